/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Canonical structured event names used across `device-proxy`.

// Construction and configuration events.
pub const TARGET_CREATE_START: &str = "target_create_start";
pub const TARGET_CREATE_OK: &str = "target_create_ok";
pub const TARGET_DISABLED: &str = "target_disabled";
pub const TARGET_CONFIG_KEY_MISSING: &str = "target_config_key_missing";
pub const TARGET_DEVICES_LOADED: &str = "target_devices_loaded";

// Outbound routing events.
pub const PUBLISH_DROP_NO_SUBFOLDER: &str = "publish_drop_no_subfolder";
pub const PUBLISH_DROP_UNKNOWN_DEVICE: &str = "publish_drop_unknown_device";
pub const PUBLISH_SEND_ATTEMPT: &str = "publish_send_attempt";
pub const PUBLISH_SEND_FAILED: &str = "publish_send_failed";
pub const PUBLISH_DROP_NO_PUBLISHER: &str = "publish_drop_no_publisher";

// Publisher pool events.
pub const PUBLISHER_CREATE: &str = "publisher_create";
pub const PUBLISHER_CREATE_FAILED: &str = "publisher_create_failed";
pub const PUBLISHER_REUSE: &str = "publisher_reuse";
pub const PUBLISHER_STALE: &str = "publisher_stale";
pub const PUBLISHER_CLOSE: &str = "publisher_close";
pub const PUBLISHER_ERROR: &str = "publisher_error";
pub const TARGET_TERMINATE: &str = "target_terminate";

// Inbound events.
pub const INBOUND_RECEIVE: &str = "inbound_receive";
pub const INBOUND_IGNORED: &str = "inbound_ignored";
pub const INBOUND_INVALID_TOPIC: &str = "inbound_invalid_topic";
pub const INBOUND_CONFIG_UPDATE: &str = "inbound_config_update";
pub const INBOUND_CONFIG_UPDATE_FAILED: &str = "inbound_config_update_failed";
pub const INBOUND_TARGET_GONE: &str = "inbound_target_gone";

// Mirror events.
pub const MIRROR_EMIT: &str = "mirror_emit";
pub const MIRROR_SEND_FAILED: &str = "mirror_send_failed";

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

//! Canonical structured field keys and value-format helpers.

pub const EVENT: &str = "event";
pub const COMPONENT: &str = "component";
pub const REGISTRY_ID: &str = "registry_id";
pub const DEVICE_ID: &str = "device_id";
pub const SUB_FOLDER: &str = "sub_folder";
pub const TOPIC: &str = "topic";
pub const PUBLISHER_KEY: &str = "publisher_key";
pub const REASON: &str = "reason";
pub const ERR: &str = "err";

pub const REASON_NOT_IN_SCOPE: &str = "device_not_in_scope";
pub const REASON_NO_SUBFOLDER: &str = "no_subfolder";
pub const REASON_NOT_CONFIG_TOPIC: &str = "not_config_topic";
pub const REASON_MALFORMED_CONFIG_TOPIC: &str = "malformed_config_topic";
pub const REASON_TERMINATED_DURING_CREATE: &str = "terminated_during_create";
pub const REASON_TARGET_DROPPED: &str = "target_dropped";

/// Renders a device list for a single log field.
pub fn format_device_list<'a>(devices: impl IntoIterator<Item = &'a String>) -> String {
    let mut sorted: Vec<&str> = devices.into_iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.join(", ")
}

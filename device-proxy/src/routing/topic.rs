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

//! Sub-channel to wire-topic mapping and inbound topic parsing.

pub const STATE_SUBFOLDER: &str = "state";
pub const STATE_TOPIC: &str = "state";
pub const CONFIG_SUBFOLDER: &str = "config";
const EVENTS_TOPIC_PREFIX: &str = "events/";
const DEVICES_SEGMENT: &str = "devices";

/// Wire topic a sub-channel is published on.
pub fn wire_topic(sub_folder: &str) -> String {
    if sub_folder == STATE_SUBFOLDER {
        STATE_TOPIC.to_string()
    } else {
        format!("{EVENTS_TOPIC_PREFIX}{sub_folder}")
    }
}

/// Inbound dispatch gate: only config topics are acted upon.
pub fn is_config_topic(topic: &str) -> bool {
    topic.ends_with(CONFIG_SUBFOLDER)
}

/// Extracts `<deviceId>` from `/devices/<deviceId>/config`.
pub fn parse_config_topic(topic: &str) -> Option<&str> {
    let mut segments = topic.split('/');
    match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(""), Some(DEVICES_SEGMENT), Some(device_id), Some(CONFIG_SUBFOLDER), None)
            if !device_id.is_empty() =>
        {
            Some(device_id)
        }
        _ => None,
    }
}

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

//! Error type shared by the proxy core and its collaborators.

use thiserror::Error;

/// Proxy errors.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// A required configuration field is missing for an otherwise eligible target.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The configuration source could not be parsed.
    #[error("Unable to parse config: {0}")]
    ConfigParse(String),

    #[error("Device directory error: {0}")]
    Directory(String),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device {device_id} has no {key} metadata")]
    MissingKeyMaterial { device_id: String, key: String },

    #[error("Unable to decode key bytes: {0}")]
    KeyDecode(#[from] base64::DecodeError),

    /// Any failure raised by a destination publisher or its underlying channel.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProxyError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn directory(message: impl Into<String>) -> Self {
        Self::Directory(message.into())
    }
}

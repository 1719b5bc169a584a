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

//! Device-management backend seam.

use crate::control_plane::proxy_config::DirectoryConfig;
use crate::error::ProxyError;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub const KEY_ALGORITHM_METADATA: &str = "key_algorithm";
pub const KEY_BYTES_METADATA: &str = "key_bytes";

/// A device as reported by the device-management backend.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Device {
    pub id: String,
    pub metadata: HashMap<String, String>,
}

/// Credential material used to open a device's destination channel.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    pub algorithm: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("algorithm", &self.algorithm)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

impl Device {
    pub fn new(id: &str, metadata: HashMap<String, String>) -> Self {
        Self {
            id: id.to_string(),
            metadata,
        }
    }

    /// Extracts the key algorithm and the base64-decoded key bytes from metadata.
    pub fn key_material(&self) -> Result<KeyMaterial, ProxyError> {
        let algorithm = self.required_metadata(KEY_ALGORITHM_METADATA)?;
        let encoded = self.required_metadata(KEY_BYTES_METADATA)?;
        let bytes = general_purpose::STANDARD.decode(encoded)?;

        Ok(KeyMaterial {
            algorithm: algorithm.to_string(),
            bytes,
        })
    }

    fn required_metadata(&self, key: &str) -> Result<&str, ProxyError> {
        self.metadata
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ProxyError::MissingKeyMaterial {
                device_id: self.id.clone(),
                key: key.to_string(),
            })
    }
}

/// Registry-scoped view of the device-management backend.
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    /// Enumerates the ids of devices currently enrolled in the registry.
    async fn list_devices(&self) -> Result<HashSet<String>, ProxyError>;

    async fn fetch_device(&self, device_id: &str) -> Result<Device, ProxyError>;

    /// Pushes a new configuration payload to a device.
    async fn set_device_config(&self, device_id: &str, payload: &str) -> Result<(), ProxyError>;
}

/// Binds a [`DeviceDirectory`] to one registry.
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    async fn connect(&self, config: DirectoryConfig)
        -> Result<Arc<dyn DeviceDirectory>, ProxyError>;
}

/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
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

//! Device directory backed by a static JSON registry file.
//!
//! The file maps registry ids to devices and their metadata:
//!
//! ```json
//! { "registries": { "ZZ-TRI-FECTA": { "AHU-1": { "metadata": { "key_algorithm": "RS256" } } } } }
//! ```
//!
//! Config pushes are kept in memory and exposed through
//! [`StaticFileDirectory::device_config`].

use async_trait::async_trait;
use device_proxy::{Device, DeviceDirectory, DirectoryConfig, DirectoryConnector, ProxyError};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs::{self, canonicalize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct RegistryFile {
    registries: HashMap<String, HashMap<String, DeviceEntry>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct DeviceEntry {
    #[serde(default)]
    metadata: HashMap<String, String>,
}

pub struct DeviceDirectoryStaticFile {
    static_file: String,
    connected: Mutex<HashMap<String, Arc<StaticFileDirectory>>>,
}

impl DeviceDirectoryStaticFile {
    pub fn new(static_file: String) -> Self {
        DeviceDirectoryStaticFile {
            static_file,
            connected: Mutex::new(HashMap::new()),
        }
    }

    /// Directory previously handed out for `registry_id`.
    pub async fn directory(&self, registry_id: &str) -> Option<Arc<StaticFileDirectory>> {
        self.connected.lock().await.get(registry_id).cloned()
    }

    fn read_registry_file(&self) -> Result<RegistryFile, ProxyError> {
        let registry_json_file = PathBuf::from(self.static_file.clone());
        debug!("registry_json_file: {registry_json_file:?}");

        let registry_json_file = canonicalize(registry_json_file).map_err(|e| {
            ProxyError::directory(format!("Static registry file not found: {e:?}"))
        })?;

        let data = fs::read_to_string(registry_json_file)
            .map_err(|e| ProxyError::directory(format!("Unable to read file: {e:?}")))?;

        serde_json::from_str(&data)
            .map_err(|e| ProxyError::directory(format!("Unable to parse JSON: {e:?}")))
    }
}

#[async_trait]
impl DirectoryConnector for DeviceDirectoryStaticFile {
    async fn connect(
        &self,
        config: DirectoryConfig,
    ) -> Result<Arc<dyn DeviceDirectory>, ProxyError> {
        let mut registry_file = self.read_registry_file()?;

        let entries = registry_file
            .registries
            .remove(&config.registry_id)
            .ok_or_else(|| {
                ProxyError::directory(format!(
                    "Registry {} not present in {}",
                    config.registry_id, self.static_file
                ))
            })?;

        info!(
            "Loaded {} devices for {}/{}/{}",
            entries.len(),
            config.project_id,
            config.cloud_region,
            config.registry_id
        );

        let devices = entries
            .into_iter()
            .map(|(id, entry)| {
                let device = Device::new(&id, entry.metadata);
                (id, device)
            })
            .collect();

        let registry_id = config.registry_id.clone();
        let directory = Arc::new(StaticFileDirectory {
            config,
            devices,
            device_configs: Mutex::new(HashMap::new()),
        });
        self.connected
            .lock()
            .await
            .insert(registry_id, directory.clone());

        Ok(directory)
    }
}

/// One registry's devices, loaded from the static file.
pub struct StaticFileDirectory {
    config: DirectoryConfig,
    devices: HashMap<String, Device>,
    device_configs: Mutex<HashMap<String, String>>,
}

impl StaticFileDirectory {
    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Latest config pushed for a device, if any.
    pub async fn device_config(&self, device_id: &str) -> Option<String> {
        self.device_configs.lock().await.get(device_id).cloned()
    }
}

#[async_trait]
impl DeviceDirectory for StaticFileDirectory {
    async fn list_devices(&self) -> Result<HashSet<String>, ProxyError> {
        Ok(self.devices.keys().cloned().collect())
    }

    async fn fetch_device(&self, device_id: &str) -> Result<Device, ProxyError> {
        self.devices
            .get(device_id)
            .cloned()
            .ok_or_else(|| ProxyError::DeviceNotFound(device_id.to_string()))
    }

    async fn set_device_config(&self, device_id: &str, payload: &str) -> Result<(), ProxyError> {
        if !self.devices.contains_key(device_id) {
            return Err(ProxyError::DeviceNotFound(device_id.to_string()));
        }
        debug!(
            "Setting config for {}/{device_id}: {payload}",
            self.config.registry_id
        );
        self.device_configs
            .lock()
            .await
            .insert(device_id.to_string(), payload.to_string());
        Ok(())
    }
}

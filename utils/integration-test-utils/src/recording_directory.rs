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

use async_trait::async_trait;
use device_proxy::{
    Device, DeviceDirectory, DirectoryConfig, DirectoryConnector, ProxyError,
    KEY_ALGORITHM_METADATA, KEY_BYTES_METADATA,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Builds a device carrying valid key metadata.
pub fn device_with_key(device_id: &str) -> Device {
    Device::new(
        device_id,
        HashMap::from([
            (KEY_ALGORITHM_METADATA.to_string(), "RS256".to_string()),
            (KEY_BYTES_METADATA.to_string(), "AQID".to_string()),
        ]),
    )
}

#[derive(Default)]
struct DirectoryState {
    devices: HashMap<String, Device>,
    connects: AtomicUsize,
    list_calls: AtomicUsize,
    connected_configs: Mutex<Vec<DirectoryConfig>>,
    fetches: Mutex<Vec<String>>,
    config_updates: Mutex<Vec<(String, String)>>,
    fail_config_updates: bool,
}

/// In-memory directory and connector that records every call made to it.
///
/// Clones share state, so a test keeps one clone and hands another to the target.
#[derive(Clone, Default)]
pub struct RecordingDirectory {
    state: Arc<DirectoryState>,
}

impl RecordingDirectory {
    /// Directory enrolling `device_ids`, each with valid key material.
    pub fn with_devices(device_ids: &[&str]) -> Self {
        Self::with_device_entries(device_ids.iter().map(|id| device_with_key(id)).collect())
    }

    pub fn with_device_entries(devices: Vec<Device>) -> Self {
        Self::build(devices, false)
    }

    /// Directory whose `set_device_config` calls all fail.
    pub fn with_failing_config_updates(device_ids: &[&str]) -> Self {
        Self::build(device_ids.iter().map(|id| device_with_key(id)).collect(), true)
    }

    fn build(devices: Vec<Device>, fail_config_updates: bool) -> Self {
        Self {
            state: Arc::new(DirectoryState {
                devices: devices
                    .into_iter()
                    .map(|device| (device.id.clone(), device))
                    .collect(),
                fail_config_updates,
                ..Default::default()
            }),
        }
    }

    pub fn connect_count(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    pub fn list_count(&self) -> usize {
        self.state.list_calls.load(Ordering::SeqCst)
    }

    /// Total calls of any kind, for asserting a directory was never touched.
    pub fn total_calls(&self) -> usize {
        self.connect_count()
            + self.list_count()
            + self.state.fetches.lock().unwrap().len()
            + self.state.config_updates.lock().unwrap().len()
    }

    pub fn connected_configs(&self) -> Vec<DirectoryConfig> {
        self.state.connected_configs.lock().unwrap().clone()
    }

    pub fn fetch_count(&self, device_id: &str) -> usize {
        self.state.fetches
            .lock()
            .unwrap()
            .iter()
            .filter(|fetched| fetched.as_str() == device_id)
            .count()
    }

    /// `(device_id, payload)` pairs in call order.
    pub fn config_updates(&self) -> Vec<(String, String)> {
        self.state.config_updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeviceDirectory for RecordingDirectory {
    async fn list_devices(&self) -> Result<HashSet<String>, ProxyError> {
        self.state.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.devices.keys().cloned().collect())
    }

    async fn fetch_device(&self, device_id: &str) -> Result<Device, ProxyError> {
        debug!("within recording_directory! fetch_device: {device_id}");
        self.state.fetches.lock().unwrap().push(device_id.to_string());
        self.state.devices
            .get(device_id)
            .cloned()
            .ok_or_else(|| ProxyError::DeviceNotFound(device_id.to_string()))
    }

    async fn set_device_config(&self, device_id: &str, payload: &str) -> Result<(), ProxyError> {
        self.state.config_updates
            .lock()
            .unwrap()
            .push((device_id.to_string(), payload.to_string()));
        if self.state.fail_config_updates {
            return Err(ProxyError::directory("config update rejected"));
        }
        Ok(())
    }
}

/// Connecting hands out the same recording instance.
#[async_trait]
impl DirectoryConnector for RecordingDirectory {
    async fn connect(
        &self,
        config: DirectoryConfig,
    ) -> Result<Arc<dyn DeviceDirectory>, ProxyError> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        self.state.connected_configs.lock().unwrap().push(config);
        Ok(Arc::new(self.clone()))
    }
}

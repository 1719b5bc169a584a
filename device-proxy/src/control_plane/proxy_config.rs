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

//! Per-registry routing configuration and the flat config-map loader.

use crate::error::ProxyError;
use crate::observability::events;
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

const COMPONENT: &str = "proxy_config";

/// Flat key/value configuration shared by every registry.
pub type ConfigMap = HashMap<String, String>;

/// Destination of a registry's forwarded traffic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyConfig {
    pub destination_project_id: String,
    pub destination_region: String,
}

/// Source-side device-directory binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryConfig {
    pub project_id: String,
    pub registry_id: String,
    pub cloud_region: String,
}

pub fn target_key(registry_id: &str) -> String {
    format!("proxy_{registry_id}_target")
}

pub fn region_key(registry_id: &str) -> String {
    format!("proxy_{registry_id}_region")
}

impl ProxyConfig {
    /// Looks up the registry's routing keys. `None` marks the registry as disabled.
    pub fn from_config_map(config_map: &ConfigMap, registry_id: &str) -> Option<Self> {
        let target_key = target_key(registry_id);
        let region_key = region_key(registry_id);

        let Some(destination_project_id) = config_map.get(&target_key) else {
            warn!(
                event = events::TARGET_CONFIG_KEY_MISSING,
                component = COMPONENT,
                registry_id,
                key = target_key.as_str(),
                "proxy target key not found"
            );
            return None;
        };
        let Some(destination_region) = config_map.get(&region_key) else {
            warn!(
                event = events::TARGET_CONFIG_KEY_MISSING,
                component = COMPONENT,
                registry_id,
                key = region_key.as_str(),
                "proxy region key not found"
            );
            return None;
        };

        Some(Self {
            destination_project_id: destination_project_id.clone(),
            destination_region: destination_region.clone(),
        })
    }

    /// Derives the source directory binding.
    ///
    /// The source registry is looked up in the destination's region.
    pub fn directory_config(&self, project_id: &str, registry_id: &str) -> DirectoryConfig {
        DirectoryConfig {
            project_id: project_id.to_string(),
            registry_id: registry_id.to_string(),
            cloud_region: self.destination_region.clone(),
        }
    }
}

/// Rejects configurations with any required field left undefined.
pub fn validate(proxy: &ProxyConfig, directory: &DirectoryConfig) -> Result<(), ProxyError> {
    let required = [
        ("cloud config cloud_region", &directory.cloud_region),
        ("cloud config registry_id", &directory.registry_id),
        ("proxy config destination_project_id", &proxy.destination_project_id),
        ("proxy config destination_region", &proxy.destination_region),
    ];

    match required.iter().find(|(_, value)| value.is_empty()) {
        Some((name, _)) => Err(ProxyError::configuration(format!("{name} not defined"))),
        None => Ok(()),
    }
}

/// Reads a JSON5 object of string values into a [`ConfigMap`].
pub fn load_config_map(path: impl AsRef<Path>) -> Result<ConfigMap, ProxyError> {
    let contents = std::fs::read_to_string(path)?;
    parse_config_map(&contents)
}

pub fn parse_config_map(contents: &str) -> Result<ConfigMap, ProxyError> {
    json5::from_str(contents).map_err(|e| ProxyError::ConfigParse(format!("{e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_map(entries: &[(&str, &str)]) -> ConfigMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn keys_are_namespaced_by_registry() {
        assert_eq!(target_key("ZZ-TRI-FECTA"), "proxy_ZZ-TRI-FECTA_target");
        assert_eq!(region_key("ZZ-TRI-FECTA"), "proxy_ZZ-TRI-FECTA_region");
    }

    #[test]
    fn from_config_map_reads_both_keys() {
        let map = config_map(&[
            ("proxy_reg_target", "dst-project"),
            ("proxy_reg_region", "us-central1"),
            ("proxy_other_target", "elsewhere"),
        ]);

        let proxy = ProxyConfig::from_config_map(&map, "reg").expect("registry is configured");

        assert_eq!(proxy.destination_project_id, "dst-project");
        assert_eq!(proxy.destination_region, "us-central1");
    }

    #[test]
    fn from_config_map_is_none_when_either_key_is_missing() {
        let only_target = config_map(&[("proxy_reg_target", "dst-project")]);
        let only_region = config_map(&[("proxy_reg_region", "us-central1")]);

        assert!(ProxyConfig::from_config_map(&only_target, "reg").is_none());
        assert!(ProxyConfig::from_config_map(&only_region, "reg").is_none());
        assert!(ProxyConfig::from_config_map(&ConfigMap::new(), "reg").is_none());
    }

    #[test]
    fn directory_config_copies_destination_region() {
        let proxy = ProxyConfig {
            destination_project_id: "dst".to_string(),
            destination_region: "europe-west1".to_string(),
        };

        let directory = proxy.directory_config("src-project", "reg");

        assert_eq!(directory.project_id, "src-project");
        assert_eq!(directory.registry_id, "reg");
        assert_eq!(directory.cloud_region, "europe-west1");
    }

    #[test]
    fn validate_names_the_first_undefined_field() {
        let proxy = ProxyConfig {
            destination_project_id: String::new(),
            destination_region: "us-central1".to_string(),
        };
        let directory = proxy.directory_config("src", "reg");

        match validate(&proxy, &directory) {
            Err(ProxyError::Configuration(message)) => {
                assert!(message.contains("destination_project_id"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn validate_accepts_complete_config() {
        let proxy = ProxyConfig {
            destination_project_id: "dst".to_string(),
            destination_region: "us-central1".to_string(),
        };
        let directory = proxy.directory_config("src", "reg");

        assert!(validate(&proxy, &directory).is_ok());
    }

    #[test]
    fn parse_config_map_accepts_json5() {
        let map = parse_config_map(
            r#"{
                // destination for the lab registry
                proxy_lab_target: "dst-project",
                "proxy_lab_region": 'us-central1',
            }"#,
        )
        .expect("json5 should parse");

        assert_eq!(map.get("proxy_lab_target").map(String::as_str), Some("dst-project"));
        assert_eq!(map.get("proxy_lab_region").map(String::as_str), Some("us-central1"));
    }

    #[test]
    fn parse_config_map_rejects_non_string_values() {
        assert!(matches!(
            parse_config_map("{ proxy_lab_target: 42 }"),
            Err(ProxyError::ConfigParse(_))
        ));
    }

    #[test]
    fn load_config_map_reports_missing_file() {
        assert!(matches!(
            load_config_map("/nonexistent/device-proxy/config.json5"),
            Err(ProxyError::Io(_))
        ));
    }
}

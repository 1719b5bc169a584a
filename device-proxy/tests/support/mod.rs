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

#![allow(dead_code)]

use device_proxy::{region_key, target_key, ConfigMap, ProxyTarget};
use integration_test_utils::{RecordingDirectory, RecordingMirror, RecordingPublisherFactory};
use std::sync::Arc;

pub(crate) const REGISTRY_ID: &str = "ZZ-TRI-FECTA";
pub(crate) const SOURCE_PROJECT: &str = "source-project";
pub(crate) const DESTINATION_PROJECT: &str = "destination-project";
pub(crate) const DESTINATION_REGION: &str = "us-central1";

pub(crate) fn enabled_config(registry_id: &str) -> ConfigMap {
    ConfigMap::from([
        (target_key(registry_id), DESTINATION_PROJECT.to_string()),
        (region_key(registry_id), DESTINATION_REGION.to_string()),
    ])
}

pub(crate) async fn make_target(
    config: &ConfigMap,
    directory: &RecordingDirectory,
    factory: &RecordingPublisherFactory,
    mirror: &RecordingMirror,
) -> ProxyTarget {
    ProxyTarget::new(
        config,
        REGISTRY_ID,
        SOURCE_PROJECT,
        Arc::new(directory.clone()),
        Arc::new(factory.clone()),
        Arc::new(mirror.clone()),
    )
    .await
    .expect("proxy target creation should succeed")
}

pub(crate) async fn make_enabled_target(
    directory: &RecordingDirectory,
    factory: &RecordingPublisherFactory,
    mirror: &RecordingMirror,
) -> ProxyTarget {
    make_target(&enabled_config(REGISTRY_ID), directory, factory, mirror).await
}

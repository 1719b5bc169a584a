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

mod support;

use device_proxy::{
    ConfigMap, Device, ProxyError, ProxyTarget, DEVICE_ID_ATTRIBUTE,
    DEVICE_REGISTRY_ID_ATTRIBUTE, KEY_ALGORITHM_METADATA, SUB_FOLDER_ATTRIBUTE,
};
use integration_test_utils::{
    PublishedMessage, RecordingDirectory, RecordingMirror, RecordingPublisherFactory,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use support::{DESTINATION_PROJECT, DESTINATION_REGION, REGISTRY_ID, SOURCE_PROJECT};

#[tokio::test]
async fn state_and_events_map_to_wire_topics() {
    integration_test_utils::init_logging();

    let directory = RecordingDirectory::with_devices(&["AHU-1"]);
    let factory = RecordingPublisherFactory::new();
    let mirror = RecordingMirror::new();
    let target = support::make_enabled_target(&directory, &factory, &mirror).await;

    target.publish("AHU-1", Some("state"), "{\"on\":true}").await;
    target.publish("AHU-1", Some("points"), "{\"temp\":21}").await;

    assert_eq!(
        factory.published(),
        vec![
            PublishedMessage {
                device_id: "AHU-1".to_string(),
                topic: "state".to_string(),
                payload: "{\"on\":true}".to_string(),
            },
            PublishedMessage {
                device_id: "AHU-1".to_string(),
                topic: "events/points".to_string(),
                payload: "{\"temp\":21}".to_string(),
            },
        ]
    );
    assert_eq!(factory.connect_count(), 1);
    assert_eq!(target.publisher_count().await, 1);
}

#[tokio::test]
async fn routed_messages_are_mirrored_with_attributes() {
    integration_test_utils::init_logging();

    let directory = RecordingDirectory::with_devices(&["AHU-1"]);
    let factory = RecordingPublisherFactory::new();
    let mirror = RecordingMirror::new();
    let target = support::make_enabled_target(&directory, &factory, &mirror).await;

    target.publish("AHU-1", Some("points"), "{\"temp\":21}").await;

    let bundles = mirror.bundles();
    assert_eq!(bundles.len(), 1);
    assert_eq!(bundles[0].payload, "{\"temp\":21}");
    assert_eq!(
        bundles[0].attributes,
        HashMap::from([
            (DEVICE_REGISTRY_ID_ATTRIBUTE.to_string(), REGISTRY_ID.to_string()),
            (DEVICE_ID_ATTRIBUTE.to_string(), "AHU-1".to_string()),
            (SUB_FOLDER_ATTRIBUTE.to_string(), "points".to_string()),
        ])
    );
}

#[tokio::test]
async fn publisher_binding_targets_destination_registry() {
    integration_test_utils::init_logging();

    let directory = RecordingDirectory::with_devices(&["AHU-1"]);
    let factory = RecordingPublisherFactory::new();
    let mirror = RecordingMirror::new();
    let target = support::make_enabled_target(&directory, &factory, &mirror).await;

    target.publish("AHU-1", Some("state"), "{}").await;

    let publishers = factory.publishers_for("AHU-1");
    assert_eq!(publishers.len(), 1);
    let binding = publishers[0].binding();
    assert_eq!(binding.project_id, DESTINATION_PROJECT);
    assert_eq!(binding.cloud_region, DESTINATION_REGION);
    assert_eq!(binding.registry_id, REGISTRY_ID);
    assert_eq!(binding.device_id, "AHU-1");
    assert_eq!(binding.key.algorithm, "RS256");
    assert_eq!(binding.key.bytes, vec![1, 2, 3]);

    let connected = directory.connected_configs();
    assert_eq!(connected.len(), 1);
    assert_eq!(connected[0].project_id, SOURCE_PROJECT);
    assert_eq!(connected[0].registry_id, REGISTRY_ID);
    assert_eq!(connected[0].cloud_region, DESTINATION_REGION);
}

#[tokio::test]
async fn message_without_sub_folder_is_dropped() {
    integration_test_utils::init_logging();

    let directory = RecordingDirectory::with_devices(&["AHU-1"]);
    let factory = RecordingPublisherFactory::new();
    let mirror = RecordingMirror::new();
    let target = support::make_enabled_target(&directory, &factory, &mirror).await;

    target.publish("AHU-1", None, "{}").await;

    assert_eq!(factory.connect_count(), 0);
    assert_eq!(directory.fetch_count("AHU-1"), 0);
    assert!(mirror.is_empty());
}

#[tokio::test]
async fn unknown_device_is_ignored_once() {
    integration_test_utils::init_logging();

    let directory = RecordingDirectory::with_devices(&["AHU-1"]);
    let factory = RecordingPublisherFactory::new();
    let mirror = RecordingMirror::new();
    let target = support::make_enabled_target(&directory, &factory, &mirror).await;

    for _ in 0..3 {
        target.publish("SNS-9", Some("state"), "{}").await;
    }

    assert_eq!(
        target.ignored_devices().await,
        HashSet::from(["SNS-9".to_string()])
    );
    assert_eq!(factory.connect_count(), 0);
    assert_eq!(directory.fetch_count("SNS-9"), 0);
    assert!(mirror.is_empty());
}

#[tokio::test]
async fn disabled_registry_is_inert() {
    integration_test_utils::init_logging();

    let directory = RecordingDirectory::with_devices(&["AHU-1"]);
    let factory = RecordingPublisherFactory::new();
    let mirror = RecordingMirror::new();
    let target = support::make_target(&ConfigMap::new(), &directory, &factory, &mirror).await;

    target.publish("AHU-1", Some("state"), "{}").await;
    target.publish("AHU-1", Some("points"), "{}").await;
    target.terminate().await;

    assert!(!target.is_enabled());
    assert!(target.proxy_config().is_none());
    assert_eq!(directory.total_calls(), 0);
    assert_eq!(factory.connect_count(), 0);
    assert!(mirror.is_empty());
}

#[tokio::test]
async fn registry_with_only_target_key_is_disabled() {
    integration_test_utils::init_logging();

    let directory = RecordingDirectory::with_devices(&["AHU-1"]);
    let factory = RecordingPublisherFactory::new();
    let mirror = RecordingMirror::new();
    let config = ConfigMap::from([(
        device_proxy::target_key(REGISTRY_ID),
        DESTINATION_PROJECT.to_string(),
    )]);
    let target = support::make_target(&config, &directory, &factory, &mirror).await;

    assert!(!target.is_enabled());
    assert_eq!(directory.total_calls(), 0);
}

#[tokio::test]
async fn enabled_registry_exposes_scope_and_config() {
    integration_test_utils::init_logging();

    let directory = RecordingDirectory::with_devices(&["AHU-1", "AHU-22"]);
    let factory = RecordingPublisherFactory::new();
    let mirror = RecordingMirror::new();
    let target = support::make_enabled_target(&directory, &factory, &mirror).await;

    assert!(target.is_enabled());
    assert_eq!(target.registry_id(), REGISTRY_ID);
    let config = target.proxy_config().expect("enabled target has a config");
    assert_eq!(config.destination_project_id, DESTINATION_PROJECT);
    assert_eq!(config.destination_region, DESTINATION_REGION);
    assert_eq!(
        target.target_devices().cloned(),
        Some(HashSet::from(["AHU-1".to_string(), "AHU-22".to_string()]))
    );
    assert_eq!(directory.connect_count(), 1);
    assert_eq!(directory.list_count(), 1);
}

#[tokio::test]
async fn empty_region_fails_construction() {
    integration_test_utils::init_logging();

    let directory = RecordingDirectory::with_devices(&["AHU-1"]);
    let config = ConfigMap::from([
        (
            device_proxy::target_key(REGISTRY_ID),
            DESTINATION_PROJECT.to_string(),
        ),
        (device_proxy::region_key(REGISTRY_ID), String::new()),
    ]);

    let result = ProxyTarget::new(
        &config,
        REGISTRY_ID,
        SOURCE_PROJECT,
        Arc::new(directory.clone()),
        Arc::new(RecordingPublisherFactory::new()),
        Arc::new(RecordingMirror::new()),
    )
    .await;

    assert!(matches!(result, Err(ProxyError::Configuration(_))));
    assert_eq!(directory.total_calls(), 0);
}

#[tokio::test]
async fn device_without_key_material_is_dropped() {
    integration_test_utils::init_logging();

    let directory = RecordingDirectory::with_device_entries(vec![Device::new(
        "GAT-123",
        HashMap::from([(KEY_ALGORITHM_METADATA.to_string(), "RS256".to_string())]),
    )]);
    let factory = RecordingPublisherFactory::new();
    let mirror = RecordingMirror::new();
    let target = support::make_enabled_target(&directory, &factory, &mirror).await;

    target.publish("GAT-123", Some("state"), "{}").await;

    assert_eq!(directory.fetch_count("GAT-123"), 1);
    assert_eq!(factory.connect_count(), 0);
    assert_eq!(target.publisher_count().await, 0);
    assert!(mirror.is_empty());
}

#[tokio::test]
async fn failed_connect_is_retried_on_next_message() {
    integration_test_utils::init_logging();

    let directory = RecordingDirectory::with_devices(&["AHU-1"]);
    let factory = RecordingPublisherFactory::new();
    let mirror = RecordingMirror::new();
    let target = support::make_enabled_target(&directory, &factory, &mirror).await;

    factory.fail_connects(true);
    target.publish("AHU-1", Some("state"), "first").await;
    assert!(mirror.is_empty());
    assert_eq!(target.publisher_count().await, 0);

    factory.fail_connects(false);
    target.publish("AHU-1", Some("state"), "second").await;

    assert_eq!(factory.connect_count(), 2);
    assert_eq!(target.publisher_count().await, 1);
    assert_eq!(mirror.len(), 1);
    assert_eq!(mirror.bundles()[0].payload, "second");
}

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

use crate::control_plane::proxy_config::{self, ConfigMap, ProxyConfig};
use crate::data_plane::inbound_listener::InboundListener;
use crate::data_plane::publisher_pool::{AcquireError, PublisherPool};
use crate::directory::{DeviceDirectory, DirectoryConnector};
use crate::error::ProxyError;
use crate::mirror::{MessageBundle, MirrorSink};
use crate::observability::{events, fields};
use crate::publisher::{DestinationPublisher, PublisherBinding, PublisherFactory, PublisherListener};
use crate::routing::publisher_key::PublisherKey;
use crate::routing::topic::{self, CONFIG_SUBFOLDER};
use std::collections::HashSet;
use std::sync::{Arc, Weak};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

const COMPONENT: &str = "proxy_target";

///
/// [`ProxyTarget`] forwards the device traffic of one source registry to a destination
/// registry and mirrors every forwarded message to a [`MirrorSink`].
///
/// A registry is enabled by two entries in the shared config map,
/// `proxy_<registryId>_target` (destination project) and `proxy_<registryId>_region`.
/// Without them the target is constructed disabled and stays inert for its lifetime.
///
/// Devices in scope are the ones enrolled in the registry when the target is created.
/// Each device gets one [`DestinationPublisher`], opened on first use and kept until
/// [`terminate`](ProxyTarget::terminate) or until any publisher reports an error, which
/// tears down every publisher of the registry. The next message reconnects on demand.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use device_proxy::{MessageBundle, ProxyTarget};
///
/// # use async_trait::async_trait;
/// # use device_proxy::{
/// #     DestinationPublisher, DeviceDirectory, DirectoryConfig, DirectoryConnector,
/// #     ProxyError, PublisherBinding, PublisherFactory, PublisherListener,
/// # };
/// # struct NoDirectory;
/// # #[async_trait]
/// # impl DirectoryConnector for NoDirectory {
/// #     async fn connect(
/// #         &self,
/// #         _config: DirectoryConfig,
/// #     ) -> Result<Arc<dyn DeviceDirectory>, ProxyError> {
/// #         Err(ProxyError::directory("not used in this example"))
/// #     }
/// # }
/// # struct NoPublisher;
/// # #[async_trait]
/// # impl PublisherFactory for NoPublisher {
/// #     async fn connect(
/// #         &self,
/// #         _binding: PublisherBinding,
/// #         _listener: Arc<dyn PublisherListener>,
/// #     ) -> Result<Arc<dyn DestinationPublisher>, ProxyError> {
/// #         Err(ProxyError::transport("not used in this example"))
/// #     }
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// // No `proxy_lab_*` keys: the target comes up disabled and never touches the directory.
/// let target = ProxyTarget::new(
///     &HashMap::new(),
///     "lab",
///     "source-project",
///     Arc::new(NoDirectory),
///     Arc::new(NoPublisher),
///     Arc::new(|bundle: MessageBundle| println!("mirror: {bundle:?}")),
/// )
/// .await
/// .unwrap();
///
/// assert!(!target.is_enabled());
/// target.publish("AHU-1", Some("state"), "{}").await;
/// # });
/// ```
pub struct ProxyTarget {
    registry_id: String,
    active: Option<Arc<ActiveTarget>>,
}

impl ProxyTarget {
    /// Creates the target for `registry_id`.
    ///
    /// Fails only when the registry is configured but incomplete, or when the device
    /// directory cannot be bound or listed. A registry without routing keys yields a
    /// disabled target.
    pub async fn new(
        config_map: &ConfigMap,
        registry_id: &str,
        project_id: &str,
        connector: Arc<dyn DirectoryConnector>,
        publisher_factory: Arc<dyn PublisherFactory>,
        mirror: Arc<dyn MirrorSink>,
    ) -> Result<Self, ProxyError> {
        info!(
            event = events::TARGET_CREATE_START,
            component = COMPONENT,
            registry_id,
            "creating proxy target"
        );

        let Some(proxy_config) = ProxyConfig::from_config_map(config_map, registry_id) else {
            info!(
                event = events::TARGET_DISABLED,
                component = COMPONENT,
                registry_id,
                "ignoring unknown proxy target"
            );
            return Ok(Self {
                registry_id: registry_id.to_string(),
                active: None,
            });
        };

        let directory_config = proxy_config.directory_config(project_id, registry_id);
        proxy_config::validate(&proxy_config, &directory_config)?;

        info!(
            event = events::TARGET_CREATE_START,
            component = COMPONENT,
            registry_id,
            destination_project_id = proxy_config.destination_project_id.as_str(),
            destination_region = proxy_config.destination_region.as_str(),
            "pushing to destination registry"
        );

        let directory = connector.connect(directory_config).await?;
        let target_devices = directory.list_devices().await?;
        info!(
            event = events::TARGET_DEVICES_LOADED,
            component = COMPONENT,
            registry_id,
            devices = fields::format_device_list(&target_devices).as_str(),
            "proxying for devices"
        );

        let active = Arc::new_cyclic(|self_ref| ActiveTarget {
            registry_id: registry_id.to_string(),
            proxy_config,
            target_devices,
            ignored_devices: Mutex::new(HashSet::new()),
            publishers: PublisherPool::new(),
            directory,
            publisher_factory,
            mirror,
            self_ref: self_ref.clone(),
        });

        info!(
            event = events::TARGET_CREATE_OK,
            component = COMPONENT,
            registry_id,
            "created proxy target"
        );

        Ok(Self {
            registry_id: registry_id.to_string(),
            active: Some(active),
        })
    }

    pub fn registry_id(&self) -> &str {
        &self.registry_id
    }

    pub fn is_enabled(&self) -> bool {
        self.active.is_some()
    }

    pub fn proxy_config(&self) -> Option<&ProxyConfig> {
        self.active.as_ref().map(|active| &active.proxy_config)
    }

    /// Devices in scope, fixed at construction. `None` when disabled.
    pub fn target_devices(&self) -> Option<&HashSet<String>> {
        self.active.as_ref().map(|active| &active.target_devices)
    }

    /// Out-of-scope devices seen so far.
    pub async fn ignored_devices(&self) -> HashSet<String> {
        match &self.active {
            Some(active) => active.ignored_devices.lock().await.clone(),
            None => HashSet::new(),
        }
    }

    /// Number of live destination publishers.
    pub async fn publisher_count(&self) -> usize {
        match &self.active {
            Some(active) => active.publishers.len().await,
            None => 0,
        }
    }

    /// Routes one message from `device_id`.
    ///
    /// Never reports failure: dropped messages and transport errors are logged, and
    /// transport errors tear down the registry's publishers.
    pub async fn publish(&self, device_id: &str, sub_folder: Option<&str>, data: &str) {
        if let Some(active) = &self.active {
            active.publish(device_id, sub_folder, data).await;
        }
    }

    /// Closes and forgets every cached publisher. The target stays enabled.
    pub async fn terminate(&self) {
        if let Some(active) = &self.active {
            active.terminate().await;
        }
    }
}

/// State of an enabled target, shared with the listeners of its publishers.
pub(crate) struct ActiveTarget {
    registry_id: String,
    proxy_config: ProxyConfig,
    target_devices: HashSet<String>,
    ignored_devices: Mutex<HashSet<String>>,
    publishers: PublisherPool,
    directory: Arc<dyn DeviceDirectory>,
    publisher_factory: Arc<dyn PublisherFactory>,
    mirror: Arc<dyn MirrorSink>,
    self_ref: Weak<ActiveTarget>,
}

impl ActiveTarget {
    async fn publish(&self, device_id: &str, sub_folder: Option<&str>, data: &str) {
        let registry_id = self.registry_id.as_str();

        let Some(sub_folder) = sub_folder else {
            info!(
                event = events::PUBLISH_DROP_NO_SUBFOLDER,
                component = COMPONENT,
                registry_id,
                device_id,
                reason = fields::REASON_NO_SUBFOLDER,
                "ignoring message with no subFolder"
            );
            return;
        };

        if !self.target_devices.contains(device_id) {
            if self.mark_ignored(device_id).await {
                info!(
                    event = events::PUBLISH_DROP_UNKNOWN_DEVICE,
                    component = COMPONENT,
                    registry_id,
                    device_id,
                    sub_folder,
                    reason = fields::REASON_NOT_IN_SCOPE,
                    "ignoring message for device"
                );
            }
            return;
        }

        info!(
            event = events::PUBLISH_SEND_ATTEMPT,
            component = COMPONENT,
            registry_id,
            device_id,
            sub_folder,
            "sending message"
        );

        let publisher = match self.publisher(device_id).await {
            Ok(publisher) => publisher,
            Err(AcquireError::Connect(err)) => {
                error!(
                    event = events::PUBLISHER_CREATE_FAILED,
                    component = COMPONENT,
                    registry_id,
                    device_id,
                    err = %err,
                    "unable to create destination publisher; dropping message"
                );
                return;
            }
            Err(AcquireError::Stale) => {
                warn!(
                    event = events::PUBLISH_DROP_NO_PUBLISHER,
                    component = COMPONENT,
                    registry_id,
                    device_id,
                    reason = fields::REASON_TERMINATED_DURING_CREATE,
                    "publisher torn down while connecting; dropping message"
                );
                return;
            }
        };

        let topic = topic::wire_topic(sub_folder);
        if let Err(err) = publisher.publish(device_id, &topic, data).await {
            error!(
                event = events::PUBLISH_SEND_FAILED,
                component = COMPONENT,
                registry_id,
                device_id,
                topic = topic.as_str(),
                err = %err,
                "publish failed; tearing down registry publishers"
            );
            self.terminate().await;
        }

        self.mirror(device_id, data, sub_folder);
    }

    /// Records an out-of-scope device. Returns `true` only the first time it is seen.
    async fn mark_ignored(&self, device_id: &str) -> bool {
        let mut ignored = self.ignored_devices.lock().await;
        ignored.insert(device_id.to_string())
    }

    async fn publisher(
        &self,
        device_id: &str,
    ) -> Result<Arc<dyn DestinationPublisher>, AcquireError> {
        let key = PublisherKey::new(
            &self.proxy_config.destination_project_id,
            &self.registry_id,
            device_id,
        );
        self.publishers
            .get_or_connect(&key, || self.connect_publisher(device_id))
            .await
    }

    async fn connect_publisher(
        &self,
        device_id: &str,
    ) -> Result<Arc<dyn DestinationPublisher>, ProxyError> {
        let device = self.directory.fetch_device(device_id).await?;
        let key = device.key_material()?;

        let binding = PublisherBinding {
            project_id: self.proxy_config.destination_project_id.clone(),
            cloud_region: self.proxy_config.destination_region.clone(),
            registry_id: self.registry_id.clone(),
            device_id: device_id.to_string(),
            key,
        };
        let listener: Arc<dyn PublisherListener> =
            Arc::new(InboundListener::new(self.self_ref.clone(), device_id));

        self.publisher_factory.connect(binding, listener).await
    }

    pub(crate) async fn terminate(&self) {
        let closed = self.publishers.close_all().await;
        info!(
            event = events::TARGET_TERMINATE,
            component = COMPONENT,
            registry_id = self.registry_id.as_str(),
            closed,
            "closed destination publishers"
        );
    }

    /// Any publisher error is a registry-wide fault.
    pub(crate) async fn handle_publisher_error(&self, device_id: &str, error: ProxyError) {
        error!(
            event = events::PUBLISHER_ERROR,
            component = COMPONENT,
            registry_id = self.registry_id.as_str(),
            device_id,
            err = %error,
            "publisher error"
        );
        self.terminate().await;
    }

    pub(crate) async fn handle_inbound(&self, topic: &str, payload: String) {
        let registry_id = self.registry_id.as_str();
        info!(
            event = events::INBOUND_RECEIVE,
            component = COMPONENT,
            registry_id,
            topic,
            "received message"
        );

        if !topic::is_config_topic(topic) {
            debug!(
                event = events::INBOUND_IGNORED,
                component = COMPONENT,
                registry_id,
                topic,
                reason = fields::REASON_NOT_CONFIG_TOPIC,
                "ignoring inbound message"
            );
            return;
        }

        let Some(device_id) = topic::parse_config_topic(topic) else {
            warn!(
                event = events::INBOUND_INVALID_TOPIC,
                component = COMPONENT,
                registry_id,
                topic,
                reason = fields::REASON_MALFORMED_CONFIG_TOPIC,
                "unable to extract device from config topic"
            );
            return;
        };

        info!(
            event = events::INBOUND_CONFIG_UPDATE,
            component = COMPONENT,
            registry_id,
            device_id,
            "updating device config"
        );
        if let Err(err) = self.directory.set_device_config(device_id, &payload).await {
            error!(
                event = events::INBOUND_CONFIG_UPDATE_FAILED,
                component = COMPONENT,
                registry_id,
                device_id,
                err = %err,
                "device config update failed"
            );
            return;
        }

        self.mirror(device_id, &payload, CONFIG_SUBFOLDER);
    }

    fn mirror(&self, device_id: &str, payload: &str, sub_folder: &str) {
        debug!(
            event = events::MIRROR_EMIT,
            component = COMPONENT,
            registry_id = self.registry_id.as_str(),
            device_id,
            sub_folder,
            "mirroring message"
        );
        self.mirror.accept(MessageBundle::routed(
            &self.registry_id,
            device_id,
            sub_folder,
            payload,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_plane::proxy_config::DirectoryConfig;
    use crate::directory::Device;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticDirectory {
        devices: HashSet<String>,
        config_updates: AtomicUsize,
    }

    #[async_trait]
    impl DeviceDirectory for StaticDirectory {
        async fn list_devices(&self) -> Result<HashSet<String>, ProxyError> {
            Ok(self.devices.clone())
        }

        async fn fetch_device(&self, device_id: &str) -> Result<Device, ProxyError> {
            Ok(Device::new(
                device_id,
                HashMap::from([
                    ("key_algorithm".to_string(), "RS256".to_string()),
                    ("key_bytes".to_string(), "AQID".to_string()),
                ]),
            ))
        }

        async fn set_device_config(
            &self,
            _device_id: &str,
            _payload: &str,
        ) -> Result<(), ProxyError> {
            self.config_updates.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct StaticConnector {
        directory: Arc<StaticDirectory>,
        connects: AtomicUsize,
    }

    #[async_trait]
    impl DirectoryConnector for StaticConnector {
        async fn connect(
            &self,
            _config: DirectoryConfig,
        ) -> Result<Arc<dyn DeviceDirectory>, ProxyError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(self.directory.clone())
        }
    }

    struct NullPublisher;

    #[async_trait]
    impl DestinationPublisher for NullPublisher {
        async fn publish(
            &self,
            _device_id: &str,
            _topic: &str,
            _payload: &str,
        ) -> Result<(), ProxyError> {
            Ok(())
        }

        async fn close(&self) {}
    }

    #[derive(Default)]
    struct NullFactory {
        listeners: std::sync::Mutex<Vec<Arc<dyn PublisherListener>>>,
    }

    #[async_trait]
    impl PublisherFactory for NullFactory {
        async fn connect(
            &self,
            _binding: PublisherBinding,
            listener: Arc<dyn PublisherListener>,
        ) -> Result<Arc<dyn DestinationPublisher>, ProxyError> {
            self.listeners.lock().unwrap().push(listener);
            Ok(Arc::new(NullPublisher))
        }
    }

    fn connector(devices: &[&str]) -> Arc<StaticConnector> {
        Arc::new(StaticConnector {
            directory: Arc::new(StaticDirectory {
                devices: devices.iter().map(|d| d.to_string()).collect(),
                config_updates: AtomicUsize::new(0),
            }),
            connects: AtomicUsize::new(0),
        })
    }

    fn enabled_config() -> ConfigMap {
        HashMap::from([
            ("proxy_reg_target".to_string(), "dst".to_string()),
            ("proxy_reg_region".to_string(), "us-central1".to_string()),
        ])
    }

    async fn make_target(
        config: &ConfigMap,
        connector: Arc<StaticConnector>,
        factory: Arc<NullFactory>,
    ) -> ProxyTarget {
        ProxyTarget::new(
            config,
            "reg",
            "src",
            connector,
            factory,
            Arc::new(|_bundle: MessageBundle| {}),
        )
        .await
        .expect("target should build")
    }

    #[tokio::test]
    async fn mark_ignored_is_true_only_once() {
        let target = make_target(&enabled_config(), connector(&["a"]), Arc::default()).await;
        let active = target.active.as_ref().expect("target is enabled");

        assert!(active.mark_ignored("stranger").await);
        assert!(!active.mark_ignored("stranger").await);
        assert!(active.mark_ignored("other").await);
    }

    #[tokio::test]
    async fn ignored_devices_survive_terminate() {
        let target = make_target(&enabled_config(), connector(&["a"]), Arc::default()).await;

        target.publish("stranger", Some("state"), "{}").await;
        target.terminate().await;

        assert!(target.ignored_devices().await.contains("stranger"));
    }

    #[tokio::test]
    async fn disabled_target_never_connects_directory() {
        let connector = connector(&["a"]);
        let target = make_target(&ConfigMap::new(), connector.clone(), Arc::default()).await;

        target.publish("a", Some("state"), "{}").await;
        target.terminate().await;

        assert!(!target.is_enabled());
        assert_eq!(target.registry_id(), "reg");
        assert!(target.target_devices().is_none());
        assert_eq!(connector.connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn incomplete_config_fails_construction() {
        let config = HashMap::from([
            ("proxy_reg_target".to_string(), String::new()),
            ("proxy_reg_region".to_string(), "us-central1".to_string()),
        ]);

        let result = ProxyTarget::new(
            &config,
            "reg",
            "src",
            connector(&["a"]),
            Arc::new(NullFactory::default()),
            Arc::new(|_bundle: MessageBundle| {}),
        )
        .await;

        assert!(matches!(result, Err(ProxyError::Configuration(_))));
    }

    #[tokio::test]
    async fn listener_outliving_target_drops_traffic() {
        let connector = connector(&["a"]);
        let directory = connector.directory.clone();
        let factory = Arc::new(NullFactory::default());
        let target = make_target(&enabled_config(), connector, factory.clone()).await;

        target.publish("a", Some("state"), "{}").await;
        drop(target);

        let listener = factory.listeners.lock().unwrap().pop().expect("listener");
        listener
            .on_message("/devices/a/config", "{}".to_string())
            .await;
        listener.on_error(ProxyError::transport("late")).await;

        assert_eq!(directory.config_updates.load(Ordering::SeqCst), 0);
    }
}

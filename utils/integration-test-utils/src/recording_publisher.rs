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
    DestinationPublisher, ProxyError, PublisherBinding, PublisherFactory, PublisherListener,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishedMessage {
    pub device_id: String,
    pub topic: String,
    pub payload: String,
}

/// Destination publisher that stores what it is asked to send.
pub struct RecordingPublisher {
    binding: PublisherBinding,
    published: Mutex<Vec<PublishedMessage>>,
    closes: AtomicUsize,
    fail_publish: bool,
}

impl RecordingPublisher {
    pub fn binding(&self) -> &PublisherBinding {
        &self.binding
    }

    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.close_count() > 0
    }
}

#[async_trait]
impl DestinationPublisher for RecordingPublisher {
    async fn publish(
        &self,
        device_id: &str,
        topic: &str,
        payload: &str,
    ) -> Result<(), ProxyError> {
        debug!("within recording_publisher! device_id: {device_id} topic: {topic}");
        self.published.lock().unwrap().push(PublishedMessage {
            device_id: device_id.to_string(),
            topic: topic.to_string(),
            payload: payload.to_string(),
        });
        if self.fail_publish {
            return Err(ProxyError::transport("publish rejected"));
        }
        Ok(())
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct FactoryState {
    connect_delay: Option<Duration>,
    fail_connect: AtomicBool,
    fail_publish: AtomicBool,
    connects: AtomicUsize,
    publishers: Mutex<Vec<Arc<RecordingPublisher>>>,
    listeners: Mutex<HashMap<String, Arc<dyn PublisherListener>>>,
}

/// Publisher factory that records every channel it opens.
///
/// Clones share state. The listener handed to the latest channel of each device is kept
/// so tests can drive inbound traffic and channel errors.
#[derive(Clone, Default)]
pub struct RecordingPublisherFactory {
    state: Arc<FactoryState>,
}

impl RecordingPublisherFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory that sleeps for `delay` before opening each channel.
    pub fn with_connect_delay(delay: Duration) -> Self {
        Self {
            state: Arc::new(FactoryState {
                connect_delay: Some(delay),
                ..Default::default()
            }),
        }
    }

    /// Makes subsequent connects fail.
    pub fn fail_connects(&self, fail: bool) {
        self.state.fail_connect.store(fail, Ordering::SeqCst);
    }

    /// Makes publishers opened from now on reject every publish.
    pub fn fail_publishes(&self, fail: bool) {
        self.state.fail_publish.store(fail, Ordering::SeqCst);
    }

    pub fn connect_count(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    /// Publishers in creation order.
    pub fn publishers(&self) -> Vec<Arc<RecordingPublisher>> {
        self.state.publishers.lock().unwrap().clone()
    }

    pub fn publishers_for(&self, device_id: &str) -> Vec<Arc<RecordingPublisher>> {
        self.publishers()
            .into_iter()
            .filter(|publisher| publisher.binding.device_id == device_id)
            .collect()
    }

    /// Every message published through any channel, in order.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.publishers()
            .iter()
            .flat_map(|publisher| publisher.published())
            .collect()
    }

    pub fn listener(&self, device_id: &str) -> Option<Arc<dyn PublisherListener>> {
        self.state.listeners.lock().unwrap().get(device_id).cloned()
    }
}

#[async_trait]
impl PublisherFactory for RecordingPublisherFactory {
    async fn connect(
        &self,
        binding: PublisherBinding,
        listener: Arc<dyn PublisherListener>,
    ) -> Result<Arc<dyn DestinationPublisher>, ProxyError> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.state.connect_delay {
            tokio::time::sleep(delay).await;
        }
        if self.state.fail_connect.load(Ordering::SeqCst) {
            return Err(ProxyError::transport("connect rejected"));
        }

        debug!(
            "within recording_publisher_factory! binding: {}/{}/{}",
            binding.project_id, binding.registry_id, binding.device_id
        );
        self.state
            .listeners
            .lock()
            .unwrap()
            .insert(binding.device_id.clone(), listener);

        let publisher = Arc::new(RecordingPublisher {
            binding,
            published: Mutex::new(Vec::new()),
            closes: AtomicUsize::new(0),
            fail_publish: self.state.fail_publish.load(Ordering::SeqCst),
        });
        self.state.publishers.lock().unwrap().push(publisher.clone());
        Ok(publisher)
    }
}

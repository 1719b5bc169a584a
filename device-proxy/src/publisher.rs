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

//! Destination transport seam.
//!
//! A [`PublisherFactory`] opens one [`DestinationPublisher`] per device. The publisher
//! reports traffic arriving on its channel, and fatal channel errors, through the
//! [`PublisherListener`] it was created with.

use crate::directory::KeyMaterial;
use crate::error::ProxyError;
use async_trait::async_trait;
use std::sync::Arc;

/// Identity and credentials a destination channel is opened with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublisherBinding {
    pub project_id: String,
    pub cloud_region: String,
    pub registry_id: String,
    pub device_id: String,
    pub key: KeyMaterial,
}

/// Per-device outbound channel toward the destination registry.
#[async_trait]
pub trait DestinationPublisher: Send + Sync {
    async fn publish(&self, device_id: &str, topic: &str, payload: &str)
        -> Result<(), ProxyError>;

    /// Closes the channel. Must be safe to call more than once.
    async fn close(&self);
}

/// Callbacks a destination channel drives.
#[async_trait]
pub trait PublisherListener: Send + Sync {
    async fn on_message(&self, topic: &str, payload: String);

    async fn on_error(&self, error: ProxyError);
}

#[async_trait]
pub trait PublisherFactory: Send + Sync {
    async fn connect(
        &self,
        binding: PublisherBinding,
        listener: Arc<dyn PublisherListener>,
    ) -> Result<Arc<dyn DestinationPublisher>, ProxyError>;
}

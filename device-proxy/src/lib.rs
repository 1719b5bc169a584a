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

//! # device-proxy
//!
//! `device-proxy` forwards device telemetry, state and config traffic from a source
//! registry to a destination registry, one [`ProxyTarget`] per source registry.
//!
//! Every routed message is also handed to a [`MirrorSink`] as a [`MessageBundle`]
//! tagged with `deviceRegistryId`, `deviceId` and `subFolder`.
//!
//! The crate does not talk to any backend itself. Embedders provide:
//!
//! - a [`DirectoryConnector`] / [`DeviceDirectory`] for device enumeration, credential
//!   lookup and config pushes,
//! - a [`PublisherFactory`] opening one [`DestinationPublisher`] per device, which reports
//!   inbound traffic and channel errors through a [`PublisherListener`].
//!
//! ## Routing contract
//!
//! - sub-folder `state` is published on topic `state`, any other sub-folder `X` on
//!   `events/X`;
//! - messages without a sub-folder, or from devices not enrolled when the target was
//!   created, are dropped and never mirrored;
//! - inbound messages on `/devices/<deviceId>/config` are pushed to the directory and
//!   mirrored with sub-folder `config`; other inbound topics are ignored;
//! - an error from any publisher closes every publisher of the registry, and the next
//!   message for a device reconnects it.
//!
//! ## Internal architecture map
//!
//! - Control plane: per-registry routing configuration and validation
//! - Routing: sub-folder/topic mapping and publisher identity
//! - Data plane: publisher pool and inbound listener
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events.
//! Library code emits events and does not initialize a global subscriber.
//! Binaries and tests are responsible for one-time `tracing_subscriber` initialization.

mod control_plane;
pub use control_plane::proxy_config::{
    load_config_map, parse_config_map, region_key, target_key, ConfigMap, DirectoryConfig,
    ProxyConfig,
};

mod data_plane;

mod directory;
pub use directory::{
    Device, DeviceDirectory, DirectoryConnector, KeyMaterial, KEY_ALGORITHM_METADATA,
    KEY_BYTES_METADATA,
};

mod error;
pub use error::ProxyError;

mod mirror;
pub use mirror::{
    MessageBundle, MirrorSink, DEVICE_ID_ATTRIBUTE, DEVICE_REGISTRY_ID_ATTRIBUTE,
    SUB_FOLDER_ATTRIBUTE,
};

#[doc(hidden)]
pub mod observability;

mod publisher;
pub use publisher::{DestinationPublisher, PublisherBinding, PublisherFactory, PublisherListener};

mod routing;
pub use routing::topic::{wire_topic, STATE_TOPIC};

mod proxy_target;
pub use proxy_target::ProxyTarget;

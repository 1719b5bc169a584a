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

//! Mirror side-channel: a copy of every handled message plus routing attributes.

use crate::observability::events;
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

pub const DEVICE_REGISTRY_ID_ATTRIBUTE: &str = "deviceRegistryId";
pub const DEVICE_ID_ATTRIBUTE: &str = "deviceId";
pub const SUB_FOLDER_ATTRIBUTE: &str = "subFolder";

const COMPONENT: &str = "mirror";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageBundle {
    pub payload: String,
    pub attributes: HashMap<String, String>,
}

impl MessageBundle {
    /// Builds a bundle carrying the three routing attributes.
    pub fn routed(registry_id: &str, device_id: &str, sub_folder: &str, payload: &str) -> Self {
        let attributes = HashMap::from([
            (DEVICE_REGISTRY_ID_ATTRIBUTE.to_string(), registry_id.to_string()),
            (DEVICE_ID_ATTRIBUTE.to_string(), device_id.to_string()),
            (SUB_FOLDER_ATTRIBUTE.to_string(), sub_folder.to_string()),
        ]);

        Self {
            payload: payload.to_string(),
            attributes,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn device_registry_id(&self) -> Option<&str> {
        self.attribute(DEVICE_REGISTRY_ID_ATTRIBUTE)
    }

    pub fn device_id(&self) -> Option<&str> {
        self.attribute(DEVICE_ID_ATTRIBUTE)
    }

    pub fn sub_folder(&self) -> Option<&str> {
        self.attribute(SUB_FOLDER_ATTRIBUTE)
    }
}

/// Receiver of mirrored bundles.
pub trait MirrorSink: Send + Sync {
    fn accept(&self, bundle: MessageBundle);
}

impl<F> MirrorSink for F
where
    F: Fn(MessageBundle) + Send + Sync,
{
    fn accept(&self, bundle: MessageBundle) {
        self(bundle)
    }
}

impl MirrorSink for UnboundedSender<MessageBundle> {
    fn accept(&self, bundle: MessageBundle) {
        if let Err(err) = self.send(bundle) {
            warn!(
                event = events::MIRROR_SEND_FAILED,
                component = COMPONENT,
                err = %err,
                "mirror channel closed; dropping bundle"
            );
        }
    }
}

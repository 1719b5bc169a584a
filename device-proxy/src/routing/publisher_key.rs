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

use std::fmt;

/// Identity of a cached destination publisher.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub(crate) struct PublisherKey {
    pub(crate) project_id: String,
    pub(crate) registry_id: String,
    pub(crate) device_id: String,
}

impl PublisherKey {
    pub(crate) fn new(project_id: &str, registry_id: &str, device_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            registry_id: registry_id.to_string(),
            device_id: device_id.to_string(),
        }
    }
}

impl fmt::Display for PublisherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.project_id, self.registry_id, self.device_id
        )
    }
}

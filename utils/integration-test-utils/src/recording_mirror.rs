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

use device_proxy::{MessageBundle, MirrorSink};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Mirror sink that keeps every bundle it receives.
#[derive(Clone, Default)]
pub struct RecordingMirror {
    bundles: Arc<Mutex<Vec<MessageBundle>>>,
}

impl RecordingMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bundles(&self) -> Vec<MessageBundle> {
        self.bundles.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.bundles.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MirrorSink for RecordingMirror {
    fn accept(&self, bundle: MessageBundle) {
        debug!("within recording_mirror! bundle: {:?}", bundle);
        self.bundles.lock().unwrap().push(bundle);
    }
}

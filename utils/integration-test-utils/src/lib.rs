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

mod recording_directory;
pub use recording_directory::{device_with_key, RecordingDirectory};
mod recording_mirror;
pub use recording_mirror::RecordingMirror;
mod recording_publisher;
pub use recording_publisher::{PublishedMessage, RecordingPublisher, RecordingPublisherFactory};

/// Installs a `tracing` subscriber once per test binary.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

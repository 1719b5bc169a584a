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

//! Lazily populated cache of destination publishers keyed by device.

use crate::error::ProxyError;
use crate::observability::events;
use crate::publisher::DestinationPublisher;
use crate::routing::publisher_key::PublisherKey;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};

const COMPONENT: &str = "publisher_pool";

type PublisherSlot = Arc<OnceCell<Arc<dyn DestinationPublisher>>>;

pub(crate) enum AcquireError {
    /// Creating the publisher failed; the slot stays empty for the next caller.
    Connect(ProxyError),
    /// The pool was cleared while this publisher was being created.
    Stale,
}

/// Per-key once-cells; at most one creation succeeds per key between teardowns.
pub(crate) struct PublisherPool {
    publishers: Mutex<HashMap<PublisherKey, PublisherSlot>>,
}

impl PublisherPool {
    pub(crate) fn new() -> Self {
        Self {
            publishers: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached publisher for `key`, running `connect` only if none exists.
    ///
    /// The map lock is held only to find or insert the slot, so creation for one device
    /// never blocks lookups for another.
    pub(crate) async fn get_or_connect<F, Fut>(
        &self,
        key: &PublisherKey,
        connect: F,
    ) -> Result<Arc<dyn DestinationPublisher>, AcquireError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<dyn DestinationPublisher>, ProxyError>>,
    {
        let slot = {
            let mut publishers = self.publishers.lock().await;
            publishers.entry(key.clone()).or_default().clone()
        };

        let created = AtomicBool::new(false);
        let publisher = slot
            .get_or_try_init(|| {
                created.store(true, Ordering::Relaxed);
                connect()
            })
            .await
            .map_err(AcquireError::Connect)?
            .clone();

        if !self.still_cached(key, &slot).await {
            warn!(
                event = events::PUBLISHER_STALE,
                component = COMPONENT,
                publisher_key = %key,
                reason = crate::observability::fields::REASON_TERMINATED_DURING_CREATE,
                "pool was cleared during acquire; closing publisher"
            );
            publisher.close().await;
            return Err(AcquireError::Stale);
        }

        if created.load(Ordering::Relaxed) {
            debug!(
                event = events::PUBLISHER_CREATE,
                component = COMPONENT,
                publisher_key = %key,
                "created destination publisher"
            );
        } else {
            debug!(
                event = events::PUBLISHER_REUSE,
                component = COMPONENT,
                publisher_key = %key,
                "reusing destination publisher"
            );
        }

        Ok(publisher)
    }

    async fn still_cached(&self, key: &PublisherKey, slot: &PublisherSlot) -> bool {
        let publishers = self.publishers.lock().await;
        publishers
            .get(key)
            .is_some_and(|cached| Arc::ptr_eq(cached, slot))
    }

    /// Empties the pool and closes every publisher it held. Returns how many were closed.
    pub(crate) async fn close_all(&self) -> usize {
        let drained: Vec<(PublisherKey, PublisherSlot)> = {
            let mut publishers = self.publishers.lock().await;
            publishers.drain().collect()
        };

        let mut closed = 0;
        for (key, slot) in drained {
            if let Some(publisher) = slot.get() {
                debug!(
                    event = events::PUBLISHER_CLOSE,
                    component = COMPONENT,
                    publisher_key = %key,
                    "closing destination publisher"
                );
                publisher.close().await;
                closed += 1;
            }
        }
        closed
    }

    /// Number of live publishers.
    pub(crate) async fn len(&self) -> usize {
        let publishers = self.publishers.lock().await;
        publishers.values().filter(|slot| slot.initialized()).count()
    }
}

//! Publisher listener that feeds inbound traffic and channel errors back to its target.

use crate::error::ProxyError;
use crate::observability::{events, fields};
use crate::proxy_target::ActiveTarget;
use crate::publisher::PublisherListener;
use async_trait::async_trait;
use std::sync::Weak;
use tracing::debug;

const COMPONENT: &str = "inbound_listener";

/// Holds the target weakly: cached publishers must not keep their owner alive.
#[derive(Clone)]
pub(crate) struct InboundListener {
    target: Weak<ActiveTarget>,
    device_id: String,
}

impl InboundListener {
    pub(crate) fn new(target: Weak<ActiveTarget>, device_id: &str) -> Self {
        Self {
            target,
            device_id: device_id.to_string(),
        }
    }
}

#[async_trait]
impl PublisherListener for InboundListener {
    async fn on_message(&self, topic: &str, payload: String) {
        match self.target.upgrade() {
            Some(target) => target.handle_inbound(topic, payload).await,
            None => debug!(
                event = events::INBOUND_TARGET_GONE,
                component = COMPONENT,
                device_id = self.device_id.as_str(),
                topic,
                reason = fields::REASON_TARGET_DROPPED,
                "dropping inbound message"
            ),
        }
    }

    async fn on_error(&self, error: ProxyError) {
        match self.target.upgrade() {
            Some(target) => target.handle_publisher_error(&self.device_id, error).await,
            None => debug!(
                event = events::INBOUND_TARGET_GONE,
                component = COMPONENT,
                device_id = self.device_id.as_str(),
                reason = fields::REASON_TARGET_DROPPED,
                err = %error,
                "dropping publisher error"
            ),
        }
    }
}

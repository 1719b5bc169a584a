//! Routing layer.
//!
//! Maps logical sub-channels onto destination wire topics, recognizes inbound config
//! topics, and names the publisher-cache key for a device.

pub(crate) mod publisher_key;
pub(crate) mod topic;

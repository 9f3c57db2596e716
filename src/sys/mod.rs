pub mod client;
pub mod runtime;
pub mod server;

use crate::ring::Frame;
use parking_lot::RwLock;
use std::sync::Arc;

/// Latest frame published by the frame loop, readable from any task.
pub type SharedFrame = Arc<RwLock<Frame>>;

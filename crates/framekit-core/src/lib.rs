//! # FrameKit Core
//!
//! In-process model of the engine's frame tree as seen by the binding layer.
//! Provides native frames, the per-process frame registry, destruction
//! observers, views, isolated-world settings, the resource cache and the
//! zoom level/factor conversion.
//!
//! ## Design Goals
//!
//! 1. **Non-owning handles**: bindings hold `Weak` references and re-validate
//!    before every use
//! 2. **Destruction notification**: observers hear about teardown exactly once
//! 3. **Local vs. remote frames**: only local frames are handed to bindings
//! 4. **Single-threaded**: `Rc`/`RefCell` throughout, no locks

pub mod cache;
pub mod document;
pub mod frame;
pub mod liveness;
pub mod registry;
pub mod view;
pub mod world;
pub mod zoom;

pub use cache::{
    CachedResource, MemoryPressureLevel, ResourceCache, ResourceId, ResourceType,
    ResourceTypeStat, ResourceTypeStats,
};
pub use document::{Document, Element, QuerySelector};
pub use frame::{FrameKind, FrameObserver, NativeFrame, TextCheckClient};
pub use liveness::LivenessGuard;
pub use registry::{ContextScope, EmbedderNamesScope, FrameRegistry};
pub use view::{PageScaleLimits, View, ViewId};
pub use world::{IsolatedWorldInfo, WorldId};
pub use zoom::{zoom_factor_to_level, zoom_level_to_factor, ZoomLimits, ZOOM_LEVEL_BASE};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process-scoped identifier of a frame, stable for the frame's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingId(i32);

impl RoutingId {
    /// Wrap a raw routing id.
    pub fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for RoutingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur when mutating the frame tree.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Frame {0} has been destroyed")]
    FrameDestroyed(RoutingId),

    #[error("Frame {0} is remote and has no document")]
    RemoteFrame(RoutingId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_id_display() {
        let id = RoutingId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(id.to_string(), "42");
    }
}

//! Browser-side owner of zoom state.

use crate::messages::{HostReply, ZoomRequest};
use framekit_common::{OptionExt, ZoomConfig};
use framekit_core::{RoutingId, ViewId, ZoomLimits};
use std::collections::HashMap;
use tracing::{debug, info};

/// Stores one temporary zoom level per view and clamps every request to its
/// limits.
#[derive(Debug)]
pub struct ZoomAuthority {
    limits: ZoomLimits,
    default_level: f64,
    frames: HashMap<RoutingId, ViewId>,
    levels: HashMap<ViewId, f64>,
}

impl ZoomAuthority {
    pub fn new(config: &ZoomConfig) -> Self {
        Self {
            limits: ZoomLimits::from(config),
            default_level: config.default_zoom_level,
            frames: HashMap::new(),
            levels: HashMap::new(),
        }
    }

    /// Replace the accepted range. Stored levels are re-clamped.
    pub fn with_limits(mut self, limits: ZoomLimits) -> Self {
        self.limits = limits;
        for level in self.levels.values_mut() {
            *level = limits.clamp(*level);
        }
        self
    }

    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    /// Route requests for `routing_id` to `view`.
    pub fn register_frame(&mut self, routing_id: RoutingId, view: ViewId) {
        if self.frames.insert(routing_id, view) != Some(view) {
            debug!(%routing_id, view = view.raw(), "Frame registered with zoom authority");
        }
    }

    /// Answer one request. The sending frame is routed to the view it
    /// names, so frames created after connect are served like any other.
    pub fn handle(&mut self, request: &ZoomRequest) -> HostReply {
        self.register_frame(request.routing_id(), request.view());

        match *request {
            ZoomRequest::SetTemporaryZoomLevel {
                view,
                level,
                view_limits,
                ..
            } => HostReply::zoom(self.set_temporary_zoom_level(view, level, view_limits)),
            ZoomRequest::GetZoomLevel { view, .. } => HostReply::zoom(self.zoom_level(view)),
        }
    }

    /// View that hosts `routing_id`.
    pub fn view_for(&self, routing_id: RoutingId) -> framekit_common::Result<ViewId> {
        self.frames
            .get(&routing_id)
            .copied()
            .ok_or_not_found(format!("routing id {routing_id}"))
    }

    /// Store a level for `view` and return what was applied. The level is
    /// clamped to the overlap of the authority's limits and the view's own.
    pub fn set_temporary_zoom_level(
        &mut self,
        view: ViewId,
        level: f64,
        view_limits: ZoomLimits,
    ) -> f64 {
        let applied = self.limits.intersect(&view_limits).clamp(level);
        if applied != level {
            info!(view = view.raw(), requested = level, applied, "Zoom level clamped");
        }
        self.levels.insert(view, applied);
        applied
    }

    pub fn zoom_level(&self, view: ViewId) -> f64 {
        self.levels.get(&view).copied().unwrap_or(self.default_level)
    }
}

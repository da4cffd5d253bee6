//! Renderer-side blocking zoom calls.

use crate::messages::ZoomRequest;
use crate::transport::SyncTransport;
use framekit_core::{zoom_factor_to_level, zoom_level_to_factor, NativeFrame};
use tracing::{trace, warn};

/// Blocking get/set of a view's zoom level through the browser process.
///
/// Zoom is best effort: a transport failure is logged and reported as level
/// `0.0` (factor `1.0`) rather than as an error.
pub struct SyncZoomChannel {
    transport: Box<dyn SyncTransport>,
}

impl SyncZoomChannel {
    pub fn new(transport: impl SyncTransport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
        }
    }

    /// Request `level` for the view hosting `frame`. Returns the level the
    /// browser applied.
    pub fn set_zoom_level(&self, frame: &NativeFrame, level: f64) -> f64 {
        let view = frame.view();
        self.round_trip(ZoomRequest::SetTemporaryZoomLevel {
            routing_id: frame.routing_id(),
            view: view.id(),
            level,
            view_limits: view.zoom_limits(),
        })
    }

    pub fn get_zoom_level(&self, frame: &NativeFrame) -> f64 {
        self.round_trip(ZoomRequest::GetZoomLevel {
            routing_id: frame.routing_id(),
            view: frame.view().id(),
        })
    }

    pub fn set_zoom_factor(&self, frame: &NativeFrame, factor: f64) -> f64 {
        zoom_level_to_factor(self.set_zoom_level(frame, zoom_factor_to_level(factor)))
    }

    pub fn get_zoom_factor(&self, frame: &NativeFrame) -> f64 {
        zoom_level_to_factor(self.get_zoom_level(frame))
    }

    fn round_trip(&self, request: ZoomRequest) -> f64 {
        match self.transport.send_sync(&request) {
            Ok(reply) => {
                trace!(routing_id = %request.routing_id(), level = reply.level, "Zoom reply");
                reply.level
            }
            Err(e) => {
                warn!(routing_id = %request.routing_id(), error = %e, "Zoom round trip failed");
                0.0
            }
        }
    }
}

impl std::fmt::Debug for SyncZoomChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncZoomChannel").finish_non_exhaustive()
    }
}

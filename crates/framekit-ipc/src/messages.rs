//! Wire messages exchanged with the browser process.

use framekit_common::serde_helpers::non_finite_f64;
use framekit_core::{RoutingId, ViewId, ZoomLimits};
use serde::{Deserialize, Serialize};

/// Renderer → browser zoom request.
///
/// Every request names the view hosting the frame, so the browser can
/// route frames it has not seen before.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "msg", rename_all = "snake_case")]
pub enum ZoomRequest {
    /// Set the view's temporary zoom level.
    SetTemporaryZoomLevel {
        routing_id: RoutingId,
        view: ViewId,
        #[serde(with = "non_finite_f64")]
        level: f64,
        /// The view's layout zoom limits.
        view_limits: ZoomLimits,
    },
    /// Read the view's zoom level.
    GetZoomLevel { routing_id: RoutingId, view: ViewId },
}

impl ZoomRequest {
    pub fn routing_id(&self) -> RoutingId {
        match self {
            ZoomRequest::SetTemporaryZoomLevel { routing_id, .. }
            | ZoomRequest::GetZoomLevel { routing_id, .. } => *routing_id,
        }
    }

    pub fn view(&self) -> ViewId {
        match self {
            ZoomRequest::SetTemporaryZoomLevel { view, .. }
            | ZoomRequest::GetZoomLevel { view, .. } => *view,
        }
    }
}

/// Browser → renderer reply, paired with exactly one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostReply {
    Zoom {
        #[serde(with = "non_finite_f64")]
        level: f64,
    },
    Error {
        message: String,
    },
}

impl HostReply {
    pub fn zoom(level: f64) -> Self {
        HostReply::Zoom { level }
    }

    pub fn error(message: impl Into<String>) -> Self {
        HostReply::Error {
            message: message.into(),
        }
    }
}

/// Successful zoom reply as seen by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomReply {
    /// Level the browser applied or reported; authoritative.
    pub level: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set(level: f64) -> ZoomRequest {
        ZoomRequest::SetTemporaryZoomLevel {
            routing_id: RoutingId::new(4),
            view: ViewId::new(2),
            level,
            view_limits: ZoomLimits {
                min_level: -1.0,
                max_level: 2.0,
            },
        }
    }

    #[test]
    fn test_request_wire_format() {
        let json = serde_json::to_value(set(1.5)).unwrap();
        assert_eq!(
            json,
            json!({
                "msg": "set_temporary_zoom_level",
                "routing_id": 4,
                "view": 2,
                "level": 1.5,
                "view_limits": { "min_level": -1.0, "max_level": 2.0 }
            })
        );

        let get: ZoomRequest =
            serde_json::from_str(r#"{ "msg": "get_zoom_level", "routing_id": 9, "view": 3 }"#)
                .unwrap();
        assert_eq!(get.routing_id(), RoutingId::new(9));
        assert_eq!(get.view(), ViewId::new(3));
    }

    #[test]
    fn test_non_finite_level_survives_encoding() {
        for level in [f64::INFINITY, f64::NEG_INFINITY] {
            let bytes = serde_json::to_vec(&set(level)).unwrap();
            assert_eq!(serde_json::from_slice::<ZoomRequest>(&bytes).unwrap(), set(level));
        }

        let bytes = serde_json::to_vec(&set(f64::NAN)).unwrap();
        match serde_json::from_slice::<ZoomRequest>(&bytes).unwrap() {
            ZoomRequest::SetTemporaryZoomLevel { level, .. } => assert!(level.is_nan()),
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_reply_wire_format() {
        let reply: HostReply = serde_json::from_str(r#"{ "type": "zoom", "level": -2.0 }"#).unwrap();
        assert_eq!(reply, HostReply::zoom(-2.0));

        let json = serde_json::to_string(&HostReply::error("no such frame")).unwrap();
        assert!(json.contains(r#""type":"error""#));
    }
}

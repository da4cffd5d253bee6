//! Process-boundary transport.
//!
//! Messages cross the boundary JSON-encoded. Each request carries its own
//! single-slot reply channel, so a reply can only ever be paired with the
//! request that created it.

use crate::messages::{HostReply, ZoomReply, ZoomRequest};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use framekit_common::FrameKitError;
use std::thread::JoinHandle;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Transport failures. All of them leave the caller without a reply.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("remote endpoint is gone")]
    Disconnected,

    #[error("message undeliverable: {0}")]
    Undeliverable(String),

    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<TransportError> for FrameKitError {
    fn from(err: TransportError) -> Self {
        FrameKitError::ipc_with_source("zoom round trip failed", err)
    }
}

/// Synchronous send-and-block primitive.
pub trait SyncTransport {
    /// Send `request` and block until its reply or a transport failure.
    fn send_sync(&self, request: &ZoomRequest) -> Result<ZoomReply, TransportError>;
}

struct Envelope {
    payload: Vec<u8>,
    reply: Sender<Vec<u8>>,
}

/// Renderer end of an in-process channel transport.
#[derive(Clone)]
pub struct ChannelTransport {
    requests: Sender<Envelope>,
}

/// Browser end of an in-process channel transport.
pub struct HostEndpoint {
    requests: Receiver<Envelope>,
}

/// Create a connected renderer/browser pair.
pub fn channel_pair() -> (ChannelTransport, HostEndpoint) {
    let (tx, rx) = unbounded();
    (ChannelTransport { requests: tx }, HostEndpoint { requests: rx })
}

impl SyncTransport for ChannelTransport {
    fn send_sync(&self, request: &ZoomRequest) -> Result<ZoomReply, TransportError> {
        let payload = serde_json::to_vec(request)?;
        let (reply_tx, reply_rx) = bounded(1);

        trace!(routing_id = %request.routing_id(), "Sending sync zoom request");
        self.requests
            .send(Envelope {
                payload,
                reply: reply_tx,
            })
            .map_err(|_| TransportError::Disconnected)?;

        // Blocks until the browser answers or drops the reply slot.
        let bytes = reply_rx.recv().map_err(|_| TransportError::Disconnected)?;

        match serde_json::from_slice::<HostReply>(&bytes)? {
            HostReply::Zoom { level } => Ok(ZoomReply { level }),
            HostReply::Error { message } => Err(TransportError::Undeliverable(message)),
        }
    }
}

/// A decoded request waiting for its reply.
///
/// Dropping it without responding abandons the request; the renderer then
/// sees [`TransportError::Disconnected`].
pub struct PendingRequest {
    pub request: ZoomRequest,
    reply: Sender<Vec<u8>>,
}

impl PendingRequest {
    /// Send the reply. Returns false if the renderer stopped waiting.
    pub fn respond(self, reply: HostReply) -> bool {
        respond(&self.reply, &reply)
    }
}

fn respond(slot: &Sender<Vec<u8>>, reply: &HostReply) -> bool {
    match serde_json::to_vec(reply) {
        Ok(bytes) => slot.send(bytes).is_ok(),
        Err(e) => {
            warn!(error = %e, "Failed to encode host reply");
            false
        }
    }
}

impl HostEndpoint {
    /// Block for the next well-formed request. Returns None once every
    /// renderer end has been dropped. Malformed requests are answered with an
    /// error reply and skipped.
    pub fn next_request(&self) -> Option<PendingRequest> {
        for envelope in self.requests.iter() {
            match serde_json::from_slice::<ZoomRequest>(&envelope.payload) {
                Ok(request) => {
                    return Some(PendingRequest {
                        request,
                        reply: envelope.reply,
                    })
                }
                Err(e) => {
                    warn!(error = %e, "Dropping malformed zoom request");
                    respond(&envelope.reply, &HostReply::error(format!("malformed request: {e}")));
                }
            }
        }
        None
    }

    /// Answer requests with `authority` until the renderer disconnects.
    pub fn serve(self, authority: &mut crate::ZoomAuthority) {
        while let Some(pending) = self.next_request() {
            let reply = authority.handle(&pending.request);
            if !pending.respond(reply) {
                debug!("Renderer stopped waiting for zoom reply");
            }
        }
        debug!("Zoom endpoint closed");
    }

    /// Run [`HostEndpoint::serve`] on a dedicated thread. The authority is
    /// handed back when the renderer disconnects.
    pub fn spawn(
        self,
        mut authority: crate::ZoomAuthority,
    ) -> std::io::Result<JoinHandle<crate::ZoomAuthority>> {
        std::thread::Builder::new()
            .name("zoom-authority".into())
            .spawn(move || {
                self.serve(&mut authority);
                authority
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framekit_core::{RoutingId, ViewId};

    fn get(id: i32) -> ZoomRequest {
        ZoomRequest::GetZoomLevel {
            routing_id: RoutingId::new(id),
            view: ViewId::new(1),
        }
    }

    #[test]
    fn test_reply_pairs_with_request() {
        let (transport, host) = channel_pair();
        let browser = std::thread::spawn(move || {
            let pending = host.next_request().unwrap();
            let level = pending.request.routing_id().raw() as f64;
            pending.respond(HostReply::zoom(level));
        });

        let reply = transport.send_sync(&get(3)).unwrap();
        assert_eq!(reply.level, 3.0);
        browser.join().unwrap();
    }

    #[test]
    fn test_host_gone_before_send() {
        let (transport, host) = channel_pair();
        drop(host);
        assert!(matches!(
            transport.send_sync(&get(1)),
            Err(TransportError::Disconnected)
        ));
    }

    #[test]
    fn test_abandoned_request_unblocks_caller() {
        let (transport, host) = channel_pair();
        let browser = std::thread::spawn(move || {
            let pending = host.next_request().unwrap();
            drop(pending);
        });

        assert!(matches!(
            transport.send_sync(&get(1)),
            Err(TransportError::Disconnected)
        ));
        browser.join().unwrap();
    }

    #[test]
    fn test_error_reply_is_undeliverable() {
        let (transport, host) = channel_pair();
        let browser = std::thread::spawn(move || {
            host.next_request()
                .unwrap()
                .respond(HostReply::error("unknown frame"));
        });

        match transport.send_sync(&get(1)) {
            Err(TransportError::Undeliverable(message)) => assert_eq!(message, "unknown frame"),
            other => panic!("unexpected result: {other:?}"),
        }
        browser.join().unwrap();
    }

    #[test]
    fn test_next_request_ends_when_renderer_drops() {
        let (transport, host) = channel_pair();
        drop(transport);
        assert!(host.next_request().is_none());
    }

    #[test]
    fn test_transport_error_converts_to_ipc_error() {
        let err: FrameKitError = TransportError::Disconnected.into();
        assert_eq!(err.category(), "ipc");
        assert!(err.is_degradable());
    }
}

//! # FrameKit IPC
//!
//! Blocking zoom-level messaging between a renderer process and the browser
//! process that owns zoom state.
//!
//! The renderer side ([`SyncZoomChannel`]) sends one [`ZoomRequest`] per call
//! and blocks until the paired reply arrives or the transport reports the
//! browser gone. The browser side ([`HostEndpoint`] + [`ZoomAuthority`])
//! clamps and stores the level per view and answers with the value it
//! actually applied.

pub mod authority;
pub mod channel;
pub mod messages;
pub mod transport;

pub use authority::ZoomAuthority;
pub use channel::SyncZoomChannel;
pub use messages::{HostReply, ZoomReply, ZoomRequest};
pub use transport::{
    channel_pair, ChannelTransport, HostEndpoint, PendingRequest, SyncTransport, TransportError,
};

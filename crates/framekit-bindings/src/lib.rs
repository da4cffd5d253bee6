//! # FrameKit Bindings
//!
//! The `webFrame` object handed to embedder script: frame-tree navigation,
//! zoom, script injection, isolated worlds, spell checking and cache control.
//!
//! ## Design Goals
//!
//! 1. **Never dangle**: a [`WebFrame`] holds a weak reference and answers
//!    absent once its frame is gone
//! 2. **Best-effort zoom**: a lost browser process degrades zoom to the
//!    default instead of raising
//! 3. **Re-entrancy safe**: operations that run embedder callbacks re-check
//!    liveness through a [`framekit_core::LivenessGuard`] before continuing
//! 4. **Loud invariants**: architecture violations stop the operation

#[cfg(feature = "boa")]
pub mod boa_host;
pub mod prototype;
pub mod script;
pub mod spellcheck;
pub mod value;
pub mod web_frame;

#[cfg(feature = "boa")]
pub use boa_host::BoaScriptHost;
pub use prototype::{METHOD_NAMES, PROPERTY_NAMES};
pub use script::{
    IsolatedScript, ScriptCompletion, ScriptExecutionType, ScriptHost, ScriptRequest, ScriptSource,
};
pub use spellcheck::SpellCheckClient;
pub use value::{Arguments, BindingValue, Callback, EmbedderObject};
pub use web_frame::WebFrame;

use framekit_common::{BindingConfig, FrameKitConfig, FrameKitError, ResultExt};
use framekit_core::{CoreError, FrameRegistry};
use framekit_ipc::{channel_pair, SyncZoomChannel, ZoomAuthority};
use std::rc::Rc;
use std::thread::JoinHandle;
use thiserror::Error;
use tracing::info;

/// Errors raised to embedder code.
#[derive(Error, Debug)]
pub enum BindingError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Type error: expected {expected}, got {got}")]
    TypeError { expected: String, got: String },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Frame tree error: {0}")]
    Core(#[from] CoreError),

    #[error("Script error: {0}")]
    Script(String),
}

impl BindingError {
    pub fn type_error(expected: impl Into<String>, got: impl Into<String>) -> Self {
        BindingError::TypeError {
            expected: expected.into(),
            got: got.into(),
        }
    }
}

impl From<BindingError> for FrameKitError {
    fn from(err: BindingError) -> Self {
        match err {
            BindingError::InvalidArgument(message) => FrameKitError::InvalidArgument(message),
            BindingError::TypeError { expected, got } => {
                FrameKitError::InvalidArgument(format!("expected {expected}, got {got}"))
            }
            BindingError::InvariantViolation(message) => FrameKitError::invariant(message),
            BindingError::Core(e) => FrameKitError::frame(e.to_string()),
            BindingError::Script(message) => FrameKitError::script(message),
        }
    }
}

/// Everything a [`WebFrame`] needs from its renderer process.
pub struct RenderContext {
    registry: Rc<FrameRegistry>,
    zoom: SyncZoomChannel,
    scripts: Rc<dyn ScriptHost>,
    config: BindingConfig,
}

impl RenderContext {
    pub fn new(
        registry: Rc<FrameRegistry>,
        zoom: SyncZoomChannel,
        scripts: Rc<dyn ScriptHost>,
        config: BindingConfig,
    ) -> Rc<Self> {
        Rc::new(Self {
            registry,
            zoom,
            scripts,
            config,
        })
    }

    /// Start a renderer against a zoom authority built from `config`,
    /// running on its own thread.
    ///
    /// Frames already in `registry` are registered with the authority up
    /// front; frames created later are routed by their first request.
    /// The handle yields the authority back once the renderer drops its
    /// zoom channel.
    pub fn connect(
        registry: Rc<FrameRegistry>,
        scripts: Rc<dyn ScriptHost>,
        config: &FrameKitConfig,
    ) -> framekit_common::Result<(Rc<Self>, JoinHandle<ZoomAuthority>)> {
        config.validate()?;
        let authority = ZoomAuthority::new(&config.zoom);
        Self::connect_with_authority(registry, scripts, authority, config.bindings.clone())
    }

    pub fn connect_with_authority(
        registry: Rc<FrameRegistry>,
        scripts: Rc<dyn ScriptHost>,
        mut authority: ZoomAuthority,
        config: BindingConfig,
    ) -> framekit_common::Result<(Rc<Self>, JoinHandle<ZoomAuthority>)> {
        let (transport, host) = channel_pair();
        let mut registered = 0;
        registry.for_each_frame(|frame| {
            authority.register_frame(frame.routing_id(), frame.view().id());
            registered += 1;
            true
        });
        let handle = host.spawn(authority).context("spawning zoom authority")?;

        info!(frames = registered, "Renderer connected to zoom authority");
        let context = Self::new(registry, SyncZoomChannel::new(transport), scripts, config);
        Ok((context, handle))
    }

    pub fn registry(&self) -> &Rc<FrameRegistry> {
        &self.registry
    }

    pub fn zoom(&self) -> &SyncZoomChannel {
        &self.zoom
    }

    pub fn scripts(&self) -> &Rc<dyn ScriptHost> {
        &self.scripts
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("frames", &self.registry.frame_count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#![allow(dead_code)]

use framekit_bindings::{RenderContext, ScriptHost, ScriptRequest, WebFrame};
use framekit_common::{BindingConfig, ZoomConfig};
use framekit_core::{FrameRegistry, NativeFrame, WorldId, ZoomLimits};
use framekit_ipc::{channel_pair, SyncZoomChannel, ZoomAuthority};
use std::cell::RefCell;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

/// Route `RUST_LOG`-filtered output through the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Script host that records requests and never runs anything.
#[derive(Default)]
pub struct RecordingHost {
    pub requests: RefCell<Vec<(WorldId, Vec<String>)>>,
    pub idle_notifications: RefCell<usize>,
}

impl ScriptHost for RecordingHost {
    fn execute(&self, _frame: &Rc<NativeFrame>, request: ScriptRequest) {
        let sources = request.sources.into_iter().map(|s| s.code).collect();
        self.requests.borrow_mut().push((request.world, sources));
    }

    fn idle_notification(&self) {
        *self.idle_notifications.borrow_mut() += 1;
    }
}

/// A renderer wired to a browser-side zoom authority on its own thread.
pub struct Harness {
    pub registry: Rc<FrameRegistry>,
    pub context: Rc<RenderContext>,
    pub scripts: Rc<RecordingHost>,
}

impl Harness {
    /// Connect `registry` to a zoom authority clamping to `limits`.
    pub fn connect(registry: Rc<FrameRegistry>, limits: ZoomLimits, config: BindingConfig) -> Self {
        init_tracing();
        let scripts = Rc::new(RecordingHost::default());
        let authority = ZoomAuthority::new(&ZoomConfig::default()).with_limits(limits);
        let (context, _authority) =
            RenderContext::connect_with_authority(registry.clone(), scripts.clone(), authority, config)
                .expect("connect renderer");
        Self {
            registry,
            context,
            scripts,
        }
    }

    /// A renderer whose browser process is already gone.
    pub fn disconnected(registry: Rc<FrameRegistry>) -> Self {
        init_tracing();
        let (transport, host) = channel_pair();
        drop(host);
        let scripts = Rc::new(RecordingHost::default());
        let context = RenderContext::new(
            registry.clone(),
            SyncZoomChannel::new(transport),
            scripts.clone(),
            BindingConfig::default(),
        );
        Self {
            registry,
            context,
            scripts,
        }
    }

    pub fn frame(&self, native: &Rc<NativeFrame>) -> WebFrame {
        WebFrame::new(&self.context, native).expect("local live frame")
    }
}

/// main
/// ├── a
/// │   └── a1
/// ├── (remote)
/// └── b
pub struct Tree {
    pub registry: Rc<FrameRegistry>,
    pub main: Rc<NativeFrame>,
    pub a: Rc<NativeFrame>,
    pub a1: Rc<NativeFrame>,
    pub remote: Rc<NativeFrame>,
    pub b: Rc<NativeFrame>,
}

impl Tree {
    pub fn build() -> Self {
        let registry = Rc::new(FrameRegistry::new());
        let main = registry.create_main_frame("main");
        let a = registry.append_child(&main, "a").unwrap();
        let a1 = registry.append_child(&a, "a1").unwrap();
        let remote = registry.append_remote_child(&main, "remote").unwrap();
        let b = registry.append_child(&main, "b").unwrap();
        Self {
            registry,
            main,
            a,
            a1,
            remote,
            b,
        }
    }
}

pub fn default_limits() -> ZoomLimits {
    ZoomLimits::default()
}

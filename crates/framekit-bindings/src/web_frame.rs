//! The `WebFrame` handle.
//!
//! A `WebFrame` wraps one native frame without owning it. Every operation
//! re-resolves the frame first; once the frame is destroyed, queries answer
//! absent and commands do nothing.

use crate::script::{ScriptCompletion, ScriptExecutionType, ScriptRequest, ScriptSource};
use crate::spellcheck::SpellCheckClient;
use crate::value::{Callback, EmbedderObject};
use crate::{BindingError, RenderContext};
use framekit_core::{
    IsolatedWorldInfo, LivenessGuard, MemoryPressureLevel, NativeFrame, ResourceTypeStats,
    RoutingId, TextCheckClient, WorldId,
};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, error, info, trace};

/// Handle to one local frame.
#[derive(Clone)]
pub struct WebFrame {
    frame: Weak<NativeFrame>,
    context: Rc<RenderContext>,
}

impl WebFrame {
    /// Wrap `frame`. Remote frames have no local representation.
    pub fn new(context: &Rc<RenderContext>, frame: &Rc<NativeFrame>) -> Option<Self> {
        if !frame.is_local() || frame.is_destroyed() {
            return None;
        }
        Some(Self {
            frame: Rc::downgrade(frame),
            context: context.clone(),
        })
    }

    /// Handle for the frame whose script is currently running.
    pub fn for_current_context(context: &Rc<RenderContext>) -> Option<Self> {
        let frame = context.registry().current_frame()?;
        Self::new(context, &frame)
    }

    fn wrap(&self, frame: Option<Rc<NativeFrame>>) -> Option<WebFrame> {
        frame.and_then(|frame| Self::new(&self.context, &frame))
    }

    /// The wrapped frame, if it is still alive.
    pub fn native(&self) -> Option<Rc<NativeFrame>> {
        self.frame.upgrade().filter(|frame| !frame.is_destroyed())
    }

    pub fn is_alive(&self) -> bool {
        self.native().is_some()
    }

    pub fn is_same_frame(&self, other: &WebFrame) -> bool {
        Weak::ptr_eq(&self.frame, &other.frame)
    }

    pub fn context(&self) -> &Rc<RenderContext> {
        &self.context
    }

    // Tree navigation

    pub fn parent(&self) -> Option<WebFrame> {
        self.wrap(self.native()?.parent())
    }

    pub fn opener(&self) -> Option<WebFrame> {
        self.wrap(self.native()?.opener())
    }

    pub fn top(&self) -> Option<WebFrame> {
        self.wrap(Some(self.native()?.top()))
    }

    pub fn first_child(&self) -> Option<WebFrame> {
        self.wrap(self.native()?.first_child())
    }

    pub fn next_sibling(&self) -> Option<WebFrame> {
        self.wrap(self.native()?.next_sibling())
    }

    pub fn routing_id(&self) -> Option<RoutingId> {
        self.native().map(|frame| frame.routing_id())
    }

    // Lookup

    pub fn find_frame_by_name(&self, name: &str) -> Option<WebFrame> {
        self.wrap(self.native()?.find_frame_by_name(name))
    }

    /// Frame hosted by the first element matching `selector`.
    pub fn frame_for_selector(&self, selector: &str) -> Option<WebFrame> {
        let element = self.native()?.document().query_selector(selector)?;
        self.wrap(element.content_frame())
    }

    pub fn find_frame_by_routing_id(&self, id: RoutingId) -> Option<WebFrame> {
        self.wrap(self.context.registry().from_routing_id(id))
    }

    /// Routing id of the frame behind a content window object.
    ///
    /// The frame is resolved from the object's creation context before the
    /// object's getters run; they may tear the frame down. `None` means the
    /// frame was missing or did not survive. A surviving frame without a
    /// local parent breaks the frame-tree architecture and is treated as an
    /// invariant violation.
    pub fn web_frame_id(&self, content_window: &EmbedderObject) -> Result<Option<RoutingId>, BindingError> {
        let resolved = content_window.creation_context();
        let guard = LivenessGuard::attach(resolved.as_ref());
        drop(resolved);

        content_window.materialize();

        let Some(frame) = guard.frame() else {
            debug!("Content window frame is gone");
            return Ok(None);
        };

        match frame.parent() {
            Some(parent) if parent.is_local() => Ok(Some(frame.routing_id())),
            Some(_) => self.invariant_violation(format!(
                "parent of frame {} is not a local frame",
                frame.routing_id()
            )),
            None => self.invariant_violation(format!(
                "frame {} behind a content window has no parent",
                frame.routing_id()
            )),
        }
    }

    fn invariant_violation<T>(&self, message: String) -> Result<T, BindingError> {
        error!(%message, "Frame tree invariant violated");
        if self.context.config().fatal_invariants {
            panic!("frame tree invariant violated: {message}");
        }
        Err(BindingError::InvariantViolation(message))
    }

    pub fn set_name(&self, name: &str) {
        if let Some(frame) = self.native() {
            frame.set_name(name);
        }
    }

    // Zoom

    /// Set the view's zoom level. Returns the level the browser applied,
    /// or `0.0` when it could not be reached or the frame is gone.
    pub fn set_zoom_level(&self, level: f64) -> f64 {
        match self.native() {
            Some(frame) => self.context.zoom().set_zoom_level(&frame, level),
            None => 0.0,
        }
    }

    pub fn get_zoom_level(&self) -> f64 {
        match self.native() {
            Some(frame) => self.context.zoom().get_zoom_level(&frame),
            None => 0.0,
        }
    }

    pub fn set_zoom_factor(&self, factor: f64) -> f64 {
        match self.native() {
            Some(frame) => self.context.zoom().set_zoom_factor(&frame, factor),
            None => 1.0,
        }
    }

    pub fn get_zoom_factor(&self) -> f64 {
        match self.native() {
            Some(frame) => self.context.zoom().get_zoom_factor(&frame),
            None => 1.0,
        }
    }

    pub fn set_visual_zoom_level_limits(&self, min_level: f64, max_level: f64) {
        if let Some(frame) = self.native() {
            frame.view().set_default_page_scale_limits(min_level, max_level);
            frame.view().set_ignore_viewport_tag_scale_limits(true);
        }
    }

    /// Bound the levels later `set_zoom_level` calls on this view can reach.
    pub fn set_layout_zoom_level_limits(&self, min_level: f64, max_level: f64) {
        if let Some(frame) = self.native() {
            frame.view().zoom_limits_changed(min_level, max_level);
        }
    }

    /// Run `register` with embedder-reserved element names allowed, in the
    /// script context `context` was created in.
    pub fn allow_guest_view_element_definition(&self, context: &EmbedderObject, register: &Callback) {
        if self.native().is_none() {
            return;
        }
        let registry = self.context.registry();
        let _context = context
            .creation_context()
            .map(|frame| registry.enter_context(&frame));
        let _names = registry.allow_embedder_names();
        register(&[]);
    }

    // Spell checking

    /// Install `provider` as the spell checker of this frame's page.
    ///
    /// The provider must define `spellCheck`.
    pub fn set_spell_check_provider(
        &self,
        language: &str,
        provider: Rc<EmbedderObject>,
    ) -> Result<(), BindingError> {
        if !provider.has("spellCheck") {
            return Err(BindingError::InvalidArgument(
                "\"spellCheck\" has to be defined".into(),
            ));
        }
        let Some(frame) = self.native() else {
            return Ok(());
        };

        let client = SpellCheckClient::new(language, provider);
        let mut installed = 0;
        self.context.registry().for_each_frame(|candidate| {
            let main = candidate.view().main_frame();
            if candidate.is_local() && main.is_some_and(|main| Rc::ptr_eq(&main, &frame)) {
                client.install(candidate);
                installed += 1;
            }
            true
        });
        let panel: Rc<dyn TextCheckClient> = client.clone();
        frame.set_spell_check_panel_host_client(Some(panel));
        client.bind_lifetime(&frame);

        info!(routing_id = %frame.routing_id(), language, installed, "Spell check provider set");
        Ok(())
    }

    // Editing

    pub fn insert_text(&self, text: &str) {
        if let Some(frame) = self.native() {
            frame.commit_text(text);
        }
    }

    pub fn insert_css(&self, css: &str) {
        if let Some(frame) = self.native() {
            frame.document().insert_style_sheet(css);
        }
    }

    // Script execution

    /// Run `code` in the page's main world. `callback` receives the result.
    pub fn execute_java_script(&self, code: &str, user_gesture: bool, callback: Option<Callback>) {
        self.execute(ScriptRequest {
            world: WorldId::MAIN,
            sources: vec![ScriptSource::new(code)],
            user_gesture,
            execution_type: ScriptExecutionType::Synchronous,
            completion: ScriptCompletion::new(callback),
        });
    }

    /// Run `sources` in isolated world `world`. `callback` receives the first
    /// source's result.
    pub fn execute_java_script_in_isolated_world(
        &self,
        world: WorldId,
        sources: Vec<ScriptSource>,
        user_gesture: bool,
        execution_type: ScriptExecutionType,
        callback: Option<Callback>,
    ) {
        if sources.is_empty() {
            trace!(world = world.raw(), "No sources to run");
            return;
        }
        self.execute(ScriptRequest {
            world,
            sources,
            user_gesture,
            execution_type,
            completion: ScriptCompletion::new(callback),
        });
    }

    fn execute(&self, request: ScriptRequest) {
        let Some(frame) = self.native() else {
            debug!("Script request for destroyed frame dropped");
            return;
        };
        trace!(
            routing_id = %frame.routing_id(),
            world = request.world.raw(),
            sources = request.sources.len(),
            execution_type = ?request.execution_type,
            "Executing script"
        );
        let host = self.context.scripts().clone();
        host.execute(&frame, request);
    }

    // Isolated worlds

    pub fn set_isolated_world_security_origin(&self, world: WorldId, origin_url: &str) {
        if let Some(frame) = self.native() {
            frame.set_isolated_world_security_origin(world, IsolatedWorldInfo::parse_origin(origin_url));
        }
    }

    pub fn set_isolated_world_content_security_policy(&self, world: WorldId, policy: &str) {
        if let Some(frame) = self.native() {
            frame.set_isolated_world_content_security_policy(world, policy);
        }
    }

    pub fn set_isolated_world_human_readable_name(&self, world: WorldId, name: &str) {
        if let Some(frame) = self.native() {
            frame.set_isolated_world_human_readable_name(world, name);
        }
    }

    // Resource cache

    pub fn get_resource_usage(&self) -> ResourceTypeStats {
        self.context.registry().cache().stats()
    }

    pub fn clear_cache(&self) {
        self.context.scripts().idle_notification();
        self.context.registry().cache().clear();
        self.context
            .registry()
            .notify_memory_pressure(MemoryPressureLevel::Critical);
    }
}

impl fmt::Debug for WebFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.native() {
            Some(frame) => write!(f, "WebFrame({})", frame.routing_id()),
            None => write!(f, "WebFrame(<destroyed>)"),
        }
    }
}

//! Per-process frame registry.
//!
//! Owns the root frames of every tree in the renderer process, hands out
//! routing ids, and answers process-wide lookups by id.

use crate::cache::{MemoryPressureLevel, ResourceCache};
use crate::document::Element;
use crate::frame::{FrameKind, NativeFrame};
use crate::view::{View, ViewId};
use crate::{CoreError, RoutingId};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use tracing::{debug, info, warn};

/// Memory pressure callback.
pub type MemoryPressureListener = Rc<dyn Fn(MemoryPressureLevel)>;

/// Registry of all frames in this process.
pub struct FrameRegistry {
    frames: RefCell<HashMap<RoutingId, Weak<NativeFrame>>>,
    roots: RefCell<Vec<Rc<NativeFrame>>>,
    next_routing_id: Cell<i32>,
    next_view_id: Cell<u32>,
    current: RefCell<Weak<NativeFrame>>,
    embedder_name_scopes: Cell<usize>,
    cache: ResourceCache,
    pressure_listeners: RefCell<Vec<MemoryPressureListener>>,
}

impl FrameRegistry {
    pub fn new() -> Self {
        Self {
            frames: RefCell::new(HashMap::new()),
            roots: RefCell::new(Vec::new()),
            next_routing_id: Cell::new(1),
            next_view_id: Cell::new(1),
            current: RefCell::new(Weak::new()),
            embedder_name_scopes: Cell::new(0),
            cache: ResourceCache::new(),
            pressure_listeners: RefCell::new(Vec::new()),
        }
    }

    fn allocate_routing_id(&self) -> RoutingId {
        let id = self.next_routing_id.get();
        self.next_routing_id.set(id + 1);
        RoutingId::new(id)
    }

    fn register(&self, frame: &Rc<NativeFrame>) {
        self.frames
            .borrow_mut()
            .insert(frame.routing_id(), Rc::downgrade(frame));
    }

    /// Create a new top-level local frame with its own view.
    pub fn create_main_frame(&self, name: &str) -> Rc<NativeFrame> {
        let view_id = self.next_view_id.get();
        self.next_view_id.set(view_id + 1);
        let view = View::new(ViewId::new(view_id));

        let frame = NativeFrame::new(self.allocate_routing_id(), FrameKind::Local, view, name);
        frame.view().set_main_frame(&frame);
        self.register(&frame);
        self.roots.borrow_mut().push(frame.clone());

        if self.current.borrow().upgrade().is_none() {
            *self.current.borrow_mut() = Rc::downgrade(&frame);
        }

        info!(routing_id = %frame.routing_id(), view = view_id, "Main frame created");
        frame
    }

    /// Create a top-level frame opened by `opener` (a popup window).
    pub fn create_window(&self, name: &str, opener: &Rc<NativeFrame>) -> Rc<NativeFrame> {
        let frame = self.create_main_frame(name);
        frame.set_opener(opener);
        frame
    }

    /// Append a local child frame, hosted by a new `<iframe>` in the parent.
    pub fn append_child(
        &self,
        parent: &Rc<NativeFrame>,
        name: &str,
    ) -> Result<Rc<NativeFrame>, CoreError> {
        self.append_frame(parent, name, FrameKind::Local)
    }

    /// Append a child frame that lives in another process.
    pub fn append_remote_child(
        &self,
        parent: &Rc<NativeFrame>,
        name: &str,
    ) -> Result<Rc<NativeFrame>, CoreError> {
        self.append_frame(parent, name, FrameKind::Remote)
    }

    fn append_frame(
        &self,
        parent: &Rc<NativeFrame>,
        name: &str,
        kind: FrameKind,
    ) -> Result<Rc<NativeFrame>, CoreError> {
        if parent.is_destroyed() {
            return Err(CoreError::FrameDestroyed(parent.routing_id()));
        }
        if !parent.is_local() {
            return Err(CoreError::RemoteFrame(parent.routing_id()));
        }

        let frame = NativeFrame::new(self.allocate_routing_id(), kind, parent.view().clone(), name);
        frame.set_parent(Some(parent));
        parent.push_child(frame.clone());

        let owner = parent
            .document()
            .append_element(Element::new("iframe").with_attribute("name", name));
        owner.set_content_frame(&frame);

        self.register(&frame);
        debug!(
            routing_id = %frame.routing_id(),
            parent = %parent.routing_id(),
            ?kind,
            "Child frame attached"
        );
        Ok(frame)
    }

    /// Look up a live frame of any kind by routing id.
    pub fn from_routing_id(&self, id: RoutingId) -> Option<Rc<NativeFrame>> {
        self.frames
            .borrow()
            .get(&id)
            .and_then(|w| w.upgrade())
            .filter(|frame| !frame.is_destroyed())
    }

    /// Remove a frame and its subtree from the tree, destroying them.
    pub fn remove_frame(&self, frame: &Rc<NativeFrame>) {
        if frame.is_destroyed() {
            return;
        }

        if let Some(parent) = frame.parent() {
            parent.take_child(frame);
            parent.document().remove_frame_owner(frame);
        } else {
            self.roots
                .borrow_mut()
                .retain(|root| !Rc::ptr_eq(root, frame));
        }

        frame.destroy();
        self.frames
            .borrow_mut()
            .retain(|_, w| w.upgrade().map_or(false, |f| !f.is_destroyed()));

        info!(routing_id = %frame.routing_id(), "Frame removed");
    }

    /// Sever a frame from its parent without destroying it. The frame keeps
    /// its view and becomes a root of its own tree.
    pub fn detach_from_parent(&self, frame: &Rc<NativeFrame>) -> bool {
        let Some(parent) = frame.parent() else {
            return false;
        };
        let Some(owned) = parent.take_child(frame) else {
            warn!(routing_id = %frame.routing_id(), "Parent did not list frame as a child");
            return false;
        };
        parent.document().remove_frame_owner(frame);
        frame.set_parent(None);
        self.roots.borrow_mut().push(owned);

        debug!(routing_id = %frame.routing_id(), parent = %parent.routing_id(), "Frame detached from parent");
        true
    }

    /// Frame whose script context is currently executing.
    pub fn current_frame(&self) -> Option<Rc<NativeFrame>> {
        self.current
            .borrow()
            .upgrade()
            .filter(|frame| !frame.is_destroyed())
    }

    pub fn set_current_frame(&self, frame: &Rc<NativeFrame>) {
        *self.current.borrow_mut() = Rc::downgrade(frame);
    }

    /// Make `frame` the current script context until the scope drops. The
    /// previous context is restored afterwards, including when there was
    /// none.
    pub fn enter_context(&self, frame: &Rc<NativeFrame>) -> ContextScope<'_> {
        let previous = self.current.replace(Rc::downgrade(frame));
        ContextScope {
            registry: self,
            previous,
        }
    }

    /// Visit every live frame in routing-id order until `visit` returns false.
    pub fn for_each_frame(&self, mut visit: impl FnMut(&Rc<NativeFrame>) -> bool) {
        let mut frames: Vec<_> = self
            .frames
            .borrow()
            .values()
            .filter_map(|w| w.upgrade())
            .filter(|frame| !frame.is_destroyed())
            .collect();
        frames.sort_by_key(|frame| frame.routing_id());

        for frame in &frames {
            if !visit(frame) {
                break;
            }
        }
    }

    pub fn frame_count(&self) -> usize {
        let mut count = 0;
        self.for_each_frame(|_| {
            count += 1;
            true
        });
        count
    }

    /// Allow embedder-reserved custom element names until the scope drops.
    pub fn allow_embedder_names(&self) -> EmbedderNamesScope<'_> {
        self.embedder_name_scopes
            .set(self.embedder_name_scopes.get() + 1);
        EmbedderNamesScope { registry: self }
    }

    pub fn embedder_names_allowed(&self) -> bool {
        self.embedder_name_scopes.get() > 0
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    pub fn add_memory_pressure_listener(&self, listener: MemoryPressureListener) {
        self.pressure_listeners.borrow_mut().push(listener);
    }

    pub fn notify_memory_pressure(&self, level: MemoryPressureLevel) {
        warn!(?level, "Memory pressure");
        let listeners = self.pressure_listeners.borrow().clone();
        for listener in listeners {
            listener(level);
        }
    }
}

impl Default for FrameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII scope returned by [`FrameRegistry::allow_embedder_names`].
pub struct EmbedderNamesScope<'a> {
    registry: &'a FrameRegistry,
}

impl Drop for EmbedderNamesScope<'_> {
    fn drop(&mut self) {
        let scopes = &self.registry.embedder_name_scopes;
        scopes.set(scopes.get().saturating_sub(1));
    }
}

/// RAII scope returned by [`FrameRegistry::enter_context`].
pub struct ContextScope<'a> {
    registry: &'a FrameRegistry,
    previous: Weak<NativeFrame>,
}

impl Drop for ContextScope<'_> {
    fn drop(&mut self) {
        *self.registry.current.borrow_mut() = std::mem::take(&mut self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_ids_are_unique() {
        let registry = FrameRegistry::new();
        let a = registry.create_main_frame("a");
        let b = registry.create_main_frame("b");
        let c = registry.append_child(&a, "c").unwrap();
        assert_ne!(a.routing_id(), b.routing_id());
        assert_ne!(b.routing_id(), c.routing_id());
        assert_eq!(registry.frame_count(), 3);
    }

    #[test]
    fn test_lookup_by_routing_id() {
        let registry = FrameRegistry::new();
        let main = registry.create_main_frame("main");
        let child = registry.append_child(&main, "child").unwrap();

        let found = registry.from_routing_id(child.routing_id()).unwrap();
        assert!(Rc::ptr_eq(&found, &child));
        assert!(registry.from_routing_id(RoutingId::new(999)).is_none());

        registry.remove_frame(&child);
        assert!(registry.from_routing_id(child.routing_id()).is_none());
        assert!(main.first_child().is_none());
    }

    #[test]
    fn test_child_shares_view_and_gets_owner_element() {
        let registry = FrameRegistry::new();
        let main = registry.create_main_frame("main");
        let child = registry.append_child(&main, "ads").unwrap();

        assert_eq!(child.view().id(), main.view().id());
        let owner = main.document().query_selector("iframe").unwrap();
        assert_eq!(owner.get_attribute("name"), Some("ads"));
        assert!(Rc::ptr_eq(&owner.content_frame().unwrap(), &child));
    }

    #[test]
    fn test_remote_frames_cannot_host_children() {
        let registry = FrameRegistry::new();
        let main = registry.create_main_frame("main");
        let remote = registry.append_remote_child(&main, "oopif").unwrap();
        assert!(!remote.is_local());
        assert!(matches!(
            registry.append_child(&remote, "x"),
            Err(CoreError::RemoteFrame(_))
        ));
    }

    #[test]
    fn test_append_to_destroyed_parent() {
        let registry = FrameRegistry::new();
        let main = registry.create_main_frame("main");
        registry.remove_frame(&main);
        assert!(matches!(
            registry.append_child(&main, "late"),
            Err(CoreError::FrameDestroyed(_))
        ));
    }

    #[test]
    fn test_detach_from_parent_keeps_frame_alive() {
        let registry = FrameRegistry::new();
        let main = registry.create_main_frame("main");
        let child = registry.append_child(&main, "child").unwrap();

        assert!(registry.detach_from_parent(&child));
        assert!(!child.is_destroyed());
        assert!(child.parent().is_none());
        assert!(main.first_child().is_none());
        assert!(registry.from_routing_id(child.routing_id()).is_some());
        assert!(!registry.detach_from_parent(&child));
    }

    #[test]
    fn test_current_frame_defaults_to_first_main_frame() {
        let registry = FrameRegistry::new();
        assert!(registry.current_frame().is_none());
        let first = registry.create_main_frame("first");
        let second = registry.create_main_frame("second");
        assert!(Rc::ptr_eq(&registry.current_frame().unwrap(), &first));
        registry.set_current_frame(&second);
        assert!(Rc::ptr_eq(&registry.current_frame().unwrap(), &second));
    }

    #[test]
    fn test_context_scope_restores_previous() {
        let registry = FrameRegistry::new();
        let main = registry.create_main_frame("main");
        let child = registry.append_child(&main, "child").unwrap();
        {
            let _scope = registry.enter_context(&child);
            assert!(Rc::ptr_eq(&registry.current_frame().unwrap(), &child));
        }
        assert!(Rc::ptr_eq(&registry.current_frame().unwrap(), &main));
    }

    #[test]
    fn test_context_scope_restores_empty_context() {
        let registry = FrameRegistry::new();
        let popup = registry.create_main_frame("popup");
        *registry.current.borrow_mut() = Weak::new();

        {
            let _scope = registry.enter_context(&popup);
            assert!(registry.current_frame().is_some());
        }
        assert!(registry.current_frame().is_none());
    }

    #[test]
    fn test_embedder_names_scope() {
        let registry = FrameRegistry::new();
        assert!(!registry.embedder_names_allowed());
        {
            let _scope = registry.allow_embedder_names();
            assert!(registry.embedder_names_allowed());
        }
        assert!(!registry.embedder_names_allowed());
    }

    #[test]
    fn test_memory_pressure_listeners() {
        let registry = FrameRegistry::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        registry.add_memory_pressure_listener(Rc::new(move |level: MemoryPressureLevel| {
            sink.borrow_mut().push(level)
        }));
        registry.notify_memory_pressure(MemoryPressureLevel::Critical);
        assert_eq!(*seen.borrow(), vec![MemoryPressureLevel::Critical]);
    }

    #[test]
    fn test_opener() {
        let registry = FrameRegistry::new();
        let main = registry.create_main_frame("main");
        let popup = registry.create_window("popup", &main);
        assert!(Rc::ptr_eq(&popup.opener().unwrap(), &main));
        assert!(main.opener().is_none());
    }
}

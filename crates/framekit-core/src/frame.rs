//! Native frames.
//!
//! A [`NativeFrame`] is owned by the frame tree (its parent, or the registry
//! for roots). Everything else holds `Weak` references and must check
//! [`NativeFrame::is_destroyed`] after upgrading, since a frame removed from
//! the tree can still be kept in memory by a temporary `Rc`.

use crate::document::Document;
use crate::view::View;
use crate::world::{IsolatedWorldInfo, WorldId};
use crate::RoutingId;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};
use url::Origin;

/// Which tree representation a frame belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Frame rendered in this process.
    Local,
    /// Placeholder for a frame rendered in another process.
    Remote,
}

/// Receives a frame's destruction notification.
pub trait FrameObserver {
    /// Called exactly once, when the observed frame is torn down.
    fn on_destruct(&self);
}

/// Spell-check client installed on a frame.
pub trait TextCheckClient {
    fn language(&self) -> &str;

    /// Return the misspelled subset of `words`.
    fn check_words(&self, words: &[String]) -> Vec<String>;
}

/// An engine frame.
pub struct NativeFrame {
    routing_id: RoutingId,
    kind: FrameKind,
    view: Rc<View>,
    name: RefCell<String>,
    parent: RefCell<Option<Weak<NativeFrame>>>,
    opener: RefCell<Option<Weak<NativeFrame>>>,
    children: RefCell<Vec<Rc<NativeFrame>>>,
    document: Document,
    worlds: RefCell<HashMap<WorldId, IsolatedWorldInfo>>,
    text_check_client: RefCell<Option<Rc<dyn TextCheckClient>>>,
    spell_check_panel_client: RefCell<Option<Rc<dyn TextCheckClient>>>,
    committed_text: RefCell<Vec<String>>,
    observers: RefCell<Vec<Weak<dyn FrameObserver>>>,
    destroyed: Cell<bool>,
}

impl std::fmt::Debug for NativeFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFrame")
            .field("routing_id", &self.routing_id)
            .field("kind", &self.kind)
            .field("name", &self.name.borrow())
            .field("destroyed", &self.destroyed.get())
            .finish_non_exhaustive()
    }
}

fn live(weak: &Weak<NativeFrame>) -> Option<Rc<NativeFrame>> {
    weak.upgrade().filter(|frame| !frame.is_destroyed())
}

impl NativeFrame {
    pub(crate) fn new(
        routing_id: RoutingId,
        kind: FrameKind,
        view: Rc<View>,
        name: &str,
    ) -> Rc<Self> {
        Rc::new(Self {
            routing_id,
            kind,
            view,
            name: RefCell::new(name.to_string()),
            parent: RefCell::new(None),
            opener: RefCell::new(None),
            children: RefCell::new(Vec::new()),
            document: Document::new(),
            worlds: RefCell::new(HashMap::new()),
            text_check_client: RefCell::new(None),
            spell_check_panel_client: RefCell::new(None),
            committed_text: RefCell::new(Vec::new()),
            observers: RefCell::new(Vec::new()),
            destroyed: Cell::new(false),
        })
    }

    pub fn routing_id(&self) -> RoutingId {
        self.routing_id
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    pub fn is_local(&self) -> bool {
        self.kind == FrameKind::Local
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    pub fn view(&self) -> &Rc<View> {
        &self.view
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    pub fn set_name(&self, name: &str) {
        debug!(routing_id = %self.routing_id, name, "Frame renamed");
        *self.name.borrow_mut() = name.to_string();
    }

    // Tree relations. Each returns only frames that are still alive.

    pub fn parent(&self) -> Option<Rc<NativeFrame>> {
        self.parent.borrow().as_ref().and_then(live)
    }

    pub fn opener(&self) -> Option<Rc<NativeFrame>> {
        self.opener.borrow().as_ref().and_then(live)
    }

    pub fn children(&self) -> Vec<Rc<NativeFrame>> {
        self.children.borrow().clone()
    }

    pub fn first_child(&self) -> Option<Rc<NativeFrame>> {
        self.children.borrow().first().cloned()
    }

    pub fn next_sibling(&self) -> Option<Rc<NativeFrame>> {
        let parent = self.parent()?;
        let siblings = parent.children.borrow();
        let index = siblings
            .iter()
            .position(|sibling| std::ptr::eq(Rc::as_ptr(sibling), self))?;
        siblings.get(index + 1).cloned()
    }

    /// Root of this frame's tree. A root frame is its own top, so this needs
    /// the `Rc` receiver.
    pub fn top(self: &Rc<Self>) -> Rc<NativeFrame> {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Resolve a frame name the way `window.open` targets do.
    ///
    /// `_self`, `_parent` and `_top` are relative to this frame; any other
    /// name is searched depth-first from the top of the tree.
    pub fn find_frame_by_name(self: &Rc<Self>, name: &str) -> Option<Rc<NativeFrame>> {
        match name {
            "" => None,
            "_self" | "_current" => Some(self.clone()),
            "_parent" => Some(self.parent().unwrap_or_else(|| self.clone())),
            "_top" => Some(self.top()),
            _ => {
                let mut stack = vec![self.top()];
                while let Some(frame) = stack.pop() {
                    if *frame.name.borrow() == name {
                        return Some(frame);
                    }
                    stack.extend(frame.children().into_iter().rev());
                }
                None
            }
        }
    }

    pub(crate) fn set_parent(&self, parent: Option<&Rc<NativeFrame>>) {
        *self.parent.borrow_mut() = parent.map(Rc::downgrade);
    }

    pub(crate) fn set_opener(&self, opener: &Rc<NativeFrame>) {
        *self.opener.borrow_mut() = Some(Rc::downgrade(opener));
    }

    pub(crate) fn push_child(&self, child: Rc<NativeFrame>) {
        self.children.borrow_mut().push(child);
    }

    pub(crate) fn take_child(&self, child: &NativeFrame) -> Option<Rc<NativeFrame>> {
        let mut children = self.children.borrow_mut();
        let index = children
            .iter()
            .position(|c| std::ptr::eq(Rc::as_ptr(c), child))?;
        Some(children.remove(index))
    }

    // Destruction observers

    /// Subscribe to this frame's destruction. Observers that were dropped
    /// without unsubscribing are pruned here.
    pub fn add_observer(&self, observer: Weak<dyn FrameObserver>) {
        let mut observers = self.observers.borrow_mut();
        observers.retain(|o| o.strong_count() > 0);
        observers.push(observer);
    }

    /// Remove an observer by identity.
    pub fn remove_observer(&self, observer: &Rc<dyn FrameObserver>) {
        self.observers
            .borrow_mut()
            .retain(|o| !std::ptr::addr_eq(o.as_ptr(), Rc::as_ptr(observer)));
    }

    /// Number of live observers.
    pub fn observer_count(&self) -> usize {
        self.observers
            .borrow()
            .iter()
            .filter(|o| o.strong_count() > 0)
            .count()
    }

    /// Tear down this frame and its subtree, children first.
    pub(crate) fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }

        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children {
            child.destroy();
        }

        trace!(routing_id = %self.routing_id, "Frame destroyed");

        // Clients tied to the frame's lifetime go with it.
        self.text_check_client.borrow_mut().take();
        self.spell_check_panel_client.borrow_mut().take();

        // Take the list first: observers may touch the frame while notified.
        let observers = std::mem::take(&mut *self.observers.borrow_mut());
        for observer in observers.iter().filter_map(Weak::upgrade) {
            observer.on_destruct();
        }
    }

    // Isolated worlds

    pub fn set_isolated_world_security_origin(&self, world: WorldId, origin: Origin) {
        self.worlds.borrow_mut().entry(world).or_default().security_origin = Some(origin);
    }

    pub fn set_isolated_world_content_security_policy(&self, world: WorldId, policy: &str) {
        self.worlds
            .borrow_mut()
            .entry(world)
            .or_default()
            .content_security_policy = Some(policy.to_string());
    }

    pub fn set_isolated_world_human_readable_name(&self, world: WorldId, name: &str) {
        self.worlds.borrow_mut().entry(world).or_default().human_readable_name =
            Some(name.to_string());
    }

    pub fn isolated_world(&self, world: WorldId) -> Option<IsolatedWorldInfo> {
        self.worlds.borrow().get(&world).cloned()
    }

    // Spell checking

    pub fn set_text_check_client(&self, client: Option<Rc<dyn TextCheckClient>>) {
        *self.text_check_client.borrow_mut() = client;
    }

    pub fn text_check_client(&self) -> Option<Rc<dyn TextCheckClient>> {
        self.text_check_client.borrow().clone()
    }

    pub fn set_spell_check_panel_host_client(&self, client: Option<Rc<dyn TextCheckClient>>) {
        *self.spell_check_panel_client.borrow_mut() = client;
    }

    pub fn spell_check_panel_host_client(&self) -> Option<Rc<dyn TextCheckClient>> {
        self.spell_check_panel_client.borrow().clone()
    }

    // Input method

    /// Commit text through the active input method controller.
    pub fn commit_text(&self, text: &str) {
        trace!(routing_id = %self.routing_id, len = text.len(), "Committing text");
        self.committed_text.borrow_mut().push(text.to_string());
    }

    pub fn committed_text(&self) -> Vec<String> {
        self.committed_text.borrow().clone()
    }
}

//! Views: the unit that owns page scale and zoom state.

use crate::frame::NativeFrame;
use crate::zoom::ZoomLimits;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::debug;

/// Identifier of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(u32);

impl ViewId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

/// Default minimum/maximum page scale (pinch zoom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageScaleLimits {
    pub min: f64,
    pub max: f64,
}

impl Default for PageScaleLimits {
    fn default() -> Self {
        Self { min: 1.0, max: 4.0 }
    }
}

/// A view hosting one frame tree.
#[derive(Debug)]
pub struct View {
    id: ViewId,
    main_frame: RefCell<Weak<NativeFrame>>,
    page_scale_limits: Cell<PageScaleLimits>,
    ignore_viewport_tag_scale_limits: Cell<bool>,
    zoom_limits: Cell<ZoomLimits>,
}

impl View {
    pub(crate) fn new(id: ViewId) -> Rc<Self> {
        Rc::new(Self {
            id,
            main_frame: RefCell::new(Weak::new()),
            page_scale_limits: Cell::new(PageScaleLimits::default()),
            ignore_viewport_tag_scale_limits: Cell::new(false),
            zoom_limits: Cell::new(ZoomLimits::default()),
        })
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    /// The frame that created this view, if still alive.
    pub fn main_frame(&self) -> Option<Rc<NativeFrame>> {
        self.main_frame
            .borrow()
            .upgrade()
            .filter(|frame| !frame.is_destroyed())
    }

    pub(crate) fn set_main_frame(&self, frame: &Rc<NativeFrame>) {
        *self.main_frame.borrow_mut() = Rc::downgrade(frame);
    }

    pub fn page_scale_limits(&self) -> PageScaleLimits {
        self.page_scale_limits.get()
    }

    pub fn set_default_page_scale_limits(&self, min: f64, max: f64) {
        debug!(view = self.id.raw(), min, max, "Page scale limits changed");
        self.page_scale_limits.set(PageScaleLimits { min, max });
    }

    pub fn ignores_viewport_tag_scale_limits(&self) -> bool {
        self.ignore_viewport_tag_scale_limits.get()
    }

    pub fn set_ignore_viewport_tag_scale_limits(&self, ignore: bool) {
        self.ignore_viewport_tag_scale_limits.set(ignore);
    }

    pub fn zoom_limits(&self) -> ZoomLimits {
        self.zoom_limits.get()
    }

    /// Update the layout zoom limits (in zoom levels). Zoom requests from
    /// this view are clamped to them on top of the browser's own limits.
    pub fn zoom_limits_changed(&self, min_level: f64, max_level: f64) {
        debug!(view = self.id.raw(), min_level, max_level, "Zoom limits changed");
        self.zoom_limits.set(ZoomLimits {
            min_level,
            max_level,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_defaults() {
        let view = View::new(ViewId::new(3));
        assert_eq!(view.id().raw(), 3);
        assert!(view.main_frame().is_none());
        assert_eq!(view.page_scale_limits(), PageScaleLimits::default());
        assert!(!view.ignores_viewport_tag_scale_limits());
    }

    #[test]
    fn test_limits_update() {
        let view = View::new(ViewId::new(1));
        view.set_default_page_scale_limits(0.5, 3.0);
        view.zoom_limits_changed(-2.0, 2.0);
        assert_eq!(view.page_scale_limits(), PageScaleLimits { min: 0.5, max: 3.0 });
        assert_eq!(view.zoom_limits().max_level, 2.0);
    }
}

//! Liveness tracking across re-entrant calls.
//!
//! A [`LivenessGuard`] subscribes to one frame's destruction notification for
//! the duration of an operation that may run embedder callbacks. After any
//! such callback, check [`LivenessGuard::is_alive`] before touching the frame
//! again.

use crate::frame::{FrameObserver, NativeFrame};
use std::cell::Cell;
use std::rc::{Rc, Weak};
use tracing::trace;

struct GuardState {
    alive: Cell<bool>,
}

impl FrameObserver for GuardState {
    fn on_destruct(&self) {
        // true -> false only; the frame signals at most once.
        self.alive.set(false);
    }
}

/// Scoped destruction observer for a single frame.
pub struct LivenessGuard {
    frame: Weak<NativeFrame>,
    state: Rc<GuardState>,
}

impl LivenessGuard {
    /// Start observing `frame`. A missing or already destroyed frame yields a
    /// guard that reports not alive.
    pub fn attach(frame: Option<&Rc<NativeFrame>>) -> Self {
        let state = Rc::new(GuardState {
            alive: Cell::new(false),
        });

        let frame = match frame {
            Some(frame) if !frame.is_destroyed() => {
                state.alive.set(true);
                let observer: Rc<dyn FrameObserver> = state.clone();
                frame.add_observer(Rc::downgrade(&observer));
                trace!(routing_id = %frame.routing_id(), "Liveness guard attached");
                Rc::downgrade(frame)
            }
            _ => Weak::new(),
        };

        Self { frame, state }
    }

    /// Whether the observed frame has not signalled destruction.
    pub fn is_alive(&self) -> bool {
        self.state.alive.get()
    }

    /// The observed frame, only while it is alive.
    pub fn frame(&self) -> Option<Rc<NativeFrame>> {
        if !self.is_alive() {
            return None;
        }
        self.frame.upgrade()
    }
}

impl Drop for LivenessGuard {
    fn drop(&mut self) {
        if let Some(frame) = self.frame() {
            let observer: Rc<dyn FrameObserver> = self.state.clone();
            frame.remove_observer(&observer);
        }
    }
}

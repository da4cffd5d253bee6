//! Boa-backed script host.
//!
//! Each (frame, world) pair gets its own JS context, so isolated worlds
//! never see the page's globals. Synchronous requests run immediately;
//! asynchronous ones wait in a queue until [`BoaScriptHost::run_pending`].

use crate::script::{ScriptHost, ScriptRequest};
use crate::value::BindingValue;
use boa_engine::{Context, JsValue as BoaValue, Source};
use framekit_core::{NativeFrame, RoutingId, WorldId};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::{Rc, Weak};
use tracing::{debug, info, trace, warn};

struct WorldContext {
    frame: Weak<NativeFrame>,
    context: Context,
}

impl WorldContext {
    fn is_live(&self) -> bool {
        self.frame.upgrade().is_some_and(|frame| !frame.is_destroyed())
    }
}

struct PendingRun {
    frame: Weak<NativeFrame>,
    request: ScriptRequest,
}

/// Script host running on the Boa engine.
#[derive(Default)]
pub struct BoaScriptHost {
    contexts: RefCell<HashMap<(RoutingId, WorldId), WorldContext>>,
    pending: RefCell<VecDeque<PendingRun>>,
}

impl BoaScriptHost {
    pub fn new() -> Self {
        info!("Initializing Boa script host");
        Self::default()
    }

    /// Run every queued asynchronous request. Requests whose frame has been
    /// destroyed are dropped without completing. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            // Completions may queue more work; release the queue first.
            let next = self.pending.borrow_mut().pop_front();
            let Some(PendingRun { frame, request }) = next else {
                break;
            };
            match frame.upgrade().filter(|frame| !frame.is_destroyed()) {
                Some(frame) => {
                    self.run(&frame, request);
                    ran += 1;
                }
                None => debug!("Dropping queued script for destroyed frame"),
            }
        }
        ran
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Number of live JS contexts.
    pub fn context_count(&self) -> usize {
        self.contexts.borrow().len()
    }

    fn run(&self, frame: &Rc<NativeFrame>, request: ScriptRequest) {
        let key = (frame.routing_id(), request.world);
        trace!(
            routing_id = %key.0,
            world = key.1.raw(),
            user_gesture = request.user_gesture,
            "Running scripts"
        );

        let results = {
            let mut contexts = self.contexts.borrow_mut();
            let world = contexts.entry(key).or_insert_with(|| WorldContext {
                frame: Rc::downgrade(frame),
                context: Context::default(),
            });

            request
                .sources
                .iter()
                .map(|source| match world.context.eval(Source::from_bytes(&source.code)) {
                    Ok(value) => Some(convert_value(&value, &mut world.context)),
                    Err(err) => {
                        warn!(
                            routing_id = %key.0,
                            url = source.url.as_ref().map(|u| u.as_str()),
                            line = source.start_line,
                            error = %err,
                            "Script threw"
                        );
                        None
                    }
                })
                .collect::<Vec<_>>()
        };

        request.completion.complete(results);
    }
}

fn convert_value(value: &BoaValue, context: &mut Context) -> BindingValue {
    match value {
        BoaValue::Undefined => BindingValue::Undefined,
        BoaValue::Null => BindingValue::Null,
        BoaValue::Boolean(b) => BindingValue::Bool(*b),
        BoaValue::Integer(n) => BindingValue::Number(*n as f64),
        BoaValue::Rational(n) => BindingValue::Number(*n),
        BoaValue::String(s) => BindingValue::String(s.to_std_string_escaped()),
        BoaValue::Object(obj) if obj.is_callable() => BindingValue::Undefined,
        BoaValue::Object(_) => match value.to_json(context) {
            Ok(json) => BindingValue::Json(json),
            Err(err) => {
                debug!(error = %err, "Result not representable as plain data");
                BindingValue::Undefined
            }
        },
        _ => BindingValue::Undefined,
    }
}

impl ScriptHost for BoaScriptHost {
    fn execute(&self, frame: &Rc<NativeFrame>, request: ScriptRequest) {
        if request.execution_type.is_synchronous() {
            self.run(frame, request);
        } else {
            self.pending.borrow_mut().push_back(PendingRun {
                frame: Rc::downgrade(frame),
                request,
            });
        }
    }

    fn idle_notification(&self) {
        let mut contexts = self.contexts.borrow_mut();
        let before = contexts.len();
        contexts.retain(|_, world| world.is_live());
        debug!(released = before - contexts.len(), "Released script contexts");
    }
}

impl std::fmt::Debug for BoaScriptHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoaScriptHost")
            .field("contexts", &self.context_count())
            .field("pending", &self.pending_count())
            .finish()
    }
}

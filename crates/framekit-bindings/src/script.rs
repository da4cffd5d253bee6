//! Script execution requests.
//!
//! The bindings only describe what to run and where. A [`ScriptHost`]
//! decides when it runs and reports results through a [`ScriptCompletion`].

use crate::value::{BindingValue, Callback};
use crate::BindingError;
use framekit_core::{NativeFrame, WorldId};
use serde::Deserialize;
use std::rc::Rc;
use std::str::FromStr;
use tracing::trace;
use url::Url;

/// When a script request runs relative to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptExecutionType {
    /// Run before the call returns.
    #[default]
    Synchronous,
    /// Queue and run later.
    Asynchronous,
    /// Queue and run later, holding the load event until done.
    AsynchronousBlockingOnload,
}

impl ScriptExecutionType {
    pub fn is_synchronous(&self) -> bool {
        *self == ScriptExecutionType::Synchronous
    }
}

impl FromStr for ScriptExecutionType {
    type Err = BindingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "synchronous" => Ok(ScriptExecutionType::Synchronous),
            "asynchronous" => Ok(ScriptExecutionType::Asynchronous),
            "asynchronousBlockingOnload" => Ok(ScriptExecutionType::AsynchronousBlockingOnload),
            other => Err(BindingError::InvalidArgument(format!(
                "unknown script execution type '{other}'"
            ))),
        }
    }
}

/// Source text plus where it claims to come from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptSource {
    pub code: String,
    pub url: Option<Url>,
    pub start_line: u32,
}

impl ScriptSource {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            url: None,
            start_line: 1,
        }
    }
}

/// One entry of an isolated-world script list as the embedder passes it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsolatedScript {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub url: Option<serde_json::Value>,
    #[serde(default)]
    pub start_line: Option<serde_json::Value>,
}

impl IsolatedScript {
    /// Parse the embedder's script list. Every entry must carry a string
    /// `code`.
    pub fn parse_list(items: Vec<serde_json::Value>) -> Result<Vec<ScriptSource>, BindingError> {
        items
            .into_iter()
            .map(|item| {
                let script: IsolatedScript = serde_json::from_value(item)
                    .map_err(|_| BindingError::InvalidArgument("Invalid 'code'".into()))?;
                script.into_source()
            })
            .collect()
    }

    pub fn into_source(self) -> Result<ScriptSource, BindingError> {
        let code = self
            .code
            .ok_or_else(|| BindingError::InvalidArgument("Invalid 'code'".into()))?;
        // Malformed optional fields fall back to defaults.
        let url = self
            .url
            .as_ref()
            .and_then(|u| u.as_str())
            .and_then(|u| Url::parse(u).ok());
        let start_line = self
            .start_line
            .as_ref()
            .and_then(|line| line.as_i64())
            .and_then(|line| u32::try_from(line).ok())
            .unwrap_or(1);
        Ok(ScriptSource {
            code,
            url,
            start_line,
        })
    }
}

/// Delivers at most one result to the embedder's callback.
pub struct ScriptCompletion {
    callback: Option<Callback>,
}

impl ScriptCompletion {
    pub fn new(callback: Option<Callback>) -> Self {
        Self { callback }
    }

    pub fn none() -> Self {
        Self { callback: None }
    }

    /// Report per-source results. `None` marks a source that produced no
    /// value (it threw). Only the first result is delivered, and only if
    /// it exists.
    pub fn complete(self, results: Vec<Option<BindingValue>>) {
        let Some(callback) = self.callback else {
            return;
        };
        match results.into_iter().next().flatten() {
            Some(first) => {
                callback(&[first]);
            }
            None => trace!("Script produced no result; completion skipped"),
        }
    }
}

impl std::fmt::Debug for ScriptCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptCompletion")
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

/// A request to run sources in one world of one frame.
#[derive(Debug)]
pub struct ScriptRequest {
    pub world: WorldId,
    pub sources: Vec<ScriptSource>,
    pub user_gesture: bool,
    pub execution_type: ScriptExecutionType,
    pub completion: ScriptCompletion,
}

/// Runs scripts on behalf of the bindings.
pub trait ScriptHost {
    /// Run `request` in `frame`. Synchronous requests complete before
    /// returning.
    fn execute(&self, frame: &Rc<NativeFrame>, request: ScriptRequest);

    /// Hint that the embedder is idle and memory may be reclaimed.
    fn idle_notification(&self) {}
}

//! Values crossing the embedder boundary.

use crate::web_frame::WebFrame;
use crate::BindingError;
use framekit_core::NativeFrame;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// Embedder-supplied function.
pub type Callback = Rc<dyn Fn(&[BindingValue]) -> BindingValue>;

/// A value passed to or returned from the frame bindings.
#[derive(Clone)]
pub enum BindingValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Plain data: arrays and dictionaries.
    Json(serde_json::Value),
    Object(Rc<EmbedderObject>),
    Function(Callback),
    Frame(WebFrame),
}

impl BindingValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            BindingValue::Undefined => "undefined",
            BindingValue::Null => "null",
            BindingValue::Bool(_) => "boolean",
            BindingValue::Number(_) => "number",
            BindingValue::String(_) => "string",
            BindingValue::Json(serde_json::Value::Array(_)) => "array",
            BindingValue::Json(_) => "object",
            BindingValue::Object(_) => "object",
            BindingValue::Function(_) => "function",
            BindingValue::Frame(_) => "WebFrame",
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, BindingValue::Undefined | BindingValue::Null)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            BindingValue::Undefined | BindingValue::Null => false,
            BindingValue::Bool(b) => *b,
            BindingValue::Number(n) => *n != 0.0 && !n.is_nan(),
            BindingValue::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            BindingValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            BindingValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_frame(&self) -> Option<&WebFrame> {
        match self {
            BindingValue::Frame(frame) => Some(frame),
            _ => None,
        }
    }

    /// Wrap an optional frame, mapping absence to `null`.
    pub fn from_frame(frame: Option<WebFrame>) -> Self {
        frame.map_or(BindingValue::Null, BindingValue::Frame)
    }

    /// Convert plain data into the closest binding value.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => BindingValue::Null,
            serde_json::Value::Bool(b) => BindingValue::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(BindingValue::Null, BindingValue::Number),
            serde_json::Value::String(s) => BindingValue::String(s),
            other => BindingValue::Json(other),
        }
    }
}

impl fmt::Debug for BindingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingValue::Undefined => write!(f, "Undefined"),
            BindingValue::Null => write!(f, "Null"),
            BindingValue::Bool(b) => write!(f, "Bool({b})"),
            BindingValue::Number(n) => write!(f, "Number({n})"),
            BindingValue::String(s) => write!(f, "String({s:?})"),
            BindingValue::Json(v) => write!(f, "Json({v})"),
            BindingValue::Object(o) => o.fmt(f),
            BindingValue::Function(_) => write!(f, "Function"),
            BindingValue::Frame(frame) => frame.fmt(f),
        }
    }
}

impl PartialEq for BindingValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (BindingValue::Undefined, BindingValue::Undefined)
            | (BindingValue::Null, BindingValue::Null) => true,
            (BindingValue::Bool(a), BindingValue::Bool(b)) => a == b,
            (BindingValue::Number(a), BindingValue::Number(b)) => a == b,
            (BindingValue::String(a), BindingValue::String(b)) => a == b,
            (BindingValue::Json(a), BindingValue::Json(b)) => a == b,
            (BindingValue::Object(a), BindingValue::Object(b)) => Rc::ptr_eq(a, b),
            (BindingValue::Function(a), BindingValue::Function(b)) => Rc::ptr_eq(a, b),
            (BindingValue::Frame(a), BindingValue::Frame(b)) => a.is_same_frame(b),
            _ => false,
        }
    }
}

impl From<f64> for BindingValue {
    fn from(n: f64) -> Self {
        BindingValue::Number(n)
    }
}

impl From<bool> for BindingValue {
    fn from(b: bool) -> Self {
        BindingValue::Bool(b)
    }
}

impl From<&str> for BindingValue {
    fn from(s: &str) -> Self {
        BindingValue::String(s.to_string())
    }
}

impl From<String> for BindingValue {
    fn from(s: String) -> Self {
        BindingValue::String(s)
    }
}

/// An embedder object: named members plus the script context it was
/// created in.
///
/// Getters registered with [`EmbedderObject::with_getter`] stand in for
/// accessor properties and run when the object is materialized as an
/// argument, so they may re-enter the frame tree.
#[derive(Default)]
pub struct EmbedderObject {
    creation_context: Weak<NativeFrame>,
    members: HashMap<String, BindingValue>,
    getters: Vec<Rc<dyn Fn()>>,
}

impl EmbedderObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Object created in `frame`'s script context.
    pub fn in_context(frame: &Rc<NativeFrame>) -> Self {
        Self {
            creation_context: Rc::downgrade(frame),
            ..Self::default()
        }
    }

    pub fn with_member(mut self, name: impl Into<String>, value: BindingValue) -> Self {
        self.members.insert(name.into(), value);
        self
    }

    pub fn with_method(
        self,
        name: impl Into<String>,
        method: impl Fn(&[BindingValue]) -> BindingValue + 'static,
    ) -> Self {
        self.with_member(name, BindingValue::Function(Rc::new(method)))
    }

    pub fn with_getter(mut self, getter: impl Fn() + 'static) -> Self {
        self.getters.push(Rc::new(getter));
        self
    }

    /// Frame whose context created this object, if that frame is alive.
    pub fn creation_context(&self) -> Option<Rc<NativeFrame>> {
        self.creation_context
            .upgrade()
            .filter(|frame| !frame.is_destroyed())
    }

    pub fn has(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&BindingValue> {
        self.members.get(name)
    }

    /// Run the object's getters.
    pub fn materialize(&self) {
        for getter in &self.getters {
            getter();
        }
    }

    /// Call the member function `name`.
    pub fn call_method(&self, name: &str, args: &[BindingValue]) -> Result<BindingValue, BindingError> {
        match self.members.get(name) {
            Some(BindingValue::Function(f)) => Ok(f(args)),
            Some(other) => Err(BindingError::type_error("function", other.type_name())),
            None => Err(BindingError::InvalidArgument(format!("\"{name}\" is not defined"))),
        }
    }
}

impl fmt::Debug for EmbedderObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.members.keys().collect();
        names.sort();
        f.debug_struct("EmbedderObject")
            .field("members", &names)
            .field("getters", &self.getters.len())
            .finish()
    }
}

/// Positional argument reader for dispatched calls.
///
/// Missing trailing arguments read as `undefined`.
pub struct Arguments<'a> {
    method: &'a str,
    values: &'a [BindingValue],
    next: usize,
}

impl<'a> Arguments<'a> {
    pub fn new(method: &'a str, values: &'a [BindingValue]) -> Self {
        Self {
            method,
            values,
            next: 0,
        }
    }

    /// The next argument as-is; `Undefined` past the end.
    pub fn next_value(&mut self) -> BindingValue {
        let value = self.values.get(self.next).cloned();
        self.next += 1;
        value.unwrap_or(BindingValue::Undefined)
    }

    fn mismatch(&self, expected: &str, got: &BindingValue) -> BindingError {
        BindingError::TypeError {
            expected: format!("{expected} for argument {} of {}", self.next, self.method),
            got: got.type_name().to_string(),
        }
    }

    pub fn number(&mut self) -> Result<f64, BindingError> {
        let value = self.next_value();
        value.as_f64().ok_or_else(|| self.mismatch("number", &value))
    }

    pub fn integer(&mut self) -> Result<i32, BindingError> {
        let n = self.number()?;
        if n.fract() != 0.0 || n < i32::MIN as f64 || n > i32::MAX as f64 {
            return Err(BindingError::InvalidArgument(format!(
                "{}: {n} is not a valid integer",
                self.method
            )));
        }
        Ok(n as i32)
    }

    pub fn string(&mut self) -> Result<String, BindingError> {
        match self.next_value() {
            BindingValue::String(s) => Ok(s),
            other => Err(self.mismatch("string", &other)),
        }
    }

    pub fn object(&mut self) -> Result<Rc<EmbedderObject>, BindingError> {
        match self.next_value() {
            BindingValue::Object(object) => Ok(object),
            other => Err(self.mismatch("object", &other)),
        }
    }

    pub fn function(&mut self) -> Result<Callback, BindingError> {
        match self.next_value() {
            BindingValue::Function(f) => Ok(f),
            other => Err(self.mismatch("function", &other)),
        }
    }

    pub fn json_array(&mut self) -> Result<Vec<serde_json::Value>, BindingError> {
        match self.next_value() {
            BindingValue::Json(serde_json::Value::Array(items)) => Ok(items),
            other => Err(self.mismatch("array", &other)),
        }
    }

    pub fn optional_bool(&mut self) -> Result<Option<bool>, BindingError> {
        match self.next_value() {
            BindingValue::Undefined => Ok(None),
            BindingValue::Bool(b) => Ok(Some(b)),
            other => Err(self.mismatch("boolean", &other)),
        }
    }

    pub fn optional_string(&mut self) -> Result<Option<String>, BindingError> {
        match self.next_value() {
            BindingValue::Undefined => Ok(None),
            BindingValue::String(s) => Ok(Some(s)),
            other => Err(self.mismatch("string", &other)),
        }
    }

    pub fn optional_function(&mut self) -> Result<Option<Callback>, BindingError> {
        match self.next_value() {
            BindingValue::Undefined | BindingValue::Null => Ok(None),
            BindingValue::Function(f) => Ok(Some(f)),
            other => Err(self.mismatch("function", &other)),
        }
    }
}

mod coercion;
mod display;
mod error_value;
mod json;

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::adapter::Thenable;
use crate::promise::Promise;

pub use error_value::{ErrorKind, ErrorValue};

/// A settled value or rejection reason.
///
/// Promises and foreign thenables are ordinary values so that a handler can
/// return one and have the dispatcher flatten it.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    Error(ErrorValue),
    Promise(Promise),
    Thenable(Rc<dyn Thenable>),
}

impl Value {
    pub fn thenable<T: Thenable + 'static>(thenable: T) -> Self {
        Value::Thenable(Rc::new(thenable))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// True for values the dispatcher adopts instead of passing along.
    pub fn is_thenable(&self) -> bool {
        matches!(self, Value::Promise(_) | Value::Thenable(_))
    }

    pub fn as_error(&self) -> Option<&ErrorValue> {
        match self {
            Value::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_cancel(&self) -> bool {
        self.as_error()
            .is_some_and(|err| err.kind == ErrorKind::Cancel)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Promise(a), Value::Promise(b)) => a.ptr_eq(b),
            (Value::Thenable(a), Value::Thenable(b)) => {
                std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Undefined
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(values)
    }
}

impl From<ErrorValue> for Value {
    fn from(err: ErrorValue) -> Self {
        Value::Error(err)
    }
}

impl From<Promise> for Value {
    fn from(promise: Promise) -> Self {
        Value::Promise(promise)
    }
}

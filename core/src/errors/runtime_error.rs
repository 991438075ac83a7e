use miette::Diagnostic;
use thiserror::Error;

use crate::value::{ErrorKind, ErrorValue, Value};

/// Errors raised by handlers, cancelers and strict settle calls.
///
/// A handler "throws" by returning `Err`; the dispatcher turns the error into
/// the rejection reason of the handler's child promise via [`into_value`].
///
/// [`into_value`]: RuntimeError::into_value
#[derive(Debug, Error, Diagnostic)]
pub enum RuntimeError {
    #[error("uncaught {value}")]
    Thrown { value: Value },

    #[error("deferred has already been settled")]
    #[diagnostic(help("only the first fulfill, reject or cancel takes effect"))]
    AlreadySettled,

    #[error("cannot resolve a deferred with its own promise")]
    SelfResolution,

    #[error("handler panicked: {message}")]
    Panicked { message: String },
}

impl RuntimeError {
    pub fn thrown(value: impl Into<Value>) -> Self {
        RuntimeError::Thrown {
            value: value.into(),
        }
    }

    /// The rejection reason this error stands for.
    pub fn into_value(self) -> Value {
        match self {
            RuntimeError::Thrown { value } => value,
            RuntimeError::Panicked { message } => ErrorValue::new(ErrorKind::Panic, message).into(),
            RuntimeError::SelfResolution => {
                ErrorValue::new(ErrorKind::Type, RuntimeError::SelfResolution.to_string()).into()
            }
            other => ErrorValue::new(ErrorKind::Error, other.to_string()).into(),
        }
    }
}

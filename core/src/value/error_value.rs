use std::fmt;

use super::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Error,
    Type,
    Cancel,
    Panic,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::Type => "TypeError",
            ErrorKind::Cancel => "CancelError",
            ErrorKind::Panic => "PanicError",
        }
    }
}

/// An error object used as a rejection reason.
///
/// Cancellation reasons carry the value they wrap in `payload`, so a chain
/// can tell "cancelled" from "failed" and still recover the original reason.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorValue {
    pub kind: ErrorKind,
    pub message: String,
    pub payload: Option<Box<Value>>,
}

impl ErrorValue {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            payload: None,
        }
    }

    pub fn cancel(payload: Option<Value>) -> Self {
        let message = payload
            .as_ref()
            .map_or_else(|| "canceled".to_string(), ToString::to_string);
        Self {
            kind: ErrorKind::Cancel,
            message,
            payload: payload.map(Box::new),
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_deref()
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.name(), self.message)
    }
}

use std::fmt;

use crate::value::Value;

/// Terminal state of a settlement cell. Monotonic: once it leaves
/// `Pending` it never changes again.
#[derive(Debug, Clone, PartialEq)]
pub enum PromiseState {
    Pending,
    Fulfilled(Value),
    Rejected(Value),
}

impl PromiseState {
    pub fn is_pending(&self) -> bool {
        matches!(self, PromiseState::Pending)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            PromiseState::Pending => None,
            PromiseState::Fulfilled(value) => Some(Outcome::Fulfilled(value.clone())),
            PromiseState::Rejected(reason) => Some(Outcome::Rejected(reason.clone())),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PromiseState::Pending => "pending",
            PromiseState::Fulfilled(_) => "fulfilled",
            PromiseState::Rejected(_) => "rejected",
        }
    }
}

impl fmt::Display for PromiseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromiseState::Pending => write!(f, "<pending>"),
            PromiseState::Fulfilled(value) => write!(f, "<fulfilled>: {value}"),
            PromiseState::Rejected(reason) => write!(f, "<rejected>: {reason}"),
        }
    }
}

/// A settlement, as delivered to continuations.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Fulfilled(Value),
    Rejected(Value),
}

impl Outcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    pub fn value(&self) -> &Value {
        match self {
            Outcome::Fulfilled(value) | Outcome::Rejected(value) => value,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Outcome::Fulfilled(value) | Outcome::Rejected(value) => value,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Fulfilled(_) => "fulfilled",
            Outcome::Rejected(_) => "rejected",
        }
    }
}

impl From<Outcome> for PromiseState {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Fulfilled(value) => PromiseState::Fulfilled(value),
            Outcome::Rejected(reason) => PromiseState::Rejected(reason),
        }
    }
}

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use super::Session;
use crate::promise::PromiseState;
use crate::value::Value;

/// The state a named promise should be in once a scenario has run.
///
/// Expected strings also match any actual value whose display text equals
/// them, which is how error reasons are written (`"Error: boom"`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    Pending,
    Fulfilled(Value),
    Rejected(Value),
    /// Rejected with a cancellation error; `None` accepts any.
    Canceled(Option<Value>),
}

impl Expectation {
    pub fn matches(&self, actual: &PromiseState) -> bool {
        match (self, actual) {
            (Expectation::Pending, PromiseState::Pending) => true,
            (Expectation::Fulfilled(expected), PromiseState::Fulfilled(value)) => {
                values_match(expected, value)
            }
            (Expectation::Rejected(expected), PromiseState::Rejected(reason)) => {
                values_match(expected, reason)
            }
            (Expectation::Canceled(expected), PromiseState::Rejected(reason)) => {
                let Some(err) = reason.as_error().filter(|_| reason.is_cancel()) else {
                    return false;
                };
                match expected {
                    None => true,
                    Some(expected) => {
                        values_match(expected, reason)
                            || err.payload().is_some_and(|p| values_match(expected, p))
                    }
                }
            }
            _ => false,
        }
    }
}

fn values_match(expected: &Value, actual: &Value) -> bool {
    if expected == actual {
        return true;
    }
    matches!(expected, Value::String(text) if *text == actual.to_string())
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Pending => write!(f, "<pending>"),
            Expectation::Fulfilled(value) => write!(f, "<fulfilled>: {value}"),
            Expectation::Rejected(reason) => write!(f, "<rejected>: {reason}"),
            Expectation::Canceled(None) => write!(f, "<canceled>"),
            Expectation::Canceled(Some(reason)) => write!(f, "<canceled>: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mismatch {
    State {
        name: String,
        expected: Expectation,
        actual: PromiseState,
    },
    Unbound {
        name: String,
    },
    Log {
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::State {
                name,
                expected,
                actual,
            } => write!(f, "{name}: expected {expected}, got {actual}"),
            Mismatch::Unbound { name } => write!(f, "{name}: no promise with this name"),
            Mismatch::Log { expected, actual } => {
                write!(f, "log: expected {expected:?}, got {actual:?}")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioReport {
    pub mismatches: Vec<Mismatch>,
}

impl ScenarioReport {
    pub fn check(
        session: &Session,
        expectations: &BTreeMap<String, Expectation>,
        log: Option<&[String]>,
    ) -> Self {
        let mut mismatches = Vec::new();
        for (name, expected) in expectations {
            match session.promise(name) {
                Ok(promise) => {
                    let actual = promise.state();
                    if !expected.matches(&actual) {
                        mismatches.push(Mismatch::State {
                            name: name.clone(),
                            expected: expected.clone(),
                            actual,
                        });
                    }
                }
                Err(_) => mismatches.push(Mismatch::Unbound { name: name.clone() }),
            }
        }
        if let Some(expected) = log {
            let actual = session.log();
            if actual != expected {
                mismatches.push(Mismatch::Log {
                    expected: expected.to_vec(),
                    actual,
                });
            }
        }
        Self { mismatches }
    }

    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.passed() {
            return "ok".to_string();
        }
        self.mismatches
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

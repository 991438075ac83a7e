use serde::Deserialize;

use super::session::Scope;
use crate::errors::RuntimeError;
use crate::promise::HandlerResult;
use crate::value::Value;

/// A canned handler, usable as a continuation, progress listener or
/// canceler.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerSpec {
    /// Returns its input.
    Identity,
    /// Returns `undefined`.
    Ignore,
    Constant(Value),
    Multiply(f64),
    Add(f64),
    /// Returns the input's text with this prefix.
    Prefix(String),
    Throw(Value),
    /// Throws its input.
    Rethrow,
    /// Returns the named promise, so the continuation adopts it.
    Follow(String),
    /// Appends `label:input` to the session log and returns the input.
    Log(String),
}

impl HandlerSpec {
    pub(crate) fn apply(&self, input: Value, scope: &Scope) -> HandlerResult {
        match self {
            HandlerSpec::Identity => Ok(input),
            HandlerSpec::Ignore => Ok(Value::Undefined),
            HandlerSpec::Constant(value) => Ok(value.clone()),
            HandlerSpec::Multiply(factor) => Ok(Value::Number(input.to_number() * factor)),
            HandlerSpec::Add(amount) => Ok(Value::Number(input.to_number() + amount)),
            HandlerSpec::Prefix(prefix) => Ok(Value::String(format!("{prefix}{input}"))),
            HandlerSpec::Throw(value) => Err(RuntimeError::thrown(value.clone())),
            HandlerSpec::Rethrow => Err(RuntimeError::thrown(input)),
            HandlerSpec::Follow(name) => scope
                .promise(name)
                .map(Value::Promise)
                .ok_or_else(|| RuntimeError::thrown(format!("unknown promise '{name}'"))),
            HandlerSpec::Log(label) => {
                scope.log(format!("{label}:{input}"));
                Ok(input)
            }
        }
    }

    pub(crate) fn into_handler(self, scope: Scope) -> impl FnOnce(Value) -> HandlerResult + 'static {
        move |input| self.apply(input, &scope)
    }

    pub(crate) fn into_progress_handler(self, scope: Scope) -> impl Fn(Value) -> HandlerResult + 'static {
        move |update| self.apply(update, &scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_specs_coerce_their_input() {
        let scope = Scope::detached();
        assert_eq!(
            HandlerSpec::Multiply(2.0).apply(Value::from("21"), &scope).expect("multiply"),
            Value::Number(42.0)
        );
        assert_eq!(
            HandlerSpec::Add(1.0).apply(Value::from(41), &scope).expect("add"),
            Value::Number(42.0)
        );
    }

    #[test]
    fn throw_specs_produce_thrown_errors() {
        let scope = Scope::detached();
        let err = HandlerSpec::Rethrow
            .apply(Value::from("boom"), &scope)
            .expect_err("rethrow should fail");
        assert_eq!(err.into_value(), Value::from("boom"));
    }

    #[test]
    fn follow_without_binding_throws() {
        let scope = Scope::detached();
        let err = HandlerSpec::Follow("missing".into())
            .apply(Value::Undefined, &scope)
            .expect_err("unbound follow should fail");
        assert_eq!(err.into_value(), Value::from("unknown promise 'missing'"));
    }
}

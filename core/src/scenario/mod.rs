//! A small declarative language for promise choreographies.
//!
//! Scenarios are plain serde data, so the same description can be written in
//! JSON (tests), YAML (conformance suites) or typed one step at a time into
//! the REPL.

mod expect;
mod handler_spec;
mod session;

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::errors::ScenarioError;
use crate::runtime::DispatchMode;
use crate::value::Value;

pub use expect::{Expectation, Mismatch, ScenarioReport};
pub use handler_spec::HandlerSpec;
pub use session::Session;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dispatch: DispatchMode,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub expect: BTreeMap<String, Expectation>,
    #[serde(default)]
    pub log: Option<Vec<String>>,
}

impl Scenario {
    pub fn from_json(source: &str) -> Result<Self, ScenarioError> {
        serde_json::from_str(source).map_err(|err| ScenarioError::Invalid {
            message: err.to_string(),
        })
    }

    /// Runs every step, drains pending microtasks, then checks the
    /// expectations against the final state.
    pub fn run(&self) -> Result<ScenarioReport, ScenarioError> {
        let session = Session::new(self.dispatch);
        for step in &self.steps {
            session.apply(step)?;
        }
        session.drain();
        Ok(ScenarioReport::check(&session, &self.expect, self.log.as_deref()))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Defer {
        name: String,
        #[serde(default)]
        canceler: Option<HandlerSpec>,
    },
    Attach {
        name: String,
        to: String,
        #[serde(default)]
        on_fulfilled: Option<HandlerSpec>,
        #[serde(default)]
        on_rejected: Option<HandlerSpec>,
        #[serde(default)]
        on_progress: Option<HandlerSpec>,
    },
    Then {
        name: String,
        to: String,
        handler: HandlerSpec,
    },
    Otherwise {
        name: String,
        to: String,
        handler: HandlerSpec,
    },
    Always {
        name: String,
        to: String,
        handler: HandlerSpec,
    },
    Fulfill {
        deferred: String,
        #[serde(default)]
        value: Value,
    },
    Reject {
        deferred: String,
        #[serde(default)]
        reason: Value,
    },
    Resolve {
        deferred: String,
        #[serde(default)]
        value: Value,
        /// Name of a bound promise to adopt instead of `value`.
        #[serde(default)]
        promise: Option<String>,
    },
    Progress {
        deferred: String,
        #[serde(default)]
        update: Value,
    },
    Cancel {
        promise: String,
        #[serde(default)]
        reason: Value,
    },
    Normalize {
        name: String,
        #[serde(default)]
        value: Value,
    },
    All {
        name: String,
        of: Vec<String>,
    },
    First {
        name: String,
        of: Vec<String>,
    },
    Trace {
        promise: String,
        #[serde(default)]
        args: Vec<Value>,
    },
    TraceRejected {
        promise: String,
        #[serde(default)]
        args: Vec<Value>,
    },
    Drain,
}

impl Step {
    pub fn keyword(&self) -> &'static str {
        match self {
            Step::Defer { .. } => "defer",
            Step::Attach { .. } => "attach",
            Step::Then { .. } => "then",
            Step::Otherwise { .. } => "otherwise",
            Step::Always { .. } => "always",
            Step::Fulfill { .. } => "fulfill",
            Step::Reject { .. } => "reject",
            Step::Resolve { .. } => "resolve",
            Step::Progress { .. } => "progress",
            Step::Cancel { .. } => "cancel",
            Step::Normalize { .. } => "normalize",
            Step::All { .. } => "all",
            Step::First { .. } => "first",
            Step::Trace { .. } => "trace",
            Step::TraceRejected { .. } => "trace_rejected",
            Step::Drain => "drain",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_steps_and_expectations() {
        let scenario = Scenario::from_json(
            r#"{
              "description": "double",
              "steps": [
                {"defer": {"name": "d"}},
                {"then": {"name": "p", "to": "d", "handler": {"multiply": 2}}},
                {"fulfill": {"deferred": "d", "value": 21}},
                "drain"
              ],
              "expect": {"p": {"fulfilled": 42}}
            }"#,
        )
        .expect("scenario should parse");

        assert_eq!(scenario.dispatch, DispatchMode::Inline);
        let keywords: Vec<_> = scenario.steps.iter().map(Step::keyword).collect();
        assert_eq!(keywords, vec!["defer", "then", "fulfill", "drain"]);
        assert_eq!(
            scenario.expect["p"],
            Expectation::Fulfilled(Value::Number(42.0))
        );
    }

    #[test]
    fn unknown_top_level_fields_are_rejected() {
        let err = Scenario::from_json(r#"{"steps": [], "extra": true}"#)
            .expect_err("unknown field should fail");
        assert!(matches!(err, ScenarioError::Invalid { .. }));
    }

    #[test]
    fn missing_promise_reports_its_name() {
        let scenario = Scenario::from_json(r#"{"steps": [{"cancel": {"promise": "ghost"}}]}"#)
            .expect("scenario should parse");
        let err = scenario.run().expect_err("unknown promise should fail");
        assert!(matches!(err, ScenarioError::UnknownPromise { name } if name == "ghost"));
    }
}

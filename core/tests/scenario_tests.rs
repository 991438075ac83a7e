use deferred::scenario::{Expectation, Mismatch, Step};
use deferred::{
    DeferredError, DispatchMode, PromiseState, Scenario, ScenarioError, Session, Value,
    run_scenario,
};

fn run(source: &str) -> deferred::ScenarioReport {
    run_scenario(source).expect("scenario should run")
}

#[test]
fn doubling_scenario_passes() {
    let report = run(r#"{
        "steps": [
            {"defer": {"name": "d"}},
            {"then": {"name": "p", "to": "d", "handler": {"multiply": 2}}},
            {"fulfill": {"deferred": "d", "value": 21}}
        ],
        "expect": {"p": {"fulfilled": 42}}
    }"#);
    assert!(report.passed(), "{}", report.summary());
}

#[test]
fn recovery_scenario_passes() {
    let report = run(r#"{
        "steps": [
            {"defer": {"name": "d"}},
            {"then": {"name": "t", "to": "d", "handler": {"throw": "boom"}}},
            {"otherwise": {"name": "r", "to": "t", "handler": {"prefix": "recovered:"}}},
            {"fulfill": {"deferred": "d", "value": 1}}
        ],
        "expect": {"r": {"fulfilled": "recovered:boom"}}
    }"#);
    assert!(report.passed(), "{}", report.summary());
}

#[test]
fn canceler_scenario_passes() {
    let report = run(r#"{
        "steps": [
            {"defer": {"name": "d", "canceler": {"prefix": "cancelled-because:"}}},
            {"cancel": {"promise": "d", "reason": "timeout"}}
        ],
        "expect": {"d": {"canceled": "cancelled-because:timeout"}}
    }"#);
    assert!(report.passed(), "{}", report.summary());
}

#[test]
fn mismatches_are_listed() {
    let report = run(r#"{
        "steps": [{"defer": {"name": "d"}}],
        "expect": {"d": {"fulfilled": 1}, "ghost": "pending"},
        "log": ["never"]
    }"#);

    assert!(!report.passed());
    assert_eq!(
        report.mismatches,
        vec![
            Mismatch::State {
                name: "d".into(),
                expected: Expectation::Fulfilled(Value::from(1)),
                actual: PromiseState::Pending,
            },
            Mismatch::Unbound {
                name: "ghost".into()
            },
            Mismatch::Log {
                expected: vec!["never".into()],
                actual: Vec::new(),
            },
        ]
    );
    assert!(report.summary().contains("ghost: no promise with this name"));
}

#[test]
fn microtask_scenarios_are_drained_before_checking() {
    let report = run(r#"{
        "dispatch": "microtask",
        "steps": [
            {"defer": {"name": "d"}},
            {"attach": {"name": "a", "to": "d", "on_fulfilled": {"log": "ran"}}},
            {"fulfill": {"deferred": "d", "value": 1}}
        ],
        "expect": {"a": {"fulfilled": 1}},
        "log": ["ran:1"]
    }"#);
    assert!(report.passed(), "{}", report.summary());
}

#[test]
fn session_applies_steps_incrementally() {
    let session = Session::new(DispatchMode::Microtask);
    let steps: Vec<Step> = serde_json::from_str(
        r#"[
            {"defer": {"name": "d"}},
            {"then": {"name": "p", "to": "d", "handler": {"add": 1}}},
            {"fulfill": {"deferred": "d", "value": 1}}
        ]"#,
    )
    .expect("steps should parse");
    for step in &steps {
        session.apply(step).expect("step should apply");
    }

    let pending = session.promise("p").expect("p should be bound");
    assert!(pending.is_pending());
    assert_eq!(session.drain(), 1);
    assert_eq!(pending.value(), Some(Value::from(2)));
    assert_eq!(session.names(), vec!["d", "p"]);
    assert_eq!(
        session.states(),
        vec![
            ("d".to_string(), PromiseState::Fulfilled(Value::from(1))),
            ("p".to_string(), PromiseState::Fulfilled(Value::from(2))),
        ]
    );
}

#[test]
fn trace_steps_write_to_the_session_log() {
    let report = run(r#"{
        "steps": [
            {"defer": {"name": "d"}},
            {"trace": {"promise": "d", "args": ["job"]}},
            {"fulfill": {"deferred": "d", "value": 1}}
        ],
        "log": ["trace:resolved:1:job"]
    }"#);
    assert!(report.passed(), "{}", report.summary());
}

#[test]
fn duplicate_names_are_rejected() {
    let err = run_scenario(
        r#"{"steps": [{"defer": {"name": "d"}}, {"normalize": {"name": "d", "value": 1}}]}"#,
    )
    .expect_err("rebinding a name should fail");
    assert!(matches!(
        err,
        DeferredError::Scenario(ScenarioError::DuplicateName { name }) if name == "d"
    ));
}

#[test]
fn settling_a_derived_promise_is_rejected() {
    let err = run_scenario(
        r#"{"steps": [
            {"defer": {"name": "d"}},
            {"then": {"name": "p", "to": "d", "handler": "identity"}},
            {"fulfill": {"deferred": "p"}}
        ]}"#,
    )
    .expect_err("only deferreds can be settled");
    assert!(matches!(
        err,
        DeferredError::Scenario(ScenarioError::UnknownDeferred { .. })
    ));
}

#[test]
fn scenarios_parse_from_json_directly() {
    let scenario = Scenario::from_json(r#"{"description": "empty"}"#).expect("should parse");
    assert_eq!(scenario.description, "empty");
    assert!(scenario.steps.is_empty());
    assert!(scenario.run().expect("empty scenario runs").passed());
}

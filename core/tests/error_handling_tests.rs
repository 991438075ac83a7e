use deferred::{DeferredError, ErrorKind, RuntimeError, ScenarioError, Value, new_deferred};

#[test]
fn thrown_values_become_rejection_reasons() {
    let (deferred, promise) = new_deferred();
    let thrown = promise.then(|_| Err(RuntimeError::thrown("boom")));
    let recovered = thrown.otherwise(|reason| Ok(Value::String(format!("recovered:{reason}"))));
    deferred.fulfill(1);

    assert_eq!(thrown.reason(), Some(Value::from("boom")));
    assert_eq!(recovered.value(), Some(Value::from("recovered:boom")));
}

#[test]
fn panicking_handler_rejects_with_panic_error() {
    let (deferred, promise) = new_deferred();
    let child = promise.then(|_| panic!("handler blew up"));
    deferred.fulfill(1);

    let reason = child.reason().expect("panic should reject the child");
    let err = reason.as_error().expect("panic reason should be an error");
    assert_eq!(err.kind, ErrorKind::Panic);
    assert_eq!(err.message, "handler blew up");
    assert_eq!(reason.to_string(), "PanicError: handler blew up");
}

#[test]
fn panic_in_one_handler_does_not_stop_siblings() {
    let (deferred, promise) = new_deferred();
    let broken = promise.then(|_| panic!("first"));
    let fine = promise.then(Ok);
    deferred.fulfill("value");

    assert!(broken.is_rejected());
    assert_eq!(fine.value(), Some(Value::from("value")));
}

#[test]
fn runtime_errors_map_to_reasons() {
    assert_eq!(RuntimeError::thrown(3).into_value(), Value::from(3));

    let settled = RuntimeError::AlreadySettled.into_value();
    assert_eq!(
        settled.to_string(),
        "Error: deferred has already been settled"
    );

    let panicked = RuntimeError::Panicked {
        message: "oops".into(),
    }
    .into_value();
    assert_eq!(panicked.as_error().map(|err| err.kind), Some(ErrorKind::Panic));
}

#[test]
fn runtime_error_messages() {
    assert_eq!(RuntimeError::thrown("x").to_string(), "uncaught x");
    assert_eq!(
        RuntimeError::SelfResolution.to_string(),
        "cannot resolve a deferred with its own promise"
    );
}

#[test]
fn scenario_errors_wrap_into_deferred_error() {
    let err: DeferredError = ScenarioError::UnknownPromise {
        name: "ghost".into(),
    }
    .into();
    assert_eq!(err.to_string(), "unknown promise 'ghost'");
    assert!(matches!(
        err,
        DeferredError::Scenario(ScenarioError::UnknownPromise { .. })
    ));

    let err: DeferredError = RuntimeError::AlreadySettled.into();
    assert!(matches!(err, DeferredError::Runtime(RuntimeError::AlreadySettled)));
}

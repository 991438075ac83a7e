use std::rc::Rc;

use deferred::{
    RecordingObserver, Runtime, RuntimeConfig, TraceEvent, TraceRecord, TracingObserver, Value,
};

fn traced_runtime() -> (Runtime, Rc<RecordingObserver>) {
    let observer = Rc::new(RecordingObserver::new());
    let runtime = RuntimeConfig::new().with_observer(observer.clone()).build();
    (runtime, observer)
}

#[test]
fn trace_reports_progress_and_fulfillment() {
    let (runtime, observer) = traced_runtime();
    let (deferred, promise) = runtime.deferred();
    let traced = promise.trace(vec![Value::from("job")]);
    assert!(traced.ptr_eq(&promise));

    deferred.progress(50);
    deferred.fulfill("done");

    assert_eq!(
        observer.records(),
        vec![
            TraceRecord {
                event: TraceEvent::Progress(Value::from(50)),
                args: vec![Value::from("job")],
            },
            TraceRecord {
                event: TraceEvent::Resolved(Value::from("done")),
                args: vec![Value::from("job")],
            },
        ]
    );
}

#[test]
fn trace_reports_rejection_without_recovering_it() {
    let (runtime, observer) = traced_runtime();
    let (deferred, promise) = runtime.deferred();
    promise.trace(Vec::new());
    deferred.reject("bad");

    assert_eq!(observer.topics(), vec!["rejected"]);
    assert_eq!(promise.reason(), Some(Value::from("bad")));
}

#[test]
fn trace_rejected_ignores_fulfillment_and_progress() {
    let (runtime, observer) = traced_runtime();
    let (ok, ok_promise) = runtime.deferred();
    let (bad, bad_promise) = runtime.deferred();
    ok_promise.trace_rejected(Vec::new());
    bad_promise.trace_rejected(vec![Value::from(1)]);

    ok.progress(1);
    ok.fulfill("fine");
    bad.reject("broken");

    assert_eq!(
        observer.records(),
        vec![TraceRecord {
            event: TraceEvent::Rejected(Value::from("broken")),
            args: vec![Value::from(1)],
        }]
    );
}

#[test]
fn tracing_without_observer_is_a_no_op() {
    let runtime = Runtime::default();
    let (deferred, promise) = runtime.deferred();
    let traced = promise.trace(Vec::new());
    deferred.fulfill(1);
    assert!(traced.ptr_eq(&promise));
    assert!(runtime.observer().is_none());
}

#[test]
fn events_expose_topic_and_value() {
    let event = TraceEvent::Rejected(Value::from("why"));
    assert_eq!(event.topic(), "rejected");
    assert_eq!(event.value(), &Value::from("why"));
}

#[test]
fn tracing_observer_leaves_outcomes_alone() {
    let runtime = RuntimeConfig::new()
        .with_observer(Rc::new(TracingObserver))
        .build();
    let (deferred, promise) = runtime.deferred();
    let traced = promise.trace(vec![Value::from("job")]).then(Ok);
    deferred.reject("bad");
    assert_eq!(traced.reason(), Some(Value::from("bad")));
}

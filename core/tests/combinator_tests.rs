use deferred::{Runtime, Value, all, first, new_deferred};

#[test]
fn all_collects_values_in_input_order() {
    let (a, a_promise) = new_deferred();
    let (b, b_promise) = new_deferred();
    let both = all([a_promise, b_promise]);

    b.fulfill(2);
    assert!(both.is_pending());
    a.fulfill(1);

    assert_eq!(
        both.value(),
        Some(Value::Array(vec![Value::from(1), Value::from(2)]))
    );
}

#[test]
fn all_accepts_plain_values() {
    let (a, a_promise) = new_deferred();
    let mixed = all(vec![Value::from("ready"), Value::Promise(a_promise)]);
    a.fulfill("later");
    assert_eq!(
        mixed.value(),
        Some(Value::Array(vec![Value::from("ready"), Value::from("later")]))
    );
}

#[test]
fn all_rejects_with_first_rejection() {
    let (a, a_promise) = new_deferred();
    let (b, b_promise) = new_deferred();
    let both = all([a_promise, b_promise]);

    b.reject("bad");
    a.reject("worse");
    assert_eq!(both.reason(), Some(Value::from("bad")));
}

#[test]
fn all_of_nothing_is_an_empty_list() {
    let none = all(Vec::<Value>::new());
    assert_eq!(none.value(), Some(Value::Array(Vec::new())));
}

#[test]
fn first_settles_like_the_earliest_input() {
    let (slow, slow_promise) = new_deferred();
    let (fast, fast_promise) = new_deferred();
    let winner = first([slow_promise, fast_promise]);

    fast.fulfill("fast");
    slow.reject("too late");
    assert_eq!(winner.value(), Some(Value::from("fast")));
}

#[test]
fn first_forwards_a_rejection_too() {
    let (a, a_promise) = new_deferred();
    let (_b, b_promise) = new_deferred();
    let winner = first([a_promise, b_promise]);
    a.reject("failed fast");
    assert_eq!(winner.reason(), Some(Value::from("failed fast")));
}

#[test]
fn first_of_nothing_is_undefined() {
    let winner = first(Vec::<Value>::new());
    assert_eq!(winner.value(), Some(Value::Undefined));
}

#[test]
fn cancelling_a_combination_cancels_pending_inputs() {
    let (a, a_promise) = new_deferred();
    let (b, b_promise) = new_deferred();
    b.fulfill(2);
    let both = all([a_promise.clone(), b_promise.clone()]);

    let reason = both.cancel("abort").expect("pending combination should cancel");

    assert!(a.is_canceled());
    assert_eq!(a_promise.reason(), Some(reason.clone()));
    assert_eq!(b_promise.value(), Some(Value::from(2)));
    assert!(reason.is_cancel());
    assert_eq!(both.reason(), Some(reason));
}

#[test]
fn combinations_share_the_caller_runtime() {
    let runtime = Runtime::new();
    let (a, a_promise) = runtime.deferred();
    let combined = runtime.first([a_promise]);
    assert!(combined.runtime().ptr_eq(&runtime));
    a.fulfill(1);
    assert_eq!(combined.value(), Some(Value::from(1)));
}

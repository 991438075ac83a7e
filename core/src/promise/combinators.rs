use std::cell::RefCell;
use std::rc::Rc;

use super::cancel::cancel;
use super::cell::WeakCell;
use super::reaction::{HandlerResult, Handlers};
use super::Promise;
use crate::errors::RuntimeError;
use crate::runtime::{Runtime, TraceEvent};
use crate::value::Value;

impl Promise {
    pub fn then<F>(&self, on_fulfilled: F) -> Promise
    where
        F: FnOnce(Value) -> HandlerResult + 'static,
    {
        self.attach(Handlers::new().on_fulfilled(on_fulfilled))
    }

    pub fn otherwise<F>(&self, on_rejected: F) -> Promise
    where
        F: FnOnce(Value) -> HandlerResult + 'static,
    {
        self.attach(Handlers::new().on_rejected(on_rejected))
    }

    /// Runs `callback` on either outcome with the settled value or reason.
    /// Its result decides the returned promise, so a rejection that reaches
    /// a normally returning callback is recovered.
    pub fn always<F>(&self, callback: F) -> Promise
    where
        F: FnOnce(Value) -> HandlerResult + 'static,
    {
        self.attach(Handlers::either(callback))
    }

    pub fn on_progress<F>(&self, on_progress: F) -> Promise
    where
        F: Fn(Value) -> HandlerResult + 'static,
    {
        self.attach(Handlers::new().on_progress(on_progress))
    }

    /// Reports settlement and progress of this promise to the runtime's
    /// trace observer. Returns this promise unchanged.
    pub fn trace(&self, args: Vec<Value>) -> Promise {
        self.observe(args, false)
    }

    /// Like [`trace`](Promise::trace), for rejections only.
    pub fn trace_rejected(&self, args: Vec<Value>) -> Promise {
        self.observe(args, true)
    }

    fn observe(&self, args: Vec<Value>, rejections_only: bool) -> Promise {
        let Some(observer) = self.runtime().observer() else {
            return self.clone();
        };
        let args = Rc::new(args);

        let mut handlers = Handlers::new();
        {
            let observer = Rc::clone(&observer);
            let args = Rc::clone(&args);
            handlers = handlers.on_rejected(move |reason| {
                observer.observe(&TraceEvent::Rejected(reason.clone()), &args);
                Err(RuntimeError::thrown(reason))
            });
        }
        if !rejections_only {
            let fulfilled_observer = Rc::clone(&observer);
            let fulfilled_args = Rc::clone(&args);
            handlers = handlers
                .on_fulfilled(move |value| {
                    fulfilled_observer.observe(&TraceEvent::Resolved(value.clone()), &fulfilled_args);
                    Ok(value)
                })
                .on_progress(move |update| {
                    observer.observe(&TraceEvent::Progress(update), &args);
                    Ok(Value::Undefined)
                });
        }

        self.attach(handlers);
        self.clone()
    }
}

/// Fulfills with every input's value, in input order, once all inputs have
/// fulfilled; rejects with the first rejection.
pub fn all<I>(values: I) -> Promise
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    Runtime::default().all(values)
}

/// Settles like whichever input settles first.
pub fn first<I>(values: I) -> Promise
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    Runtime::default().first(values)
}

struct AllState {
    results: Vec<Option<Value>>,
    remaining: usize,
}

impl Runtime {
    pub fn all<I>(&self, values: I) -> Promise
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let inputs: Vec<Promise> = values.into_iter().map(|v| self.normalize(v)).collect();
        if inputs.is_empty() {
            return self.resolved(Value::Array(Vec::new()));
        }

        let (deferred, promise) = self.deferred_with_canceler(cancel_inputs(&inputs));
        let state = Rc::new(RefCell::new(AllState {
            results: vec![None; inputs.len()],
            remaining: inputs.len(),
        }));

        for (index, input) in inputs.iter().enumerate() {
            let on_value = deferred.clone();
            let on_reason = deferred.clone();
            let state = Rc::clone(&state);
            input.attach(
                Handlers::new()
                    .on_fulfilled(move |value| {
                        let completed = {
                            let mut state = state.borrow_mut();
                            state.results[index] = Some(value);
                            state.remaining -= 1;
                            (state.remaining == 0).then(|| {
                                state
                                    .results
                                    .drain(..)
                                    .map(Option::unwrap_or_default)
                                    .collect::<Vec<_>>()
                            })
                        };
                        if let Some(values) = completed {
                            on_value.fulfill(Value::Array(values));
                        }
                        Ok(Value::Undefined)
                    })
                    .on_rejected(move |reason| {
                        on_reason.reject(reason);
                        Ok(Value::Undefined)
                    }),
            );
        }

        promise
    }

    pub fn first<I>(&self, values: I) -> Promise
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let inputs: Vec<Promise> = values.into_iter().map(|v| self.normalize(v)).collect();
        if inputs.is_empty() {
            return self.resolved(Value::Undefined);
        }

        let (deferred, promise) = self.deferred_with_canceler(cancel_inputs(&inputs));
        for input in &inputs {
            let on_value = deferred.clone();
            let on_reason = deferred.clone();
            input.attach(
                Handlers::new()
                    .on_fulfilled(move |value| {
                        on_value.fulfill(value);
                        Ok(Value::Undefined)
                    })
                    .on_rejected(move |reason| {
                        on_reason.reject(reason);
                        Ok(Value::Undefined)
                    }),
            );
        }

        promise
    }
}

fn cancel_inputs(inputs: &[Promise]) -> impl FnOnce(Value) -> HandlerResult + 'static {
    let inputs: Vec<WeakCell> = inputs.iter().map(Promise::downgrade).collect();
    move |reason| {
        for input in inputs.iter().filter_map(|weak| weak.upgrade()) {
            cancel(&input, reason.clone());
        }
        Ok(Value::Undefined)
    }
}

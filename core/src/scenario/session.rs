use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use super::Step;
use crate::errors::ScenarioError;
use crate::promise::{Deferred, Handlers, Promise, PromiseState};
use crate::runtime::{DispatchMode, Runtime, RuntimeConfig, TraceEvent, TraceObserver};
use crate::value::Value;

#[derive(Default)]
struct Bindings {
    promises: BTreeMap<String, Promise>,
    deferreds: BTreeMap<String, Deferred>,
    log: Vec<String>,
}

/// What handlers built from a [`HandlerSpec`](super::HandlerSpec) may see of their session.
/// Weak, so bound promises holding these handlers do not keep the session
/// alive.
#[derive(Clone)]
pub(crate) struct Scope {
    bindings: Weak<RefCell<Bindings>>,
}

impl Scope {
    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        Self {
            bindings: Weak::new(),
        }
    }

    pub(crate) fn promise(&self, name: &str) -> Option<Promise> {
        let bindings = self.bindings.upgrade()?;
        let promise = bindings.borrow().promises.get(name).cloned();
        promise
    }

    pub(crate) fn log(&self, entry: String) {
        if let Some(bindings) = self.bindings.upgrade() {
            bindings.borrow_mut().log.push(entry);
        }
    }
}

/// Writes trace events into the session log as `trace:<topic>:<value>`.
struct LogObserver {
    scope: Scope,
}

impl TraceObserver for LogObserver {
    fn observe(&self, event: &TraceEvent, args: &[Value]) {
        let mut entry = format!("trace:{}:{}", event.topic(), event.value());
        for arg in args {
            entry.push(':');
            entry.push_str(&arg.to_string());
        }
        self.scope.log(entry);
    }
}

/// Named promises and deferreds on one runtime, driven step by step.
pub struct Session {
    runtime: Runtime,
    bindings: Rc<RefCell<Bindings>>,
}

impl Session {
    pub fn new(dispatch: DispatchMode) -> Self {
        let bindings = Rc::new(RefCell::new(Bindings::default()));
        let scope = Scope {
            bindings: Rc::downgrade(&bindings),
        };
        let runtime = RuntimeConfig::new()
            .with_dispatch(dispatch)
            .with_observer(Rc::new(LogObserver { scope }))
            .build();
        Self { runtime, bindings }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn apply(&self, step: &Step) -> Result<(), ScenarioError> {
        tracing::debug!(step = step.keyword(), "applying scenario step");
        match step {
            Step::Defer { name, canceler } => {
                self.ensure_unbound(name)?;
                let (deferred, promise) = match canceler {
                    Some(spec) => self
                        .runtime
                        .deferred_with_canceler(spec.clone().into_handler(self.scope())),
                    None => self.runtime.deferred(),
                };
                let mut bindings = self.bindings.borrow_mut();
                bindings.deferreds.insert(name.clone(), deferred);
                bindings.promises.insert(name.clone(), promise);
            }
            Step::Attach {
                name,
                to,
                on_fulfilled,
                on_rejected,
                on_progress,
            } => {
                self.ensure_unbound(name)?;
                let mut handlers = Handlers::new();
                if let Some(spec) = on_fulfilled {
                    handlers = handlers.on_fulfilled(spec.clone().into_handler(self.scope()));
                }
                if let Some(spec) = on_rejected {
                    handlers = handlers.on_rejected(spec.clone().into_handler(self.scope()));
                }
                if let Some(spec) = on_progress {
                    handlers =
                        handlers.on_progress(spec.clone().into_progress_handler(self.scope()));
                }
                let child = self.promise(to)?.attach(handlers);
                self.bind(name, child);
            }
            Step::Then { name, to, handler } => {
                self.ensure_unbound(name)?;
                let child = self
                    .promise(to)?
                    .then(handler.clone().into_handler(self.scope()));
                self.bind(name, child);
            }
            Step::Otherwise { name, to, handler } => {
                self.ensure_unbound(name)?;
                let child = self
                    .promise(to)?
                    .otherwise(handler.clone().into_handler(self.scope()));
                self.bind(name, child);
            }
            Step::Always { name, to, handler } => {
                self.ensure_unbound(name)?;
                let child = self
                    .promise(to)?
                    .always(handler.clone().into_handler(self.scope()));
                self.bind(name, child);
            }
            Step::Fulfill { deferred, value } => {
                self.deferred(deferred)?.fulfill(value.clone());
            }
            Step::Reject { deferred, reason } => {
                self.deferred(deferred)?.reject(reason.clone());
            }
            Step::Resolve {
                deferred,
                value,
                promise,
            } => {
                let target = self.deferred(deferred)?;
                let value = match promise {
                    Some(name) => Value::Promise(self.promise(name)?),
                    None => value.clone(),
                };
                target.resolve(value);
            }
            Step::Progress { deferred, update } => {
                self.deferred(deferred)?.progress(update.clone());
            }
            Step::Cancel { promise, reason } => {
                self.promise(promise)?.cancel(reason.clone());
            }
            Step::Normalize { name, value } => {
                self.ensure_unbound(name)?;
                let promise = self.runtime.normalize(value.clone());
                self.bind(name, promise);
            }
            Step::All { name, of } => {
                self.ensure_unbound(name)?;
                let inputs = self.promises(of)?;
                let promise = self.runtime.all(inputs);
                self.bind(name, promise);
            }
            Step::First { name, of } => {
                self.ensure_unbound(name)?;
                let inputs = self.promises(of)?;
                let promise = self.runtime.first(inputs);
                self.bind(name, promise);
            }
            Step::Trace { promise, args } => {
                self.promise(promise)?.trace(args.clone());
            }
            Step::TraceRejected { promise, args } => {
                self.promise(promise)?.trace_rejected(args.clone());
            }
            Step::Drain => {
                self.drain();
            }
        }
        Ok(())
    }

    pub fn drain(&self) -> usize {
        self.runtime.run_microtasks()
    }

    pub fn promise(&self, name: &str) -> Result<Promise, ScenarioError> {
        let promise = self.bindings.borrow().promises.get(name).cloned();
        promise.ok_or_else(|| ScenarioError::UnknownPromise {
            name: name.to_string(),
        })
    }

    pub fn deferred(&self, name: &str) -> Result<Deferred, ScenarioError> {
        let deferred = self.bindings.borrow().deferreds.get(name).cloned();
        deferred.ok_or_else(|| ScenarioError::UnknownDeferred {
            name: name.to_string(),
        })
    }

    /// Every bound promise with its current state, sorted by name.
    pub fn states(&self) -> Vec<(String, PromiseState)> {
        let promises: Vec<(String, Promise)> = self
            .bindings
            .borrow()
            .promises
            .iter()
            .map(|(name, promise)| (name.clone(), promise.clone()))
            .collect();
        promises
            .into_iter()
            .map(|(name, promise)| (name, promise.state()))
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.bindings.borrow().promises.keys().cloned().collect()
    }

    pub fn log(&self) -> Vec<String> {
        self.bindings.borrow().log.clone()
    }

    fn promises(&self, names: &[String]) -> Result<Vec<Promise>, ScenarioError> {
        names.iter().map(|name| self.promise(name)).collect()
    }

    fn ensure_unbound(&self, name: &str) -> Result<(), ScenarioError> {
        if self.bindings.borrow().promises.contains_key(name) {
            return Err(ScenarioError::DuplicateName {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn bind(&self, name: &str, promise: Promise) {
        self.bindings
            .borrow_mut()
            .promises
            .insert(name.to_string(), promise);
    }

    fn scope(&self) -> Scope {
        Scope {
            bindings: Rc::downgrade(&self.bindings),
        }
    }
}

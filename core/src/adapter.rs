//! Normalization of plain values and foreign `then`-shaped objects into
//! promises of this crate.

use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::errors::{RuntimeError, format_panic};
use crate::promise::dispatch::{notify_progress, resolve_into, settle};
use crate::promise::{CellRef, Handlers, Outcome, Promise, SettlementCell};
use crate::runtime::Runtime;
use crate::value::Value;

/// A promise from some other implementation.
///
/// `then` receives the callbacks that settle the adopting promise. It may
/// call them synchronously or keep them and call them later; only the first
/// settling call counts. An `Err` returned from `then` rejects the adopting
/// promise unless a callback already settled it.
pub trait Thenable: fmt::Debug {
    fn then(&self, callbacks: ThenCallbacks) -> Result<(), RuntimeError>;
}

#[derive(Clone)]
pub struct ThenCallbacks {
    cell: CellRef,
    called: Rc<Cell<bool>>,
}

impl ThenCallbacks {
    fn new(cell: CellRef) -> Self {
        Self {
            cell,
            called: Rc::new(Cell::new(false)),
        }
    }

    pub fn fulfill(&self, value: impl Into<Value>) {
        if self.called.replace(true) {
            return;
        }
        resolve_into(&self.cell, value.into());
    }

    pub fn reject(&self, reason: impl Into<Value>) {
        if self.called.replace(true) {
            return;
        }
        settle(&self.cell, Outcome::Rejected(reason.into()));
    }

    pub fn progress(&self, update: impl Into<Value>) {
        if self.called.get() {
            return;
        }
        notify_progress(&self.cell, update.into());
    }
}

impl fmt::Debug for ThenCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThenCallbacks")
            .field("called", &self.called.get())
            .finish()
    }
}

pub(crate) fn from_thenable(runtime: &Runtime, thenable: Rc<dyn Thenable>) -> Promise {
    let cell = SettlementCell::pending(runtime, None);
    let callbacks = ThenCallbacks::new(Rc::clone(&cell));
    let guard = callbacks.clone();

    let result = panic::catch_unwind(AssertUnwindSafe(|| thenable.then(callbacks)))
        .unwrap_or_else(|payload| {
            Err(RuntimeError::Panicked {
                message: format_panic(payload),
            })
        });
    if let Err(err) = result {
        guard.reject(err.into_value());
    }

    Promise::from_cell(cell)
}

impl Runtime {
    /// Own promises are returned unchanged, foreign thenables are adopted,
    /// anything else becomes an already-fulfilled promise.
    pub fn normalize(&self, value: impl Into<Value>) -> Promise {
        match value.into() {
            Value::Promise(promise) => promise,
            Value::Thenable(thenable) => from_thenable(self, thenable),
            other => self.resolved(other),
        }
    }

    pub fn when(&self, value: impl Into<Value>, handlers: Handlers) -> Promise {
        self.normalize(value).attach(handlers)
    }
}

pub fn normalize(value: impl Into<Value>) -> Promise {
    Runtime::default().normalize(value)
}

pub fn when(value: impl Into<Value>, handlers: Handlers) -> Promise {
    Runtime::default().when(value, handlers)
}

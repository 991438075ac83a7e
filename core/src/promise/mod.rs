mod cancel;
mod cell;
mod combinators;
pub(crate) mod dispatch;
mod reaction;
mod state;

use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::errors::RuntimeError;
use crate::runtime::Runtime;
use crate::value::Value;

pub(crate) use cell::{CancelHook, CellRef, SettlementCell, WeakCell};
pub use cell::Canceler;
pub use combinators::{all, first};
pub(crate) use reaction::ContinuationRecord;
pub use reaction::{HandlerResult, Handlers};
pub use state::{Outcome, PromiseState};

/// Creates a pending deferred on a fresh inline runtime.
pub fn new_deferred() -> (Deferred, Promise) {
    Runtime::default().deferred()
}

/// Like [`new_deferred`], with a hook consulted when the promise is
/// cancelled while still pending.
pub fn new_deferred_with_canceler<F>(canceler: F) -> (Deferred, Promise)
where
    F: FnOnce(Value) -> HandlerResult + 'static,
{
    Runtime::default().deferred_with_canceler(canceler)
}

impl Runtime {
    pub fn deferred(&self) -> (Deferred, Promise) {
        self.deferred_from_hook(None)
    }

    pub fn deferred_with_canceler<F>(&self, canceler: F) -> (Deferred, Promise)
    where
        F: FnOnce(Value) -> HandlerResult + 'static,
    {
        self.deferred_from_hook(Some(CancelHook::Producer(Box::new(canceler))))
    }

    fn deferred_from_hook(&self, hook: Option<CancelHook>) -> (Deferred, Promise) {
        let cell = SettlementCell::pending(self, hook);
        let promise = Promise::from_cell(Rc::clone(&cell));
        (Deferred { cell }, promise)
    }

    pub fn resolved(&self, value: impl Into<Value>) -> Promise {
        Promise::from_cell(SettlementCell::settled(self, Outcome::Fulfilled(value.into())))
    }

    pub fn rejected(&self, reason: impl Into<Value>) -> Promise {
        Promise::from_cell(SettlementCell::settled(self, Outcome::Rejected(reason.into())))
    }
}

/// Producer handle: the only way to settle a cell or report progress.
///
/// Double settlement is not an error: once the cell has left `Pending`, or
/// has been resolved with another promise, `fulfill`, `reject`, `resolve`
/// and `progress` are silent no-ops returning `false`.
/// The `try_*` variants report [`RuntimeError::AlreadySettled`] instead.
#[derive(Clone)]
pub struct Deferred {
    cell: CellRef,
}

impl Deferred {
    pub fn new() -> Self {
        new_deferred().0
    }

    pub fn promise(&self) -> Promise {
        Promise::from_cell(Rc::clone(&self.cell))
    }

    pub fn fulfill(&self, value: impl Into<Value>) -> bool {
        self.accepts_writes() && dispatch::settle(&self.cell, Outcome::Fulfilled(value.into()))
    }

    pub fn reject(&self, reason: impl Into<Value>) -> bool {
        self.accepts_writes() && dispatch::settle(&self.cell, Outcome::Rejected(reason.into()))
    }

    /// Fulfills with a plain value, or adopts the outcome of a promise or
    /// foreign thenable. An adopting cell ignores later producer calls
    /// even while it is still pending.
    pub fn resolve(&self, value: impl Into<Value>) -> bool {
        if !self.accepts_writes() {
            return false;
        }
        dispatch::resolve_into(&self.cell, value.into());
        true
    }

    pub fn progress(&self, update: impl Into<Value>) -> bool {
        self.accepts_writes() && dispatch::notify_progress(&self.cell, update.into())
    }

    pub fn try_fulfill(&self, value: impl Into<Value>) -> Result<(), RuntimeError> {
        self.fulfill(value)
            .then_some(())
            .ok_or(RuntimeError::AlreadySettled)
    }

    pub fn try_reject(&self, reason: impl Into<Value>) -> Result<(), RuntimeError> {
        self.reject(reason)
            .then_some(())
            .ok_or(RuntimeError::AlreadySettled)
    }

    pub fn try_progress(&self, update: impl Into<Value>) -> Result<(), RuntimeError> {
        self.progress(update)
            .then_some(())
            .ok_or(RuntimeError::AlreadySettled)
    }

    pub fn cancel(&self, reason: impl Into<Value>) -> Option<Value> {
        cancel::cancel(&self.cell, reason.into())
    }

    pub fn is_pending(&self) -> bool {
        self.cell.borrow().state.is_pending()
    }

    pub fn is_canceled(&self) -> bool {
        self.cell.borrow().canceled
    }

    fn accepts_writes(&self) -> bool {
        let cell = self.cell.borrow();
        if !cell.accepts_writes() {
            trace!(cell = cell.id, resolved = cell.resolved, "ignoring producer call");
            return false;
        }
        true
    }
}

impl Default for Deferred {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = self.cell.borrow();
        write!(f, "Deferred#{} {{ {} }}", cell.id, cell.state)
    }
}

/// Consumer view of a settlement cell. Cloning shares the cell.
#[derive(Clone)]
pub struct Promise {
    pub(crate) cell: CellRef,
}

impl Promise {
    pub(crate) fn from_cell(cell: CellRef) -> Self {
        Self { cell }
    }

    pub fn resolved(value: impl Into<Value>) -> Self {
        Runtime::default().resolved(value)
    }

    pub fn rejected(reason: impl Into<Value>) -> Self {
        Runtime::default().rejected(reason)
    }

    /// Attaches a continuation and returns the promise for its outcome.
    ///
    /// Runs the matching handler right away (subject to the runtime's
    /// dispatch mode) when this promise has already settled.
    pub fn attach(&self, handlers: Handlers) -> Promise {
        let runtime = self.runtime();
        let child = SettlementCell::pending(
            &runtime,
            Some(CancelHook::Upstream(Rc::downgrade(&self.cell))),
        );
        dispatch::enqueue(
            &self.cell,
            ContinuationRecord::new(handlers, Rc::clone(&child)),
        );
        Promise::from_cell(child)
    }

    /// Cooperative cancellation; see [`Deferred::cancel`] for the return
    /// value. Cancelling a derived promise walks up to the root.
    pub fn cancel(&self, reason: impl Into<Value>) -> Option<Value> {
        cancel::cancel(&self.cell, reason.into())
    }

    pub fn state(&self) -> PromiseState {
        self.cell.borrow().state.clone()
    }

    pub fn value(&self) -> Option<Value> {
        match &self.cell.borrow().state {
            PromiseState::Fulfilled(value) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<Value> {
        match &self.cell.borrow().state {
            PromiseState::Rejected(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.cell.borrow().state.is_pending()
    }

    pub fn is_fulfilled(&self) -> bool {
        matches!(self.cell.borrow().state, PromiseState::Fulfilled(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self.cell.borrow().state, PromiseState::Rejected(_))
    }

    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    pub fn is_canceled(&self) -> bool {
        self.cell.borrow().canceled
    }

    pub fn id(&self) -> u64 {
        self.cell.borrow().id
    }

    pub fn runtime(&self) -> Runtime {
        self.cell.borrow().runtime.clone()
    }

    pub fn ptr_eq(&self, other: &Promise) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }

    pub(crate) fn downgrade(&self) -> WeakCell {
        Rc::downgrade(&self.cell)
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = self.cell.borrow();
        write!(f, "Promise#{} {{ {} }}", cell.id, cell.state)
    }
}

impl fmt::Display for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Promise {{ {} }}", self.cell.borrow().state)
    }
}

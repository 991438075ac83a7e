use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use tracing::{debug, trace, warn};

use super::cell::{CancelHook, CellRef};
use super::reaction::{ContinuationRecord, HandlerResult, ProgressHandler};
use super::state::Outcome;
use crate::adapter;
use crate::errors::{RuntimeError, format_panic};
use crate::value::Value;

/// Moves a pending cell to its terminal state and drains its queue.
/// Returns false, without touching the cell, when it was already settled.
pub(crate) fn settle(cell: &CellRef, outcome: Outcome) -> bool {
    let outcome = match outcome {
        Outcome::Fulfilled(Value::Promise(promise)) if Rc::ptr_eq(&promise.cell, cell) => {
            Outcome::Rejected(RuntimeError::SelfResolution.into_value())
        }
        other => other,
    };
    let (records, runtime, id) = {
        let mut cell_mut = cell.borrow_mut();
        if !cell_mut.state.is_pending() {
            trace!(cell = cell_mut.id, "ignoring settle of an already settled cell");
            return false;
        }
        cell_mut.state = outcome.clone().into();
        cell_mut.cancel_hook = None;
        cell_mut.progress_listeners.clear();
        (
            std::mem::take(&mut cell_mut.queue),
            cell_mut.runtime.clone(),
            cell_mut.id,
        )
    };

    debug!(
        cell = id,
        state = outcome.label(),
        continuations = records.len(),
        "settled"
    );
    for record in records {
        runtime.dispatch(record, outcome.clone());
    }
    true
}

/// Queues `record` on a pending cell, or dispatches it right away when the
/// cell has already settled.
pub(crate) fn enqueue(cell: &CellRef, record: ContinuationRecord) {
    let (outcome, runtime) = {
        let mut cell_mut = cell.borrow_mut();
        match cell_mut.state.outcome() {
            None => {
                let listener = record.progress_listener();
                cell_mut.progress_listeners.push(listener);
                cell_mut.queue.push(record);
                return;
            }
            Some(outcome) => (outcome, cell_mut.runtime.clone()),
        }
    };
    runtime.dispatch(record, outcome);
}

pub(crate) fn run_record(record: ContinuationRecord, outcome: Outcome) {
    let ContinuationRecord {
        on_fulfilled,
        on_rejected,
        child,
        ..
    } = record;

    let handler = if outcome.is_rejected() {
        on_rejected
    } else {
        on_fulfilled
    };

    match handler {
        Some(handler) => match invoke(handler, outcome.into_value()) {
            Ok(result) => resolve_into(&child, result),
            Err(err) => {
                settle(&child, Outcome::Rejected(err.into_value()));
            }
        },
        None => {
            settle(&child, outcome);
        }
    }
}

/// Settles `target` with `value`, adopting the eventual outcome of promises
/// and foreign thenables instead of fulfilling with them.
pub(crate) fn resolve_into(target: &CellRef, value: Value) {
    match value {
        Value::Promise(promise) => adopt(target, &promise.cell),
        Value::Thenable(thenable) => {
            let runtime = target.borrow().runtime.clone();
            let promise = adapter::from_thenable(&runtime, thenable);
            adopt(target, &promise.cell);
        }
        other => {
            settle(target, Outcome::Fulfilled(other));
        }
    }
}

fn adopt(target: &CellRef, source: &CellRef) {
    if Rc::ptr_eq(target, source) {
        settle(
            target,
            Outcome::Rejected(RuntimeError::SelfResolution.into_value()),
        );
        return;
    }

    {
        let mut target_mut = target.borrow_mut();
        if !target_mut.state.is_pending() {
            return;
        }
        target_mut.resolved = true;
        // Cancelling the adopting cell now reaches the adopted one; a
        // producer's own canceler stays in charge of its root cell.
        if !matches!(target_mut.cancel_hook, Some(CancelHook::Producer(_))) {
            target_mut.cancel_hook = Some(CancelHook::Upstream(Rc::downgrade(source)));
        }
    }

    enqueue(source, ContinuationRecord::pass_through(Rc::clone(target)));
}

/// Delivers `update` to every progress listener of a pending cell, in
/// attachment order. Handler failures are logged and dropped.
pub(crate) fn notify_progress(cell: &CellRef, update: Value) -> bool {
    let (listeners, id) = {
        let cell_ref = cell.borrow();
        if !cell_ref.state.is_pending() {
            trace!(cell = cell_ref.id, "ignoring progress on a settled cell");
            return false;
        }
        (cell_ref.progress_listeners.clone(), cell_ref.id)
    };

    for listener in listeners {
        let forwarded = match &listener.handler {
            None => Some(update.clone()),
            Some(handler) => match invoke_progress(handler, update.clone()) {
                Ok(Value::Undefined) => None,
                Ok(value) => Some(value),
                Err(err) => {
                    warn!(cell = id, error = %err, "progress handler failed");
                    None
                }
            },
        };
        if let Some(value) = forwarded {
            notify_progress(&listener.child, value);
        }
    }
    true
}

/// Runs a handler, turning both `Err` and panics into a handler error.
pub(crate) fn invoke<F>(handler: F, value: Value) -> HandlerResult
where
    F: FnOnce(Value) -> HandlerResult,
{
    panic::catch_unwind(AssertUnwindSafe(move || handler(value))).unwrap_or_else(|payload| {
        Err(RuntimeError::Panicked {
            message: format_panic(payload),
        })
    })
}

fn invoke_progress(handler: &ProgressHandler, update: Value) -> HandlerResult {
    invoke(|value| handler(value), update)
}

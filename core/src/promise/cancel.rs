use tracing::debug;

use super::cell::{CancelHook, CellRef};
use super::dispatch::{invoke, settle};
use super::state::{Outcome, PromiseState};
use crate::value::{ErrorValue, Value};

/// Requests cancellation of a pending cell.
///
/// Returns the rejection reason when this call rejected the cell, or when the
/// cell ended up rejected with exactly that reason while its hook ran.
pub(crate) fn cancel(cell: &CellRef, reason: Value) -> Option<Value> {
    let (hook, id) = {
        let mut cell_mut = cell.borrow_mut();
        if !cell_mut.state.is_pending() {
            return None;
        }
        cell_mut.canceled = true;
        (cell_mut.cancel_hook.take(), cell_mut.id)
    };
    debug!(cell = id, reason = %reason, "cancel requested");

    let returned = match hook {
        None => Value::Undefined,
        Some(CancelHook::Producer(canceler)) => match invoke(canceler, reason.clone()) {
            Ok(value) => value,
            Err(err) => return finish(cell, err.into_value()),
        },
        Some(CancelHook::Upstream(parent)) => parent
            .upgrade()
            .and_then(|parent| cancel(&parent, reason.clone()))
            .unwrap_or_default(),
    };

    let chosen = if returned.is_undefined() {
        reason
    } else {
        returned
    };
    finish(cell, into_cancel_reason(chosen))
}

fn finish(cell: &CellRef, reason: Value) -> Option<Value> {
    let current = cell.borrow().state.clone();
    match current {
        PromiseState::Pending => {
            settle(cell, Outcome::Rejected(reason.clone()));
            Some(reason)
        }
        PromiseState::Rejected(existing) if existing == reason => Some(existing),
        _ => None,
    }
}

/// Error values pass through; anything else is wrapped in a cancel error.
pub(crate) fn into_cancel_reason(reason: Value) -> Value {
    match reason {
        Value::Error(_) => reason,
        Value::Undefined => ErrorValue::cancel(None).into(),
        other => ErrorValue::cancel(Some(other)).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ErrorKind;

    #[test]
    fn plain_reasons_are_wrapped() {
        let reason = into_cancel_reason(Value::from("timeout"));
        let err = reason.as_error().expect("cancel reason should be an error");
        assert_eq!(err.kind, ErrorKind::Cancel);
        assert_eq!(err.payload(), Some(&Value::from("timeout")));
    }

    #[test]
    fn missing_reason_becomes_bare_cancel_error() {
        let reason = into_cancel_reason(Value::Undefined);
        assert!(reason.is_cancel());
        assert_eq!(reason.to_string(), "CancelError: canceled");
    }

    #[test]
    fn errors_are_kept_as_is() {
        let original: Value = ErrorValue::new(ErrorKind::Error, "disk full").into();
        assert_eq!(into_cancel_reason(original.clone()), original);
    }
}

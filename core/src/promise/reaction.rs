use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::cell::CellRef;
use crate::errors::RuntimeError;
use crate::value::Value;

pub type HandlerResult = Result<Value, RuntimeError>;

pub(crate) type SettleHandler = Box<dyn FnOnce(Value) -> HandlerResult>;
pub(crate) type ProgressHandler = Rc<dyn Fn(Value) -> HandlerResult>;

/// The optional handlers passed to [`Promise::attach`].
///
/// Any subset may be absent; an absent fulfillment or rejection handler makes
/// the continuation pass the parent's outcome through unchanged.
///
/// [`Promise::attach`]: super::Promise::attach
#[derive(Default)]
pub struct Handlers {
    pub(crate) on_fulfilled: Option<SettleHandler>,
    pub(crate) on_rejected: Option<SettleHandler>,
    pub(crate) on_progress: Option<ProgressHandler>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_fulfilled<F>(mut self, handler: F) -> Self
    where
        F: FnOnce(Value) -> HandlerResult + 'static,
    {
        self.on_fulfilled = Some(Box::new(handler));
        self
    }

    pub fn on_rejected<F>(mut self, handler: F) -> Self
    where
        F: FnOnce(Value) -> HandlerResult + 'static,
    {
        self.on_rejected = Some(Box::new(handler));
        self
    }

    pub fn on_progress<F>(mut self, handler: F) -> Self
    where
        F: Fn(Value) -> HandlerResult + 'static,
    {
        self.on_progress = Some(Rc::new(handler));
        self
    }

    /// One callback serving both outcomes; only one of them ever runs.
    pub(crate) fn either<F>(callback: F) -> Self
    where
        F: FnOnce(Value) -> HandlerResult + 'static,
    {
        let slot = Rc::new(RefCell::new(Some(callback)));
        let rejected_slot = Rc::clone(&slot);
        Self::new()
            .on_fulfilled(move |value| take_and_call(&slot, value))
            .on_rejected(move |reason| take_and_call(&rejected_slot, reason))
    }
}

fn take_and_call<F>(slot: &RefCell<Option<F>>, value: Value) -> HandlerResult
where
    F: FnOnce(Value) -> HandlerResult,
{
    let callback = slot.borrow_mut().take();
    match callback {
        Some(callback) => callback(value),
        None => Ok(Value::Undefined),
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("on_fulfilled", &self.on_fulfilled.is_some())
            .field("on_rejected", &self.on_rejected.is_some())
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

pub(crate) struct ContinuationRecord {
    pub on_fulfilled: Option<SettleHandler>,
    pub on_rejected: Option<SettleHandler>,
    pub on_progress: Option<ProgressHandler>,
    pub child: CellRef,
}

impl ContinuationRecord {
    pub fn new(handlers: Handlers, child: CellRef) -> Self {
        let Handlers {
            on_fulfilled,
            on_rejected,
            on_progress,
        } = handlers;
        Self {
            on_fulfilled,
            on_rejected,
            on_progress,
            child,
        }
    }

    pub fn pass_through(child: CellRef) -> Self {
        Self::new(Handlers::new(), child)
    }

    pub fn progress_listener(&self) -> ProgressListener {
        ProgressListener {
            handler: self.on_progress.clone(),
            child: Rc::clone(&self.child),
        }
    }
}

/// Progress subscription of one continuation. Without a handler the update
/// is forwarded to the child unchanged.
#[derive(Clone)]
pub(crate) struct ProgressListener {
    pub handler: Option<ProgressHandler>,
    pub child: CellRef,
}

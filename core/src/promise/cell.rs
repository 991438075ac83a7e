use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::reaction::{ContinuationRecord, HandlerResult, ProgressListener};
use super::state::{Outcome, PromiseState};
use crate::runtime::Runtime;
use crate::value::Value;

pub(crate) type CellRef = Rc<RefCell<SettlementCell>>;
pub(crate) type WeakCell = Weak<RefCell<SettlementCell>>;

/// Producer-supplied cancellation hook. A returned value replaces the
/// cancellation reason; an `Err` becomes the rejection reason as-is.
pub type Canceler = Box<dyn FnOnce(Value) -> HandlerResult>;

pub(crate) enum CancelHook {
    Producer(Canceler),
    /// Forward the request to the cell this one derives from (or adopts).
    Upstream(WeakCell),
}

pub(crate) struct SettlementCell {
    pub id: u64,
    pub state: PromiseState,
    pub queue: Vec<ContinuationRecord>,
    pub progress_listeners: Vec<ProgressListener>,
    pub cancel_hook: Option<CancelHook>,
    pub canceled: bool,
    /// Following another promise; only that adoption may settle the cell.
    pub resolved: bool,
    pub runtime: Runtime,
}

impl SettlementCell {
    /// Whether a producer call may still change the cell.
    pub fn accepts_writes(&self) -> bool {
        self.state.is_pending() && !self.resolved
    }

    pub fn pending(runtime: &Runtime, cancel_hook: Option<CancelHook>) -> CellRef {
        Rc::new(RefCell::new(Self {
            id: runtime.next_cell_id(),
            state: PromiseState::Pending,
            queue: Vec::new(),
            progress_listeners: Vec::new(),
            cancel_hook,
            canceled: false,
            resolved: false,
            runtime: runtime.clone(),
        }))
    }

    pub fn settled(runtime: &Runtime, outcome: Outcome) -> CellRef {
        let cell = Self::pending(runtime, None);
        cell.borrow_mut().state = outcome.into();
        cell
    }
}

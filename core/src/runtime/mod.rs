mod microtask_queue;
mod observer;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::Deserialize;

use crate::promise::{ContinuationRecord, Outcome, dispatch};

use microtask_queue::{Microtask, MicrotaskQueue};
pub use observer::{RecordingObserver, TraceEvent, TraceObserver, TraceRecord, TracingObserver};

/// When queued continuations run relative to the call that triggered them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// On the caller's stack, before `fulfill`/`reject`/`attach` returns.
    #[default]
    Inline,
    /// On the runtime's microtask queue, drained by
    /// [`Runtime::run_microtasks`].
    Microtask,
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchMode::Inline => write!(f, "inline"),
            DispatchMode::Microtask => write!(f, "microtask"),
        }
    }
}

impl FromStr for DispatchMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "inline" => Ok(DispatchMode::Inline),
            "microtask" => Ok(DispatchMode::Microtask),
            other => Err(format!("unknown dispatch mode '{other}' (inline|microtask)")),
        }
    }
}

#[derive(Clone, Default)]
pub struct RuntimeConfig {
    dispatch: DispatchMode,
    observer: Option<Rc<dyn TraceObserver>>,
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dispatch(mut self, dispatch: DispatchMode) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn with_observer(mut self, observer: Rc<dyn TraceObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn build(&self) -> Runtime {
        Runtime {
            inner: Rc::new(RuntimeInner {
                dispatch: self.dispatch,
                observer: self.observer.clone(),
                microtasks: RefCell::new(MicrotaskQueue::default()),
                next_cell_id: Cell::new(1),
            }),
        }
    }
}

impl fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("dispatch", &self.dispatch)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// Shared context of a family of promises: dispatch policy, trace observer
/// and the microtask queue. Derived promises inherit their parent's runtime.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

struct RuntimeInner {
    dispatch: DispatchMode,
    observer: Option<Rc<dyn TraceObserver>>,
    microtasks: RefCell<MicrotaskQueue>,
    next_cell_id: Cell<u64>,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch_mode(&self) -> DispatchMode {
        self.inner.dispatch
    }

    pub fn observer(&self) -> Option<Rc<dyn TraceObserver>> {
        self.inner.observer.clone()
    }

    pub fn has_microtasks(&self) -> bool {
        !self.inner.microtasks.borrow().is_empty()
    }

    pub fn pending_microtasks(&self) -> usize {
        self.inner.microtasks.borrow().len()
    }

    /// Runs queued continuations in FIFO order until the queue is empty,
    /// including the ones they enqueue. Returns how many ran.
    pub fn run_microtasks(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.inner.microtasks.borrow_mut().pop();
            let Some(task) = next else {
                break;
            };
            task.run();
            ran += 1;
        }
        ran
    }

    pub fn ptr_eq(&self, other: &Runtime) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn next_cell_id(&self) -> u64 {
        let id = self.inner.next_cell_id.get();
        self.inner.next_cell_id.set(id + 1);
        id
    }

    pub(crate) fn dispatch(&self, record: ContinuationRecord, outcome: Outcome) {
        match self.inner.dispatch {
            DispatchMode::Inline => dispatch::run_record(record, outcome),
            DispatchMode::Microtask => self
                .inner
                .microtasks
                .borrow_mut()
                .enqueue(Microtask::Continuation { record, outcome }),
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        RuntimeConfig::default().build()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("dispatch", &self.inner.dispatch)
            .field("observer", &self.inner.observer.is_some())
            .field("queued", &self.inner.microtasks.borrow().len())
            .finish()
    }
}

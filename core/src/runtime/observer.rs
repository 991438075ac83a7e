use std::cell::RefCell;

use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    Resolved(Value),
    Rejected(Value),
    Progress(Value),
}

impl TraceEvent {
    pub fn topic(&self) -> &'static str {
        match self {
            TraceEvent::Resolved(_) => "resolved",
            TraceEvent::Rejected(_) => "rejected",
            TraceEvent::Progress(_) => "progress",
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            TraceEvent::Resolved(value) | TraceEvent::Rejected(value) | TraceEvent::Progress(value) => {
                value
            }
        }
    }
}

/// Receives the events produced by [`Promise::trace`] and
/// [`Promise::trace_rejected`]. Registered per runtime through
/// [`RuntimeConfig::with_observer`].
///
/// [`Promise::trace`]: crate::Promise::trace
/// [`Promise::trace_rejected`]: crate::Promise::trace_rejected
/// [`RuntimeConfig::with_observer`]: crate::RuntimeConfig::with_observer
pub trait TraceObserver {
    fn observe(&self, event: &TraceEvent, args: &[Value]);
}

/// Forwards trace events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TraceObserver for TracingObserver {
    fn observe(&self, event: &TraceEvent, args: &[Value]) {
        let args: Vec<String> = args.iter().map(ToString::to_string).collect();
        tracing::info!(
            topic = event.topic(),
            value = %event.value(),
            args = ?args,
            "promise trace"
        );
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraceRecord {
    pub event: TraceEvent,
    pub args: Vec<Value>,
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    records: RefCell<Vec<TraceRecord>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<TraceRecord> {
        self.records.borrow().clone()
    }

    pub fn topics(&self) -> Vec<&'static str> {
        self.records
            .borrow()
            .iter()
            .map(|record| record.event.topic())
            .collect()
    }
}

impl TraceObserver for RecordingObserver {
    fn observe(&self, event: &TraceEvent, args: &[Value]) {
        self.records.borrow_mut().push(TraceRecord {
            event: event.clone(),
            args: args.to_vec(),
        });
    }
}

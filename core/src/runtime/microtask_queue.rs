use std::collections::VecDeque;

use crate::promise::{ContinuationRecord, Outcome, dispatch};

pub(crate) enum Microtask {
    Continuation {
        record: ContinuationRecord,
        outcome: Outcome,
    },
}

impl Microtask {
    pub fn run(self) {
        match self {
            Microtask::Continuation { record, outcome } => dispatch::run_record(record, outcome),
        }
    }
}

#[derive(Default)]
pub(crate) struct MicrotaskQueue {
    queue: VecDeque<Microtask>,
}

impl MicrotaskQueue {
    pub fn enqueue(&mut self, task: Microtask) {
        self.queue.push_back(task);
    }

    pub fn pop(&mut self) -> Option<Microtask> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

pub mod adapter;
pub mod errors;
pub mod promise;
pub mod runtime;
pub mod scenario;
pub mod value;

pub use adapter::{ThenCallbacks, Thenable, normalize, when};
pub use errors::{DeferredError, RuntimeError, ScenarioError};
pub use promise::{
    Canceler, Deferred, HandlerResult, Handlers, Outcome, Promise, PromiseState, all, first,
    new_deferred, new_deferred_with_canceler,
};
pub use runtime::{
    DispatchMode, RecordingObserver, Runtime, RuntimeConfig, TraceEvent, TraceObserver,
    TraceRecord, TracingObserver,
};
pub use scenario::{Scenario, ScenarioReport, Session};
pub use value::{ErrorKind, ErrorValue, Value};

/// Convenience function to parse and run a JSON scenario end-to-end.
pub fn run_scenario(source: &str) -> Result<ScenarioReport, DeferredError> {
    let scenario = Scenario::from_json(source)?;
    Ok(scenario.run()?)
}

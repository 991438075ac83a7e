mod panic_message;
mod runtime_error;
mod scenario_error;

pub use panic_message::format_panic;
pub use runtime_error::RuntimeError;
pub use scenario_error::ScenarioError;

use miette::Diagnostic;
use thiserror::Error;

/// Unified error type wrapping all deferred errors.
#[derive(Debug, Error, Diagnostic)]
pub enum DeferredError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Scenario(#[from] ScenarioError),
}

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ScenarioError {
    #[error("unknown promise '{name}'")]
    #[diagnostic(help("bind it first with a defer, then, attach or normalize step"))]
    UnknownPromise { name: String },

    #[error("unknown deferred '{name}'")]
    #[diagnostic(help("only names created by a defer step can be settled"))]
    UnknownDeferred { name: String },

    #[error("name '{name}' is already bound")]
    DuplicateName { name: String },

    #[error("invalid scenario: {message}")]
    Invalid { message: String },
}

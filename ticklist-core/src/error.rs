use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskError {
    /// Task text was empty after trimming. Nothing was changed.
    #[error("Please enter a task!")]
    Validation,

    #[error("no free task id left")]
    IdsExhausted,

    #[error("due time {local} does not exist in {zone}")]
    InvalidDueTime { local: String, zone: String },

    /// The in-memory list changed but could not be written out.
    #[error("failed to persist tasks: {0}")]
    Storage(#[from] anyhow::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown filter '{0}' (expected all, active or completed)")]
pub struct ParseFilterError(pub String);

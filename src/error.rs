use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParleyError>;

/// Failure taxonomy for the runtime.
///
/// `Configuration` is fatal and reported once before a session starts.
/// The provider variants (`Authentication`, `RateLimited`,
/// `ServiceUnavailable`, `ToolCall`) are caught per turn and surfaced to
/// the user; the session stays alive so the user can resubmit. Nothing is
/// retried automatically.
#[derive(Debug, Error)]
pub enum ParleyError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    #[error("provider unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("malformed tool-call payload: {0}")]
    ToolCall(String),

    #[error("tool `{0}` not found")]
    ToolNotFound(String),

    #[error("tool `{name}` invocation failed: {source}")]
    ToolInvocation {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("dispatch loop stopped after {0} steps without a final response")]
    StepLimit(usize),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

use std::time::Duration;

/// Core error type.
///
/// Adapter crates map their specific errors into this type. Only collaborator
/// and setup failures are errors; bad user input is answered with a reply.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("auth error: {0}")]
    Auth(String),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    /// True for failures of an outside system (content API, credentials, messenger).
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            Error::Auth(_) | Error::Timeout { .. } | Error::External(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

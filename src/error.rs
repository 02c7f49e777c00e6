use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("{0}")]
    Usage(String),
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("invalid JSON response: {reason}\n{body}")]
    MalformedPayload { reason: String, body: String },
    #[error("failed writing output JSON: {0}")]
    Output(#[from] io::Error),
}

impl FilterError {
    pub fn usage(message: impl Into<String>) -> Self {
        FilterError::Usage(message.into())
    }

    pub fn malformed(reason: impl ToString, body: &str) -> Self {
        FilterError::MalformedPayload {
            reason: reason.to_string(),
            body: body.trim().to_string(),
        }
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            FilterError::Usage(_) => 2,
            _ => 1,
        }
    }
}

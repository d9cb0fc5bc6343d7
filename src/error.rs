// src/error.rs
use std::time::Duration;
use thiserror::Error;

/// Failures surfaced by the chat client. None of them are retried.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The reachability probe failed, so the completion request was never sent
    #[error("LLM server is not running at {base_url}. Please start it first.")]
    Unavailable { base_url: String },

    #[error("LLM request timed out after {timeout:?}. Model might be too large for your system.")]
    Timeout { timeout: Duration },

    #[error("LLM request error: {message}")]
    RequestFailed {
        status: Option<u16>,
        message: String,
    },
}

impl ChatError {
    pub fn unavailable(base_url: impl Into<String>) -> Self {
        Self::Unavailable {
            base_url: base_url.into(),
        }
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed {
            status: None,
            message: msg.into(),
        }
    }

    pub fn http_status(status: u16, body: &str) -> Self {
        Self::RequestFailed {
            status: Some(status),
            message: format!("HTTP {}: {}", status, body),
        }
    }

    /// HTTP status of a failed completion request, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }
}

#![forbid(unsafe_code)]

use std::time::Duration;

use thiserror::Error;

/// Coarse classification of a forge failure, consumed by retry layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    RateLimited,
    TransientNetwork,
    ClientError,
    ServerError,
}

/// Centralized error type for davit-forge.
#[derive(Debug, Error, Clone)]
pub enum ForgeError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("HTTP {status} for URL: {url}")]
    Status {
        status: u16,
        url: String,
        body: Option<String>,
    },
    #[error("rate limited for URL: {url}")]
    RateLimited {
        url: String,
        /// Delay advertised by the forge, when present.
        retry_after: Option<Duration>,
    },
    #[error("abuse limit reported for URL: {url}")]
    AbuseLimited { url: String },
    #[error("invalid upload URL template: {0}")]
    InvalidUploadUrl(String),
    #[error("io error: {0}")]
    Io(String),
}

impl ForgeError {
    /// Creates an HTTP status error.
    pub fn status(status: u16, url: impl Into<String>, body: Option<String>) -> Self {
        Self::Status {
            status,
            url: url.into(),
            body,
        }
    }

    /// Creates a transport error from a reqwest error.
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        Self::Http(error.to_string())
    }

    /// Creates an io error from a std io error.
    pub fn io(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }

    /// Classifies this error for retry decisions.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(_) => ErrorKind::TransientNetwork,
            Self::Status { status, .. } => {
                if *status >= 500 {
                    ErrorKind::ServerError
                } else {
                    ErrorKind::ClientError
                }
            }
            Self::RateLimited { .. } | Self::AbuseLimited { .. } => ErrorKind::RateLimited,
            Self::InvalidUploadUrl(_) | Self::Io(_) => ErrorKind::ClientError,
        }
    }

    /// Checks if this error is considered retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimited { .. } => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429 || *status == 408,
            Self::AbuseLimited { .. } | Self::InvalidUploadUrl(_) | Self::Io(_) => false,
        }
    }

    /// Checks if this error is the not-found status.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// Gets the HTTP status code if this is a status error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ForgeError {
    fn from(error: reqwest::Error) -> Self {
        Self::from_reqwest(error)
    }
}

pub type ForgeResult<T> = Result<T, ForgeError>;

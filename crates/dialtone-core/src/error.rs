// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Dialtone report-delivery engine.

use thiserror::Error;

/// The primary error type used across all Dialtone adapter traits and core operations.
#[derive(Debug, Error)]
pub enum DialtoneError {
    /// Configuration errors (invalid TOML, missing required fields, bad collector URLs).
    #[error("configuration error: {0}")]
    Config(String),

    /// No connectivity at dispatch time. Synthetic: no request was attempted.
    #[error("device is offline")]
    Offline,

    /// The request did not complete within the transport's timeout.
    #[error("request timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// The collector answered with a status outside the accepted success set.
    #[error("collector returned HTTP {status}")]
    Http { status: u16 },

    /// Any other network failure (DNS, connection reset, TLS).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A report payload could not be encoded. Never retried.
    #[error("serialization error: {source}")]
    Serialization {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Store read or write failed.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A producer named a counter that does not exist.
    #[error("unknown counter kind `{0}`")]
    UnknownCounter(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DialtoneError {
    /// Network-class failures that drive the retry path.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Offline | Self::Timeout { .. } | Self::Http { .. } | Self::Transport { .. }
        )
    }
}

impl From<serde_json::Error> for DialtoneError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization {
            source: Box::new(e),
        }
    }
}

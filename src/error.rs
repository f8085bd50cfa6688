//! Error types for the tsdemo CLI.
//!
//! This module provides structured error handling with semantic exit codes.

use std::io;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (missing required values).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid command-line argument or parameter format.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Login retry budget exhausted against the management API.
    #[error("login did not succeed after {attempts} attempts")]
    AuthExhausted {
        /// Number of login attempts made before giving up.
        attempts: u32,
    },

    /// A management API response lacked an expected field or was malformed
    /// beyond what sanitization can repair. Carries the raw body for diagnosis.
    #[error("unexpected {endpoint} response: {body}")]
    ApiContract {
        /// Endpoint whose response violated the expected structure.
        endpoint: &'static str,
        /// Raw response body.
        body: String,
    },

    /// Cluster creation returned no identifier.
    #[error("cluster '{0}' creation returned no identifier")]
    ClusterCreateFailed(String),

    /// No registration token was found for a newly created cluster.
    #[error("no registration token found for cluster '{0}'")]
    TokenRetrievalFailed(String),

    /// An external deployment/creation action returned non-zero status.
    #[error("{description} failed: {output}")]
    ExternalAction {
        /// What the action was doing.
        description: String,
        /// Captured combined output of the failed process.
        output: String,
    },

    /// HTTP transport error talking to the management API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error (file operations, process spawning, etc.).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General/unspecified error.
    #[error("{0}")]
    Other(String),
}

/// Convenient Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the exit code for this error type.
    ///
    /// - 0: Success
    /// - 1: General error / failed external action
    /// - 2: Invalid arguments or configuration
    /// - 3: Authentication exhausted
    /// - 10: Network error
    /// - 11: Server error / API contract violation
    pub fn exit_code(&self) -> i32 {
        match self {
            // Argument/config errors
            Error::Config(_) | Error::InvalidArgument(_) => 2,

            // Auth errors
            Error::AuthExhausted { .. } => 3,

            // Contract violations surface the server's misbehavior
            Error::ApiContract { .. }
            | Error::ClusterCreateFailed(_)
            | Error::TokenRetrievalFailed(_) => 11,

            // IO/network
            Error::Http(_) | Error::Io(_) => 10,

            // External tools and everything else
            Error::ExternalAction { .. } | Error::Json(_) | Error::Other(_) => 1,
        }
    }

    /// Returns true if this error should show a usage hint.
    pub fn should_suggest_usage(&self) -> bool {
        matches!(self, Error::Config(_) | Error::InvalidArgument(_))
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create an invalid argument error.
    pub fn invalid_arg(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Create a general error.
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}

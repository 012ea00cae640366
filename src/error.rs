//! Service error types
//!
//! Every failure a request handler can produce, with its HTTP status mapping.

use hyper::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("secret configuration not found: {0}")]
    ConfigNotFound(String),

    #[error("secret configuration malformed: {0}")]
    ConfigMalformed(String),

    #[error("secret not found: {0}")]
    SecretNotFound(String),

    #[error("decode error: {0}")]
    DecodeError(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl ServiceError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::SecretNotFound(_) => StatusCode::NOT_FOUND,
            Self::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::ConfigNotFound(_)
            | Self::ConfigMalformed(_)
            | Self::DecodeError(_)
            | Self::DecryptionFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error kind
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "InvalidArgument",
            Self::ConfigNotFound(_) => "ConfigNotFound",
            Self::ConfigMalformed(_) => "ConfigMalformed",
            Self::SecretNotFound(_) => "SecretNotFound",
            Self::DecodeError(_) => "DecodeError",
            Self::DecryptionFailed(_) => "DecryptionFailed",
            Self::UpstreamUnavailable(_) => "UpstreamUnavailable",
        }
    }

    /// Message safe to show a client when details are not exposed
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "Invalid request argument",
            Self::ConfigNotFound(_) | Self::ConfigMalformed(_) => {
                "Secret configuration unavailable"
            }
            Self::SecretNotFound(_) => "Secret not found",
            Self::DecodeError(_) => "Secret value could not be decoded",
            Self::DecryptionFailed(_) => "Secret value could not be decrypted",
            Self::UpstreamUnavailable(_) => "Upstream service unavailable",
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

//! Error types
//!
//! Every failure of a rotation maps onto one [`RotationError`] variant. Messages
//! name the secret, key or field involved and never carry secret values.

use thiserror::Error;

use crate::models::RotationResponse;

/// A request field that violates its contract
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error(transparent)]
    InvalidOptions(#[from] ValidationError),

    #[error("no usable characters remain after excluding ambiguous characters")]
    EmptyCharset,

    #[error("secure random source failed: {0}")]
    RandomSource(#[from] rand::Error),
}

/// Failures reported by a secret store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("secret '{0}' was not found")]
    NotFound(String),

    #[error("access denied to secret '{0}'")]
    AccessDenied(String),

    #[error("transient store failure: {0}")]
    Transient(String),

    #[error("store request failed: {0}")]
    Service(String),

    #[error("deadline exceeded before the store responded")]
    DeadlineExceeded,
}

impl StoreError {
    /// Whether an outer retry policy could reasonably try again
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_) | StoreError::DeadlineExceeded)
    }
}

#[derive(Debug, Error)]
pub enum RotationError {
    #[error("invalid request format: {0}")]
    InputParse(serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to generate secret: {0}")]
    Generation(GeneratorError),

    #[error("failed to generate value for key '{key}': {error}")]
    KeyGeneration { key: String, error: GeneratorError },

    #[error("failed to get existing secret: {0}")]
    StoreRead(StoreError),

    #[error("failed to parse existing secret as a JSON object: {0}")]
    MalformedSecret(serde_json::Error),

    #[error("key '{key}' is not present in the existing secret")]
    MissingKey { key: String },

    #[error("existing secret has no keys to rotate")]
    EmptySecret,

    #[error("failed to serialize updated secret: {0}")]
    Serialize(serde_json::Error),

    #[error("failed to update secret: {0}")]
    StoreWrite(StoreError),
}

impl RotationError {
    /// Stable label used in log events
    pub fn kind(&self) -> &'static str {
        match self {
            RotationError::InputParse(_) => "input_parse",
            RotationError::Validation(_) => "validation",
            RotationError::Generation(GeneratorError::RandomSource(_))
            | RotationError::KeyGeneration {
                error: GeneratorError::RandomSource(_),
                ..
            } => "random_source",
            RotationError::Generation(_) | RotationError::KeyGeneration { .. } => "generation",
            RotationError::StoreRead(_) => "store_read",
            RotationError::MalformedSecret(_) => "malformed_secret",
            RotationError::MissingKey { .. } => "missing_key",
            RotationError::EmptySecret => "empty_secret",
            RotationError::Serialize(_) => "serialize",
            RotationError::StoreWrite(_) => "store_write",
        }
    }
}

/// A failed rotation: the response for the caller plus the cause for the operator
#[derive(Debug, Error)]
#[error("failed to rotate secret '{}': {error}", .response.secret_arn)]
pub struct RotationFailure {
    pub response: RotationResponse,
    pub error: RotationError,
}

impl RotationFailure {
    pub fn new(secret_arn: impl Into<String>, error: RotationError) -> Self {
        Self {
            response: RotationResponse::failure(secret_arn, &error),
            error,
        }
    }

    pub fn into_response(self) -> RotationResponse {
        self.response
    }
}

use std::future::Future;
use tokio::time::Instant;

use crate::error::StoreError;

/// Trait for secret stores (AWS Secrets Manager, local files, etc.)
///
/// Bodies are opaque strings; interpreting them is up to the rotator.
#[async_trait::async_trait]
pub trait SecretStore: Send + Sync {
    /// Read the current value of a secret
    async fn get_secret_value(&self, secret_id: &str) -> Result<String, StoreError>;

    /// Write a new value, returning the version identifier the store assigned
    async fn put_secret_value(&self, secret_id: &str, body: &str) -> Result<String, StoreError>;

    /// Get the store type name for display purposes
    fn store_type(&self) -> &'static str;
}

/// Run a store call, giving up once `deadline` passes
pub async fn with_deadline<T, F>(deadline: Option<Instant>, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, call)
            .await
            .map_err(|_| StoreError::DeadlineExceeded)?,
        None => call.await,
    }
}

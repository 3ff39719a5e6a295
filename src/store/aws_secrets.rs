use anyhow::Result;
use aws_config::Region;
use aws_sdk_secretsmanager::config::http::HttpResponse;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueError;
use aws_sdk_secretsmanager::operation::put_secret_value::PutSecretValueError;
use aws_sdk_secretsmanager::Client as SecretsManagerClient;
use tracing::{debug, info};

use super::secret_store::SecretStore;
use crate::error::StoreError;

const ACCESS_DENIED_CODES: &[&str] = &["AccessDeniedException", "UnrecognizedClientException"];
const TRANSIENT_CODES: &[&str] = &[
    "ThrottlingException",
    "InternalServiceError",
    "RequestTimeout",
    "ServiceUnavailable",
];

/// AWS Secrets Manager store
#[derive(Debug, Clone)]
pub struct AwsSecretsStore {
    client: SecretsManagerClient,
}

impl AwsSecretsStore {
    /// Create a store from the default credential chain.
    ///
    /// `endpoint_url` points the client at a compatible local endpoint (e.g. LocalStack).
    pub async fn new(region: Option<String>, endpoint_url: Option<String>) -> Result<Self> {
        let region_str = region.unwrap_or_else(|| {
            std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string())
        });

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region_str.clone()));
        if let Some(url) = endpoint_url {
            debug!("Using custom Secrets Manager endpoint: {}", url);
            loader = loader.endpoint_url(url);
        }
        let config = loader.load().await;

        info!("Initialized AWS Secrets Manager store in {}", region_str);
        Ok(Self::from_client(SecretsManagerClient::new(&config)))
    }

    /// Wrap an already configured SDK client
    pub fn from_client(client: SecretsManagerClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl SecretStore for AwsSecretsStore {
    async fn get_secret_value(&self, secret_id: &str) -> Result<String, StoreError> {
        debug!("Reading secret from AWS Secrets Manager: {}", secret_id);

        let response = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| {
                classify_sdk_error(
                    secret_id,
                    e,
                    GetSecretValueError::is_resource_not_found_exception,
                )
            })?;

        response
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| StoreError::Service(format!("secret '{}' has no string value", secret_id)))
    }

    async fn put_secret_value(&self, secret_id: &str, body: &str) -> Result<String, StoreError> {
        debug!("Writing secret to AWS Secrets Manager: {}", secret_id);

        let response = self
            .client
            .put_secret_value()
            .secret_id(secret_id)
            .secret_string(body)
            .send()
            .await
            .map_err(|e| {
                classify_sdk_error(
                    secret_id,
                    e,
                    PutSecretValueError::is_resource_not_found_exception,
                )
            })?;

        let version_id = response.version_id().ok_or_else(|| {
            StoreError::Service(format!(
                "no version id returned for secret '{}'",
                secret_id
            ))
        })?;

        info!(
            "Stored new version {} of secret '{}' in AWS Secrets Manager",
            version_id, secret_id
        );
        Ok(version_id.to_string())
    }

    fn store_type(&self) -> &'static str {
        "AWS Secrets Manager"
    }
}

/// Map an SDK failure onto the store error taxonomy
fn classify_sdk_error<E>(
    secret_id: &str,
    err: SdkError<E, HttpResponse>,
    is_not_found: fn(&E) -> bool,
) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    if err.as_service_error().is_some_and(is_not_found) {
        return StoreError::NotFound(secret_id.to_string());
    }

    if matches!(
        err,
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_)
    ) {
        return StoreError::Transient(DisplayErrorContext(&err).to_string());
    }

    match err.code() {
        Some(code) if ACCESS_DENIED_CODES.contains(&code) => {
            StoreError::AccessDenied(secret_id.to_string())
        }
        Some(code) if TRANSIENT_CODES.contains(&code) => {
            StoreError::Transient(DisplayErrorContext(&err).to_string())
        }
        _ => StoreError::Service(DisplayErrorContext(&err).to_string()),
    }
}

use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::{RotationError, RotationFailure};
use crate::generator::Generator;
use crate::models::{RotationRequest, RotationResponse, SecretType};
use crate::store::{with_deadline, SecretStore};
use crate::structured::StructuredSecret;
use crate::validator;

/// Rotates secrets held in a [`SecretStore`].
///
/// The store and generator are borrowed for the lifetime of the rotator; each
/// call to [`Rotator::rotate`] is independent and keeps no state between calls.
pub struct Rotator<'a> {
    store: &'a dyn SecretStore,
    generator: &'a dyn Generator,
}

impl<'a> Rotator<'a> {
    pub fn new(store: &'a dyn SecretStore, generator: &'a dyn Generator) -> Self {
        Self { store, generator }
    }

    /// Rotate the secret described by `request`
    pub async fn rotate(
        &self,
        request: &RotationRequest,
    ) -> Result<RotationResponse, RotationFailure> {
        self.rotate_until(request, None).await
    }

    /// Rotate, abandoning any store call still pending at `deadline`
    pub async fn rotate_with_deadline(
        &self,
        request: &RotationRequest,
        deadline: Instant,
    ) -> Result<RotationResponse, RotationFailure> {
        self.rotate_until(request, Some(deadline)).await
    }

    pub(crate) async fn rotate_until(
        &self,
        request: &RotationRequest,
        deadline: Option<Instant>,
    ) -> Result<RotationResponse, RotationFailure> {
        match self.execute(request, deadline).await {
            Ok(version_id) => {
                info!(
                    secret_arn = %request.secret_arn,
                    version_id = %version_id,
                    "Successfully rotated secret"
                );
                Ok(RotationResponse::success(&request.secret_arn, version_id))
            }
            Err(e) => {
                error!(
                    secret_arn = %request.secret_arn,
                    kind = e.kind(),
                    "Secret rotation failed: {}",
                    e
                );
                Err(RotationFailure::new(&request.secret_arn, e))
            }
        }
    }

    async fn execute(
        &self,
        request: &RotationRequest,
        deadline: Option<Instant>,
    ) -> Result<String, RotationError> {
        let secret_type = validator::validate(request)?;
        info!(
            "Rotating {} secret {} ({})",
            secret_type,
            request.secret_arn,
            self.store.store_type()
        );

        let body = match secret_type {
            SecretType::Plaintext => self.rotate_plaintext(request)?,
            SecretType::KeyValue | SecretType::Json => {
                self.rotate_structured(request, deadline).await?
            }
        };

        with_deadline(
            deadline,
            self.store.put_secret_value(&request.secret_arn, &body),
        )
        .await
        .map_err(RotationError::StoreWrite)
    }

    fn rotate_plaintext(&self, request: &RotationRequest) -> Result<String, RotationError> {
        if request.key_value_config.is_some() {
            warn!(
                "Ignoring key_value_config for plaintext secret {}",
                request.secret_arn
            );
        }

        self.generator
            .generate(&request.generator_options)
            .map_err(RotationError::Generation)
    }

    async fn rotate_structured(
        &self,
        request: &RotationRequest,
        deadline: Option<Instant>,
    ) -> Result<String, RotationError> {
        let existing = with_deadline(deadline, self.store.get_secret_value(&request.secret_arn))
            .await
            .map_err(RotationError::StoreRead)?;

        let mut secret =
            StructuredSecret::parse(&existing).map_err(RotationError::MalformedSecret)?;

        let keys = select_keys(&secret, request)?;
        debug!(
            "Rotating {} of {} keys in {}",
            keys.len(),
            secret.len(),
            request.secret_arn
        );

        // Generate every value before touching the secret so a failure leaves nothing half-rotated
        let mut rotated = Vec::with_capacity(keys.len());
        for key in keys {
            let value = self
                .generator
                .generate(&request.generator_options)
                .map_err(|error| RotationError::KeyGeneration {
                    key: key.clone(),
                    error,
                })?;
            rotated.push((key, value));
        }

        for (key, value) in &rotated {
            secret
                .set_string(key, value)
                .map_err(RotationError::Serialize)?;
        }

        secret.to_body().map_err(RotationError::Serialize)
    }
}

/// Keys to rotate: the explicit list when non-empty, otherwise every key present
fn select_keys(
    secret: &StructuredSecret,
    request: &RotationRequest,
) -> Result<Vec<String>, RotationError> {
    let requested = request
        .key_value_config
        .as_ref()
        .map(|config| config.keys_to_rotate.as_slice())
        .unwrap_or_default();

    if requested.is_empty() {
        if secret.is_empty() {
            return Err(RotationError::EmptySecret);
        }
        return Ok(secret.keys().map(str::to_string).collect());
    }

    if let Some(missing) = requested.iter().find(|key| !secret.contains_key(key)) {
        return Err(RotationError::MissingKey {
            key: missing.clone(),
        });
    }

    Ok(requested.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KeyValueConfig;

    fn request(keys: Option<Vec<&str>>) -> RotationRequest {
        RotationRequest {
            secret_arn: "arn:aws:secretsmanager:us-east-1:123456789012:secret:test".into(),
            secret_type: "json".into(),
            generator_options: Default::default(),
            key_value_config: keys.map(|keys| KeyValueConfig {
                keys_to_rotate: keys.into_iter().map(String::from).collect(),
            }),
        }
    }

    fn secret() -> StructuredSecret {
        StructuredSecret::parse(r#"{"username":"admin","password":"old","api_key":"old"}"#)
            .unwrap()
    }

    #[test]
    fn test_select_all_keys_when_absent() {
        let keys = select_keys(&secret(), &request(None)).unwrap();
        assert_eq!(keys, vec!["api_key", "password", "username"]);
    }

    #[test]
    fn test_select_all_keys_when_empty() {
        let keys = select_keys(&secret(), &request(Some(vec![]))).unwrap();
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_select_explicit_keys() {
        let keys = select_keys(&secret(), &request(Some(vec!["password", "api_key"]))).unwrap();
        assert_eq!(keys, vec!["password", "api_key"]);
    }

    #[test]
    fn test_select_missing_key() {
        let err = select_keys(&secret(), &request(Some(vec!["password", "token"]))).unwrap_err();
        assert!(matches!(err, RotationError::MissingKey { ref key } if key == "token"));
    }

    #[test]
    fn test_select_from_empty_secret() {
        let empty = StructuredSecret::parse("{}").unwrap();
        let err = select_keys(&empty, &request(None)).unwrap_err();
        assert!(matches!(err, RotationError::EmptySecret));
    }
}

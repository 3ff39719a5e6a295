//! Invocation boundary: serialized request in, serialized response out.

use serde_json::Value;
use tokio::time::Instant;
use tracing::error;

use crate::error::{RotationError, RotationFailure};
use crate::models::{RotationRequest, RotationResponse};
use crate::rotation::Rotator;

/// Decode a request payload.
///
/// Only a JSON object is accepted; arrays and scalars fail like any other
/// malformed input.
/// Failures are reported before validation runs and carry no secret reference.
pub fn parse_request(payload: &str) -> Result<RotationRequest, RotationFailure> {
    decode(payload).map_err(|e| {
        let e = RotationError::InputParse(e);
        error!(kind = e.kind(), "Rejected rotation request: {}", e);
        RotationFailure::new(String::new(), e)
    })
}

fn decode(payload: &str) -> Result<RotationRequest, serde_json::Error> {
    match serde_json::from_str::<Value>(payload)? {
        object @ Value::Object(_) => serde_json::from_value(object),
        _ => Err(serde::de::Error::custom("expected a JSON object")),
    }
}

/// Parse `payload` and run the rotation it describes
pub async fn handle_request(
    rotator: &Rotator<'_>,
    payload: &str,
    deadline: Option<Instant>,
) -> Result<RotationResponse, RotationFailure> {
    let request = parse_request(payload)?;
    rotator.rotate_until(&request, deadline).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request() {
        let request = parse_request(
            r#"{"secret_arn":"arn:aws:secretsmanager:us-east-1:1:secret:x","secret_type":"plaintext","generator_options":{"length":16,"include_lowercase":true}}"#,
        )
        .unwrap();
        assert_eq!(request.secret_type, "plaintext");
        assert_eq!(request.generator_options.length, 16);
    }

    #[test]
    fn test_parse_request_rejects_malformed_payload() {
        for payload in ["", "not json", "[]", r#"{"generator_options":{"length":"sixteen"}}"#] {
            let failure = parse_request(payload).unwrap_err();
            assert!(matches!(failure.error, RotationError::InputParse(_)));
            assert!(!failure.response.success);
            assert!(failure.response.secret_arn.is_empty());
            assert!(failure
                .response
                .error_msg
                .as_deref()
                .unwrap()
                .starts_with("invalid request format:"));
        }
    }

    #[test]
    fn test_parse_request_requires_object() {
        for payload in [
            r#"["arn:aws:secretsmanager:us-east-1:1:secret:x","plaintext"]"#,
            "\"plaintext\"",
            "42",
            "null",
        ] {
            let failure = parse_request(payload).unwrap_err();
            assert!(matches!(failure.error, RotationError::InputParse(_)), "{}", payload);
            assert!(failure.response.secret_arn.is_empty());
        }
    }
}

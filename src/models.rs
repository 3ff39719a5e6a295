use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape of the secret body held by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecretType {
    #[serde(rename = "plaintext")]
    Plaintext,
    #[serde(rename = "key-value")]
    KeyValue,
    #[serde(rename = "json")]
    Json,
}

impl SecretType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecretType::Plaintext => "plaintext",
            SecretType::KeyValue => "key-value",
            SecretType::Json => "json",
        }
    }

    /// Whether the body is a JSON object rotated key by key
    pub fn is_structured(&self) -> bool {
        matches!(self, SecretType::KeyValue | SecretType::Json)
    }
}

impl fmt::Display for SecretType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SecretType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plaintext" => Ok(SecretType::Plaintext),
            "key-value" => Ok(SecretType::KeyValue),
            "json" => Ok(SecretType::Json),
            _ => Err(format!(
                "Unknown secret type: {}. Supported: plaintext, key-value, json",
                s
            )),
        }
    }
}

/// Input parameters for a single rotation.
///
/// `secret_type` stays a raw string on the wire so that an unknown type is
/// reported by validation rather than as a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationRequest {
    #[serde(default)]
    pub secret_arn: String,
    #[serde(default)]
    pub secret_type: String,
    #[serde(default)]
    pub generator_options: GeneratorOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_value_config: Option<KeyValueConfig>,
}

/// Options controlling secret generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorOptions {
    #[serde(default)]
    pub length: usize,
    #[serde(default)]
    pub include_digits: bool,
    #[serde(default)]
    pub include_uppercase: bool,
    #[serde(default)]
    pub include_lowercase: bool,
    #[serde(default)]
    pub include_special_chars: bool,
    #[serde(default)]
    pub exclude_ambiguous: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_number_digits: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_number_special: Option<usize>,
}

impl GeneratorOptions {
    /// Digits guaranteed in the output; an enabled class without an explicit minimum gets one
    pub fn min_digits(&self) -> usize {
        effective_minimum(self.include_digits, self.min_number_digits)
    }

    /// Special characters guaranteed in the output
    pub fn min_special(&self) -> usize {
        effective_minimum(self.include_special_chars, self.min_number_special)
    }

    pub fn has_character_class(&self) -> bool {
        self.include_lowercase
            || self.include_uppercase
            || self.include_digits
            || self.include_special_chars
    }
}

fn effective_minimum(enabled: bool, explicit: Option<usize>) -> usize {
    match explicit {
        Some(count) => count,
        None if enabled => 1,
        None => 0,
    }
}

/// Which keys of a structured secret to rotate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueConfig {
    /// Empty means every key present in the secret
    #[serde(default)]
    pub keys_to_rotate: Vec<String>,
}

/// Result of a rotation, returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationResponse {
    pub success: bool,
    pub secret_arn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
}

impl RotationResponse {
    pub fn success(secret_arn: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self {
            success: true,
            secret_arn: secret_arn.into(),
            version_id: Some(version_id.into()),
            error_msg: None,
        }
    }

    pub fn failure(secret_arn: impl Into<String>, error: &impl fmt::Display) -> Self {
        Self {
            success: false,
            secret_arn: secret_arn.into(),
            version_id: None,
            error_msg: Some(error.to_string()),
        }
    }
}

//! Structural checks on a rotation request, run before any store or generator call.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::models::{GeneratorOptions, KeyValueConfig, RotationRequest, SecretType};

pub const MIN_SECRET_ARN_LENGTH: usize = 20;
pub const MIN_SECRET_LENGTH: usize = 8;
pub const MAX_SECRET_LENGTH: usize = 2048;

/// Validate a request, returning its parsed secret type.
///
/// Rules are checked in order and the first failure wins: reference, secret
/// type, generator options, then the key selection of structured secrets.
pub fn validate(request: &RotationRequest) -> Result<SecretType, ValidationError> {
    validate_secret_arn(&request.secret_arn)?;
    let secret_type = validate_secret_type(&request.secret_type)?;
    validate_generator_options(&request.generator_options)?;

    if secret_type.is_structured() {
        if let Some(config) = &request.key_value_config {
            validate_key_value_config(config)?;
        }
    }

    Ok(secret_type)
}

fn validate_secret_arn(arn: &str) -> Result<(), ValidationError> {
    if arn.trim().is_empty() {
        return Err(ValidationError::new("secret_arn", "cannot be empty"));
    }

    if arn.len() < MIN_SECRET_ARN_LENGTH {
        return Err(ValidationError::new(
            "secret_arn",
            format!(
                "is too short to be valid (minimum {} characters)",
                MIN_SECRET_ARN_LENGTH
            ),
        ));
    }

    Ok(())
}

fn validate_secret_type(secret_type: &str) -> Result<SecretType, ValidationError> {
    secret_type
        .parse()
        .map_err(|reason: String| ValidationError::new("secret_type", reason))
}

/// Option-level rules, shared with the generator
pub fn validate_generator_options(opts: &GeneratorOptions) -> Result<(), ValidationError> {
    if !(MIN_SECRET_LENGTH..=MAX_SECRET_LENGTH).contains(&opts.length) {
        return Err(ValidationError::new(
            "length",
            format!(
                "must be between {} and {}, got {}",
                MIN_SECRET_LENGTH, MAX_SECRET_LENGTH, opts.length
            ),
        ));
    }

    if !opts.has_character_class() {
        return Err(ValidationError::new(
            "generator_options",
            "at least one character type must be included",
        ));
    }

    if !opts.include_digits && opts.min_number_digits.unwrap_or(0) > 0 {
        return Err(ValidationError::new(
            "min_number_digits",
            "requires include_digits to be enabled",
        ));
    }

    if !opts.include_special_chars && opts.min_number_special.unwrap_or(0) > 0 {
        return Err(ValidationError::new(
            "min_number_special",
            "requires include_special_chars to be enabled",
        ));
    }

    let required = opts.min_digits().saturating_add(opts.min_special());
    if required > opts.length {
        return Err(ValidationError::new(
            "generator_options",
            format!(
                "minimum character counts ({}) exceed length ({})",
                required, opts.length
            ),
        ));
    }

    Ok(())
}

fn validate_key_value_config(config: &KeyValueConfig) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for key in &config.keys_to_rotate {
        if key.is_empty() {
            return Err(ValidationError::new(
                "keys_to_rotate",
                "key names cannot be empty",
            ));
        }
        if !seen.insert(key.as_str()) {
            return Err(ValidationError::new(
                "keys_to_rotate",
                format!("key '{}' is listed more than once", key),
            ));
        }
    }
    Ok(())
}

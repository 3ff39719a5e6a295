//! Random secret generation
//!
//! Secrets are drawn from the union of the enabled character classes. Digit and
//! special-character minimums are satisfied by drawing those characters first
//! from their own class, filling the remainder from the full alphabet and then
//! shuffling the whole buffer, so guaranteed characters land at random
//! positions. All draws go through [`uniform_index`], which rejects samples
//! outside the largest multiple of the bound to avoid modulo bias.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::sync::{Mutex, PoisonError};

use crate::error::GeneratorError;
use crate::models::GeneratorOptions;
use crate::validator::validate_generator_options;

pub const LOWERCASE_CHARS: &str = "abcdefghijklmnopqrstuvwxyz";
pub const UPPERCASE_CHARS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGIT_CHARS: &str = "0123456789";
pub const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";
pub const AMBIGUOUS_CHARS: &str = "0Ol1";

/// Produces new secret values
pub trait Generator: Send + Sync {
    fn generate(&self, opts: &GeneratorOptions) -> Result<String, GeneratorError>;
}

/// Generator backed by a cryptographically secure random source
#[derive(Debug)]
pub struct SecretGenerator<R = OsRng> {
    rng: Mutex<R>,
}

impl SecretGenerator<OsRng> {
    /// Create a generator reading from the operating system's entropy source
    pub fn new() -> Self {
        Self::with_rng(OsRng)
    }
}

impl Default for SecretGenerator<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + CryptoRng> SecretGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl<R: RngCore + CryptoRng + Send> Generator for SecretGenerator<R> {
    fn generate(&self, opts: &GeneratorOptions) -> Result<String, GeneratorError> {
        validate_generator_options(opts)?;

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        compose(&mut *rng, opts)
    }
}

/// Alphabet of every enabled class, minus ambiguous characters if requested
pub fn build_charset(opts: &GeneratorOptions) -> Vec<u8> {
    let mut charset = Vec::new();

    if opts.include_lowercase {
        charset.extend_from_slice(LOWERCASE_CHARS.as_bytes());
    }
    if opts.include_uppercase {
        charset.extend_from_slice(UPPERCASE_CHARS.as_bytes());
    }
    if opts.include_digits {
        charset.extend_from_slice(DIGIT_CHARS.as_bytes());
    }
    if opts.include_special_chars {
        charset.extend_from_slice(SPECIAL_CHARS.as_bytes());
    }

    if opts.exclude_ambiguous {
        remove_ambiguous(&mut charset);
    }

    charset
}

fn class_pool(class: &str, exclude_ambiguous: bool) -> Vec<u8> {
    let mut pool = class.as_bytes().to_vec();
    if exclude_ambiguous {
        remove_ambiguous(&mut pool);
    }
    pool
}

fn remove_ambiguous(charset: &mut Vec<u8>) {
    charset.retain(|c| !AMBIGUOUS_CHARS.as_bytes().contains(c));
}

fn compose<R: RngCore + ?Sized>(
    rng: &mut R,
    opts: &GeneratorOptions,
) -> Result<String, GeneratorError> {
    let charset = build_charset(opts);
    if charset.is_empty() {
        return Err(GeneratorError::EmptyCharset);
    }

    let mut secret = Vec::with_capacity(opts.length);

    for (class, minimum) in [
        (DIGIT_CHARS, opts.min_digits()),
        (SPECIAL_CHARS, opts.min_special()),
    ] {
        if minimum == 0 {
            continue;
        }
        let pool = class_pool(class, opts.exclude_ambiguous);
        if pool.is_empty() {
            return Err(GeneratorError::EmptyCharset);
        }
        for _ in 0..minimum {
            secret.push(pool[uniform_index(rng, pool.len())?]);
        }
    }

    while secret.len() < opts.length {
        secret.push(charset[uniform_index(rng, charset.len())?]);
    }

    shuffle(rng, &mut secret)?;

    Ok(secret.into_iter().map(char::from).collect())
}

/// Draw an index in `0..bound` without modulo bias.
///
/// `bound` must be non-zero and fit in 32 bits.
pub fn uniform_index<R: RngCore + ?Sized>(rng: &mut R, bound: usize) -> Result<usize, rand::Error> {
    debug_assert!(bound > 0 && bound as u64 <= u64::from(u32::MAX));

    let range = u64::from(u32::MAX) + 1;
    let bound = bound as u64;
    let zone = range - range % bound;

    loop {
        let mut word = [0u8; 4];
        rng.try_fill_bytes(&mut word)?;
        let value = u64::from(u32::from_le_bytes(word));
        if value < zone {
            return Ok((value % bound) as usize);
        }
    }
}

/// Fisher-Yates shuffle driven by [`uniform_index`]
fn shuffle<R: RngCore + ?Sized>(rng: &mut R, items: &mut [u8]) -> Result<(), rand::Error> {
    for i in (1..items.len()).rev() {
        let j = uniform_index(rng, i + 1)?;
        items.swap(i, j);
    }
    Ok(())
}

//! Secret Rotation Library
//!
//! Rotates plaintext and structured (key-value / JSON) secrets: validates the
//! request, generates constrained random values and writes them back to a
//! secret store.

pub mod config;
pub mod error;
pub mod generator;
pub mod handler;
pub mod models;
pub mod rotation;
pub mod store;
pub mod structured;
pub mod validator;

pub use config::Config;
pub use error::{GeneratorError, RotationError, RotationFailure, StoreError, ValidationError};
pub use generator::{Generator, SecretGenerator};
pub use models::{GeneratorOptions, KeyValueConfig, RotationRequest, RotationResponse, SecretType};
pub use rotation::Rotator;
pub use store::SecretStore;

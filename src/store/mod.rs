//! Secret store implementations
//!
//! The rotator only needs get/put on opaque string bodies; this module provides
//! that contract and its implementations.

mod aws_secrets;
mod file;
mod secret_store;

pub use aws_secrets::AwsSecretsStore;
pub use file::FileStore;
pub use secret_store::{with_deadline, SecretStore};

/// Store type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreType {
    Aws,
    File,
}

impl std::str::FromStr for StoreType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aws" => Ok(StoreType::Aws),
            "file" => Ok(StoreType::File),
            _ => Err(format!("Unknown store type: {}. Supported: aws, file", s)),
        }
    }
}

/// Type alias for store trait object
pub type Store = Box<dyn SecretStore>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_type_from_str() {
        assert_eq!("aws".parse::<StoreType>(), Ok(StoreType::Aws));
        assert_eq!("FILE".parse::<StoreType>(), Ok(StoreType::File));
        assert!("vault".parse::<StoreType>().is_err());
    }
}

//! Content digest handling for Docker/OCI registries
//!
//! A digest is the content address of a blob or manifest, written as
//! `<algorithm>:<hex>` (for example `sha256:e3b0c442...`). The registry API
//! uses digests both in URLs and in the `Docker-Content-Digest` response
//! header, so validation lives in one place.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};

use crate::error::{RegistryError, Result};

/// SHA256 digest of the empty blob, with the `sha256:` prefix.
pub const EMPTY_BLOB_DIGEST: &str =
    "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// A validated `<algorithm>:<hex>` content digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    algorithm: String,
    hex: String,
}

impl Digest {
    /// Parse and validate a digest string.
    ///
    /// The algorithm part must match `[a-z0-9+._-]+` and the hex part
    /// `[a-f0-9]+`; anything else is rejected.
    pub fn parse(value: &str) -> Result<Self> {
        let Some((algorithm, hex)) = value.split_once(':') else {
            return Err(RegistryError::Validation(format!(
                "invalid digest '{}': missing ':' separator",
                value
            )));
        };

        if algorithm.is_empty() || !algorithm.chars().all(is_algorithm_char) {
            return Err(RegistryError::Validation(format!(
                "invalid digest algorithm '{}'",
                algorithm
            )));
        }
        if hex.is_empty() || !hex.chars().all(is_hex_char) {
            return Err(RegistryError::Validation(format!(
                "invalid digest hex part in '{}'",
                value
            )));
        }
        if algorithm == "sha256" && hex.len() != 64 {
            return Err(RegistryError::Validation(format!(
                "invalid sha256 digest length: expected 64 hex characters, got {}",
                hex.len()
            )));
        }

        Ok(Self {
            algorithm: algorithm.to_string(),
            hex: hex.to_string(),
        })
    }

    /// Compute the `sha256:<hex>` digest of raw content.
    pub fn sha256_of(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self {
            algorithm: "sha256".to_string(),
            hex: hex::encode(hasher.finalize()),
        }
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }
}

fn is_algorithm_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '.' | '_' | '-')
}

fn is_hex_char(c: char) -> bool {
    c.is_ascii_digit() || ('a'..='f').contains(&c)
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.hex)
    }
}

impl std::str::FromStr for Digest {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Digest::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_sha256_digest() {
        let digest = Digest::parse(EMPTY_BLOB_DIGEST).unwrap();
        assert_eq!(digest.algorithm(), "sha256");
        assert_eq!(digest.hex().len(), 64);
        assert_eq!(digest.to_string(), EMPTY_BLOB_DIGEST);
    }

    #[test]
    fn parses_non_sha256_algorithm() {
        let digest = Digest::parse("sha512+b64:abc123").unwrap();
        assert_eq!(digest.algorithm(), "sha512+b64");
        assert_eq!(digest.hex(), "abc123");
    }

    #[test]
    fn rejects_missing_separator() {
        assert!(Digest::parse("e3b0c44298fc1c14").is_err());
    }

    #[test]
    fn rejects_uppercase_hex() {
        assert!(Digest::parse("sha256:ABCDEF").is_err());
    }

    #[test]
    fn rejects_non_hex_characters() {
        assert!(Digest::parse("sha256:zzzz").is_err());
    }

    #[test]
    fn rejects_empty_parts() {
        assert!(Digest::parse(":abcdef").is_err());
        assert!(Digest::parse("sha256:").is_err());
    }

    #[test]
    fn rejects_short_sha256() {
        assert!(Digest::parse("sha256:abcdef").is_err());
    }

    #[test]
    fn computes_sha256_of_empty_input() {
        assert_eq!(Digest::sha256_of(b"").to_string(), EMPTY_BLOB_DIGEST);
    }

    #[test]
    fn serde_round_trip() {
        let json = format!("\"{}\"", EMPTY_BLOB_DIGEST);
        let digest: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(serde_json::to_string(&digest).unwrap(), json);
    }
}

//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Longest SKU accepted from callers.
pub const MAX_ID_LEN: usize = 64;

/// Identifier of a product (its SKU).
///
/// Stored as text so SKUs entered by hand and generated ones share a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
    /// Generate a fresh identifier.
    ///
    /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
    /// for determinism.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ProductId> for String {
    fn from(value: ProductId) -> Self {
        value.0
    }
}

impl TryFrom<String> for ProductId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_id("ProductId: empty"));
        }
        if trimmed.len() > MAX_ID_LEN {
            return Err(DomainError::invalid_id(format!(
                "ProductId: longer than {MAX_ID_LEN} bytes"
            )));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(DomainError::invalid_id(format!(
                "ProductId: contains whitespace: {trimmed:?}"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl FromStr for ProductId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_string())
    }
}

//! Product categories and their type-dependent size payloads.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, ValueObject};

/// Product category.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Dvd,
    #[default]
    Book,
    Furniture,
}

impl ProductType {
    pub const ALL: [ProductType; 3] = [ProductType::Dvd, ProductType::Book, ProductType::Furniture];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Dvd => "dvd",
            ProductType::Book => "book",
            ProductType::Furniture => "furniture",
        }
    }

    /// Human-facing name, as shown in a type switcher.
    pub fn label(&self) -> &'static str {
        match self {
            ProductType::Dvd => "DVD",
            ProductType::Book => "Book",
            ProductType::Furniture => "Furniture",
        }
    }

    /// Names of the size fields this category requires.
    pub fn size_fields(&self) -> &'static [&'static str] {
        match self {
            ProductType::Dvd => &["size"],
            ProductType::Book => &["weight"],
            ProductType::Furniture => &["height", "width", "length"],
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dvd" => Ok(ProductType::Dvd),
            "book" => Ok(ProductType::Book),
            "furniture" => Ok(ProductType::Furniture),
            other => Err(DomainError::validation(format!(
                "unknown product type {other:?} (expected dvd, book or furniture)"
            ))),
        }
    }
}

/// Type-dependent size payload.
///
/// Serialized untagged so persisted records read `{"size": 700}`,
/// `{"weight": 2}` or `{"height": 24, "width": 45, "length": 15}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductSize {
    /// Furniture dimensions in centimetres.
    Dimensions { height: f64, width: f64, length: f64 },
    /// DVD capacity in megabytes.
    Capacity { size: f64 },
    /// Book weight in kilograms.
    Weight { weight: f64 },
}

impl ValueObject for ProductSize {}

impl ProductSize {
    pub fn dimensions(height: f64, width: f64, length: f64) -> Self {
        ProductSize::Dimensions { height, width, length }
    }

    pub fn capacity(size: f64) -> Self {
        ProductSize::Capacity { size }
    }

    pub fn weight(weight: f64) -> Self {
        ProductSize::Weight { weight }
    }

    /// The category this payload belongs to.
    pub fn product_type(&self) -> ProductType {
        match self {
            ProductSize::Dimensions { .. } => ProductType::Furniture,
            ProductSize::Capacity { .. } => ProductType::Dvd,
            ProductSize::Weight { .. } => ProductType::Book,
        }
    }

    /// `(field name, value)` pairs, in the order a form presents them.
    pub fn fields(&self) -> Vec<(&'static str, f64)> {
        match *self {
            ProductSize::Dimensions { height, width, length } => {
                vec![("height", height), ("width", width), ("length", length)]
            }
            ProductSize::Capacity { size } => vec![("size", size)],
            ProductSize::Weight { weight } => vec![("weight", weight)],
        }
    }

    /// List-view rendering.
    pub fn label(&self) -> String {
        match *self {
            ProductSize::Dimensions { height, width, length } => {
                format!("Dimension: {height}x{width}x{length}")
            }
            ProductSize::Capacity { size } => format!("Size: {size} MB"),
            ProductSize::Weight { weight } => format!("Weight: {weight} KG"),
        }
    }
}

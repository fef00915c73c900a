//! Field-level validation of product data.
//!
//! Every check runs and every failure is collected, so a caller can show all
//! problems with a submission at once rather than one per attempt.

use core::fmt;

use serde::Serialize;

use catalog_core::DomainError;

use crate::size::{ProductSize, ProductType};

/// Minimum length (in characters, after trimming) of names and descriptions.
pub const MIN_TEXT_LEN: usize = 3;

/// A validated product field.
///
/// Declaration order is the order errors are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Description,
    Name,
    Price,
    Image,
    Size,
    Type,
    Id,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Description => "description",
            Field::Name => "name",
            Field::Price => "price",
            Field::Image => "image",
            Field::Size => "size",
            Field::Type => "type",
            Field::Id => "id",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// All field failures of one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: Field, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    pub fn has(&self, field: Field) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Messages reported for `field`.
    pub fn messages(&self, field: Field) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    /// `Ok(())` when nothing failed; otherwise the errors in report order.
    pub fn into_result(mut self) -> Result<(), Self> {
        if self.errors.is_empty() {
            return Ok(());
        }
        self.errors.sort_by_key(|e| e.field);
        Err(self)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            f.write_str(&e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationErrors> for DomainError {
    fn from(value: ValidationErrors) -> Self {
        DomainError::validation(value.to_string())
    }
}

fn check_text(errors: &mut ValidationErrors, field: Field, label: &str, value: &str) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.push(field, format!("{label} is required"));
    } else if len < MIN_TEXT_LEN {
        errors.push(
            field,
            format!("{label} must be at least {MIN_TEXT_LEN} characters"),
        );
    }
}

pub(crate) fn check_name(errors: &mut ValidationErrors, name: &str) {
    check_text(errors, Field::Name, "Name", name);
}

pub(crate) fn check_description(errors: &mut ValidationErrors, description: &str) {
    check_text(errors, Field::Description, "Description", description);
}

pub(crate) fn check_image(errors: &mut ValidationErrors, image: &str) {
    if image.trim().is_empty() {
        errors.push(Field::Image, "Image is required");
    }
}

pub(crate) fn check_price(errors: &mut ValidationErrors, price: f64) {
    if price.is_nan() {
        errors.push(Field::Price, "Price is required");
    } else if !(price.is_finite() && price > 0.0) {
        errors.push(Field::Price, "Price must be greater than 0");
    }
}

pub(crate) fn check_size(errors: &mut ValidationErrors, product_type: ProductType, size: &ProductSize) {
    if size.product_type() != product_type {
        errors.push(
            Field::Size,
            format!(
                "Size does not match product type {} (expected {})",
                product_type,
                product_type.size_fields().join(", ")
            ),
        );
        return;
    }
    for (name, value) in size.fields() {
        if !(value.is_finite() && value > 0.0) {
            errors.push(
                Field::Size,
                format!("{} must be greater than 0", capitalize(name)),
            );
        }
    }
}

/// Run every check over a full set of product fields.
pub fn validate_fields(
    name: &str,
    price: f64,
    product_type: ProductType,
    size: &ProductSize,
    image: &str,
    description: &str,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    check_name(&mut errors, name);
    check_price(&mut errors, price);
    check_size(&mut errors, product_type, size);
    check_image(&mut errors, image);
    check_description(&mut errors, description);
    errors.into_result()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

//! Products domain module.
//!
//! This crate contains the catalog's business rules (product records, size
//! payloads, validation, price display), implemented purely as deterministic
//! domain logic (no IO, no storage).

pub mod currency;
pub mod draft;
pub mod product;
pub mod size;
pub mod validation;

pub use currency::{Currency, format_currency, to_dollars, to_euro, to_ghana_cedis, to_pounds};
pub use draft::ProductDraft;
pub use product::{Product, ProductPatch, ProductRequest};
pub use size::{ProductSize, ProductType};
pub use validation::{Field, FieldError, ValidationErrors};

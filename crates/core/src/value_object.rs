//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two size payloads with the same numbers
/// are the same size. They are immutable; to "modify" one, build a new one.
///
/// - **Value Object**: `ProductSize::Weight { weight: 2.0 }`
/// - **Entity**: `Product { id: "JVC200123", .. }`
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

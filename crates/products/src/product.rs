use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, DomainResult, Entity, ProductId};

use crate::size::{ProductSize, ProductType};
use crate::validation::{Field, ValidationErrors, validate_fields};

/// A catalog record.
///
/// Serialized camelCase with a lowercase `type` tag so persisted snapshots keep
/// the shape `{ id, name, price, image, type, size, description, createdAt, updatedAt }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: ProductId,
    name: String,
    price: f64,
    image: String,
    #[serde(rename = "type")]
    product_type: ProductType,
    size: ProductSize,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Input for creating a product. `id` is generated when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub name: String,
    pub price: f64,
    pub image: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub size: ProductSize,
    pub description: String,
}

impl ProductRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_fields(
            &self.name,
            self.price,
            self.product_type,
            &self.size,
            &self.image,
            &self.description,
        )
    }
}

/// Partial update. Unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub product_type: Option<ProductType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<ProductSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.image.is_none()
            && self.product_type.is_none()
            && self.size.is_none()
            && self.description.is_none()
    }
}

impl Product {
    /// Validate `request` and build a new record stamped with `now`.
    pub fn create(request: ProductRequest, now: DateTime<Utc>) -> DomainResult<Self> {
        request.validate()?;

        Ok(Self {
            id: request.id.unwrap_or_else(ProductId::generate),
            name: request.name.trim().to_string(),
            price: request.price,
            image: request.image.trim().to_string(),
            product_type: request.product_type,
            size: request.size,
            description: request.description.trim().to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn product_type(&self) -> ProductType {
        self.product_type
    }

    pub fn size(&self) -> &ProductSize {
        &self.size
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// List-view rendering of the size payload.
    pub fn size_label(&self) -> String {
        self.size.label()
    }

    /// Case-insensitive, whitespace-insensitive name comparison used for the
    /// uniqueness check.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }

    /// Re-run field validation over the stored values.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_fields(
            &self.name,
            self.price,
            self.product_type,
            &self.size,
            &self.image,
            &self.description,
        )
    }

    /// Field validation plus timestamp order, for records read back from
    /// storage rather than built through [`Product::create`].
    pub fn check(&self) -> DomainResult<()> {
        self.validate()?;
        if self.updated_at < self.created_at {
            return Err(DomainError::invariant(format!(
                "updatedAt {} precedes createdAt {}",
                self.updated_at, self.created_at
            )));
        }
        Ok(())
    }

    /// Apply `patch` in place, bumping `updated_at` to `now`.
    ///
    /// The result is validated as a whole; on failure `self` is untouched.
    /// An empty patch is a no-op and does not bump the timestamp.
    pub fn apply_patch(&mut self, patch: ProductPatch, now: DateTime<Utc>) -> DomainResult<()> {
        if patch.is_empty() {
            return Ok(());
        }

        if let Some(ty) = patch.product_type {
            if ty != self.product_type && patch.size.is_none() {
                let mut errors = ValidationErrors::new();
                errors.push(
                    Field::Size,
                    format!("Size is required when changing type to {ty}"),
                );
                return Err(errors.into());
            }
        }

        let mut next = self.clone();
        if let Some(name) = patch.name {
            next.name = name.trim().to_string();
        }
        if let Some(price) = patch.price {
            next.price = price;
        }
        if let Some(image) = patch.image {
            next.image = image.trim().to_string();
        }
        if let Some(ty) = patch.product_type {
            next.product_type = ty;
        }
        if let Some(size) = patch.size {
            next.size = size;
        }
        if let Some(description) = patch.description {
            next.description = description.trim().to_string();
        }
        next.validate()?;

        next.updated_at = now.max(self.created_at);
        *self = next;
        Ok(())
    }

    /// Point the record at a new image reference.
    pub fn set_image(&mut self, image: impl Into<String>, now: DateTime<Utc>) -> DomainResult<()> {
        let image = image.into();
        if image.trim().is_empty() {
            return Err(DomainError::validation("Image is required"));
        }
        self.image = image.trim().to_string();
        self.updated_at = now.max(self.created_at);
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sku(s: &str) -> ProductId {
        s.parse().unwrap()
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn book_request() -> ProductRequest {
        ProductRequest {
            id: Some(sku("GGWP0007")),
            name: "War and Peace".to_string(),
            price: 20.0,
            image: "https://cdn.example.com/war-and-peace.png".to_string(),
            product_type: ProductType::Book,
            size: ProductSize::weight(2.0),
            description: "A long novel".to_string(),
        }
    }

    #[test]
    fn create_product_keeps_given_id_and_stamps_time() {
        let now = test_time();
        let product = Product::create(book_request(), now).unwrap();

        assert_eq!(product.id(), &sku("GGWP0007"));
        assert_eq!(product.name(), "War and Peace");
        assert_eq!(product.product_type(), ProductType::Book);
        assert_eq!(product.created_at(), now);
        assert_eq!(product.updated_at(), now);
        assert_eq!(product.size_label(), "Weight: 2 KG");
    }

    #[test]
    fn create_product_generates_id_when_missing() {
        let mut request = book_request();
        request.id = None;
        let a = Product::create(request.clone(), test_time()).unwrap();
        let b = Product::create(request, test_time()).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn create_product_trims_text_fields() {
        let mut request = book_request();
        request.name = "  War and Peace  ".to_string();
        request.description = "\tA long novel\n".to_string();
        let product = Product::create(request, test_time()).unwrap();
        assert_eq!(product.name(), "War and Peace");
        assert_eq!(product.description(), "A long novel");
    }

    #[test]
    fn create_product_rejects_invalid_request() {
        let mut request = book_request();
        request.price = -5.0;
        request.size = ProductSize::capacity(700.0);

        let err = Product::create(request, test_time()).unwrap_err();
        match err {
            DomainError::Validation(msg) => {
                assert!(msg.contains("Price must be greater than 0"));
                assert!(msg.contains("Size does not match product type book"));
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn json_shape_matches_persisted_records() {
        let now = "2024-03-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let product = Product::create(book_request(), now).unwrap();
        let json = serde_json::to_value(&product).unwrap();

        assert_eq!(json["id"], "GGWP0007");
        assert_eq!(json["type"], "book");
        assert_eq!(json["size"], serde_json::json!({ "weight": 2.0 }));
        assert_eq!(json["createdAt"], "2024-03-01T10:00:00Z");
        assert_eq!(json["updatedAt"], "2024-03-01T10:00:00Z");

        let back: Product = serde_json::from_value(json).unwrap();
        assert_eq!(back, product);
    }

    #[test]
    fn request_deserializes_without_id() {
        let request: ProductRequest = serde_json::from_str(
            r#"{"name":"Acme DISC","price":1,"image":"disc.png","type":"dvd","size":{"size":700},"description":"Blank disc"}"#,
        )
        .unwrap();
        assert!(request.id.is_none());
        assert_eq!(request.size, ProductSize::capacity(700.0));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn check_rejects_inconsistent_stored_records() {
        let stored = |json: serde_json::Value| serde_json::from_value::<Product>(json).unwrap();
        let base = serde_json::json!({
            "id": "GGWP0007",
            "name": "War and Peace",
            "price": 20.0,
            "image": "war.png",
            "type": "book",
            "size": { "weight": 2.0 },
            "description": "A long novel",
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-01T10:00:00Z"
        });
        assert!(stored(base.clone()).check().is_ok());

        let mut mismatched = base.clone();
        mismatched["size"] = serde_json::json!({ "size": 700 });
        mismatched["price"] = serde_json::json!(-3);
        assert!(matches!(
            stored(mismatched).check(),
            Err(DomainError::Validation(_))
        ));

        let mut backwards = base;
        backwards["updatedAt"] = serde_json::json!("2024-02-01T10:00:00Z");
        assert!(matches!(
            stored(backwards).check(),
            Err(DomainError::InvariantViolation(_))
        ));
    }

    #[test]
    fn apply_patch_updates_fields_and_timestamp() {
        let created = test_time();
        let mut product = Product::create(book_request(), created).unwrap();
        let later = created + Duration::seconds(30);

        product
            .apply_patch(
                ProductPatch {
                    price: Some(25.5),
                    description: Some("An even longer novel".to_string()),
                    ..ProductPatch::default()
                },
                later,
            )
            .unwrap();

        assert_eq!(product.price(), 25.5);
        assert_eq!(product.description(), "An even longer novel");
        assert_eq!(product.created_at(), created);
        assert_eq!(product.updated_at(), later);
    }

    #[test]
    fn apply_patch_is_atomic_on_failure() {
        let mut product = Product::create(book_request(), test_time()).unwrap();
        let before = product.clone();

        let err = product
            .apply_patch(
                ProductPatch {
                    name: Some("Anna Karenina".to_string()),
                    price: Some(0.0),
                    ..ProductPatch::default()
                },
                test_time(),
            )
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(product, before);
    }

    #[test]
    fn apply_patch_type_change_requires_size() {
        let mut product = Product::create(book_request(), test_time()).unwrap();

        let err = product
            .apply_patch(
                ProductPatch {
                    product_type: Some(ProductType::Dvd),
                    ..ProductPatch::default()
                },
                test_time(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        product
            .apply_patch(
                ProductPatch {
                    product_type: Some(ProductType::Dvd),
                    size: Some(ProductSize::capacity(4700.0)),
                    ..ProductPatch::default()
                },
                test_time(),
            )
            .unwrap();
        assert_eq!(product.product_type(), ProductType::Dvd);
        assert_eq!(product.size_label(), "Size: 4700 MB");
    }

    #[test]
    fn empty_patch_does_not_touch_timestamp() {
        let created = test_time();
        let mut product = Product::create(book_request(), created).unwrap();
        product
            .apply_patch(ProductPatch::default(), created + Duration::hours(1))
            .unwrap();
        assert_eq!(product.updated_at(), created);
    }

    #[test]
    fn updated_at_never_precedes_created_at() {
        let created = test_time();
        let mut product = Product::create(book_request(), created).unwrap();
        product
            .apply_patch(
                ProductPatch {
                    price: Some(1.0),
                    ..ProductPatch::default()
                },
                created - Duration::days(1),
            )
            .unwrap();
        assert_eq!(product.updated_at(), created);
    }

    #[test]
    fn has_name_ignores_case_and_padding() {
        let product = Product::create(book_request(), test_time()).unwrap();
        assert!(product.has_name("  war AND peace "));
        assert!(!product.has_name("War and Peace II"));
    }

    #[test]
    fn set_image_rejects_blank_reference() {
        let mut product = Product::create(book_request(), test_time()).unwrap();
        assert!(product.set_image("   ", test_time()).is_err());
        product.set_image("memory://bucket/a.png", test_time()).unwrap();
        assert_eq!(product.image(), "memory://bucket/a.png");
    }
}

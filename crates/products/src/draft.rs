//! Raw, unparsed product input.
//!
//! A draft carries text exactly as typed. Turning it into a [`ProductRequest`]
//! parses numbers, builds the size payload for the chosen category and runs
//! the same validation a request gets.

use serde::Deserialize;

use catalog_core::ProductId;

use crate::product::ProductRequest;
use crate::size::{ProductSize, ProductType};
use crate::validation::{
    Field, ValidationErrors, check_description, check_image, check_name, check_price, check_size,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProductDraft {
    pub id: Option<String>,
    pub name: Option<String>,
    pub price: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub size: Option<String>,
    pub weight: Option<String>,
    pub height: Option<String>,
    pub width: Option<String>,
    pub length: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
}

/// Parse a numeric field. Blank, unparseable and NaN input all read as absent.
fn number(raw: &Option<String>) -> Option<f64> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| !v.is_nan())
}

fn text(raw: Option<String>) -> String {
    raw.map(|s| s.trim().to_string()).unwrap_or_default()
}

impl ProductDraft {
    /// Size payload for `product_type` from whichever size fields parsed.
    ///
    /// Fields belonging to other categories are ignored.
    pub fn size_for(&self, product_type: ProductType) -> Option<ProductSize> {
        match product_type {
            ProductType::Dvd => number(&self.size).map(ProductSize::capacity),
            ProductType::Book => number(&self.weight).map(ProductSize::weight),
            ProductType::Furniture => Some(ProductSize::dimensions(
                number(&self.height)?,
                number(&self.width)?,
                number(&self.length)?,
            )),
        }
    }

    pub fn into_request(self) -> Result<ProductRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let id = match self.id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => match raw.parse::<ProductId>() {
                Ok(id) => Some(id),
                Err(e) => {
                    errors.push(Field::Id, e.to_string());
                    None
                }
            },
            None => None,
        };

        let product_type = match self.product_type.as_deref().map(str::trim) {
            None | Some("") => Some(ProductType::default()),
            Some(raw) => match raw.parse::<ProductType>() {
                Ok(ty) => Some(ty),
                Err(_) => {
                    errors.push(Field::Type, "Type must be one of dvd, book, furniture");
                    None
                }
            },
        };

        let price = match self.price.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push(Field::Price, "Price is required");
                None
            }
            Some(_) => match number(&self.price) {
                Some(price) => {
                    check_price(&mut errors, price);
                    Some(price)
                }
                None => {
                    errors.push(Field::Price, "Price must be a number");
                    None
                }
            },
        };

        let size = product_type.and_then(|ty| match self.size_for(ty) {
            Some(size) => {
                check_size(&mut errors, ty, &size);
                Some(size)
            }
            None => {
                errors.push(Field::Size, "Size is required");
                None
            }
        });

        let name = text(self.name);
        let image = text(self.image);
        let description = text(self.description);
        check_name(&mut errors, &name);
        check_image(&mut errors, &image);
        check_description(&mut errors, &description);

        match (errors.into_result(), product_type, price, size) {
            (Ok(()), Some(product_type), Some(price), Some(size)) => Ok(ProductRequest {
                id,
                name,
                price,
                image,
                product_type,
                size,
                description,
            }),
            (checked, ..) => Err(checked.err().unwrap_or_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    fn furniture_draft() -> ProductDraft {
        ProductDraft {
            name: s("Oak chair"),
            price: s("49.99"),
            product_type: s("furniture"),
            height: s("90"),
            width: s("45"),
            length: s("50"),
            image: s("chair.png"),
            description: s("Solid oak"),
            ..ProductDraft::default()
        }
    }

    #[test]
    fn complete_draft_becomes_request() {
        let request = furniture_draft().into_request().unwrap();
        assert_eq!(request.product_type, ProductType::Furniture);
        assert_eq!(request.size, ProductSize::dimensions(90.0, 45.0, 50.0));
        assert_eq!(request.price, 49.99);
        assert!(request.id.is_none());
    }

    #[test]
    fn type_defaults_to_book() {
        let draft = ProductDraft {
            name: s("Dune"),
            price: s("9.5"),
            weight: s("0.4"),
            image: s("dune.png"),
            description: s("Desert planet"),
            ..ProductDraft::default()
        };
        let request = draft.into_request().unwrap();
        assert_eq!(request.product_type, ProductType::Book);
        assert_eq!(request.size, ProductSize::weight(0.4));
    }

    #[test]
    fn unparseable_size_fields_are_dropped() {
        let mut draft = furniture_draft();
        draft.width = s("wide");
        // stray fields from another category do not stand in
        draft.size = s("700");

        let errs = draft.into_request().unwrap_err();
        assert_eq!(errs.messages(Field::Size), vec!["Size is required"]);
    }

    #[test]
    fn size_for_ignores_nan() {
        let draft = ProductDraft {
            size: s("NaN"),
            weight: s("1"),
            ..ProductDraft::default()
        };
        assert_eq!(draft.size_for(ProductType::Dvd), None);
        assert_eq!(draft.size_for(ProductType::Book), Some(ProductSize::weight(1.0)));
    }

    #[test]
    fn empty_draft_reports_every_field() {
        let errs = ProductDraft::default().into_request().unwrap_err();
        let fields: Vec<Field> = errs.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![Field::Description, Field::Name, Field::Price, Field::Image, Field::Size]
        );
    }

    #[test]
    fn bad_price_and_type_are_reported() {
        let mut draft = furniture_draft();
        draft.price = s("12.3.4");
        draft.product_type = s("vinyl");

        let errs = draft.into_request().unwrap_err();
        assert_eq!(errs.messages(Field::Price), vec!["Price must be a number"]);
        assert_eq!(
            errs.messages(Field::Type),
            vec!["Type must be one of dvd, book, furniture"]
        );
        // no type, so no size check either
        assert!(!errs.has(Field::Size));
    }

    #[test]
    fn zero_dimensions_fail_validation() {
        let mut draft = furniture_draft();
        draft.length = s("0");
        let errs = draft.into_request().unwrap_err();
        assert_eq!(errs.messages(Field::Size), vec!["Length must be greater than 0"]);
    }

    #[test]
    fn explicit_id_is_parsed() {
        let mut draft = furniture_draft();
        draft.id = s(" TR120555 ");
        let request = draft.into_request().unwrap();
        assert_eq!(request.id.unwrap().as_str(), "TR120555");

        let mut draft = furniture_draft();
        draft.id = s("TR 120555");
        let errs = draft.into_request().unwrap_err();
        assert!(errs.has(Field::Id));
    }
}

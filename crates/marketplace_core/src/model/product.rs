//! Product entity.
//!
//! # Invariants
//! - `id` and `user_id` are non-nil. `user_id` never changes after creation.
//! - `product_name` is non-empty.
//! - `description`, `photo`, `location`, `category` are optional text and
//!   default to the empty string. `photo` is an opaque reference.

use crate::model::patch::{float_slot, integer_slot, merge_field, text_slot, PatchOutcome};
use crate::model::user::UserId;
use crate::validate::{
    validate_finite, validate_id, validate_non_empty, FieldValue, ValidationError,
    ValidationResult,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable product identifier.
pub type ProductId = Uuid;

/// Field set for creating a product.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewProduct {
    pub user_id: UserId,
    pub product_name: String,
    pub price: i64,
    pub quantity: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub photo: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub product_rank: f64,
}

impl NewProduct {
    /// Builds a field set with empty optional text and a zero rank.
    pub fn new(
        user_id: UserId,
        product_name: impl Into<String>,
        price: i64,
        quantity: i64,
    ) -> Self {
        Self {
            user_id,
            product_name: product_name.into(),
            price,
            quantity,
            description: String::new(),
            photo: String::new(),
            location: String::new(),
            category: String::new(),
            product_rank: 0.0,
        }
    }

    /// Validates every field, failing on the first violation.
    pub fn validate(&self) -> ValidationResult {
        validate_id("user_id", self.user_id)?;
        validate_non_empty("product_name", &self.product_name)?;
        validate_finite("product_rank", self.product_rank)?;
        Ok(())
    }
}

/// Persistable product listed by one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub user_id: UserId,
    pub product_name: String,
    pub price: i64,
    pub quantity: i64,
    pub description: String,
    pub photo: String,
    pub location: String,
    pub category: String,
    pub product_rank: f64,
}

impl Product {
    /// Validates `fields` and assigns a fresh identifier.
    pub fn create(fields: NewProduct) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4(), fields)
    }

    /// Validates `fields` under a caller-provided identifier.
    pub fn with_id(id: ProductId, fields: NewProduct) -> Result<Self, ValidationError> {
        validate_id("id", id)?;
        fields.validate()?;

        Ok(Self {
            id,
            user_id: fields.user_id,
            product_name: fields.product_name,
            price: fields.price,
            quantity: fields.quantity,
            description: fields.description,
            photo: fields.photo,
            location: fields.location,
            category: fields.category,
            product_rank: fields.product_rank,
        })
    }

    /// Applies every patch slot that passes validation.
    pub fn apply_patch(&mut self, patch: &ProductPatch) -> PatchOutcome {
        let mut outcome = PatchOutcome::default();

        merge_field(
            &mut self.product_name,
            patch.product_name.as_ref(),
            "product_name",
            |value| validate_non_empty("product_name", value),
            &mut outcome,
        );
        merge_field(&mut self.price, patch.price.as_ref(), "price", accept_any, &mut outcome);
        merge_field(
            &mut self.quantity,
            patch.quantity.as_ref(),
            "quantity",
            accept_any,
            &mut outcome,
        );
        merge_field(
            &mut self.description,
            patch.description.as_ref(),
            "description",
            accept_any,
            &mut outcome,
        );
        merge_field(&mut self.photo, patch.photo.as_ref(), "photo", accept_any, &mut outcome);
        merge_field(
            &mut self.location,
            patch.location.as_ref(),
            "location",
            accept_any,
            &mut outcome,
        );
        merge_field(
            &mut self.category,
            patch.category.as_ref(),
            "category",
            accept_any,
            &mut outcome,
        );
        merge_field(
            &mut self.product_rank,
            patch.product_rank.as_ref(),
            "product_rank",
            |value| validate_finite("product_rank", *value),
            &mut outcome,
        );

        outcome
    }
}

/// Price, quantity and optional text carry no constraint beyond their type.
fn accept_any<T>(_: &T) -> ValidationResult {
    Ok(())
}

/// Partial update for a product. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProductPatch {
    pub product_name: Option<String>,
    pub price: Option<i64>,
    pub quantity: Option<i64>,
    pub description: Option<String>,
    pub photo: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub product_rank: Option<f64>,
}

impl ProductPatch {
    /// Builds a patch from an untyped field mapping.
    ///
    /// Unknown names, `id`, `user_id`, and values of the wrong kind are dropped.
    pub fn from_fields<K: AsRef<str>>(fields: impl IntoIterator<Item = (K, FieldValue)>) -> Self {
        let mut patch = Self::default();
        for (name, value) in fields {
            match name.as_ref() {
                "product_name" => patch.product_name = text_slot("product_name", &value),
                "price" => patch.price = integer_slot("price", &value),
                "quantity" => patch.quantity = integer_slot("quantity", &value),
                "description" => patch.description = text_slot("description", &value),
                "photo" => patch.photo = text_slot("photo", &value),
                "location" => patch.location = text_slot("location", &value),
                "category" => patch.category = text_slot("category", &value),
                "product_rank" => patch.product_rank = float_slot("product_rank", &value),
                _ => {}
            }
        }
        patch
    }

    /// Returns whether no slot is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

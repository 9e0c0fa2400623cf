//! User entity.
//!
//! # Responsibility
//! - Hold a validated marketplace user and the input used to create one.
//! - Merge partial updates without breaking field invariants.
//!
//! # Invariants
//! - `id` is a non-nil UUID generated once and never changed.
//! - `name`, `surname`, `location` are non-empty.
//! - `email` matches the email grammar; uniqueness is enforced by storage.
//! - `password` satisfies the strength policy. It is stored as given.

use crate::model::patch::{float_slot, merge_field, text_slot, PatchOutcome};
use crate::validate::{
    validate_email, validate_finite, validate_id, validate_non_empty, validate_password,
    FieldValue, ValidationError, ValidationResult,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable user identifier.
pub type UserId = Uuid;

/// Ranking assigned to users that do not provide one.
pub const DEFAULT_USER_RANKING: f64 = 4.8;

fn default_ranking() -> f64 {
    DEFAULT_USER_RANKING
}

/// Field set for creating a user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    pub location: String,
    #[serde(default = "default_ranking")]
    pub ranking: f64,
}

impl NewUser {
    /// Builds a field set with the default ranking.
    pub fn new(
        name: impl Into<String>,
        surname: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
            email: email.into(),
            password: password.into(),
            location: location.into(),
            ranking: DEFAULT_USER_RANKING,
        }
    }

    /// Overrides the ranking.
    pub fn with_ranking(mut self, ranking: f64) -> Self {
        self.ranking = ranking;
        self
    }

    /// Validates every field, failing on the first violation.
    pub fn validate(&self) -> ValidationResult {
        validate_non_empty("name", &self.name)?;
        validate_non_empty("surname", &self.surname)?;
        validate_email("email", &self.email)?;
        validate_password("password", &self.password)?;
        validate_non_empty("location", &self.location)?;
        validate_finite("ranking", self.ranking)?;
        Ok(())
    }
}

/// Persistable marketplace user.
///
/// The password is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub surname: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub location: String,
    pub ranking: f64,
}

impl User {
    /// Validates `fields` and assigns a fresh identifier.
    pub fn create(fields: NewUser) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4(), fields)
    }

    /// Validates `fields` under a caller-provided identifier.
    ///
    /// Used when rehydrating persisted rows.
    pub fn with_id(id: UserId, fields: NewUser) -> Result<Self, ValidationError> {
        validate_id("id", id)?;
        fields.validate()?;

        Ok(Self {
            id,
            name: fields.name,
            surname: fields.surname,
            email: fields.email,
            password: fields.password,
            location: fields.location,
            ranking: fields.ranking,
        })
    }

    /// Applies every patch slot that passes validation.
    pub fn apply_patch(&mut self, patch: &UserPatch) -> PatchOutcome {
        let mut outcome = PatchOutcome::default();

        merge_field(
            &mut self.name,
            patch.name.as_ref(),
            "name",
            |value| validate_non_empty("name", value),
            &mut outcome,
        );
        merge_field(
            &mut self.surname,
            patch.surname.as_ref(),
            "surname",
            |value| validate_non_empty("surname", value),
            &mut outcome,
        );
        merge_field(
            &mut self.email,
            patch.email.as_ref(),
            "email",
            |value| validate_email("email", value),
            &mut outcome,
        );
        merge_field(
            &mut self.password,
            patch.password.as_ref(),
            "password",
            |value| validate_password("password", value),
            &mut outcome,
        );
        merge_field(
            &mut self.location,
            patch.location.as_ref(),
            "location",
            |value| validate_non_empty("location", value),
            &mut outcome,
        );
        merge_field(
            &mut self.ranking,
            patch.ranking.as_ref(),
            "ranking",
            |value| validate_finite("ranking", *value),
            &mut outcome,
        );

        outcome
    }
}

/// Partial update for a user. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub location: Option<String>,
    pub ranking: Option<f64>,
}

impl UserPatch {
    /// Builds a patch from an untyped field mapping.
    ///
    /// Unknown names, `id`, and values of the wrong kind are dropped.
    pub fn from_fields<K: AsRef<str>>(fields: impl IntoIterator<Item = (K, FieldValue)>) -> Self {
        let mut patch = Self::default();
        for (name, value) in fields {
            match name.as_ref() {
                "name" => patch.name = text_slot("name", &value),
                "surname" => patch.surname = text_slot("surname", &value),
                "email" => patch.email = text_slot("email", &value),
                "password" => patch.password = text_slot("password", &value),
                "location" => patch.location = text_slot("location", &value),
                "ranking" => patch.ranking = float_slot("ranking", &value),
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

//! Field-level validation predicates.
//!
//! # Responsibility
//! - Decide whether one candidate value is acceptable for one entity field.
//! - Produce a field name plus human-readable reason on rejection.
//!
//! # Invariants
//! - Predicates are pure: no I/O, no logging, no mutation.
//! - Construction treats the first failure as fatal; patch merging treats
//!   each failure as a per-field skip.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Symbols accepted (and one of which is required) by the password policy.
pub const PASSWORD_SYMBOLS: &str = "@$!%*?&";
/// Minimum password length in characters.
pub const PASSWORD_MIN_LEN: usize = 8;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+$").expect("valid email regex")
});
static PASSWORD_CHARSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9@$!%*?&]+$").expect("valid password charset regex"));

/// Value kind expected by a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Any text, empty allowed.
    Text,
    /// Text with at least one non-whitespace character.
    NonEmptyText,
    /// Signed 64-bit integer.
    Integer,
    /// Finite floating-point number. Integers are widened.
    Float,
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::NonEmptyText => "non-empty text",
            Self::Integer => "integer",
            Self::Float => "float",
        };
        f.write_str(name)
    }
}

/// Untyped candidate value, as received from loosely typed callers.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl FieldValue {
    fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
        }
    }

    /// Returns the text payload if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Returns the integer payload if this is an integer value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns a float, widening integers.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Integer(value) => Some(*value as f64),
            Self::Text(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text is empty or whitespace-only.
    EmptyText { field: &'static str },
    /// Email does not match `local@domain.tld`.
    InvalidEmail { field: &'static str },
    /// Password does not satisfy the strength policy.
    WeakPassword { field: &'static str },
    /// Value kind does not match the field kind.
    TypeMismatch {
        field: &'static str,
        expected: FieldKind,
        found: &'static str,
    },
    /// Float value is NaN or infinite.
    NonFiniteNumber { field: &'static str },
    /// Identifier is the nil UUID.
    NilId { field: &'static str },
}

impl ValidationError {
    /// Name of the field that failed.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyText { field }
            | Self::InvalidEmail { field }
            | Self::WeakPassword { field }
            | Self::TypeMismatch { field, .. }
            | Self::NonFiniteNumber { field }
            | Self::NilId { field } => field,
        }
    }

    /// Human-readable reason, without the field prefix.
    pub fn reason(&self) -> String {
        match self {
            Self::EmptyText { .. } => "must not be empty".to_string(),
            Self::InvalidEmail { .. } => "must match local@domain.tld".to_string(),
            Self::WeakPassword { .. } => format!(
                "must be at least {PASSWORD_MIN_LEN} characters from [A-Za-z0-9{PASSWORD_SYMBOLS}] \
                 with an uppercase letter, a lowercase letter, a digit and one of {PASSWORD_SYMBOLS}"
            ),
            Self::TypeMismatch {
                expected, found, ..
            } => format!("expected {expected}, got {found}"),
            Self::NonFiniteNumber { .. } => "must be a finite number".to_string(),
            Self::NilId { .. } => "must not be the nil uuid".to_string(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field(), self.reason())
    }
}

impl Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

/// Checks `value` against the email grammar.
pub fn validate_email(field: &'static str, value: &str) -> ValidationResult {
    if EMAIL_RE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail { field })
    }
}

/// Checks `value` against the password strength policy.
pub fn validate_password(field: &'static str, value: &str) -> ValidationResult {
    let strong = value.chars().count() >= PASSWORD_MIN_LEN
        && PASSWORD_CHARSET_RE.is_match(value)
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().any(|c| PASSWORD_SYMBOLS.contains(c));

    if strong {
        Ok(())
    } else {
        Err(ValidationError::WeakPassword { field })
    }
}

/// Checks that required text carries at least one non-whitespace character.
pub fn validate_non_empty(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyText { field })
    } else {
        Ok(())
    }
}

/// Checks that a float can be persisted.
pub fn validate_finite(field: &'static str, value: f64) -> ValidationResult {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFiniteNumber { field })
    }
}

/// Checks that an identifier is not the nil UUID.
pub fn validate_id(field: &'static str, value: Uuid) -> ValidationResult {
    if value.is_nil() {
        Err(ValidationError::NilId { field })
    } else {
        Ok(())
    }
}

/// Checks that an untyped value has the kind a field expects.
pub fn validate_type(field: &'static str, value: &FieldValue, expected: FieldKind) -> ValidationResult {
    let mismatch = || ValidationError::TypeMismatch {
        field,
        expected,
        found: value.kind_name(),
    };

    match expected {
        FieldKind::Text => value.as_text().map(|_| ()).ok_or_else(mismatch),
        FieldKind::NonEmptyText => {
            let text = value.as_text().ok_or_else(mismatch)?;
            validate_non_empty(field, text)
        }
        FieldKind::Integer => value.as_integer().map(|_| ()).ok_or_else(mismatch),
        FieldKind::Float => {
            let number = value.as_float().ok_or_else(mismatch)?;
            validate_finite(field, number)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_grammar_accepts_common_addresses() {
        for email in ["john@x.com", "john.doe+tag@example.co.uk", "a_b-c@d-e.io"] {
            assert!(validate_email("email", email).is_ok(), "{email} should pass");
        }
    }

    #[test]
    fn email_grammar_rejects_malformed_addresses() {
        for email in ["", "john", "john@", "@x.com", "john@x", "jo hn@x.com", "john@@x.com"] {
            assert_eq!(
                validate_email("email", email),
                Err(ValidationError::InvalidEmail { field: "email" }),
                "{email} should fail"
            );
        }
    }

    #[test]
    fn password_policy_requires_every_character_class() {
        assert!(validate_password("password", "S3cure!ab").is_ok());
        assert!(validate_password("password", "S!ecurepa1ssword123").is_ok());

        for weak in [
            "weak",
            "S3cure!",
            "s3cure!ab",
            "S3CURE!AB",
            "Secure!ab",
            "S3cureab1",
            "S3cure!ab#",
            "S3cure ab!",
        ] {
            assert!(
                validate_password("password", weak).is_err(),
                "{weak} should fail"
            );
        }
    }

    #[test]
    fn non_empty_rejects_whitespace_only() {
        assert!(validate_non_empty("name", "John").is_ok());
        assert_eq!(
            validate_non_empty("name", "   "),
            Err(ValidationError::EmptyText { field: "name" })
        );
    }

    #[test]
    fn validate_type_checks_kind_and_widens_integers_to_float() {
        assert!(validate_type("price", &FieldValue::Integer(10), FieldKind::Integer).is_ok());
        assert!(validate_type("ranking", &FieldValue::Integer(4), FieldKind::Float).is_ok());
        assert!(validate_type("description", &FieldValue::from(""), FieldKind::Text).is_ok());

        let err = validate_type("price", &FieldValue::from("10"), FieldKind::Integer).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TypeMismatch {
                field: "price",
                expected: FieldKind::Integer,
                found: "text",
            }
        );
        assert_eq!(err.to_string(), "price: expected integer, got text");

        assert!(validate_type("name", &FieldValue::from(" "), FieldKind::NonEmptyText).is_err());
        assert!(validate_type("ranking", &FieldValue::Float(f64::NAN), FieldKind::Float).is_err());
    }

    #[test]
    fn nil_id_is_rejected() {
        assert_eq!(
            validate_id("user_id", Uuid::nil()),
            Err(ValidationError::NilId { field: "user_id" })
        );
        assert!(validate_id("user_id", Uuid::new_v4()).is_ok());
    }
}

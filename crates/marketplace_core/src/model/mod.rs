//! Marketplace domain model.
//!
//! # Responsibility
//! - Define the validated `User` and `Product` entities and their inputs.
//! - Define explicit patch shapes with merge-on-valid-else-keep semantics.
//!
//! # Invariants
//! - Entities only exist in a state that passes field validation.
//! - Identifiers are assigned once at construction and never change.
//! - `Product.user_id` references `User.id`; existence is enforced by storage.

pub mod patch;
pub mod product;
pub mod user;

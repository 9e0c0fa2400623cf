//! Marketplace use-case service.
//!
//! # Responsibility
//! - Provide the user/product entry points used by application code.
//! - Turn absent rows into `RepoError::NotFound` so callers can branch on
//!   success, not-found, validation failure and storage failure.
//!
//! # Invariants
//! - Service APIs never bypass repository validation or transactions.
//! - Untyped field mappings go through the same merge-on-valid-else-keep
//!   policy as typed patches.

use crate::model::product::{NewProduct, Product, ProductId, ProductPatch};
use crate::model::user::{NewUser, User, UserId, UserPatch};
use crate::repo::product_repo::ProductRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::{EntityKind, RepoError, RepoResult};
use crate::validate::FieldValue;

/// Use-case service over user and product repositories.
pub struct MarketplaceService<U: UserRepository, P: ProductRepository> {
    users: U,
    products: P,
}

impl<U: UserRepository, P: ProductRepository> MarketplaceService<U, P> {
    pub fn new(users: U, products: P) -> Self {
        Self { users, products }
    }

    /// Creates a user.
    ///
    /// # Contract
    /// - Invalid fields return `RepoError::Validation` and write nothing.
    /// - A duplicate email returns `RepoError::Storage` with a constraint
    ///   violation.
    pub fn create_user(&self, fields: NewUser) -> RepoResult<User> {
        self.users.create_user(fields)
    }

    /// Creates a product owned by `fields.user_id`.
    ///
    /// An unknown owner returns `RepoError::Storage` with a constraint
    /// violation.
    pub fn create_product(&self, fields: NewProduct) -> RepoResult<Product> {
        self.products.create_product(fields)
    }

    pub fn get_user_by_id(&self, id: UserId) -> RepoResult<User> {
        self.users
            .get_user(id)?
            .ok_or_else(|| RepoError::not_found(EntityKind::User, id))
    }

    pub fn get_user_by_email(&self, email: &str) -> RepoResult<User> {
        self.users
            .get_user_by_email(email)?
            .ok_or_else(|| RepoError::not_found(EntityKind::User, email))
    }

    pub fn get_product_by_id(&self, id: ProductId) -> RepoResult<Product> {
        self.products
            .get_product(id)?
            .ok_or_else(|| RepoError::not_found(EntityKind::Product, id))
    }

    /// Lists products owned by `user_id`. An unknown user yields an empty list.
    pub fn get_products_by_user_id(&self, user_id: UserId) -> RepoResult<Vec<Product>> {
        self.products.list_products_by_user(user_id)
    }

    /// Applies `patch` with merge-on-valid-else-keep semantics.
    ///
    /// Invalid patch values are dropped silently; the stored value stays.
    pub fn update_user(&self, id: UserId, patch: &UserPatch) -> RepoResult<User> {
        self.users.update_user(id, patch)
    }

    pub fn update_product(&self, id: ProductId, patch: &ProductPatch) -> RepoResult<Product> {
        self.products.update_product(id, patch)
    }

    /// Updates a user from an untyped `(field, value)` mapping.
    pub fn update_user_fields<K: AsRef<str>>(
        &self,
        id: UserId,
        fields: impl IntoIterator<Item = (K, FieldValue)>,
    ) -> RepoResult<User> {
        self.users.update_user(id, &UserPatch::from_fields(fields))
    }

    /// Updates a product from an untyped `(field, value)` mapping.
    pub fn update_product_fields<K: AsRef<str>>(
        &self,
        id: ProductId,
        fields: impl IntoIterator<Item = (K, FieldValue)>,
    ) -> RepoResult<Product> {
        self.products
            .update_product(id, &ProductPatch::from_fields(fields))
    }
}

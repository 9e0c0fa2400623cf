//! Core data layer for the marketplace.
//! This crate is the single source of truth for user/product invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validate;

pub use config::{ConfigError, LogConfig, StoreConfig, StoreLocation};
pub use db::{ConnectionManager, DbError, DbResult, Session};
pub use logging::{default_log_level, init_logging, init_logging_from, logging_status, LoggingError};
pub use model::patch::PatchOutcome;
pub use model::product::{NewProduct, Product, ProductId, ProductPatch};
pub use model::user::{NewUser, User, UserId, UserPatch, DEFAULT_USER_RANKING};
pub use repo::product_repo::{ProductRepository, SqliteProductRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{EntityKind, RepoError, RepoResult};
pub use service::marketplace_service::MarketplaceService;
pub use validate::{
    validate_email, validate_password, validate_type, FieldKind, FieldValue, ValidationError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

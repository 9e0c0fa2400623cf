//! Core use-case services.
//!
//! # Responsibility
//! - Expose the marketplace call contract to application code.
//! - Keep callers decoupled from storage details.

pub mod marketplace_service;

//! Shared types, errors, and configuration for Costree.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for records and report trees
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, CacheConfig, LabelConfig, SelectionConfig, UnresolvedCodePolicy};
pub use error::{AppError, AppResult};

//! Core business logic for Costree.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Records and objective configuration are supplied by the caller; the crate
//! classifies them and hands the resulting tree back for rendering.
//!
//! # Modules
//!
//! - `reporting` - Objective trees, record selection, other/duplicate buckets
//!   and aggregate caching

pub mod reporting;

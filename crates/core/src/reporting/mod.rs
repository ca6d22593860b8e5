//! Objective-tree report classification.
//!
//! This module splits a flat list of booking records into a tree of report
//! objectives:
//! - Wildcard pattern translation for cost codes
//! - Exclude-then-include filter rules over two code dimensions
//! - Lazily expanded report nodes with "other" and "duplicates" buckets
//! - Memoized aggregate views per node

pub mod aggregate;
pub mod error;
pub mod objective;
pub mod pattern;
pub mod period;
pub mod record;
pub mod rule;
pub mod selector;
pub mod tree;

#[cfg(test)]
mod tests;
#[cfg(test)]
mod tree_props;

pub use aggregate::{AggregateCache, Aggregator};
pub use error::ReportError;
pub use objective::Objective;
pub use pattern::CodePattern;
pub use period::{ReportPeriod, YearMonth};
pub use record::{BookingRecord, ClassifiedRecord, CodeDimension};
pub use rule::{DimensionRule, FilterRule};
pub use selector::RecordSelector;
pub use tree::{Localizer, NodeId, ReportNode, ReportTree};

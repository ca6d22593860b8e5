//! Report objectives (the configured category tree).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::rule::FilterRule;

/// A named report category with its filter rule and child categories.
///
/// Objectives are static configuration: they are built (or deserialized)
/// once and shared read-only by every report node that refers to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    /// Identifier, unique within one objective tree.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Filter rule deciding which records belong here.
    #[serde(default)]
    pub filter: FilterRule,
    /// Do not collect records matched by none of the children.
    #[serde(default)]
    pub suppress_other: bool,
    /// Do not collect records matched by several children.
    #[serde(default)]
    pub suppress_duplicates: bool,
    /// Child objectives in display order.
    #[serde(default)]
    pub children: Vec<Arc<Objective>>,
}

impl Objective {
    /// Creates a leaf objective with an empty filter rule.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            filter: FilterRule::default(),
            suppress_other: false,
            suppress_duplicates: false,
            children: Vec::new(),
        }
    }

    /// Sets the filter rule.
    #[must_use]
    pub fn with_filter(mut self, filter: FilterRule) -> Self {
        self.filter = filter;
        self
    }

    /// Appends a child objective.
    #[must_use]
    pub fn with_child(mut self, child: Objective) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    /// Sets whether the "other" bucket is suppressed.
    #[must_use]
    pub const fn suppress_other(mut self, suppress: bool) -> Self {
        self.suppress_other = suppress;
        self
    }

    /// Sets whether the "duplicates" bucket is suppressed.
    #[must_use]
    pub const fn suppress_duplicates(mut self, suppress: bool) -> Self {
        self.suppress_duplicates = suppress;
        self
    }

    /// Returns true if child objectives are configured.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Returns true if at least one of the other/duplicates buckets is collected.
    #[must_use]
    pub const fn collects_buckets(&self) -> bool {
        !self.suppress_other || !self.suppress_duplicates
    }

    /// Builds the objective of a synthetic bucket child ("other", "duplicates").
    ///
    /// Its records are assigned directly, so the filter rule stays empty.
    #[must_use]
    pub(crate) fn bucket(&self, label: &str) -> Self {
        Self::new(
            format!("{} - {label}", self.id),
            format!("{} - {label}", self.title),
        )
    }
}

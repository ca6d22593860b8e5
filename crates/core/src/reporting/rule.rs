//! Filter rules attached to report objectives.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::pattern::CodePattern;
use super::record::CodeDimension;

/// Exclude and include pattern lists for one code dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionRule {
    /// Blacklist: a code matching any of these rejects the record.
    pub exclude: Vec<String>,
    /// Whitelist: an empty list lets every non-excluded code pass.
    pub include: Vec<String>,
}

/// Filter rule of an objective over both code dimensions.
///
/// Patterns are translated once, on first use, and reused for every record
/// and every selection that references this rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRule {
    code1: DimensionRule,
    code2: DimensionRule,
    #[serde(skip)]
    compiled: OnceLock<CompiledRule>,
}

impl FilterRule {
    /// Creates an empty rule (matches every record with resolvable codes).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a rule from both dimension rules.
    #[must_use]
    pub fn from_dimensions(code1: DimensionRule, code2: DimensionRule) -> Self {
        Self {
            code1,
            code2,
            compiled: OnceLock::new(),
        }
    }

    /// Adds an include pattern.
    #[must_use]
    pub fn include(mut self, dimension: CodeDimension, pattern: impl Into<String>) -> Self {
        self.dimension_mut(dimension).include.push(pattern.into());
        self
    }

    /// Adds an exclude pattern.
    #[must_use]
    pub fn exclude(mut self, dimension: CodeDimension, pattern: impl Into<String>) -> Self {
        self.dimension_mut(dimension).exclude.push(pattern.into());
        self
    }

    /// Returns the pattern lists of one dimension.
    #[must_use]
    pub fn dimension(&self, dimension: CodeDimension) -> &DimensionRule {
        match dimension {
            CodeDimension::Code1 => &self.code1,
            CodeDimension::Code2 => &self.code2,
        }
    }

    /// Returns true if no pattern is configured at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code1 == DimensionRule::default() && self.code2 == DimensionRule::default()
    }

    /// Translated patterns, built on first access.
    pub(crate) fn compiled(&self) -> &CompiledRule {
        self.compiled.get_or_init(|| CompiledRule {
            code1: CompiledDimension::new(&self.code1),
            code2: CompiledDimension::new(&self.code2),
        })
    }

    fn dimension_mut(&mut self, dimension: CodeDimension) -> &mut DimensionRule {
        // A clone may carry translated patterns of the rule it came from.
        self.compiled = OnceLock::new();
        match dimension {
            CodeDimension::Code1 => &mut self.code1,
            CodeDimension::Code2 => &mut self.code2,
        }
    }
}

impl PartialEq for FilterRule {
    fn eq(&self, other: &Self) -> bool {
        self.code1 == other.code1 && self.code2 == other.code2
    }
}

impl Eq for FilterRule {}

/// Translated form of a [`FilterRule`].
#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    pub(crate) code1: CompiledDimension,
    pub(crate) code2: CompiledDimension,
}

impl CompiledRule {
    pub(crate) fn dimension(&self, dimension: CodeDimension) -> &CompiledDimension {
        match dimension {
            CodeDimension::Code1 => &self.code1,
            CodeDimension::Code2 => &self.code2,
        }
    }
}

/// Translated pattern lists of one dimension.
#[derive(Debug, Clone)]
pub(crate) struct CompiledDimension {
    exclude: Vec<CodePattern>,
    include: Vec<CodePattern>,
}

impl CompiledDimension {
    fn new(rule: &DimensionRule) -> Self {
        Self {
            exclude: rule.exclude.iter().map(|p| CodePattern::parse(p)).collect(),
            include: rule.include.iter().map(|p| CodePattern::parse(p)).collect(),
        }
    }

    /// True if any exclude pattern matches. An empty blacklist excludes nothing.
    pub(crate) fn excludes(&self, code: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(code))
    }

    /// True if any include pattern matches. An empty whitelist matches everything.
    pub(crate) fn includes(&self, code: &str) -> bool {
        self.include.is_empty() || self.include.iter().any(|p| p.matches(code))
    }
}

//! Record selection against filter rules.

use costree_shared::UnresolvedCodePolicy;
use tracing::warn;

use super::error::ReportError;
use super::record::{ClassifiedRecord, CodeDimension};
use super::rule::FilterRule;

const DIMENSIONS: [CodeDimension; 2] = [CodeDimension::Code1, CodeDimension::Code2];

/// Applies filter rules to records.
///
/// Evaluation order is fixed: the blacklists of both dimensions first, then
/// the whitelists. A record passes only if both whitelists accept it.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordSelector {
    policy: UnresolvedCodePolicy,
}

impl RecordSelector {
    /// Creates a selector with the given unresolved-code policy.
    #[must_use]
    pub const fn new(policy: UnresolvedCodePolicy) -> Self {
        Self { policy }
    }

    /// Returns the unresolved-code policy.
    #[must_use]
    pub const fn policy(&self) -> UnresolvedCodePolicy {
        self.policy
    }

    /// Decides whether a record belongs to the rule.
    ///
    /// A record with an unresolvable code never matches under
    /// [`UnresolvedCodePolicy::Exclude`] and yields
    /// [`ReportError::UnresolvedCode`] under [`UnresolvedCodePolicy::Reject`].
    pub fn matches<R: ClassifiedRecord>(
        &self,
        rule: &FilterRule,
        record: &R,
    ) -> Result<bool, ReportError> {
        let (Some(code1), Some(code2)) = (record.code1(), record.code2()) else {
            return match self.policy {
                UnresolvedCodePolicy::Exclude => Ok(false),
                UnresolvedCodePolicy::Reject => Err(unresolved(record)),
            };
        };
        Ok(Self::matches_codes(rule, code1, code2))
    }

    /// Decides whether a pair of resolved codes belongs to the rule.
    #[must_use]
    pub fn matches_codes(rule: &FilterRule, code1: &str, code2: &str) -> bool {
        let compiled = rule.compiled();

        // 1st of all the blacklists
        if compiled.code1.excludes(code1) || compiled.code2.excludes(code2) {
            return false;
        }

        // 2nd the whitelists
        let included1 = compiled.code1.includes(code1);
        let included2 = compiled.code2.includes(code2);
        included1 && included2
    }

    /// Returns the records matching the rule, in input order.
    pub fn select<R: ClassifiedRecord>(
        &self,
        rule: &FilterRule,
        records: &[R],
    ) -> Result<Vec<R>, ReportError> {
        let mut selected = Vec::new();
        let mut unresolved_count = 0usize;

        for record in records {
            let (Some(code1), Some(code2)) = (record.code1(), record.code2()) else {
                if self.policy == UnresolvedCodePolicy::Reject {
                    return Err(unresolved(record));
                }
                unresolved_count += 1;
                continue;
            };
            if Self::matches_codes(rule, code1, code2) {
                selected.push(record.clone());
            }
        }

        if unresolved_count > 0 {
            warn!(
                unresolved_count,
                "Records without resolvable codes excluded from selection"
            );
        }

        Ok(selected)
    }
}

fn unresolved<R: ClassifiedRecord>(record: &R) -> ReportError {
    let dimension = DIMENSIONS
        .into_iter()
        .find(|d| record.code(*d).is_none())
        .unwrap_or(CodeDimension::Code1);
    ReportError::UnresolvedCode {
        dimension,
        record: record.describe(),
    }
}

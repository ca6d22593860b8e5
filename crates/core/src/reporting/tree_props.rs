//! Property-based tests for report trees.
//!
//! - Partition completeness of other/duplicates buckets
//! - Idempotent reselection
//! - Wildcard translation against a reference matcher

use std::sync::Arc;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::objective::Objective;
use super::pattern::CodePattern;
use super::record::{BookingRecord, CodeDimension};
use super::rule::FilterRule;
use super::tree::ReportTree;

/// Strategy to generate cost codes like "5.10.3".
fn cost_code() -> impl Strategy<Value = String> {
    (1u8..4, 0u8..3, 0u8..3).prop_map(|(a, b, c)| format!("{a}.{b}{c}.{c}"))
}

/// Strategy to generate include patterns over those codes.
fn include_pattern() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u8..4).prop_map(|a| format!("{a}.*")),
        (0u8..3).prop_map(|b| format!("*.{b}*")),
        (1u8..4, 0u8..3).prop_map(|(a, b)| format!("{a}.{b}*")),
        Just("*".to_string()),
    ]
}

fn records(codes: &[String]) -> Vec<BookingRecord> {
    codes
        .iter()
        .map(|code| {
            BookingRecord::new(
                code.as_str(),
                "4000",
                Decimal::ONE,
                NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            )
        })
        .collect()
}

fn root_with_children(patterns: &[String]) -> Objective {
    patterns
        .iter()
        .enumerate()
        .fold(Objective::new("root", "Root"), |root, (i, pattern)| {
            root.with_child(
                Objective::new(format!("c{i}"), format!("Child {i}"))
                    .with_filter(FilterRule::new().include(CodeDimension::Code1, pattern.clone())),
            )
        })
}

fn localize(key: &str) -> String {
    key.to_string()
}

/// Reference glob matcher: `*` is any sequence, everything else literal.
fn glob_matches(pattern: &[u8], code: &[u8]) -> bool {
    match pattern.split_first() {
        None => code.is_empty(),
        Some((b'*', rest)) => (0..=code.len()).any(|i| glob_matches(rest, &code[i..])),
        Some((c, rest)) => code.first() == Some(c) && glob_matches(rest, &code[1..]),
    }
}

proptest! {
    /// Every matched record is in exactly one child, in "other", or in "duplicates".
    #[test]
    fn test_partition_completeness(
        codes in prop::collection::vec(cost_code(), 0..40),
        patterns in prop::collection::vec(include_pattern(), 1..5),
    ) {
        let input = records(&codes);
        let mut tree = ReportTree::new(Arc::new(root_with_children(&patterns)));
        let root = tree.root();
        tree.select(root, &input).unwrap();
        let children = tree.expand(root, &localize).unwrap().to_vec();
        let configured = &children[..patterns.len()];

        let node = tree.node(root).unwrap();
        let other = node.other().unwrap_or_default();
        let duplicates = node.duplicates().unwrap_or_default();
        let mut single = 0usize;

        for record in node.records().unwrap() {
            let n = configured
                .iter()
                .filter(|child| tree.node(**child).unwrap().contains(record))
                .count();
            prop_assert_eq!(other.contains(record), n == 0);
            prop_assert_eq!(duplicates.contains(record), n > 1);
            if n == 1 {
                single += 1;
            }
        }

        prop_assert_eq!(
            node.records().unwrap().len(),
            single + other.len() + duplicates.len()
        );

        let buckets = usize::from(!other.is_empty()) + usize::from(!duplicates.is_empty());
        prop_assert_eq!(children.len(), patterns.len() + buckets);
    }

    /// Selecting twice with the same input yields identical records and fresh derived state.
    #[test]
    fn test_idempotent_reselect(
        codes in prop::collection::vec(cost_code(), 0..30),
        patterns in prop::collection::vec(include_pattern(), 1..4),
    ) {
        let input = records(&codes);
        let mut tree = ReportTree::new(Arc::new(root_with_children(&patterns)));
        let root = tree.root();

        tree.select(root, &input).unwrap();
        let first = tree.node(root).unwrap().records().unwrap().to_vec();
        tree.expand(root, &localize).unwrap();

        tree.select(root, &input).unwrap();
        let node = tree.node(root).unwrap();
        prop_assert_eq!(node.records().unwrap(), &first[..]);
        prop_assert!(node.children().is_none());
        prop_assert!(node.other().is_none());
        prop_assert!(node.duplicates().is_none());
    }

    /// Wildcard patterns match exactly what a plain glob matcher accepts.
    #[test]
    fn test_wildcard_matches_reference(
        pattern in "[0-9.*]{0,8}",
        code in "[0-9.]{0,8}",
    ) {
        prop_assume!(!pattern.starts_with('\''));
        let translated = CodePattern::parse(&pattern);
        prop_assert_eq!(
            translated.matches(&code),
            glob_matches(pattern.as_bytes(), code.as_bytes())
        );
    }

    /// Quoted patterns match only their literal remainder.
    #[test]
    fn test_literal_matches_only_itself(
        literal in "[0-9.*]{0,8}",
        code in "[0-9.*]{0,8}",
    ) {
        let translated = CodePattern::parse(&format!("'{literal}"));
        prop_assert_eq!(translated.matches(&code), code == literal);
        prop_assert!(translated.matches(&literal));
    }
}

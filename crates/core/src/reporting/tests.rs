//! Scenario tests for report trees.

use std::sync::Arc;

use chrono::NaiveDate;
use costree_shared::LabelConfig;
use rust_decimal_macros::dec;

use super::objective::Objective;
use super::period::ReportPeriod;
use super::record::{BookingRecord, CodeDimension};
use super::rule::FilterRule;
use super::tree::{NodeId, ReportTree};

fn record(kost1: &str) -> BookingRecord {
    BookingRecord::new(
        kost1,
        "4000",
        dec!(100),
        NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
    )
}

fn objective(id: &str, include1: &str) -> Objective {
    Objective::new(id, format!("Title {id}"))
        .with_filter(FilterRule::new().include(CodeDimension::Code1, include1))
}

fn localize(key: &str) -> String {
    match key {
        "reporting.other" => "Sonstiges".to_string(),
        "reporting.duplicates" => "Doppelte".to_string(),
        other => other.to_string(),
    }
}

fn child_ids(tree: &ReportTree<BookingRecord>, children: &[NodeId]) -> Vec<String> {
    children
        .iter()
        .map(|c| tree.node(*c).unwrap().id().to_string())
        .collect()
}

#[test]
fn test_end_to_end_partition() {
    let a = record("5.100.1");
    let b = record("5.200.1");
    let c = record("9.999.9");

    let root = objective("root", "5.*")
        .with_child(objective("c1", "5.100.*"))
        .with_child(objective("c2", "5.200.*"));
    let mut tree = ReportTree::new(Arc::new(root));
    let root = tree.root();

    tree.select(root, &[a.clone(), b.clone(), c.clone()]).unwrap();
    let node = tree.node(root).unwrap();
    assert_eq!(node.records(), Some(&[a.clone(), b.clone()][..]));
    assert!(!node.contains(&c));

    let children = tree.expand(root, &localize).unwrap().to_vec();
    assert_eq!(child_ids(&tree, &children), ["c1", "c2"]);
    assert_eq!(tree.node(children[0]).unwrap().records(), Some(&[a][..]));
    assert_eq!(tree.node(children[1]).unwrap().records(), Some(&[b][..]));

    let node = tree.node(root).unwrap();
    assert!(node.other().is_none());
    assert!(node.duplicates().is_none());
}

#[test]
fn test_duplicates_bucket() {
    let a = record("5.100.1");
    let b = record("5.200.1");

    let root = objective("root", "5.*")
        .with_child(objective("wide", "5.*"))
        .with_child(objective("narrow", "5.100.*"));
    let mut tree = ReportTree::new(Arc::new(root));
    let root = tree.root();
    tree.select(root, &[a.clone(), b.clone()]).unwrap();

    let children = tree.expand(root, &localize).unwrap().to_vec();
    assert_eq!(
        child_ids(&tree, &children),
        ["wide", "narrow", "root - Doppelte"]
    );

    let node = tree.node(root).unwrap();
    assert_eq!(node.duplicates(), Some(&[a.clone()][..]));
    assert!(node.other().is_none());

    // Children keep their own subsets.
    assert_eq!(
        tree.node(children[0]).unwrap().records(),
        Some(&[a.clone(), b][..])
    );
    assert_eq!(tree.node(children[1]).unwrap().records(), Some(&[a.clone()][..]));

    let bucket = tree.node(children[2]).unwrap();
    assert_eq!(bucket.title(), "Title root - Doppelte");
    assert_eq!(bucket.records(), Some(&[a][..]));
    assert_eq!(bucket.parent(), Some(root));
    assert!(!bucket.has_children());
}

#[test]
fn test_other_bucket_comes_before_duplicates() {
    let a = record("1.1");
    let b = record("2.1");

    let root = Objective::new("root", "Root")
        .with_child(objective("x", "1*"))
        .with_child(objective("y", "1.*"));
    let mut tree = ReportTree::new(Arc::new(root));
    let root = tree.root();
    tree.select(root, &[a.clone(), b.clone()]).unwrap();

    let children = tree.expand(root, &localize).unwrap().to_vec();
    assert_eq!(
        child_ids(&tree, &children),
        ["x", "y", "root - Sonstiges", "root - Doppelte"]
    );
    assert_eq!(tree.node(root).unwrap().other(), Some(&[b][..]));
    assert_eq!(tree.node(root).unwrap().duplicates(), Some(&[a][..]));
}

#[test]
fn test_suppress_other() {
    let root = Objective::new("root", "Root")
        .with_child(objective("x", "1*"))
        .with_child(objective("y", "1*"))
        .suppress_other(true);
    let mut tree = ReportTree::new(Arc::new(root));
    let root = tree.root();
    tree.select(root, &[record("1"), record("2")]).unwrap();

    let children = tree.expand(root, &localize).unwrap().to_vec();
    assert_eq!(child_ids(&tree, &children), ["x", "y", "root - Doppelte"]);
    assert!(tree.node(root).unwrap().other().is_none());
}

#[test]
fn test_suppress_duplicates() {
    let root = Objective::new("root", "Root")
        .with_child(objective("x", "1*"))
        .with_child(objective("y", "1*"))
        .suppress_duplicates(true);
    let mut tree = ReportTree::new(Arc::new(root));
    let root = tree.root();
    tree.select(root, &[record("1"), record("2")]).unwrap();

    let children = tree.expand(root, &localize).unwrap().to_vec();
    assert_eq!(child_ids(&tree, &children), ["x", "y", "root - Sonstiges"]);
    assert!(tree.node(root).unwrap().duplicates().is_none());
}

#[test]
fn test_suppress_both() {
    let root = Objective::new("root", "Root")
        .with_child(objective("x", "1*"))
        .with_child(objective("y", "1*"))
        .suppress_other(true)
        .suppress_duplicates(true);
    let mut tree = ReportTree::new(Arc::new(root));
    let root = tree.root();
    tree.select(root, &[record("1"), record("2")]).unwrap();

    let children = tree.expand(root, &localize).unwrap().to_vec();
    assert_eq!(child_ids(&tree, &children), ["x", "y"]);
    let node = tree.node(root).unwrap();
    assert!(node.other().is_none());
    assert!(node.duplicates().is_none());
}

#[test]
fn test_custom_label_keys() {
    let root = Objective::new("root", "Root").with_child(objective("x", "1*"));
    let mut tree = ReportTree::new(Arc::new(root)).with_labels(LabelConfig {
        other_key: "custom.rest".to_string(),
        duplicates_key: "custom.twice".to_string(),
    });
    let root = tree.root();
    tree.select(root, &[record("2")]).unwrap();

    let children = tree.expand(root, &localize).unwrap().to_vec();
    assert_eq!(child_ids(&tree, &children), ["x", "root - custom.rest"]);
}

#[test]
fn test_nested_expansion_uses_parent_subset() {
    let root = objective("root", "5.*").with_child(
        objective("sales", "5.1*")
            .with_child(objective("domestic", "5.10.*"))
            .with_child(objective("export", "5.11.*")),
    );
    let records = [
        record("5.10.1"),
        record("5.11.1"),
        record("5.12.1"),
        record("5.2.1"),
        record("6.10.1"),
    ];
    let mut tree = ReportTree::new(Arc::new(root));
    let root = tree.root();
    tree.select(root, &records).unwrap();
    tree.expand_all(root, &localize).unwrap();

    let sales = tree.find_by_id(root, "sales", &localize).unwrap().unwrap();
    let children = tree.node(sales).unwrap().children().unwrap().to_vec();
    assert_eq!(
        child_ids(&tree, &children),
        ["domestic", "export", "sales - Sonstiges"]
    );
    assert_eq!(
        tree.node(sales).unwrap().other(),
        Some(&[records[2].clone()][..])
    );
    assert_eq!(
        tree.node(root).unwrap().other(),
        Some(&[records[3].clone()][..])
    );
}

#[test]
fn test_find_by_id_prefers_shallow_match() {
    // "dup" is both a grandchild under "a" and a direct child of the root.
    let root = Objective::new("root", "Root")
        .with_child(Objective::new("a", "A").with_child(Objective::new("dup", "Deep")))
        .with_child(Objective::new("dup", "Shallow"))
        .suppress_other(true)
        .suppress_duplicates(true);
    let mut tree = ReportTree::new(Arc::new(root));
    let root = tree.root();
    tree.select(root, &[record("1")]).unwrap();

    let found = tree.find_by_id(root, "dup", &localize).unwrap().unwrap();
    assert_eq!(tree.node(found).unwrap().title(), "Shallow");

    // The deep node is still reachable from its own parent.
    let a = tree.find_by_id(root, "a", &localize).unwrap().unwrap();
    let deep = tree.find_by_id(a, "dup", &localize).unwrap().unwrap();
    assert_eq!(tree.node(deep).unwrap().title(), "Deep");
}

#[test]
fn test_find_by_id_not_found() {
    let root = Objective::new("root", "Root").with_child(Objective::new("a", "A"));
    let mut tree = ReportTree::new(Arc::new(root));
    let root = tree.root();
    tree.select(root, &[record("1")]).unwrap();

    assert_eq!(tree.find_by_id(root, "missing", &localize).unwrap(), None);
    assert_eq!(tree.find_by_id(root, "root", &localize).unwrap(), Some(root));
}

#[test]
fn test_find_by_id_finds_bucket_nodes() {
    let root = Objective::new("root", "Root").with_child(objective("a", "1*"));
    let mut tree = ReportTree::new(Arc::new(root));
    let root = tree.root();
    tree.select(root, &[record("2")]).unwrap();

    let bucket = tree
        .find_by_id(root, "root - Sonstiges", &localize)
        .unwrap()
        .unwrap();
    assert_eq!(tree.path(bucket).unwrap(), Some(vec![root]));
}

#[test]
fn test_find_by_id_on_leaf_does_not_expand() {
    let mut tree = ReportTree::new(Arc::new(objective("leaf", "*")));
    let root = tree.root();
    tree.select(root, &[record("1")]).unwrap();

    assert_eq!(tree.find_by_id(root, "x", &localize).unwrap(), None);
    assert!(tree.node(root).unwrap().children().is_none());
}

#[test]
fn test_period_is_shared() {
    let period = ReportPeriod::month(2026, 1).unwrap();
    let mut tree = ReportTree::new(Arc::new(objective("root", "*"))).with_period(period);
    let root = tree.root();
    tree.select(root, &[record("1")]).unwrap();

    assert_eq!(tree.period().map(|p| p.label()), Some("01/2026".to_string()));
    let first = tree.node(root).unwrap().records().unwrap()[0].booked_on;
    assert!(period.contains_date(first));
}

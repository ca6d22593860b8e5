//! Costree report preview.
//!
//! Loads an objective tree and a booking list from JSON files, classifies
//! the bookings and prints the resulting report tree with totals.
//!
//! Usage: cargo run --bin costree-preview -- objectives.json records.json

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use costree_core::reporting::{
    AggregateCache, Aggregator, BookingRecord, NodeId, Objective, RecordSelector, ReportTree,
};
use costree_shared::AppConfig;

/// Record count and amount total of one node.
#[derive(Debug)]
struct Totals {
    count: usize,
    amount: Decimal,
}

/// Sums booking amounts.
struct AmountAggregator;

impl Aggregator<BookingRecord> for AmountAggregator {
    type View = Totals;
    type Table = Vec<(String, Arc<Totals>)>;

    fn aggregate(&self, records: &[BookingRecord]) -> Totals {
        Totals {
            count: records.len(),
            amount: records.iter().map(|r| r.amount).sum(),
        }
    }

    fn build_table(&self, entries: Vec<(String, Arc<Totals>)>) -> Self::Table {
        entries
    }
}

type PreviewCache = AggregateCache<BookingRecord, AmountAggregator>;

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "costree=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(objectives_path), Some(records_path)) = (args.next(), args.next()) else {
        bail!("usage: costree-preview <objectives.json> <records.json>");
    };

    let config = AppConfig::load()?;
    let objective: Objective = read_json(Path::new(&objectives_path))?;
    let records: Vec<BookingRecord> = read_json(Path::new(&records_path))?;

    let labels = config.labels.clone();
    let localizer = move |key: &str| {
        if key == labels.other_key {
            "Other".to_string()
        } else if key == labels.duplicates_key {
            "Duplicates".to_string()
        } else {
            key.to_string()
        }
    };

    let mut tree = ReportTree::new(Arc::new(objective))
        .with_selector(RecordSelector::new(config.selection.unresolved_codes))
        .with_labels(config.labels.clone());
    let root = tree.root();

    let matched = tree.select(root, &records)?;
    info!(input = records.len(), matched, "Records selected");
    tree.expand_all(root, &localizer)?;

    let cache = AggregateCache::with_config(AmountAggregator, &config.cache);
    print_node(&tree, &cache, root, 0)?;

    if let Some(table) = cache.child_table(&mut tree, root, true, &localizer)? {
        println!();
        for (id, totals) in table.iter() {
            println!("{id:<40} {:>6} {:>14}", totals.count, totals.amount);
        }
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn print_node(
    tree: &ReportTree<BookingRecord>,
    cache: &PreviewCache,
    id: NodeId,
    depth: usize,
) -> anyhow::Result<()> {
    let node = tree.node(id)?;
    let totals = cache.aggregate(tree, id)?;
    println!(
        "{:indent$}{} [{}]: {} records, total {}",
        "",
        node.title(),
        node.id(),
        totals.count,
        totals.amount,
        indent = depth * 2
    );
    for child in node.children().unwrap_or_default() {
        print_node(tree, cache, *child, depth + 1)?;
    }
    Ok(())
}

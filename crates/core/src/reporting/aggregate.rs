//! Aggregate view caching using Moka.
//!
//! The reporting layer supplies an [`Aggregator`] that turns the records of
//! a node into a view (e.g. an income statement) and a list of views into a
//! table. Views and tables are memoized per node; the cache key carries the
//! node's generation, so a reselection invalidates the memo without any
//! explicit call.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use costree_shared::CacheConfig;
use costree_shared::types::ReportTreeId;
use moka::sync::Cache;

use super::error::ReportError;
use super::record::ClassifiedRecord;
use super::tree::{Localizer, NodeId, ReportTree};

/// Builds aggregate views from record subsets. Opaque to the tree.
pub trait Aggregator<R>: Send + Sync {
    /// Aggregate of one record subset.
    type View: Send + Sync + 'static;
    /// Table of several views keyed by objective id.
    type Table: Send + Sync + 'static;

    /// Aggregates the records of one node.
    fn aggregate(&self, records: &[R]) -> Self::View;

    /// Builds a table from views in display order.
    fn build_table(&self, entries: Vec<(String, Arc<Self::View>)>) -> Self::Table;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ViewKey {
    tree: ReportTreeId,
    node: NodeId,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TableKey {
    view: ViewKey,
    include_self: bool,
    children: Vec<ViewKey>,
}

/// Memoizes aggregate views and child tables per report node.
///
/// Thread-safe; one cache can serve several trees.
pub struct AggregateCache<R, A: Aggregator<R>> {
    aggregator: A,
    views: Cache<ViewKey, Arc<A::View>>,
    tables: Cache<TableKey, Arc<A::Table>>,
    _records: PhantomData<fn(&R)>,
}

impl<R, A> AggregateCache<R, A>
where
    R: ClassifiedRecord,
    A: Aggregator<R>,
{
    /// Creates a cache with default settings.
    #[must_use]
    pub fn new(aggregator: A) -> Self {
        Self::with_config(aggregator, &CacheConfig::default())
    }

    /// Creates a cache with custom capacity and time-to-live.
    #[must_use]
    pub fn with_config(aggregator: A, config: &CacheConfig) -> Self {
        let ttl = Duration::from_secs(config.ttl_secs);
        Self {
            aggregator,
            views: Cache::builder()
                .max_capacity(config.max_capacity)
                .time_to_live(ttl)
                .build(),
            tables: Cache::builder()
                .max_capacity(config.max_capacity)
                .time_to_live(ttl)
                .build(),
            _records: PhantomData,
        }
    }

    /// Returns the aggregate view of a node, computing it on first request.
    pub fn aggregate(
        &self,
        tree: &ReportTree<R>,
        id: NodeId,
    ) -> Result<Arc<A::View>, ReportError> {
        let node = tree.node(id)?;
        let records = node.records().ok_or_else(|| ReportError::NotSelected {
            objective_id: node.id().to_string(),
        })?;
        let key = view_key(tree, id)?;

        Ok(self
            .views
            .get_with(key, || Arc::new(self.aggregator.aggregate(records))))
    }

    /// Returns a table with the views of the node's children, optionally
    /// preceded by the node's own view.
    ///
    /// `None` if the node itself is not requested and has no children.
    /// Expands the node if needed.
    pub fn child_table(
        &self,
        tree: &mut ReportTree<R>,
        id: NodeId,
        include_self: bool,
        localizer: &dyn Localizer,
    ) -> Result<Option<Arc<A::Table>>, ReportError> {
        if !include_self && !tree.node(id)?.has_children() {
            return Ok(None);
        }

        let children = tree.expand(id, localizer)?.to_vec();
        let tree = &*tree;
        let key = TableKey {
            view: view_key(tree, id)?,
            include_self,
            children: children
                .iter()
                .map(|child| view_key(tree, *child))
                .collect::<Result<_, _>>()?,
        };
        if let Some(table) = self.tables.get(&key) {
            return Ok(Some(table));
        }

        let mut entries = Vec::with_capacity(children.len() + 1);
        if include_self {
            entries.push((tree.node(id)?.id().to_string(), self.aggregate(tree, id)?));
        }
        for child in children {
            entries.push((
                tree.node(child)?.id().to_string(),
                self.aggregate(tree, child)?,
            ));
        }

        let table = Arc::new(self.aggregator.build_table(entries));
        self.tables.insert(key, Arc::clone(&table));
        Ok(Some(table))
    }

    /// Invalidates all cached entries.
    pub fn invalidate_all(&self) {
        self.views.invalidate_all();
        self.tables.invalidate_all();
    }

    /// Returns the number of cached views and tables.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.views.entry_count() + self.tables.entry_count()
    }

    /// Runs cache maintenance tasks.
    ///
    /// Moka handles this automatically, but calling it makes entry counts
    /// and evictions visible immediately.
    pub fn run_pending_tasks(&self) {
        self.views.run_pending_tasks();
        self.tables.run_pending_tasks();
    }
}

fn view_key<R: ClassifiedRecord>(tree: &ReportTree<R>, id: NodeId) -> Result<ViewKey, ReportError> {
    Ok(ViewKey {
        tree: tree.id(),
        node: id,
        generation: tree.node(id)?.generation(),
    })
}

//! Report nodes and the tree expander.
//!
//! A [`ReportTree`] is an arena of [`ReportNode`]s. Each node refers to its
//! objective, its parent (by index) and, once expanded, its children. The
//! root is selected from a flat record list; every expansion selects the
//! children from the parent's records and sorts the parent's records that
//! no child (or several children) took into synthetic "other" and
//! "duplicates" nodes.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use costree_shared::LabelConfig;
use costree_shared::types::ReportTreeId;
use tracing::debug;

use super::error::ReportError;
use super::objective::Objective;
use super::period::ReportPeriod;
use super::record::ClassifiedRecord;
use super::selector::RecordSelector;

/// Handle of a node inside one [`ReportTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Translates label keys into display strings.
pub trait Localizer {
    /// Returns the display string for a key.
    fn localize(&self, key: &str) -> String;
}

impl<F> Localizer for F
where
    F: Fn(&str) -> String,
{
    fn localize(&self, key: &str) -> String {
        self(key)
    }
}

/// Records of a node plus the set used for membership tests.
#[derive(Debug, Clone)]
struct Selection<R> {
    records: Vec<R>,
    set: HashSet<R>,
}

impl<R: ClassifiedRecord> Selection<R> {
    fn new(records: Vec<R>) -> Self {
        let set = records.iter().cloned().collect();
        Self { records, set }
    }
}

/// One node of a materialized report tree.
#[derive(Debug, Clone)]
pub struct ReportNode<R> {
    objective: Arc<Objective>,
    parent: Option<NodeId>,
    selection: Option<Selection<R>>,
    children: Option<Vec<NodeId>>,
    other: Option<Vec<R>>,
    duplicates: Option<Vec<R>>,
    generation: u64,
    show_children: bool,
    retired: bool,
}

impl<R: ClassifiedRecord> ReportNode<R> {
    fn new(objective: Arc<Objective>, parent: Option<NodeId>) -> Self {
        Self {
            objective,
            parent,
            selection: None,
            children: None,
            other: None,
            duplicates: None,
            generation: 0,
            show_children: false,
            retired: false,
        }
    }

    /// Objective behind this node.
    #[must_use]
    pub fn objective(&self) -> &Arc<Objective> {
        &self.objective
    }

    /// Objective id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.objective.id
    }

    /// Objective title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.objective.title
    }

    /// Parent node, `None` for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns true once records were selected or assigned (possibly none).
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        self.selection.is_some()
    }

    /// Matched records in input order, `None` before the first selection.
    #[must_use]
    pub fn records(&self) -> Option<&[R]> {
        self.selection.as_ref().map(|s| s.records.as_slice())
    }

    /// Returns true if the record is among the matched records.
    #[must_use]
    pub fn contains(&self, record: &R) -> bool {
        self.selection
            .as_ref()
            .is_some_and(|s| s.set.contains(record))
    }

    /// Returns true if the objective has configured children.
    #[must_use]
    pub fn has_children(&self) -> bool {
        self.objective.has_children()
    }

    /// Materialized children, `None` until the node was expanded.
    #[must_use]
    pub fn children(&self) -> Option<&[NodeId]> {
        self.children.as_deref()
    }

    /// Records matched here but by none of the children.
    ///
    /// `None` before expansion, when suppressed, or when there are none.
    #[must_use]
    pub fn other(&self) -> Option<&[R]> {
        self.other.as_deref()
    }

    /// Records matched by more than one child.
    ///
    /// `None` before expansion, when suppressed, or when there are none.
    #[must_use]
    pub fn duplicates(&self) -> Option<&[R]> {
        self.duplicates.as_deref()
    }

    /// Counter bumped every time the records of this node are replaced.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// UI flag: whether the children should be displayed.
    #[must_use]
    pub const fn show_children(&self) -> bool {
        self.show_children
    }
}

/// Arena-backed tree of report nodes.
///
/// Not `Clone`: the tree id keys cached aggregates, so two trees must never share it.
#[derive(Debug)]
pub struct ReportTree<R> {
    id: ReportTreeId,
    nodes: Vec<ReportNode<R>>,
    selector: RecordSelector,
    labels: LabelConfig,
    period: Option<ReportPeriod>,
}

impl<R: ClassifiedRecord> ReportTree<R> {
    /// Creates a tree holding only the (unselected) root node.
    #[must_use]
    pub fn new(root: Arc<Objective>) -> Self {
        Self {
            id: ReportTreeId::new(),
            nodes: vec![ReportNode::new(root, None)],
            selector: RecordSelector::default(),
            labels: LabelConfig::default(),
            period: None,
        }
    }

    /// Sets the selector (and with it the unresolved-code policy).
    #[must_use]
    pub fn with_selector(mut self, selector: RecordSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Sets the label keys for synthetic nodes.
    #[must_use]
    pub fn with_labels(mut self, labels: LabelConfig) -> Self {
        self.labels = labels;
        self
    }

    /// Sets the reporting period shared by all nodes.
    #[must_use]
    pub fn with_period(mut self, period: ReportPeriod) -> Self {
        self.period = Some(period);
        self
    }

    /// Tree identity.
    #[must_use]
    pub const fn id(&self) -> ReportTreeId {
        self.id
    }

    /// Root node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Reporting period, if set.
    #[must_use]
    pub const fn period(&self) -> Option<ReportPeriod> {
        self.period
    }

    /// Returns a live node.
    pub fn node(&self, id: NodeId) -> Result<&ReportNode<R>, ReportError> {
        self.nodes
            .get(id.0)
            .filter(|node| !node.retired)
            .ok_or(ReportError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut ReportNode<R>, ReportError> {
        self.nodes
            .get_mut(id.0)
            .filter(|node| !node.retired)
            .ok_or(ReportError::UnknownNode(id))
    }

    /// Selects the records matching the node's filter rule and stores them,
    /// dropping all derived state. Returns the number of matched records.
    ///
    /// On error the node keeps its previous state.
    pub fn select(&mut self, id: NodeId, records: &[R]) -> Result<usize, ReportError> {
        let node = self.node(id)?;
        let selected = self.selector.select(&node.objective.filter, records)?;
        let count = selected.len();

        debug!(
            objective = %node.objective.id,
            input = records.len(),
            matched = count,
            "Selected report records"
        );

        self.store(id, selected)?;
        Ok(count)
    }

    /// Stores records as the node's selection without evaluating its filter.
    pub fn assign(&mut self, id: NodeId, records: Vec<R>) -> Result<(), ReportError> {
        self.store(id, records)
    }

    fn store(&mut self, id: NodeId, records: Vec<R>) -> Result<(), ReportError> {
        self.reset_derived(id)?;
        self.node_mut(id)?.selection = Some(Selection::new(records));
        Ok(())
    }

    /// Drops children, buckets and cached views of a node.
    ///
    /// Former descendants are retired: their handles answer `UnknownNode`.
    fn reset_derived(&mut self, id: NodeId) -> Result<(), ReportError> {
        let node = self.node_mut(id)?;
        node.other = None;
        node.duplicates = None;
        node.generation += 1;
        let mut stack = node.children.take().unwrap_or_default();

        while let Some(child) = stack.pop() {
            let child = &mut self.nodes[child.0];
            child.retired = true;
            child.selection = None;
            child.other = None;
            child.duplicates = None;
            stack.extend(child.children.take().unwrap_or_default());
        }
        Ok(())
    }

    /// Returns true if the record is among the node's matched records.
    pub fn contains(&self, id: NodeId, record: &R) -> Result<bool, ReportError> {
        Ok(self.node(id)?.contains(record))
    }

    /// Sets the UI flag for showing the node's children.
    pub fn set_show_children(&mut self, id: NodeId, show: bool) -> Result<(), ReportError> {
        self.node_mut(id)?.show_children = show;
        Ok(())
    }

    /// Materializes the children of a node and returns them.
    ///
    /// One child per configured child objective, each selected from this
    /// node's records, followed by the synthetic "other" and "duplicates"
    /// nodes when they are not suppressed and not empty. Repeated calls
    /// return the same children until the node is selected again.
    pub fn expand(
        &mut self,
        id: NodeId,
        localizer: &dyn Localizer,
    ) -> Result<&[NodeId], ReportError> {
        let node = self.node(id)?;
        if node.children.is_none() {
            let Some(selection) = &node.selection else {
                return Err(ReportError::NotSelected {
                    objective_id: node.objective.id.clone(),
                });
            };
            let objective = Arc::clone(&node.objective);

            if objective.has_children() {
                let expansion = self.partition(&objective, selection)?;
                self.attach(id, &objective, expansion, localizer)?;
            } else {
                self.node_mut(id)?.children = Some(Vec::new());
            }
        }

        Ok(self.node(id)?.children.as_deref().unwrap_or_default())
    }

    /// Selects the children and sorts the parent's records into buckets.
    fn partition(
        &self,
        objective: &Objective,
        parent: &Selection<R>,
    ) -> Result<Expansion<R>, ReportError> {
        let children = objective
            .children
            .iter()
            .map(|child| {
                self.selector
                    .select(&child.filter, &parent.records)
                    .map(|records| (Arc::clone(child), Selection::new(records)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut other = Vec::new();
        let mut duplicates = Vec::new();
        if objective.collects_buckets() {
            for record in &parent.records {
                let n = children
                    .iter()
                    .filter(|(_, selection)| selection.set.contains(record))
                    .count();
                if !objective.suppress_other && n == 0 {
                    other.push(record.clone());
                } else if !objective.suppress_duplicates && n > 1 {
                    duplicates.push(record.clone());
                }
            }
        }

        Ok(Expansion {
            children,
            other,
            duplicates,
        })
    }

    fn attach(
        &mut self,
        id: NodeId,
        objective: &Objective,
        expansion: Expansion<R>,
        localizer: &dyn Localizer,
    ) -> Result<(), ReportError> {
        let Expansion {
            children,
            other,
            duplicates,
        } = expansion;

        let mut ids = Vec::with_capacity(children.len() + 2);
        for (child, selection) in children {
            ids.push(self.push_child(id, child, selection));
        }

        let other = (!other.is_empty()).then_some(other);
        let duplicates = (!duplicates.is_empty()).then_some(duplicates);

        if let Some(records) = &other {
            let label = localizer.localize(&self.labels.other_key);
            let bucket = Arc::new(objective.bucket(&label));
            ids.push(self.push_child(id, bucket, Selection::new(records.clone())));
        }
        if let Some(records) = &duplicates {
            let label = localizer.localize(&self.labels.duplicates_key);
            let bucket = Arc::new(objective.bucket(&label));
            ids.push(self.push_child(id, bucket, Selection::new(records.clone())));
        }

        debug!(
            objective = %objective.id,
            children = ids.len(),
            other = other.as_ref().map_or(0, Vec::len),
            duplicates = duplicates.as_ref().map_or(0, Vec::len),
            "Expanded report node"
        );

        let node = self.node_mut(id)?;
        node.children = Some(ids);
        node.other = other;
        node.duplicates = duplicates;
        Ok(())
    }

    fn push_child(
        &mut self,
        parent: NodeId,
        objective: Arc<Objective>,
        selection: Selection<R>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut node = ReportNode::new(objective, Some(parent));
        node.selection = Some(selection);
        self.nodes.push(node);
        id
    }

    /// Expands the node and, recursively, every descendant.
    pub fn expand_all(&mut self, id: NodeId, localizer: &dyn Localizer) -> Result<(), ReportError> {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            stack.extend_from_slice(self.expand(next, localizer)?);
        }
        Ok(())
    }

    /// Finds the node of an objective id below (or at) `from`.
    ///
    /// Checks the node itself, then all direct children, and only then
    /// descends into each child's subtree in order. Leaf objectives end the
    /// search of their branch without being expanded.
    pub fn find_by_id(
        &mut self,
        from: NodeId,
        objective_id: &str,
        localizer: &dyn Localizer,
    ) -> Result<Option<NodeId>, ReportError> {
        let node = self.node(from)?;
        if node.id() == objective_id {
            return Ok(Some(from));
        }
        if !node.has_children() {
            return Ok(None);
        }

        let children = self.expand(from, localizer)?.to_vec();
        if let Some(found) = children
            .iter()
            .find(|child| self.nodes[child.0].id() == objective_id)
        {
            return Ok(Some(*found));
        }
        for child in children {
            if let Some(found) = self.find_by_id(child, objective_id, localizer)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Ancestors from the root down to the direct parent (the node itself
    /// excluded). `None` for the root.
    pub fn path(&self, id: NodeId) -> Result<Option<Vec<NodeId>>, ReportError> {
        let mut parent = self.node(id)?.parent;
        if parent.is_none() {
            return Ok(None);
        }

        let mut path = Vec::new();
        while let Some(ancestor) = parent {
            path.push(ancestor);
            parent = self.node(ancestor)?.parent;
        }
        path.reverse();
        Ok(Some(path))
    }
}

/// Result of selecting the children of one node.
struct Expansion<R> {
    children: Vec<(Arc<Objective>, Selection<R>)>,
    other: Vec<R>,
    duplicates: Vec<R>,
}

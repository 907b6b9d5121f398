//! Arena-based forest of partners.

use std::collections::HashMap;
use std::ops::Deref;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::{Partner, PartnerId};

/// Forest node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode {
    /// Partner payload for this node
    pub data: Partner,
    /// Index of the parent node, None for roots
    pub parent: Option<Index>,
    /// Indices of child nodes in input order
    pub children: Vec<Index>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.data.is_root()
    }
}

/// Arena-based forest holding every partner of one network.
///
/// Nodes are addressed by arena index; the id map gives O(1) lookups by partner id.
/// Built by [`crate::domain::ForestBuilder`], not yet checked for cycles.
#[derive(Debug, Default)]
pub struct Forest {
    arena: Arena<TreeNode>,
    ids: HashMap<PartnerId, Index>,
    /// Insertion order of all nodes
    order: Vec<Index>,
    roots: Vec<Index>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            arena: Arena::with_capacity(n),
            ids: HashMap::with_capacity(n),
            order: Vec::with_capacity(n),
            roots: Vec::new(),
        }
    }

    /// Insert a partner without wiring edges. Returns None if the id is taken.
    #[instrument(level = "trace", skip(self, partner), fields(id = partner.id))]
    pub(crate) fn insert_partner(&mut self, partner: Partner) -> Option<Index> {
        if self.ids.contains_key(&partner.id) {
            return None;
        }
        let id = partner.id;
        let is_root = partner.is_root();
        let idx = self.arena.insert(TreeNode {
            data: partner,
            parent: None,
            children: Vec::new(),
        });
        self.ids.insert(id, idx);
        self.order.push(idx);
        if is_root {
            self.roots.push(idx);
        }
        Some(idx)
    }

    /// Append `child` to the children of `parent`.
    pub(crate) fn link(&mut self, parent: Index, child: Index) {
        if let Some(node) = self.arena.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.arena.get_mut(parent) {
            node.children.push(child);
        }
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub(crate) fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    pub fn index_of(&self, id: PartnerId) -> Option<Index> {
        self.ids.get(&id).copied()
    }

    pub fn get_partner(&self, id: PartnerId) -> Option<&Partner> {
        self.index_of(id)
            .and_then(|idx| self.get_node(idx))
            .map(|node| &node.data)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All nodes in input order.
    pub fn nodes(&self) -> impl Iterator<Item = (Index, &TreeNode)> + '_ {
        self.order
            .iter()
            .filter_map(move |&idx| self.arena.get(idx).map(|node| (idx, node)))
    }

    /// Partners in input order.
    pub fn partners(&self) -> impl Iterator<Item = &Partner> + '_ {
        self.nodes().map(|(_, node)| &node.data)
    }

    pub(crate) fn indices(&self) -> &[Index] {
        &self.order
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes().filter(|(_, node)| node.is_leaf()).count()
    }

    /// Pre-order walk over all trees, roots in input order, yielding each node with its depth.
    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Post-order walk over all trees: every node after all of its children.
    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }
}

/// A forest that passed structural validation: every parent resolves,
/// there are no cycles and at least one root exists.
#[derive(Debug)]
pub struct ValidatedForest(Forest);

impl ValidatedForest {
    pub(crate) fn new(forest: Forest) -> Self {
        Self(forest)
    }

    pub(crate) fn forest_mut(&mut self) -> &mut Forest {
        &mut self.0
    }
}

impl Deref for ValidatedForest {
    type Target = Forest;

    fn deref(&self) -> &Forest {
        &self.0
    }
}

pub struct TreeIterator<'a> {
    forest: &'a Forest,
    stack: Vec<(Index, usize)>,
}

impl<'a> TreeIterator<'a> {
    fn new(forest: &'a Forest) -> Self {
        // Roots pushed in reverse for left-to-right traversal
        let stack = forest.roots().iter().rev().map(|&root| (root, 0)).collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, depth)) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                for &child in node.children.iter().rev() {
                    self.stack.push((child, depth + 1));
                }
                return Some((current_idx, node, depth));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    forest: &'a Forest,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(forest: &'a Forest) -> Self {
        let stack = forest.roots().iter().rev().map(|&root| (root, false)).collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

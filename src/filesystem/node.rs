use std::ops::Deref;

use bincode::{Decode, Encode};
use derive_more::Display;

use crate::filesystem::path::{self, ROOT_PATH};
use crate::filesystem::tree::Tree;

/// Index of a node slot inside a [`Tree`].
///
/// Ids are only meaningful for the tree that handed them out, and only while
/// the node is alive: a destroyed node's slot can be reused by a later insert.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Encode, Decode)]
#[display("#{_0}")]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// One entry of the folder tree: a directory when `link` is absent, a file otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct TreeNode {
    name: String,
    link: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    is_last_child: bool,
}

impl TreeNode {
    pub(crate) fn root() -> Self {
        TreeNode {
            name: ROOT_PATH.to_string(),
            link: None,
            parent: None,
            children: Vec::new(),
            is_last_child: true,
        }
    }

    pub(crate) fn new(name: String, link: Option<String>, parent: NodeId) -> Self {
        TreeNode {
            name,
            link,
            parent: Some(parent),
            children: Vec::new(),
            is_last_child: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_last_child(&self) -> bool {
        self.is_last_child
    }

    pub fn is_directory(&self) -> bool {
        self.link.is_none()
    }

    pub fn is_file(&self) -> bool {
        !self.is_directory()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }

    pub(crate) fn set_last_child(&mut self, is_last_child: bool) {
        self.is_last_child = is_last_child;
    }
}

/// A live node together with the tree it belongs to.
///
/// Dereferences to [`TreeNode`]; adds the queries that need to walk ancestors.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a Tree,
    id: NodeId,
    node: &'a TreeNode,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(tree: &'a Tree, id: NodeId, node: &'a TreeNode) -> Self {
        NodeRef { tree, id, node }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent_node(&self) -> Option<NodeRef<'a>> {
        self.node.parent.and_then(|parent| self.tree.node(parent))
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = NodeRef<'a>> + use<'a> {
        let mut current = self.parent_node();
        std::iter::from_fn(move || {
            let next = current?;
            current = next.parent_node();
            Some(next)
        })
    }

    pub fn child_nodes(&self) -> impl Iterator<Item = NodeRef<'a>> + use<'a> {
        let tree = self.tree;
        self.node
            .children
            .iter()
            .filter_map(move |child| tree.node(*child))
    }

    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    pub fn full_path(&self) -> String {
        let mut names: Vec<&str> = self
            .ancestors()
            .map(|ancestor| ancestor.node.name.as_str())
            .collect();
        names.reverse();
        names.push(self.node.name.as_str());
        path::normalize(&names.join("/"))
    }
}

impl Deref for NodeRef<'_> {
    type Target = TreeNode;

    fn deref(&self) -> &Self::Target {
        self.node
    }
}

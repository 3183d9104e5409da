use std::collections::HashSet;

use bincode::{Decode, Encode};
use snafu::{OptionExt, ensure};
use tracing::{debug, trace};

use crate::filesystem::error::{
    CannotRemoveRootSnafu, CdToNonDirectorySnafu, CreateUnderFileSnafu, InvalidPathSnafu,
    NodeExistsSnafu, NodeNotFoundSnafu, TreeError,
};
use crate::filesystem::node::{NodeId, NodeRef, TreeNode};
use crate::filesystem::path::{
    self, CURRENT_DIR, EMPTY_PLACEHOLDER, PARENT_DIR, ROOT_PATH, SEPARATOR, WILDCARD,
};
use crate::filesystem::resolver;

/// One tenant's folder tree.
///
/// Nodes live in a slot arena addressed by [`NodeId`]; released slots are kept
/// on a free list and handed out again by later inserts. Slot 0 always holds
/// the root.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Tree {
    nodes: Vec<Option<TreeNode>>,
    free: Vec<NodeId>,
    pwd: NodeId,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        Tree {
            nodes: vec![Some(TreeNode::root())],
            free: Vec::new(),
            pwd: NodeId::ROOT,
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.get(id).map(|node| NodeRef::new(self, id, node))
    }

    fn live(&self, id: NodeId) -> NodeRef<'_> {
        match self.node(id) {
            Some(node) => node,
            None => panic!("node {id} is referenced by the tree but its slot is empty"),
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn root_id(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.live(NodeId::ROOT)
    }

    pub fn pwd_id(&self) -> NodeId {
        self.pwd
    }

    pub fn pwd(&self) -> NodeRef<'_> {
        self.live(self.pwd)
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    /// Walks from the root matching one child per segment.
    ///
    /// Names are compared case-sensitively; among same-named siblings the one
    /// inserted first wins.
    pub fn lookup(&self, path: &str) -> Result<NodeId, TreeError> {
        let normalized = path::normalize(path);
        let mut current = self.root();

        for segment in path::segments(&normalized) {
            current = current
                .child_nodes()
                .find(|child| child.name() == segment)
                .context(NodeNotFoundSnafu {
                    path: normalized.as_str(),
                })?;
        }

        Ok(current.id())
    }

    /// Creates the node named by the final segment of the absolute `path`.
    ///
    /// # Panics
    ///
    /// When `is_file` disagrees with the presence of `link`.
    pub fn create(
        &mut self,
        path: &str,
        is_file: bool,
        link: Option<&str>,
    ) -> Result<NodeId, TreeError> {
        assert_eq!(
            is_file,
            link.is_some(),
            "a file node needs a link and a directory node must not have one"
        );

        let normalized = path::normalize(path);
        let (parent_path, name) = path::split_parent(&normalized);
        validate_name(&normalized, name)?;

        let parent = if parent_path.is_empty() {
            NodeId::ROOT
        } else {
            self.lookup(parent_path)?
        };
        self.insert_child(parent, name, link.map(str::to_string))
    }

    /// Appends a new child under `parent`, keeping the sibling flags in order.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        name: &str,
        link: Option<String>,
    ) -> Result<NodeId, TreeError> {
        let parent_node = self.node(parent).context(NodeNotFoundSnafu {
            path: parent.to_string(),
        })?;
        let parent_path = parent_node.full_path();
        validate_name(&join_child(&parent_path, name), name)?;

        ensure!(
            parent_node.is_directory(),
            CreateUnderFileSnafu {
                name,
                parent: parent_path.as_str(),
            }
        );

        let is_file = link.is_some();
        let duplicate = parent_node
            .child_nodes()
            .any(|child| child.name() == name && child.is_file() == is_file);
        ensure!(
            !duplicate,
            NodeExistsSnafu {
                path: join_child(&parent_path, name),
            }
        );

        let node = TreeNode::new(name.to_string(), link, parent);
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id.index()] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                NodeId::from_index(self.nodes.len() - 1)
            }
        };

        if let Some(parent_node) = self.get_mut(parent) {
            parent_node.children_mut().push(id);
        }
        self.refresh_last_child_flags(parent);

        trace!(%id, name, parent = %parent_path, is_file, "Created node");
        Ok(id)
    }

    pub fn destroy(&mut self, path: &str) -> Result<(), TreeError> {
        let id = self.lookup(path)?;
        self.destroy_node(id)
    }

    /// Detaches `id` from its parent and releases its whole subtree.
    ///
    /// Moves the working directory back to the root when it lived inside the
    /// released subtree.
    pub fn destroy_node(&mut self, id: NodeId) -> Result<(), TreeError> {
        ensure!(id != NodeId::ROOT, CannotRemoveRootSnafu);
        let node = self.node(id).context(NodeNotFoundSnafu {
            path: id.to_string(),
        })?;
        let removed_path = node.full_path();
        let parent = node.parent();

        let pwd = self.pwd();
        let pwd_removed = pwd.id() == id || pwd.ancestors().any(|ancestor| ancestor.id() == id);

        if let Some(parent) = parent {
            if let Some(parent_node) = self.get_mut(parent) {
                parent_node.children_mut().retain(|child| *child != id);
            }
            self.refresh_last_child_flags(parent);
        }

        let mut released = 0usize;
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.get_mut(next.index()).and_then(Option::take) {
                pending.extend_from_slice(node.children());
                self.free.push(next);
                released += 1;
            }
        }
        trace!(path = %removed_path, released, "Destroyed subtree");

        if pwd_removed {
            debug!(path = %removed_path, "Working directory was removed, returning to root");
            self.pwd = NodeId::ROOT;
        }
        Ok(())
    }

    /// Moves the working directory to the last node `path` resolves to.
    pub fn change_directory(&mut self, path: &str) -> Result<(), TreeError> {
        let normalized = path::normalize(path);
        ensure!(
            path::segments(&normalized).last() != Some(WILDCARD),
            InvalidPathSnafu {
                path: normalized.as_str(),
                reason: "cannot cd into a wildcard",
            }
        );

        let resolved = resolver::resolve_for_lookup(self, &normalized)?;
        let target = resolved
            .last()
            .and_then(|id| self.node(*id))
            .context(NodeNotFoundSnafu {
                path: normalized.as_str(),
            })?;
        ensure!(
            target.is_directory(),
            CdToNonDirectorySnafu {
                path: target.full_path(),
            }
        );

        let target = target.id();
        if target != self.pwd {
            debug!(from = %self.current_path(), to = %self.live(target).full_path(), "Changed directory");
        }
        self.pwd = target;
        Ok(())
    }

    pub fn current_path(&self) -> String {
        self.pwd().full_path()
    }

    /// Checks every structural invariant of the arena, node names and
    /// sibling uniqueness included.
    ///
    /// Used when a tree comes from outside the process, such as a stored snapshot.
    pub fn is_consistent(&self) -> bool {
        let Some(root) = self.get(NodeId::ROOT) else {
            return false;
        };
        if root.name() != ROOT_PATH
            || root.parent().is_some()
            || root.is_file()
            || !root.is_last_child()
        {
            return false;
        }
        if !self.get(self.pwd).is_some_and(TreeNode::is_directory) {
            return false;
        }
        if self.free.iter().any(|id| self.contains(*id)) {
            return false;
        }

        let mut visited = vec![false; self.nodes.len()];
        let mut pending = vec![NodeId::ROOT];
        while let Some(id) = pending.pop() {
            let Some(node) = self.get(id) else {
                return false;
            };
            if std::mem::replace(&mut visited[id.index()], true) {
                return false;
            }
            if node.is_file() && !node.is_leaf() {
                return false;
            }
            let last = node.children().len().saturating_sub(1);
            let mut siblings = HashSet::with_capacity(node.children().len());
            for (i, child) in node.children().iter().enumerate() {
                match self.get(*child) {
                    Some(child_node)
                        if child_node.parent() == Some(id)
                            && child_node.is_last_child() == (i == last)
                            && validate_name(ROOT_PATH, child_node.name()).is_ok()
                            && siblings.insert((child_node.name(), child_node.is_file())) => {}
                    _ => return false,
                }
                pending.push(*child);
            }
        }

        self.nodes
            .iter()
            .zip(&visited)
            .all(|(slot, seen)| slot.is_some() == *seen)
    }

    fn refresh_last_child_flags(&mut self, parent: NodeId) {
        let Some(children) = self.get(parent).map(|node| node.children().to_vec()) else {
            return;
        };
        let last = children.len().saturating_sub(1);
        for (i, child) in children.into_iter().enumerate() {
            if let Some(node) = self.get_mut(child) {
                node.set_last_child(i == last);
            }
        }
    }
}

fn join_child(parent_path: &str, name: &str) -> String {
    if parent_path == ROOT_PATH {
        format!("{ROOT_PATH}{name}")
    } else {
        format!("{parent_path}{SEPARATOR}{name}")
    }
}

fn validate_name(path: &str, name: &str) -> Result<(), TreeError> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name == CURRENT_DIR || name == PARENT_DIR {
        "name is reserved for navigation"
    } else if name == EMPTY_PLACEHOLDER {
        "name is reserved for empty directories"
    } else if name.contains(WILDCARD) {
        "name contains a wildcard"
    } else if name.contains(SEPARATOR) {
        "name contains a separator"
    } else {
        return Ok(());
    };
    InvalidPathSnafu { path, reason }.fail()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    /// Two top-level folders, nested folders and a file at every level of the first one.
    #[fixture]
    fn populated() -> Tree {
        let mut tree = Tree::new();
        tree.create("/test1", false, None).unwrap();
        tree.create("/test1/d1", false, None).unwrap();
        tree.create("/test1/d1/d2", false, None).unwrap();
        tree.create("/test1/file.txt", true, Some("abc.com/file.txt"))
            .unwrap();
        tree.create("/test1/d1/file.txt", true, Some("abc.com/file.txt"))
            .unwrap();
        tree.create("/test1/d1/d2/file.txt", true, Some("abc.com/file.txt"))
            .unwrap();
        tree.create("/test2", false, None).unwrap();
        tree
    }

    #[fixture]
    fn navigable() -> Tree {
        let mut tree = Tree::new();
        tree.create("/node1", false, None).unwrap();
        tree.create("/node1/node2", false, None).unwrap();
        tree.create("/node1/node2/node3", false, None).unwrap();
        tree.create("/node1/node2/file.ext", true, Some("fake_link"))
            .unwrap();
        tree
    }

    fn child_names(tree: &Tree, path: &str) -> Vec<String> {
        let id = tree.lookup(path).unwrap();
        tree.node(id)
            .unwrap()
            .child_nodes()
            .map(|child| child.name().to_string())
            .collect()
    }

    #[test]
    fn new_tree_has_only_root() {
        let tree = Tree::new();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.pwd_id(), tree.root_id());
        assert_eq!(tree.current_path(), "/");
        assert!(tree.is_consistent());
    }

    #[rstest]
    #[case("/node")]
    #[case("//node/")]
    #[case("/a//b///c/")]
    fn created_node_is_found_under_its_normalized_path(#[case] raw: &str) {
        let mut tree = Tree::new();
        let normalized = path::normalize(raw);
        let (parent, _) = path::split_parent(&normalized);
        let mut built = ROOT_PATH.to_string();
        for segment in path::segments(parent) {
            built = join_child(&built, segment);
            tree.create(&built, false, None).unwrap();
        }

        let id = tree.create(raw, false, None).unwrap();
        assert_eq!(tree.lookup(raw), Ok(id));
        assert_eq!(tree.node(id).unwrap().full_path(), normalized);
    }

    #[test]
    fn create_appends_to_parent() {
        let mut tree = Tree::new();
        tree.create("/node", false, None).unwrap();
        assert_eq!(child_names(&tree, "/"), vec!["node"]);
    }

    #[test]
    fn create_same_directory_twice_fails() {
        let mut tree = Tree::new();
        tree.create("/a", false, None).unwrap();
        assert_eq!(
            tree.create("/a", false, None),
            Err(TreeError::NodeExistsError {
                path: "/a".to_string()
            })
        );
    }

    #[test]
    fn directory_and_file_may_share_a_name() {
        let mut tree = Tree::new();
        let dir = tree.create("/a", false, None).unwrap();
        let file = tree.create("/a", true, Some("cdn/a")).unwrap();
        assert_ne!(dir, file);
        assert_eq!(child_names(&tree, "/"), vec!["a", "a"]);
        // Lookup prefers the first inserted sibling.
        assert_eq!(tree.lookup("/a"), Ok(dir));
    }

    #[test]
    fn create_under_file_fails() {
        let mut tree = Tree::new();
        tree.create("/node", false, None).unwrap();
        tree.create("/node/node.ext", true, Some("some/link")).unwrap();
        assert_eq!(
            tree.create("/node/node.ext/new_node", false, None),
            Err(TreeError::CreateUnderFileError {
                name: "new_node".to_string(),
                parent: "/node/node.ext".to_string(),
            })
        );
    }

    #[test]
    fn create_with_missing_parent_fails() {
        let mut tree = Tree::new();
        assert!(matches!(
            tree.create("/missing/child", false, None),
            Err(TreeError::NodeNotFoundError { .. })
        ));
    }

    #[rstest]
    #[case("/")]
    #[case("/a/.")]
    #[case("/..")]
    #[case("/(empty)")]
    #[case("/star*")]
    fn reserved_names_are_rejected(#[case] raw: &str) {
        let mut tree = Tree::new();
        tree.create("/a", false, None).unwrap();
        assert!(matches!(
            tree.create(raw, false, None),
            Err(TreeError::InvalidPathError { .. })
        ));
    }

    #[test]
    #[should_panic]
    fn file_without_link_is_a_programming_error() {
        let mut tree = Tree::new();
        let _ = tree.create("/a", true, None);
    }

    #[rstest]
    fn lookup_finds_nested_file(populated: Tree) {
        let id = populated.lookup("/test1/file.txt").unwrap();
        assert_eq!(populated.get(id).unwrap().name(), "file.txt");
    }

    #[rstest]
    fn lookup_reports_missing_node(populated: Tree) {
        assert_eq!(
            populated.lookup("/test1/d1/non_existent"),
            Err(TreeError::NodeNotFoundError {
                path: "/test1/d1/non_existent".to_string()
            })
        );
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let mut tree = Tree::new();
        tree.create("/Docs", false, None).unwrap();
        assert!(tree.lookup("/docs").is_err());
    }

    #[test]
    fn destroy_removes_node_from_parent() {
        let mut tree = Tree::new();
        tree.create("/node", false, None).unwrap();
        tree.destroy("/node").unwrap();
        assert!(child_names(&tree, "/").is_empty());
        assert_eq!(tree.len(), 1);
        assert!(tree.is_consistent());
    }

    #[test]
    fn destroy_missing_node_fails() {
        let mut tree = Tree::new();
        assert!(matches!(
            tree.destroy("/node"),
            Err(TreeError::NodeNotFoundError { .. })
        ));
    }

    #[test]
    fn destroy_root_fails() {
        let mut tree = Tree::new();
        assert_eq!(tree.destroy("/"), Err(TreeError::CannotRemoveRootError));
    }

    #[rstest]
    fn destroy_releases_whole_subtree(mut populated: Tree) {
        let before = populated.len();
        let stale = populated.lookup("/test1/d1/d2").unwrap();
        populated.destroy("/test1/d1").unwrap();

        assert_eq!(populated.len(), before - 4);
        assert!(!populated.contains(stale));
        assert_eq!(
            populated.destroy_node(stale),
            Err(TreeError::NodeNotFoundError {
                path: stale.to_string()
            })
        );
        assert!(populated.is_consistent());
    }

    #[test]
    fn released_slots_are_reused() {
        let mut tree = Tree::new();
        let first = tree.create("/a", false, None).unwrap();
        tree.destroy("/a").unwrap();
        let second = tree.create("/b", false, None).unwrap();
        assert_eq!(first, second);
        assert!(tree.is_consistent());
    }

    #[test]
    fn last_child_flag_follows_mutations() {
        let mut tree = Tree::new();
        let a = tree.create("/a", false, None).unwrap();
        assert!(tree.get(a).unwrap().is_last_child());

        let b = tree.create("/b", false, None).unwrap();
        assert!(!tree.get(a).unwrap().is_last_child());
        assert!(tree.get(b).unwrap().is_last_child());

        tree.destroy("/b").unwrap();
        assert!(tree.get(a).unwrap().is_last_child());
    }

    #[rstest]
    fn destroying_pwd_ancestor_resets_pwd(mut navigable: Tree) {
        navigable.change_directory("/node1/node2/node3").unwrap();
        navigable.destroy("/node1/node2").unwrap();
        assert_eq!(navigable.pwd_id(), navigable.root_id());
        assert_eq!(navigable.current_path(), "/");
    }

    #[rstest]
    fn destroying_pwd_itself_resets_pwd(mut navigable: Tree) {
        navigable.change_directory("/node1/node2/node3").unwrap();
        navigable.destroy("/node1/node2/node3").unwrap();
        assert_eq!(navigable.pwd_id(), navigable.root_id());
        assert_eq!(navigable.current_path(), "/");
        assert!(navigable.lookup("/node1/node2").is_ok());
        assert!(navigable.is_consistent());
    }

    #[rstest]
    fn destroying_unrelated_node_keeps_pwd(mut navigable: Tree) {
        navigable.change_directory("/node1/node2/node3").unwrap();
        navigable.destroy("/node1/node2/file.ext").unwrap();
        assert_eq!(navigable.current_path(), "/node1/node2/node3");
    }

    #[rstest]
    #[case("/node1/node2/node3", "/node1/node2/node3")]
    #[case("node1/node2/../../node1", "/node1")]
    #[case("node1/node2/../..", "/")]
    #[case("./node1/./node2", "/node1/node2")]
    #[case("", "/")]
    fn cd_moves_working_directory(
        mut navigable: Tree,
        #[case] target: &str,
        #[case] expected: &str,
    ) {
        navigable.change_directory(target).unwrap();
        assert_eq!(navigable.current_path(), expected);
    }

    #[rstest]
    fn cd_relative_to_pwd(mut navigable: Tree) {
        navigable.change_directory("/node1/node2").unwrap();
        navigable.change_directory("node3").unwrap();
        assert_eq!(navigable.current_path(), "/node1/node2/node3");
        navigable.change_directory("../..").unwrap();
        assert_eq!(navigable.current_path(), "/node1");
    }

    #[rstest]
    #[case("..")]
    #[case("/node1/../..")]
    fn cd_past_root_fails(mut navigable: Tree, #[case] target: &str) {
        assert_eq!(
            navigable.change_directory(target),
            Err(TreeError::CdPastRootError)
        );
        assert_eq!(navigable.current_path(), "/");
    }

    #[rstest]
    fn cd_to_file_fails(mut navigable: Tree) {
        assert_eq!(
            navigable.change_directory("/node1/node2/file.ext"),
            Err(TreeError::CdToNonDirectoryError {
                path: "/node1/node2/file.ext".to_string()
            })
        );
    }

    #[rstest]
    fn cd_to_missing_node_fails(mut navigable: Tree) {
        assert!(matches!(
            navigable.change_directory("/node1/node2/does_not_exist"),
            Err(TreeError::NodeNotFoundError { .. })
        ));
    }

    #[rstest]
    fn cd_to_wildcard_fails(mut navigable: Tree) {
        assert!(matches!(
            navigable.change_directory("/node1/*"),
            Err(TreeError::InvalidPathError { .. })
        ));
    }

    #[test]
    fn consistency_check_catches_broken_back_links() {
        let mut tree = Tree::new();
        tree.create("/a", false, None).unwrap();
        tree.create("/a/b", false, None).unwrap();
        let b = tree.lookup("/a/b").unwrap();
        if let Some(root) = tree.get_mut(NodeId::ROOT) {
            root.children_mut().push(b);
        }
        assert!(!tree.is_consistent());
    }

    #[test]
    fn consistency_check_catches_dangling_pwd() {
        let mut tree = Tree::new();
        tree.pwd = NodeId::from_index(42);
        assert!(!tree.is_consistent());
    }

    /// Replaces the only child of the root with a node of the given name and kind.
    fn tree_with_top_level(name: &str, link: Option<&str>) -> Tree {
        let mut tree = Tree::new();
        let id = tree.create("/a", false, None).unwrap();
        let mut replacement = TreeNode::new(name.to_string(), link.map(str::to_string), NodeId::ROOT);
        replacement.set_last_child(true);
        tree.nodes[id.index()] = Some(replacement);
        tree
    }

    #[rstest]
    #[case("x/y")]
    #[case("*")]
    #[case("b*")]
    #[case(".")]
    #[case("..")]
    #[case("(empty)")]
    #[case("")]
    fn consistency_check_catches_invalid_names(#[case] name: &str) {
        assert!(!tree_with_top_level(name, None).is_consistent());
        assert!(!tree_with_top_level(name, Some("cdn/x")).is_consistent());
    }

    #[test]
    fn consistency_check_accepts_valid_replacement() {
        assert!(tree_with_top_level("fine", None).is_consistent());
    }

    #[test]
    fn consistency_check_catches_duplicate_siblings() {
        let mut tree = Tree::new();
        tree.create("/a", false, None).unwrap();
        let b = tree.create("/b", false, None).unwrap();
        let mut duplicate = TreeNode::new("a".to_string(), None, NodeId::ROOT);
        duplicate.set_last_child(true);
        tree.nodes[b.index()] = Some(duplicate);
        assert!(!tree.is_consistent());
    }

    #[test]
    fn consistency_check_allows_same_name_of_other_kind() {
        let mut tree = Tree::new();
        tree.create("/a", false, None).unwrap();
        tree.create("/a", true, Some("cdn/a")).unwrap();
        assert!(tree.is_consistent());
    }
}

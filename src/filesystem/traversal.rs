use crate::filesystem::node::{NodeId, NodeRef};
use crate::filesystem::tree::Tree;

/// Everything a renderer needs to draw one line of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDescriptor {
    pub node: NodeId,
    pub name: String,
    pub link: Option<String>,
    pub depth: usize,
    pub is_empty_dir: bool,
    pub is_pwd: bool,
    pub is_last_child: bool,
    /// Depths of the ancestors, nearest first, below which a vertical
    /// connector continues. The root never appears here.
    pub continuation_depths: Vec<usize>,
}

impl LineDescriptor {
    fn describe(tree: &Tree, node: NodeRef<'_>, depth: usize) -> Self {
        let continuation_depths = node
            .ancestors()
            .zip((1..depth).rev())
            .filter(|(ancestor, _)| !ancestor.is_last_child())
            .map(|(_, ancestor_depth)| ancestor_depth)
            .collect();

        LineDescriptor {
            node: node.id(),
            name: node.name().to_string(),
            link: node.link().map(str::to_string),
            depth,
            is_empty_dir: node.is_directory() && node.is_leaf(),
            is_pwd: node.id() == tree.pwd_id(),
            is_last_child: node.is_last_child(),
            continuation_depths,
        }
    }

    pub fn is_root(&self) -> bool {
        self.depth == 0
    }
}

impl Tree {
    /// Depth-first pre-order walk, siblings in insertion order.
    pub fn traverse(&self) -> Vec<LineDescriptor> {
        let mut lines = Vec::with_capacity(self.len());
        let mut pending = vec![(self.root(), 0usize)];

        while let Some((node, depth)) = pending.pop() {
            lines.push(LineDescriptor::describe(self, node, depth));
            let children: Vec<_> = node.child_nodes().collect();
            pending.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

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

    fn line<'a>(lines: &'a [LineDescriptor], tree: &Tree, path: &str) -> &'a LineDescriptor {
        let id = tree.lookup(path).unwrap();
        lines.iter().find(|line| line.node == id).unwrap()
    }

    #[test]
    fn empty_tree_yields_root_only() {
        let lines = Tree::new().traverse();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].is_root());
        assert!(lines[0].is_empty_dir);
        assert!(lines[0].is_pwd);
    }

    #[test]
    fn root_directory_and_file() {
        let mut tree = Tree::new();
        tree.create("/dir", false, None).unwrap();
        tree.create("/file", true, Some("cdn/file")).unwrap();

        let lines = tree.traverse();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].is_empty_dir);
        assert!(!lines[2].is_empty_dir);
        assert_eq!(lines[2].link.as_deref(), Some("cdn/file"));
    }

    #[rstest]
    fn visits_every_node_in_pre_order(populated: Tree) {
        let lines = populated.traverse();
        assert_eq!(lines.len(), 8);

        let names: Vec<_> = lines.iter().map(|line| line.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["/", "test1", "d1", "d2", "file.txt", "file.txt", "file.txt", "test2"]
        );
        let depths: Vec<_> = lines.iter().map(|line| line.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 3, 4, 3, 2, 1]);
    }

    #[rstest]
    #[case("/test1/file.txt", 1)]
    #[case("/test1/d1/file.txt", 2)]
    #[case("/test1/d1/d2/file.txt", 3)]
    fn connector_count_grows_with_depth(
        populated: Tree,
        #[case] path: &str,
        #[case] expected: usize,
    ) {
        let lines = populated.traverse();
        // test1 is followed by test2, d1 by test1/file.txt, d2 by d1/file.txt
        assert_eq!(line(&lines, &populated, path).continuation_depths.len(), expected);
    }

    #[rstest]
    fn continuation_depths_list_nearest_first(populated: Tree) {
        let lines = populated.traverse();
        let deepest = line(&lines, &populated, "/test1/d1/d2/file.txt");
        assert_eq!(deepest.continuation_depths, vec![3, 2, 1]);
    }

    #[rstest]
    fn last_children_stop_continuations(mut populated: Tree) {
        populated.destroy("/test2").unwrap();
        let lines = populated.traverse();
        let deepest = line(&lines, &populated, "/test1/d1/d2/file.txt");
        assert_eq!(deepest.continuation_depths, vec![3, 2]);
        assert!(line(&lines, &populated, "/test1").is_last_child);
    }

    #[rstest]
    fn marks_working_directory(mut populated: Tree) {
        populated.change_directory("/test1/d1").unwrap();
        let lines = populated.traverse();
        let marked: Vec<_> = lines.iter().filter(|line| line.is_pwd).collect();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].name, "d1");
    }
}

/*
 * This module defines the in-memory tree of file system entries shown to the
 * user. Nodes live in an arena (`TreeStore`) and refer to each other through
 * `NodeId` indices, which gives every node a stable identifier and a cheap,
 * non-owning parent back-reference. The store is rebuilt from scratch on every
 * project load; there is no incremental update path.
 */
use std::path::PathBuf;

/*
 * Stable identifier of one node inside a `TreeStore`.
 * Ids are only meaningful for the store that issued them and stay valid until
 * that store is cleared or dropped.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/*
 * One file system entry in the tree: a display name, a directory flag fixed at
 * creation, a mutable checked flag, and the arena links. Files never carry
 * children; the scanner upholds that invariant when it populates the store.
 *
 * `checked` has no maintained relationship to the children's `checked` values
 * at rest. A cascade overwrites the whole subtree, but a later independent
 * toggle on a descendant leaves the ancestor untouched (cascade-down-only
 * policy, see `selection`).
 */
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub is_dir: bool,
    pub checked: bool,
    pub parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/*
 * Arena holding the nodes of one loaded project. Exactly one root exists per
 * populated store; the root's `parent` is `None`.
 */
#[derive(Debug, Default)]
pub struct TreeStore {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl TreeStore {
    pub fn new() -> Self {
        TreeStore {
            nodes: Vec::new(),
            root: None,
        }
    }

    /*
     * Appends a new node under `parent` (or as the root when `parent` is
     * `None`) and returns its id. New nodes always start checked. An empty
     * `name` is accepted as-is; the store does not validate display names.
     *
     * Inserting a second root or a child under a file node is a caller bug.
     * The operation itself never fails, so those contract violations are
     * caught by debug assertions rather than a `Result`.
     */
    pub fn insert(&mut self, parent: Option<NodeId>, name: impl Into<String>, is_dir: bool) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.into(),
            is_dir,
            checked: true,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(parent_id) => {
                debug_assert!(
                    self.nodes[parent_id.0].is_dir,
                    "TreeStore: inserted a child under a file node"
                );
                self.nodes[parent_id.0].children.push(id);
            }
            None => {
                debug_assert!(
                    self.root.is_none(),
                    "TreeStore: a populated store holds exactly one root"
                );
                self.root = Some(id);
            }
        }
        id
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Live children of `id`, in insertion order.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Discards every node. Used when a new project replaces the current one.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /*
     * Finds the first node whose display name matches `name` exactly, in
     * pre-order from the root.
     *
     * Display names are not unique across a tree; when duplicates exist only
     * the first pre-order match is returned. Callers that need an unambiguous
     * lookup should use `node_at_path` instead.
     */
    pub fn find_by_display_name(&self, name: &str) -> Option<NodeId> {
        let mut stack = vec![self.root?];
        while let Some(id) = stack.pop() {
            if self.nodes[id.0].name == name {
                return Some(id);
            }
            for &child in self.nodes[id.0].children.iter().rev() {
                stack.push(child);
            }
        }
        None
    }

    /*
     * Walks the parent links from `id` to the root and returns the path
     * segments in root-first order.
     */
    pub fn path_of(&self, id: NodeId) -> Vec<&str> {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id.0];
            segments.push(node.name.as_str());
            current = node.parent;
        }
        segments.reverse();
        segments
    }

    /// `path_of` joined into a relative `PathBuf` (root segment first).
    pub fn full_path_of(&self, id: NodeId) -> PathBuf {
        self.path_of(id).into_iter().collect()
    }

    /*
     * Resolves a root-first segment path (as produced by `path_of`) back to a
     * node id. The first segment must match the root's display name. Unlike
     * `find_by_display_name` this lookup is unambiguous.
     */
    pub fn node_at_path(&self, segments: &[&str]) -> Option<NodeId> {
        let root = self.root?;
        let (first, rest) = segments.split_first()?;
        if self.nodes[root.0].name != *first {
            return None;
        }
        let mut current = root;
        for segment in rest {
            current = *self.nodes[current.0]
                .children
                .iter()
                .find(|&&child| self.nodes[child.0].name == *segment)?;
        }
        Some(current)
    }

    /// All node ids in pre-order from the root, ignoring checked state.
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut ordered = Vec::with_capacity(self.nodes.len());
        let Some(root) = self.root else {
            return ordered;
        };
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            ordered.push(id);
            for &child in self.nodes[id.0].children.iter().rev() {
                stack.push(child);
            }
        }
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_store() -> (TreeStore, NodeId, NodeId, NodeId, NodeId) {
        let mut store = TreeStore::new();
        let root = store.insert(None, "proj", true);
        let lib = store.insert(Some(root), "lib", true);
        let a = store.insert(Some(lib), "a.php", false);
        let b = store.insert(Some(lib), "b.php", false);
        (store, root, lib, a, b)
    }

    #[test]
    fn test_insert_defaults_to_checked() {
        let (store, root, lib, a, _) = sample_store();
        assert!(store.get(root).checked);
        assert!(store.get(lib).checked);
        assert!(store.get(a).checked);
        assert_eq!(store.get(a).parent, Some(lib));
        assert_eq!(store.get(root).parent, None);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_children_preserve_insertion_order() {
        let (store, _, lib, a, b) = sample_store();
        assert_eq!(store.children_of(lib), &[a, b]);
        assert!(store.children_of(a).is_empty());
    }

    #[test]
    fn test_insert_accepts_empty_name() {
        let mut store = TreeStore::new();
        let root = store.insert(None, "", true);
        assert_eq!(store.get(root).name, "");
    }

    #[test]
    fn test_find_by_display_name_exact_match() {
        let (store, root, lib, _, b) = sample_store();
        assert_eq!(store.find_by_display_name("proj"), Some(root));
        assert_eq!(store.find_by_display_name("lib"), Some(lib));
        assert_eq!(store.find_by_display_name("b.php"), Some(b));
        assert_eq!(store.find_by_display_name("missing"), None);
        assert_eq!(store.find_by_display_name("a"), None, "no prefix matching");
    }

    #[test]
    fn test_find_by_display_name_returns_first_pre_order_match() {
        let mut store = TreeStore::new();
        let root = store.insert(None, "proj", true);
        let first_dir = store.insert(Some(root), "app", true);
        let dup_in_first = store.insert(Some(first_dir), "dup.php", false);
        let second_dir = store.insert(Some(root), "lib", true);
        let _dup_in_second = store.insert(Some(second_dir), "dup.php", false);

        // Pre-order visits app's subtree before lib's.
        assert_eq!(store.find_by_display_name("dup.php"), Some(dup_in_first));
    }

    #[test]
    fn test_path_of_walks_to_root() {
        let (store, root, _, a, _) = sample_store();
        assert_eq!(store.path_of(a), vec!["proj", "lib", "a.php"]);
        assert_eq!(store.path_of(root), vec!["proj"]);
        assert_eq!(
            store.full_path_of(a),
            PathBuf::from("proj").join("lib").join("a.php")
        );
    }

    #[test]
    fn test_node_at_path_resolves_segments() {
        let (store, root, lib, a, _) = sample_store();
        assert_eq!(store.node_at_path(&["proj"]), Some(root));
        assert_eq!(store.node_at_path(&["proj", "lib"]), Some(lib));
        assert_eq!(store.node_at_path(&["proj", "lib", "a.php"]), Some(a));
        assert_eq!(store.node_at_path(&["proj", "lib", "c.php"]), None);
        assert_eq!(store.node_at_path(&["other", "lib"]), None);
        assert_eq!(store.node_at_path(&[]), None);
    }

    #[test]
    fn test_pre_order_visits_parents_before_children() {
        let (store, root, lib, a, b) = sample_store();
        assert_eq!(store.pre_order(), vec![root, lib, a, b]);
    }

    #[test]
    fn test_clear_discards_everything() {
        let (mut store, ..) = sample_store();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.root(), None);
        assert!(store.pre_order().is_empty());
    }
}

/*
 * Selection engine operating over a `TreeStore`: toggling a node's checked
 * state with a downward cascade, and rendering the checked subset as an ASCII
 * outline. The engine keeps no state of its own; the two operations are freely
 * interleavable and a render pass never mutates the store.
 *
 * Propagation policy is cascade-down-only: a toggle overwrites every
 * descendant with the node's new value and never inspects or recomputes an
 * ancestor. A parent can therefore read as checked while some of its children
 * are unchecked; that mixed state is resolved only by the next cascade from
 * that child or an ancestor.
 */
use super::tree_store::{NodeId, TreeStore};
use std::path::PathBuf;

/*
 * Flips `id`'s checked flag and cascades the new value to every descendant,
 * depth-first, overwriting each descendant's prior value. Only the `checked`
 * field of the visited nodes changes. Infallible: it operates purely on
 * in-memory state the caller already holds ids for.
 */
pub fn toggle(store: &mut TreeStore, id: NodeId) {
    let new_state = !store.get(id).checked;
    log::debug!(
        "Selection: {} '{}' and its subtree.",
        if new_state { "checking" } else { "unchecking" },
        store.get(id).name
    );
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        store.get_mut(current).checked = new_state;
        for &child in store.children_of(current) {
            stack.push(child);
        }
    }
}

/*
 * Renders the checked subset of the tree as an indented ASCII outline, one
 * node per line in pre-order. An unchecked node prunes its entire subtree:
 * the render never recurses below it, so a checked descendant of an unchecked
 * folder is not emitted.
 *
 * Line layout, by nesting depth (root = 0):
 * - depth 0: `<name>/`, no indentation;
 * - depth 1: fixed `│   ` prefix, then `<name>/` for directories or
 *   `├── <name>` for files;
 * - depth 2+: the accumulated ancestor prefix, then `<name>/` or
 *   `├── <name>`. Each ancestor below depth 1 contributes `    ` when it is
 *   the last of its siblings, `│   ` otherwise, and a last-sibling item trims
 *   the trailing four-space segment off its own prefix, pulling the line in
 *   one indent level relative to its continuation.
 *
 * Output is a pure function of the store's state: identical state yields
 * byte-identical text. Sibling position is taken from the full child list,
 * not the checked subset, so an unchecked trailing sibling still makes the
 * nodes before it render with continuation glyphs.
 */
pub fn serialize_checked_subset(store: &TreeStore) -> String {
    let mut out = String::new();
    if let Some(root) = store.root() {
        render_node(store, root, 0, "", &mut out);
    }
    out
}

fn render_node(store: &TreeStore, id: NodeId, depth: usize, prefix: &str, out: &mut String) {
    let node = store.get(id);
    if !node.checked {
        return;
    }

    if depth == 0 {
        out.push_str(&node.name);
        out.push_str("/\n");
    } else if node.is_dir {
        if depth == 1 {
            out.push_str(&format!("│   {}/\n", node.name));
        } else {
            match prefix.strip_suffix("    ") {
                Some(trimmed) => out.push_str(&format!("{trimmed}{}/\n", node.name)),
                None => out.push_str(&format!("{prefix}{}/\n", node.name)),
            }
        }
    } else if depth == 1 {
        out.push_str(&format!("│   ├── {}\n", node.name));
    } else {
        match prefix.strip_suffix("    ") {
            Some(trimmed) => out.push_str(&format!("{trimmed}├── {}\n", node.name)),
            None => out.push_str(&format!("{prefix}├── {}\n", node.name)),
        }
    }

    let children = store.children_of(id);
    for (index, &child) in children.iter().enumerate() {
        let is_last = index + 1 == children.len();
        let child_prefix = if depth == 0 {
            String::new()
        } else {
            format!("{prefix}{}", if is_last { "    " } else { "│   " })
        };
        render_node(store, child, depth + 1, &child_prefix, out);
    }
}

/*
 * Full relative paths (root segment first) of every node whose own `checked`
 * flag is set, sorted lexicographically. This flat export ignores ancestor
 * state on purpose: it reflects each node's flag, not the rendered subset.
 */
pub fn checked_paths(store: &TreeStore) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = store
        .pre_order()
        .into_iter()
        .filter(|&id| store.get(id).checked)
        .map(|id| store.full_path_of(id))
        .collect();
    paths.sort();
    paths
}

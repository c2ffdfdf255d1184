/*
 * Holds the mutable state of one loaded project: the scanned tree, the token
 * cache, and the root path everything was scanned from. Loading a project
 * discards the previous tree and token totals and rebuilds both from scratch;
 * nothing is persisted between runs. Collaborators (scanner, estimator) are
 * passed in per call, following the dependency-injection style of the rest of
 * the core.
 */
use super::file_system::{ProjectScannerOperations, Result, ScanError, ScanFilter};
use super::selection;
use super::token_counter::{FileTokenCache, TokenEstimatorOperations, format_token_count};
use super::tree_store::{NodeId, TreeStore};
use std::path::{Path, PathBuf};

#[derive(Default)]
pub struct ProjectSession {
    root_path: Option<PathBuf>,
    tree: TreeStore,
    tokens: FileTokenCache,
}

impl ProjectSession {
    pub fn new() -> Self {
        ProjectSession {
            root_path: None,
            tree: TreeStore::new(),
            tokens: FileTokenCache::new(),
        }
    }

    pub fn tree(&self) -> &TreeStore {
        &self.tree
    }

    pub fn root_path(&self) -> Option<&Path> {
        self.root_path.as_deref()
    }

    /*
     * Scans `root_path` and replaces the session's tree and token totals with
     * the result. The previous tree and the whole token cache are discarded
     * first, so two loads of an unchanged directory produce trees that
     * serialize identically.
     */
    pub fn load_project(
        &mut self,
        scanner: &dyn ProjectScannerOperations,
        estimator: &dyn TokenEstimatorOperations,
        filter: &ScanFilter,
        root_path: &Path,
    ) -> Result<()> {
        let canonical = root_path
            .canonicalize()
            .map_err(|_| ScanError::InvalidPath(root_path.to_path_buf()))?;
        log::debug!("ProjectSession: Loading project from {canonical:?}.");

        self.tree = scanner.scan_project(&canonical, filter)?;
        self.root_path = Some(canonical);

        let base = self.base_dir();
        let files: Vec<PathBuf> = self
            .tree
            .pre_order()
            .into_iter()
            .filter(|&id| !self.tree.get(id).is_dir)
            .map(|id| base.join(self.tree.full_path_of(id)))
            .collect();
        let total = self.tokens.update_total_for_files(estimator, &files);
        log::debug!(
            "ProjectSession: Loaded {} nodes, {} file tokens.",
            self.tree.len(),
            total
        );
        Ok(())
    }

    /// Flips `id` and cascades the new state through its subtree.
    pub fn toggle(&mut self, id: NodeId) {
        selection::toggle(&mut self.tree, id);
    }

    /*
     * Toggles the first node (pre-order) whose display name matches exactly.
     * Returns false when no node carries that name; absence is reported
     * explicitly instead of being folded into some default behavior.
     */
    pub fn toggle_by_name(&mut self, name: &str) -> bool {
        match self.tree.find_by_display_name(name) {
            Some(id) => {
                selection::toggle(&mut self.tree, id);
                true
            }
            None => {
                log::warn!("ProjectSession: No tree entry named '{name}' to toggle.");
                false
            }
        }
    }

    /*
     * Toggles the node at a root-first segment path. Unlike `toggle_by_name`
     * this is unambiguous under duplicate display names.
     */
    pub fn toggle_at_path(&mut self, segments: &[&str]) -> bool {
        match self.tree.node_at_path(segments) {
            Some(id) => {
                selection::toggle(&mut self.tree, id);
                true
            }
            None => {
                log::warn!("ProjectSession: No tree entry at path {segments:?} to toggle.");
                false
            }
        }
    }

    /// The checked subset rendered as the ASCII outline.
    pub fn outline(&self) -> String {
        selection::serialize_checked_subset(&self.tree)
    }

    /*
     * Every checked node's absolute path, sorted, one bullet line each. This
     * export reads the per-node flag directly rather than the rendered
     * subset.
     */
    pub fn checked_path_list(&self) -> String {
        let base = self.base_dir();
        let mut out = String::new();
        for path in selection::checked_paths(&self.tree) {
            out.push_str(&format!("• {}\n", base.join(path).display()));
        }
        out
    }

    pub fn total_tokens(&self) -> usize {
        self.tokens.total_tokens()
    }

    /// The header label shown next to the outline, e.g. `Total Tokens: 1.2k`.
    pub fn total_tokens_label(&self) -> String {
        format!("Total Tokens: {}", format_token_count(self.tokens.total_tokens()))
    }

    /*
     * Formatted token count and percentage-of-total for one node. For a
     * directory this sums every file in its subtree, served from the session
     * cache.
     */
    pub fn node_token_stats(
        &mut self,
        estimator: &dyn TokenEstimatorOperations,
        id: NodeId,
    ) -> (String, f64) {
        let base = self.base_dir();
        let mut tokens = 0usize;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if self.tree.get(current).is_dir {
                stack.extend(self.tree.children_of(current).iter().copied());
            } else {
                let path = base.join(self.tree.full_path_of(current));
                tokens += self.tokens.count_file_tokens(estimator, &path);
            }
        }
        let percentage = if self.total_tokens() > 0 {
            tokens as f64 / self.total_tokens() as f64 * 100.0
        } else {
            0.0
        };
        (format_token_count(tokens), percentage)
    }

    // Node paths start with the root's own segment, so absolute paths are
    // joined from the scan root's parent directory.
    fn base_dir(&self) -> PathBuf {
        self.root_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }
}

/*
 * File system scanning: walks a project directory and populates a `TreeStore`
 * from the entries that pass a fixed inclusion predicate. The walk is
 * best-effort: unreadable subtrees are logged and omitted rather than failing
 * the whole scan. The module defines a `ProjectScannerOperations` trait so
 * callers can substitute the scanner in tests, and a concrete
 * `CoreProjectScanner` built on the `ignore` crate's walker.
 */
use super::tree_store::{NodeId, TreeStore};
use ignore::WalkBuilder;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/*
 * The fixed inclusion rules applied to every entry below the scan root:
 * reject names in the ignore set, reject any name starting with a dot, and
 * for files require an allow-listed extension. Directories that pass the name
 * checks are always descended into.
 */
#[derive(Debug, Clone)]
pub struct ScanFilter {
    ignored_names: HashSet<String>,
    allowed_extensions: HashSet<String>,
}

impl ScanFilter {
    /// Extensions are given without the leading dot, e.g. `["php"]`.
    pub fn new(
        ignored_names: impl IntoIterator<Item = String>,
        allowed_extensions: impl IntoIterator<Item = String>,
    ) -> Self {
        ScanFilter {
            ignored_names: ignored_names.into_iter().collect(),
            allowed_extensions: allowed_extensions.into_iter().collect(),
        }
    }

    pub fn should_include(&self, name: &str, is_dir: bool) -> bool {
        if self.ignored_names.contains(name) {
            return false;
        }
        if name.starts_with('.') {
            return false;
        }
        if !is_dir {
            return match name.rsplit_once('.') {
                Some((_, extension)) => self.allowed_extensions.contains(extension),
                None => false,
            };
        }
        true
    }
}

impl Default for ScanFilter {
    /*
     * The stock project filter: dependency and build-output directories are
     * ignored, and only PHP sources survive the extension allow-list.
     */
    fn default() -> Self {
        ScanFilter::new(
            [
                "node_modules",
                "vendor",
                "storage",
                "bootstrap/cache",
                ".git",
                ".env",
            ]
            .map(String::from),
            ["php".to_string()],
        )
    }
}

#[derive(Debug)]
pub enum ScanError {
    Io(io::Error),
    Walk(ignore::Error),
    InvalidPath(PathBuf),
}

impl From<io::Error> for ScanError {
    fn from(err: io::Error) -> Self {
        ScanError::Io(err)
    }
}

impl From<ignore::Error> for ScanError {
    fn from(err: ignore::Error) -> Self {
        ScanError::Walk(err)
    }
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::Io(e) => write!(f, "I/O error: {e}"),
            ScanError::Walk(e) => write!(f, "Directory walk error: {e}"),
            ScanError::InvalidPath(p) => write!(f, "Not a project directory: {p:?}"),
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScanError::Io(e) => Some(e),
            ScanError::Walk(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

/*
 * Abstraction over project scanning so session logic and tests are not bound
 * to the real file system walker.
 */
pub trait ProjectScannerOperations: Send + Sync {
    /*
     * Scans `root_path` recursively and builds a `TreeStore` whose root node
     * carries the directory's base name. Entries below the root are consumed
     * in lexicographic name order and filtered through `filter`; every
     * created node starts checked.
     */
    fn scan_project(&self, root_path: &Path, filter: &ScanFilter) -> Result<TreeStore>;
}

pub struct CoreProjectScanner {}

impl CoreProjectScanner {
    pub fn new() -> Self {
        CoreProjectScanner {}
    }
}

impl Default for CoreProjectScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectScannerOperations for CoreProjectScanner {
    /*
     * Walks `root_path` with the `ignore` crate's walker. Gitignore-style
     * standard filters are disabled; the fixed `ScanFilter` predicate is the
     * only inclusion rule. Entries whose parent was omitted, and entries that
     * fail to read (permissions, broken links), are skipped with a warning.
     * The scan reports what it could see rather than erroring out.
     */
    fn scan_project(&self, root_path: &Path, filter: &ScanFilter) -> Result<TreeStore> {
        if !root_path.is_dir() {
            return Err(ScanError::InvalidPath(root_path.to_path_buf()));
        }
        log::debug!("ProjectScanner: Scanning directory {root_path:?}.");

        let mut builder = WalkBuilder::new(root_path);
        builder
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        let entry_filter = filter.clone();
        builder.filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true; // the root itself is never filtered
            }
            let name = entry.file_name().to_string_lossy();
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            entry_filter.should_include(&name, is_dir)
        });

        let mut store = TreeStore::new();
        let mut ids_by_path: HashMap<PathBuf, NodeId> = HashMap::new();

        for entry_result in builder.build() {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(err) => {
                    if store.is_empty() {
                        // Nothing scanned yet: the root itself is unreadable.
                        return Err(err.into());
                    }
                    log::warn!("ProjectScanner: Skipping unreadable entry: {err}");
                    continue;
                }
            };

            let path = entry.path().to_path_buf();
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());

            if entry.depth() == 0 {
                let root_name = root_path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| root_path.display().to_string());
                let root_id = store.insert(None, root_name, true);
                ids_by_path.insert(path, root_id);
                continue;
            }

            let Some(parent_id) = path.parent().and_then(|p| ids_by_path.get(p)).copied() else {
                log::warn!("ProjectScanner: Parent of {path:?} was omitted; skipping subtree.");
                continue;
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            let id = store.insert(Some(parent_id), name, is_dir);
            if is_dir {
                ids_by_path.insert(path, id);
            }
        }

        log::debug!(
            "ProjectScanner: Scan complete, {} nodes for {:?}.",
            store.len(),
            root_path
        );
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::selection;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn scan(path: &Path) -> Result<TreeStore> {
        CoreProjectScanner::new().scan_project(path, &ScanFilter::default())
    }

    #[test]
    fn test_should_include_accepts_only_allowed_sources() {
        let filter = ScanFilter::default();
        assert!(filter.should_include("a.php", false));
        assert!(!filter.should_include("a.js", false));
        assert!(!filter.should_include(".env", false));
        assert!(!filter.should_include("node_modules", true));
    }

    #[test]
    fn test_should_include_directory_rules() {
        let filter = ScanFilter::default();
        assert!(filter.should_include("app", true));
        assert!(!filter.should_include(".git", true));
        assert!(!filter.should_include("vendor", true));
        assert!(!filter.should_include("storage", true));
        assert!(!filter.should_include(".hidden", true));
    }

    #[test]
    fn test_should_include_extension_edge_cases() {
        let filter = ScanFilter::default();
        assert!(!filter.should_include("php", false), "no extension at all");
        assert!(!filter.should_include("a.PHP", false), "case-sensitive");
        assert!(!filter.should_include("a.php.bak", false));
        assert!(filter.should_include("index.blade.php", false));
    }

    #[test]
    fn test_custom_extension_allow_list() {
        let filter = ScanFilter::new(
            ["target".to_string()],
            ["rs".to_string(), "toml".to_string()],
        );
        assert!(filter.should_include("main.rs", false));
        assert!(filter.should_include("Cargo.toml", false));
        assert!(!filter.should_include("a.php", false));
        assert!(!filter.should_include("target", true));
    }

    #[test]
    fn test_scan_builds_filtered_sorted_tree() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("app"))?;
        fs::create_dir_all(dir.path().join("node_modules").join("pkg"))?;
        File::create(dir.path().join("app").join("b.php"))?.sync_all()?;
        File::create(dir.path().join("app").join("a.php"))?.sync_all()?;
        File::create(dir.path().join("app").join("a.js"))?.sync_all()?;
        File::create(dir.path().join(".env"))?.sync_all()?;
        File::create(dir.path().join("index.php"))?.sync_all()?;

        let store = scan(dir.path())?;
        let root = store.root().expect("scan must produce a root");
        assert!(store.get(root).is_dir);
        assert!(store.get(root).checked, "all nodes start checked");

        let top_level: Vec<&str> = store
            .children_of(root)
            .iter()
            .map(|&id| store.get(id).name.as_str())
            .collect();
        assert_eq!(
            top_level,
            vec!["app", "index.php"],
            "filtered entries in lexicographic order"
        );

        let app = store.children_of(root)[0];
        let app_children: Vec<&str> = store
            .children_of(app)
            .iter()
            .map(|&id| store.get(id).name.as_str())
            .collect();
        assert_eq!(app_children, vec!["a.php", "b.php"]);
        Ok(())
    }

    #[test]
    fn test_scan_root_named_after_directory() -> Result<()> {
        let dir = tempdir()?;
        let project = dir.path().join("myproj");
        fs::create_dir_all(&project)?;
        let store = scan(&project)?;
        assert_eq!(store.get(store.root().unwrap()).name, "myproj");
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[test]
    fn test_scan_rejects_non_directory_root() {
        let result = scan(Path::new("this_path_should_not_exist_anywhere"));
        assert!(matches!(result, Err(ScanError::InvalidPath(_))));
    }

    #[test]
    fn test_scan_files_never_gain_children() -> Result<()> {
        let dir = tempdir()?;
        File::create(dir.path().join("only.php"))?.sync_all()?;
        let store = scan(dir.path())?;
        let root = store.root().unwrap();
        let file = store.children_of(root)[0];
        assert!(!store.get(file).is_dir);
        assert!(store.children_of(file).is_empty());
        Ok(())
    }

    #[test]
    fn test_repeated_scans_serialize_identically() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("lib"))?;
        File::create(dir.path().join("lib").join("a.php"))?.sync_all()?;
        File::create(dir.path().join("main.php"))?.sync_all()?;

        let first = selection::serialize_checked_subset(&scan(dir.path())?);
        let second = selection::serialize_checked_subset(&scan(dir.path())?);
        assert_eq!(first, second);
        // a.php is the last (only) child of lib, so its line pulls in one
        // indent level; main.php sits at depth 1.
        assert!(first.contains("│   lib/\n├── a.php\n│   ├── main.php\n"));
        Ok(())
    }
}

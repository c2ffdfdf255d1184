/*
 * Token estimation for project files. `TokenEstimatorOperations` abstracts the
 * per-string tokenizer; `CoreTikTokenEstimator` uses the `tiktoken-rs`
 * cl100k_base model and `WhitespaceTokenEstimator` is the cheap fallback.
 * `FileTokenCache` layers session-scoped per-path caching on top, along with
 * the binary/excluded-file short-circuits: those files count as zero tokens,
 * silently. The cache is invalidated wholesale whenever a new project loads.
 */
use log::error;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tiktoken_rs::{CoreBPE, cl100k_base};

/*
 * Extensions whose files are never tokenized: binaries, media, fonts, and
 * generated or ancillary text that would only inflate the totals.
 */
const SKIP_EXTENSIONS: &[&str] = &[
    "exe", "dll", "so", "dylib", "node", "bin", "jpg", "jpeg", "png", "gif", "ico", "svg", "woff",
    "woff2", "ttf", "eot", "css", "js", "json", "lock", "md", "xml", "yml", "yaml",
];

const BINARY_SNIFF_LEN: usize = 1024;

/*
 * Contract for a service that counts tokens in a text. What a "token" is
 * depends on the implementation.
 */
pub trait TokenEstimatorOperations: Send + Sync {
    fn count_tokens(&self, text: &str) -> usize;
}

/*
 * Estimator backed by the `tiktoken-rs` cl100k_base model (the encoding used
 * by OpenAI's GPT-3.5/GPT-4 family). The BPE tables are built once at
 * construction; if that fails, an error is logged and every call falls back
 * to a whitespace split so counting stays functional, just less accurate.
 */
pub struct CoreTikTokenEstimator {
    bpe: Option<CoreBPE>,
}

impl CoreTikTokenEstimator {
    pub fn new() -> Self {
        let bpe = match cl100k_base() {
            Ok(bpe) => Some(bpe),
            Err(e) => {
                error!(
                    "TokenEstimator: Failed to initialize cl100k_base BPE: {e:?}. \
                     Falling back to whitespace counting."
                );
                None
            }
        };
        CoreTikTokenEstimator { bpe }
    }
}

impl Default for CoreTikTokenEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenEstimatorOperations for CoreTikTokenEstimator {
    fn count_tokens(&self, text: &str) -> usize {
        match &self.bpe {
            Some(bpe) => bpe.encode_with_special_tokens(text).len(),
            None => text.split_whitespace().count(),
        }
    }
}

/// Estimates tokens as whitespace-separated words. Very rough, very fast.
pub struct WhitespaceTokenEstimator;

impl WhitespaceTokenEstimator {
    pub fn new() -> Self {
        WhitespaceTokenEstimator
    }
}

impl TokenEstimatorOperations for WhitespaceTokenEstimator {
    fn count_tokens(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

/*
 * Session-scoped cache of per-file token counts plus the running project
 * total. Results are keyed by path and reused for the life of the session;
 * a new project load calls `update_total_for_files`, which throws the whole
 * cache away first. Files that are excluded by extension, look binary, or
 * cannot be read as UTF-8 are recorded as zero tokens without reporting an
 * error.
 */
#[derive(Debug, Default)]
pub struct FileTokenCache {
    counts_by_path: HashMap<PathBuf, usize>,
    total_tokens: usize,
}

impl FileTokenCache {
    pub fn new() -> Self {
        FileTokenCache {
            counts_by_path: HashMap::new(),
            total_tokens: 0,
        }
    }

    /// Drops every cached count and zeroes the total.
    pub fn invalidate(&mut self) {
        self.counts_by_path.clear();
        self.total_tokens = 0;
    }

    pub fn total_tokens(&self) -> usize {
        self.total_tokens
    }

    /*
     * Returns the token count for `path`, computing and caching it on first
     * use. A cached value is returned as-is even if the file has changed on
     * disk since; the cache only resets on project load.
     */
    pub fn count_file_tokens(
        &mut self,
        estimator: &dyn TokenEstimatorOperations,
        path: &Path,
    ) -> usize {
        if let Some(&count) = self.counts_by_path.get(path) {
            return count;
        }

        let count = if has_skipped_extension(path) || looks_binary(path) {
            log::debug!("TokenCache: Skipping binary or excluded file {path:?}.");
            0
        } else {
            match fs::read_to_string(path) {
                Ok(content) => estimator.count_tokens(&content),
                Err(e) => {
                    log::debug!("TokenCache: Failed to read {path:?}: {e}; counting as zero.");
                    0
                }
            }
        };

        self.counts_by_path.insert(path.to_path_buf(), count);
        count
    }

    /*
     * Recomputes the project total over the given file paths, invalidating
     * the cache wholesale first. Returns the new total.
     */
    pub fn update_total_for_files(
        &mut self,
        estimator: &dyn TokenEstimatorOperations,
        files: &[PathBuf],
    ) -> usize {
        self.invalidate();
        let mut total = 0usize;
        for path in files {
            total += self.count_file_tokens(estimator, path);
        }
        self.total_tokens = total;
        log::debug!("TokenCache: Updated total tokens: {total}.");
        total
    }

    /*
     * Formatted count and percentage-of-total for one file, e.g.
     * `("1.2k", 34.5)`. Percentage is zero when no total has been computed.
     */
    pub fn file_stats(
        &mut self,
        estimator: &dyn TokenEstimatorOperations,
        path: &Path,
    ) -> (String, f64) {
        let tokens = self.count_file_tokens(estimator, path);
        let percentage = if self.total_tokens > 0 {
            tokens as f64 / self.total_tokens as f64 * 100.0
        } else {
            0.0
        };
        (format_token_count(tokens), percentage)
    }
}

/// Formats a count for display: `"874"` below one thousand, `"1.2k"` above.
pub fn format_token_count(tokens: usize) -> String {
    if tokens >= 1000 {
        format!("{:.1}k", tokens as f64 / 1000.0)
    } else {
        tokens.to_string()
    }
}

fn has_skipped_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SKIP_EXTENSIONS.contains(&ext.as_str()))
}

/*
 * A file is treated as binary when its first kilobyte contains a NUL byte.
 * Unreadable files are treated as binary too, which routes them to the
 * zero-token path.
 */
fn looks_binary(path: &Path) -> bool {
    let Ok(mut file) = File::open(path) else {
        return true;
    };
    let mut buffer = [0u8; BINARY_SNIFF_LEN];
    let mut filled = 0usize;
    while filled < buffer.len() {
        match file.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(_) => return true,
        }
    }
    buffer[..filled].contains(&0)
}

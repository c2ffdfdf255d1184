/*
 * This module consolidates the core logic of the application: the arena-backed
 * tree of project entries, the selection engine (cascade toggling and outline
 * serialization), the filtered directory scanner, token estimation with its
 * session cache, and the project session that ties them together. Key types
 * and the operation traits (`ProjectScannerOperations`,
 * `TokenEstimatorOperations`) are re-exported here for consumers.
 */
pub mod file_system;
pub mod project_session;
pub mod selection;
pub mod token_counter;
pub mod tree_store;

// Re-export the tree model
pub use tree_store::{Node, NodeId, TreeStore};

// Re-export selection engine operations
pub use selection::{checked_paths, serialize_checked_subset, toggle};

// Re-export scanner related items
pub use file_system::{CoreProjectScanner, ProjectScannerOperations, ScanError, ScanFilter};

// Re-export token estimation related items
pub use token_counter::{
    CoreTikTokenEstimator, FileTokenCache, TokenEstimatorOperations, WhitespaceTokenEstimator,
    format_token_count,
};

pub use project_session::ProjectSession;

//! Selection and aggregation core for yanking parts of a directory tree into
//! one LLM-ready text block.
//!
//! A [`Session`] owns an immutable [`Tree`] snapshot built by the
//! [`TreeBuilder`], the selected and expanded path sets, and a lazily filled
//! line-count cache. Output text and the ASCII structure view are generated
//! from the snapshot on demand.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod file_scanner;
pub mod metrics;
pub mod scheduler;
pub mod selection;
pub mod session;
pub mod stats;
pub mod tree_builder;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::{Aggregation, generate, generate_ascii_tree};
pub use config::{Config, Preferences, Theme};
pub use error::{CoreError, Result, Warning, WarningKind};
pub use file_scanner::{FileSource, FileText, FsSource, PathPicker, RootPicker, SourceEntry};
pub use metrics::{TextMetrics, estimate_tokens, minify, savings_percent};
pub use scheduler::GenerationScheduler;
pub use selection::{
    NodeStatistics, PathSet, SelectionModel, compute_node_statistics, statistics_by_path,
};
pub use session::{FolderOpen, Session};
pub use stats::{StatsCache, count_lines};
pub use tree_builder::{ExclusionSet, Node, NodeKind, Tree, TreeBuilder};

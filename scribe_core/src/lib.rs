//! Core library for scribe's comment workflow.
//!
//! The crate is layered around four responsibilities:
//! - locating declarations through language plugins and building oracle context
//! - generating comment text through a cached oracle adapter
//! - splicing formatted comments into source buffers
//! - reporting how a file's comments evolved across git history

#![warn(
    clippy::all,
    clippy::cargo,
    clippy::nursery,
    clippy::pedantic,
    missing_docs
)]
#![cfg_attr(
    not(test),
    deny(
        clippy::dbg_macro,
        clippy::expect_used,
        clippy::panic,
        clippy::print_stderr,
        clippy::print_stdout,
        clippy::todo,
        clippy::unwrap_used
    )
)]

/// Declaration pipeline: plugin resolution through file rewrite.
pub mod annotator;
/// Configuration file support.
pub mod config;
/// Generation context derived from declarations.
pub mod context;
/// Comment history across commits.
pub mod history;
/// Splicing formatted comments into source buffers.
pub mod insertion;
/// Tracing subscriber setup.
pub mod logging;
/// Comment oracle boundary, cache and built-in oracles.
pub mod oracle;
/// Language plugin registry integration.
pub mod plugins;
/// Git repository access.
pub mod repository;

pub use annotator::{AnnotateOptions, Annotation, Annotator, BatchReport, FileOutcome, FileReport};
pub use config::ScribeConfig;
pub use context::ContextBuilder;
pub use history::CommentHistory;
pub use insertion::{InsertionEngine, InsertionError, SourceBuffer};
pub use oracle::{
    CommandOracle, CommentCache, CommentGenerator, CommentOracle, OracleError, OracleRequest,
    OracleResponse, OutlineOracle,
};
pub use repository::Repository;
pub use scribe_api::{
    CommentStyle, CommitCommentDelta, Declaration, DeclarationKind, FileFacts, FormattedComment,
    GenerationContext,
};
pub use scribe_plugin_api::ParseError;

/// Common result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No plugin handles the requested language or extension.
    #[error("unsupported language: {language}")]
    UnsupportedLanguage {
        /// Language identifier, extension or path that failed to resolve.
        language: String,
    },
    /// Source text could not be parsed; nothing was written.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File (or in-memory origin) that failed to parse.
        path: String,
        /// Parser diagnostic with the first error location.
        #[source]
        source: ParseError,
    },
    /// A plugin failed for reasons other than malformed input.
    #[error("plugin '{plugin}' failed: {source}")]
    Plugin {
        /// Plugin identifier.
        plugin: String,
        /// Underlying plugin error.
        #[source]
        source: scribe_plugin_api::PluginError,
    },
    /// Comments could not be spliced into the buffer; nothing was written.
    #[error("failed to insert comments into {path}: {source}")]
    Insertion {
        /// Target file.
        path: String,
        /// Underlying insertion error.
        #[source]
        source: InsertionError,
    },
    /// The oracle failed for one declaration, aborting its file.
    #[error("oracle failed for {name} at {path}:{line}: {source}")]
    Oracle {
        /// Target file.
        path: String,
        /// 1-based line of the declaration.
        line: u32,
        /// Declaration name.
        name: String,
        /// Underlying oracle error.
        #[source]
        source: OracleError,
    },
    /// Underlying git operation failed.
    #[error("git error: {source}")]
    Git {
        /// Original libgit2 error bubbled up by the core library.
        #[from]
        source: git2::Error,
    },
    /// Provided path does not correspond to a git repository.
    #[error("path does not reference a git repository: {path}")]
    NotARepository {
        /// Path that failed to resolve to a repository.
        path: String,
    },
    /// Bare repositories are currently unsupported.
    #[error("repository at {path} is bare and unsupported")]
    BareRepository {
        /// Path of the repository lacking a working tree.
        path: String,
    },
    /// Path escapes the repository working tree.
    #[error("path is outside the repository: {path}")]
    PathOutsideRepository {
        /// Offending path.
        path: String,
    },
    /// Configuration could not be loaded or applied.
    #[error("invalid configuration in {path}: {message}")]
    Config {
        /// Configuration source.
        path: String,
        /// Description of the problem.
        message: String,
    },
    /// Filesystem interaction failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// Filesystem path involved in the failed operation.
        path: String,
        /// Source I/O error returned by the standard library.
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

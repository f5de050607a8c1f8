mod registry;
mod syntax;
mod types;

pub use registry::PluginRegistry;
pub use syntax::CommentSyntax;
pub use types::{parse_source, ParseError, PluginError, PluginResult, PluginSummary, SyntaxTree};

use scribe_api::{CommentStyle, Declaration};

/// Trait implemented once per supported language.
///
/// Implementations are stateless: every method is a pure function of its
/// arguments, so a single instance is shared across threads for the life of
/// the process.
pub trait LanguagePlugin: Send + Sync {
    /// Stable identifier used for lookup and logging (e.g. `python`).
    fn id(&self) -> &'static str;

    /// Human-friendly label.
    fn label(&self) -> &'static str;

    /// File extensions handled by the plugin, each with a leading dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Comment delimiters used for rendering and extraction.
    fn comment_syntax(&self) -> CommentSyntax;

    /// Style used when the caller does not pick one.
    fn default_style(&self) -> CommentStyle;

    /// Parse source text into an opaque syntax tree.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Parse`] with the first error location when the
    /// source is malformed.
    fn parse(&self, source: &str) -> PluginResult<SyntaxTree>;

    /// Walk the tree and return every function, method and class definition,
    /// nested ones included, ordered by ascending start line.
    fn extract_declarations(&self, tree: &SyntaxTree, source: &str) -> Vec<Declaration>;

    /// Imports, packages or headers referenced at file level.
    fn collect_imports(&self, tree: &SyntaxTree, source: &str) -> Vec<String>;

    /// Render `text` as comment lines indented by `indent` spaces.
    ///
    /// Styles the language does not support fall back to line comments.
    fn format_comment(&self, text: &str, indent: usize, style: CommentStyle) -> Vec<String>;

    /// Extract comment text lines from a buffer using this language's syntax.
    fn extract_comments(&self, source: &str) -> Vec<String> {
        self.comment_syntax().extract_comments(source)
    }
}

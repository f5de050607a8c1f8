use std::fmt;

use serde::{Deserialize, Serialize};
use tree_sitter::{Language, Node, Parser, Tree};

/// Summary information about a registered plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSummary {
    /// Stable identifier for the plugin.
    pub id: String,
    /// Human-friendly label for display.
    pub label: String,
    /// Extensions claimed by the plugin.
    pub extensions: Vec<String>,
}

/// Parsed source handed back to the plugin that produced it.
///
/// Other components treat it as opaque.
pub struct SyntaxTree {
    tree: Tree,
}

impl SyntaxTree {
    /// Wrap a tree-sitter tree.
    #[must_use]
    pub const fn new(tree: Tree) -> Self {
        Self { tree }
    }

    /// Root node of the tree.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("root", &self.tree.root_node().kind())
            .finish_non_exhaustive()
    }
}

/// Parse `source` with `language`, rejecting trees that contain error or
/// missing nodes.
///
/// # Errors
///
/// Returns [`PluginError::Grammar`] if the grammar cannot be loaded and
/// [`PluginError::Parse`] pointing at the first syntax error.
pub fn parse_source(language: &Language, source: &str) -> PluginResult<SyntaxTree> {
    let mut parser = Parser::new();
    parser
        .set_language(language)
        .map_err(|err| PluginError::Grammar {
            message: err.to_string(),
        })?;

    let tree = parser.parse(source, None).ok_or_else(|| ParseError {
        line: 1,
        column: 1,
        message: "parser produced no tree".into(),
    })?;

    if let Some(err) = first_error(tree.root_node(), source) {
        return Err(err.into());
    }

    Ok(SyntaxTree::new(tree))
}

fn first_error(root: Node<'_>, source: &str) -> Option<ParseError> {
    if !root.has_error() {
        return None;
    }

    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_missing() {
            return Some(ParseError::at(node, format!("missing `{}`", node.kind())));
        }
        if node.is_error() {
            let text = source.get(node.byte_range()).unwrap_or_default();
            let excerpt: String = text
                .lines()
                .next()
                .unwrap_or_default()
                .chars()
                .take(40)
                .collect();
            return Some(ParseError::at(node, format!("unexpected `{}`", excerpt.trim())));
        }

        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node
            .children(&mut cursor)
            .filter(|child| child.has_error())
            .collect();
        stack.extend(children.into_iter().rev());
    }

    Some(ParseError {
        line: 1,
        column: 1,
        message: "syntax error".into(),
    })
}

/// Location and description of malformed source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error at {line}:{column}: {message}")]
pub struct ParseError {
    /// 1-based line of the first error.
    pub line: u32,
    /// 1-based column of the first error.
    pub column: u32,
    /// Short description of the problem.
    pub message: String,
}

impl ParseError {
    fn at(node: Node<'_>, message: String) -> Self {
        let point = node.start_position();
        Self {
            line: u32::try_from(point.row + 1).unwrap_or(u32::MAX),
            column: u32::try_from(point.column + 1).unwrap_or(u32::MAX),
            message,
        }
    }
}

/// Errors surfaced by language plugins and the registry.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// No plugin is registered for the language or extension.
    #[error("unsupported language: {language}")]
    UnsupportedLanguage {
        /// Identifier or extension that failed to resolve.
        language: String,
    },
    /// Source text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The tree-sitter grammar could not be loaded.
    #[error("failed to load grammar: {message}")]
    Grammar {
        /// Loader message.
        message: String,
    },
}

impl PluginError {
    /// Helper for unsupported languages.
    #[must_use]
    pub fn unsupported(language: impl Into<String>) -> Self {
        Self::UnsupportedLanguage {
            language: language.into(),
        }
    }
}

/// Convenience result alias for plugin operations.
pub type PluginResult<T> = std::result::Result<T, PluginError>;

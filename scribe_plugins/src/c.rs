use scribe_api::{CommentStyle, Declaration};
use scribe_plugin_api::{parse_source, CommentSyntax, LanguagePlugin, PluginResult, SyntaxTree};

use crate::c_family;

/// C plugin backed by `tree-sitter-c`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CPlugin;

impl LanguagePlugin for CPlugin {
    fn id(&self) -> &'static str {
        "c"
    }

    fn label(&self) -> &'static str {
        "C"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".c"]
    }

    fn comment_syntax(&self) -> CommentSyntax {
        CommentSyntax::C_LIKE
    }

    fn default_style(&self) -> CommentStyle {
        CommentStyle::Doxygen
    }

    fn parse(&self, source: &str) -> PluginResult<SyntaxTree> {
        parse_source(&tree_sitter_c::LANGUAGE.into(), source)
    }

    fn extract_declarations(&self, tree: &SyntaxTree, source: &str) -> Vec<Declaration> {
        c_family::extract_declarations(tree, source)
    }

    fn collect_imports(&self, tree: &SyntaxTree, source: &str) -> Vec<String> {
        c_family::collect_includes(tree, source)
    }

    fn format_comment(&self, text: &str, indent: usize, style: CommentStyle) -> Vec<String> {
        c_family::format_comment(text, indent, style)
    }
}

use scribe_api::{CommentStyle, Declaration, DeclarationKind};
use scribe_plugin_api::{parse_source, CommentSyntax, LanguagePlugin, PluginResult, SyntaxTree};
use tree_sitter::Node;

use crate::ast::{field_text, in_source_order, leading_comment, preorder, start_line, text};

const FUNCTION_VALUES: &[&str] = &[
    "arrow_function",
    "function",
    "function_expression",
    "generator_function",
];

/// JavaScript plugin backed by `tree-sitter-javascript`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JavaScriptPlugin;

impl LanguagePlugin for JavaScriptPlugin {
    fn id(&self) -> &'static str {
        "javascript"
    }

    fn label(&self) -> &'static str {
        "JavaScript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".js", ".mjs", ".cjs", ".jsx"]
    }

    fn comment_syntax(&self) -> CommentSyntax {
        CommentSyntax::C_LIKE
    }

    fn default_style(&self) -> CommentStyle {
        CommentStyle::Jsdoc
    }

    fn parse(&self, source: &str) -> PluginResult<SyntaxTree> {
        parse_source(&tree_sitter_javascript::LANGUAGE.into(), source)
    }

    fn extract_declarations(&self, tree: &SyntaxTree, source: &str) -> Vec<Declaration> {
        let syntax = self.comment_syntax();
        let mut declarations = Vec::new();

        for node in preorder(tree.root()) {
            let (kind, anchor) = match node.kind() {
                "function_declaration" | "generator_function_declaration" => {
                    (DeclarationKind::Function, exported(node))
                }
                "class_declaration" => (DeclarationKind::Class, exported(node)),
                "method_definition" => (DeclarationKind::Method, node),
                "variable_declarator" if binds_function(node) => {
                    let Some(statement) = node.parent() else {
                        continue;
                    };
                    (DeclarationKind::Function, exported(statement))
                }
                _ => continue,
            };

            declarations.push(
                Declaration::new(
                    kind,
                    field_text(node, "name", source).unwrap_or_default(),
                    start_line(anchor),
                    text(anchor, source),
                )
                .with_existing_doc(leading_comment(anchor, source, &syntax, &["comment"])),
            );
        }

        in_source_order(declarations)
    }

    fn collect_imports(&self, tree: &SyntaxTree, source: &str) -> Vec<String> {
        let root = tree.root();
        let mut cursor = root.walk();
        root.named_children(&mut cursor)
            .filter(|child| child.kind() == "import_statement")
            .filter_map(|statement| field_text(statement, "source", source))
            .map(|module| module.trim_matches(|c| c == '"' || c == '\'').to_owned())
            .collect()
    }

    fn format_comment(&self, text: &str, indent: usize, style: CommentStyle) -> Vec<String> {
        let syntax = self.comment_syntax();
        match style {
            CommentStyle::Jsdoc => syntax.star_block(text, indent),
            _ => syntax.line_comment(text, indent),
        }
    }
}

/// Widen to the enclosing `export` statement when there is one.
fn exported(node: Node<'_>) -> Node<'_> {
    match node.parent() {
        Some(parent) if parent.kind() == "export_statement" => parent,
        _ => node,
    }
}

fn binds_function(declarator: Node<'_>) -> bool {
    declarator
        .child_by_field_name("value")
        .is_some_and(|value| FUNCTION_VALUES.contains(&value.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"import fs from "fs";
import { join } from 'path';

/**
 * Reads a file.
 */
export function read(path) {
  return fs.readFileSync(path);
}

class Store {
  get(key) {
    return this.items[key];
  }
}

const add = (a, b) => a + b;
"#;

    #[test]
    fn finds_functions_classes_methods_and_bound_arrows() {
        let plugin = JavaScriptPlugin;
        let tree = plugin.parse(SOURCE).expect("parse");
        let found = plugin.extract_declarations(&tree, SOURCE);

        let summary: Vec<(DeclarationKind, &str, u32)> = found
            .iter()
            .map(|decl| (decl.kind, decl.name.as_str(), decl.start_line))
            .collect();
        assert_eq!(
            summary,
            vec![
                (DeclarationKind::Function, "read", 7),
                (DeclarationKind::Class, "Store", 11),
                (DeclarationKind::Method, "get", 12),
                (DeclarationKind::Function, "add", 17),
            ]
        );
        assert_eq!(found[0].existing_doc.as_deref(), Some("Reads a file."));
        assert!(found[0].source_snippet.starts_with("export function read"));
        assert_eq!(found[3].source_snippet, "const add = (a, b) => a + b;");
    }

    #[test]
    fn import_sources_are_unquoted() {
        let plugin = JavaScriptPlugin;
        let tree = plugin.parse(SOURCE).expect("parse");
        assert_eq!(plugin.collect_imports(&tree, SOURCE), vec!["fs", "path"]);
    }

    #[test]
    fn jsdoc_renders_star_block() {
        let lines = JavaScriptPlugin.format_comment("Adds.", 2, CommentStyle::Jsdoc);
        assert_eq!(lines, vec!["  /**", "   * Adds.", "   */"]);

        let lines = JavaScriptPlugin.format_comment("Adds.", 0, CommentStyle::Google);
        assert_eq!(lines, vec!["// Adds."]);
    }
}

use scribe_api::{CommentStyle, Declaration, DeclarationKind};
use scribe_plugin_api::{parse_source, CommentSyntax, LanguagePlugin, PluginResult, SyntaxTree};

use crate::ast::{field_text, in_source_order, leading_comment, preorder, start_line, text};

const COMMENT_KINDS: &[&str] = &["block_comment", "line_comment", "comment"];

/// Java plugin backed by `tree-sitter-java`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JavaPlugin;

impl LanguagePlugin for JavaPlugin {
    fn id(&self) -> &'static str {
        "java"
    }

    fn label(&self) -> &'static str {
        "Java"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".java"]
    }

    fn comment_syntax(&self) -> CommentSyntax {
        CommentSyntax::C_LIKE
    }

    fn default_style(&self) -> CommentStyle {
        CommentStyle::Javadoc
    }

    fn parse(&self, source: &str) -> PluginResult<SyntaxTree> {
        parse_source(&tree_sitter_java::LANGUAGE.into(), source)
    }

    fn extract_declarations(&self, tree: &SyntaxTree, source: &str) -> Vec<Declaration> {
        let syntax = self.comment_syntax();
        let mut declarations = Vec::new();

        for node in preorder(tree.root()) {
            let kind = match node.kind() {
                "class_declaration"
                | "interface_declaration"
                | "enum_declaration"
                | "record_declaration"
                | "annotation_type_declaration" => DeclarationKind::Class,
                "method_declaration" | "constructor_declaration" => DeclarationKind::Method,
                _ => continue,
            };

            declarations.push(
                Declaration::new(
                    kind,
                    field_text(node, "name", source).unwrap_or_default(),
                    start_line(node),
                    text(node, source),
                )
                .with_existing_doc(leading_comment(node, source, &syntax, COMMENT_KINDS)),
            );
        }

        in_source_order(declarations)
    }

    fn collect_imports(&self, tree: &SyntaxTree, source: &str) -> Vec<String> {
        let root = tree.root();
        let mut cursor = root.walk();
        root.named_children(&mut cursor)
            .filter(|child| child.kind() == "import_declaration")
            .map(|import| {
                text(import, source)
                    .trim_start_matches("import")
                    .trim_end_matches(';')
                    .trim()
                    .to_owned()
            })
            .collect()
    }

    fn format_comment(&self, text: &str, indent: usize, style: CommentStyle) -> Vec<String> {
        let syntax = self.comment_syntax();
        match style {
            CommentStyle::Javadoc => syntax.star_block(text, indent),
            _ => syntax.line_comment(text, indent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "package demo;\n\nimport java.util.List;\nimport static java.lang.Math.max;\n\n/** A counter. */\npublic class Counter {\n    private int count;\n\n    public Counter() {\n        this.count = 0;\n    }\n\n    // Bumps the count.\n    @Deprecated\n    public void increment() {\n        count++;\n    }\n}\n";

    #[test]
    fn classes_constructors_and_methods() {
        let plugin = JavaPlugin;
        let tree = plugin.parse(SOURCE).expect("parse");
        let found = plugin.extract_declarations(&tree, SOURCE);

        let summary: Vec<(DeclarationKind, &str, u32)> = found
            .iter()
            .map(|decl| (decl.kind, decl.name.as_str(), decl.start_line))
            .collect();
        assert_eq!(
            summary,
            vec![
                (DeclarationKind::Class, "Counter", 7),
                (DeclarationKind::Method, "Counter", 10),
                (DeclarationKind::Method, "increment", 15),
            ]
        );
        assert_eq!(found[0].existing_doc.as_deref(), Some("A counter."));
        assert_eq!(found[2].existing_doc.as_deref(), Some("Bumps the count."));
    }

    #[test]
    fn imports_keep_static_marker() {
        let plugin = JavaPlugin;
        let tree = plugin.parse(SOURCE).expect("parse");
        assert_eq!(
            plugin.collect_imports(&tree, SOURCE),
            vec!["java.util.List", "static java.lang.Math.max"]
        );
    }

    #[test]
    fn javadoc_and_fallback() {
        let lines = JavaPlugin.format_comment("Counts.", 4, CommentStyle::Javadoc);
        assert_eq!(lines, vec!["    /**", "     * Counts.", "     */"]);

        let lines = JavaPlugin.format_comment("Counts.", 0, CommentStyle::Doxygen);
        assert_eq!(lines, vec!["// Counts."]);
    }
}

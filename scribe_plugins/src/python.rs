use scribe_api::{CommentStyle, Declaration, DeclarationKind};
use scribe_plugin_api::{parse_source, CommentSyntax, LanguagePlugin, PluginResult, SyntaxTree};
use tree_sitter::Node;

use crate::ast::{field_text, in_source_order, preorder, start_line, text};

/// Python plugin backed by `tree-sitter-python`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonPlugin;

impl LanguagePlugin for PythonPlugin {
    fn id(&self) -> &'static str {
        "python"
    }

    fn label(&self) -> &'static str {
        "Python"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".py", ".pyi"]
    }

    fn comment_syntax(&self) -> CommentSyntax {
        CommentSyntax::HASH
    }

    fn default_style(&self) -> CommentStyle {
        CommentStyle::Google
    }

    fn parse(&self, source: &str) -> PluginResult<SyntaxTree> {
        parse_source(&tree_sitter_python::LANGUAGE.into(), source)
    }

    fn extract_declarations(&self, tree: &SyntaxTree, source: &str) -> Vec<Declaration> {
        let mut declarations = Vec::new();

        for node in preorder(tree.root()) {
            let kind = match node.kind() {
                "function_definition" if inside_class(node) => DeclarationKind::Method,
                "function_definition" => DeclarationKind::Function,
                "class_definition" => DeclarationKind::Class,
                _ => continue,
            };

            let anchor = match node.parent() {
                Some(parent) if parent.kind() == "decorated_definition" => parent,
                _ => node,
            };

            let doc = node
                .child_by_field_name("body")
                .and_then(|body| docstring(body, source));

            declarations.push(
                Declaration::new(
                    kind,
                    field_text(node, "name", source).unwrap_or_default(),
                    start_line(anchor),
                    text(anchor, source),
                )
                .with_existing_doc(doc),
            );
        }

        in_source_order(declarations)
    }

    fn collect_imports(&self, tree: &SyntaxTree, source: &str) -> Vec<String> {
        let root = tree.root();
        let mut imports = Vec::new();
        let mut cursor = root.walk();

        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "import_statement" => imports.extend(imported_names(child, source)),
                "import_from_statement" => {
                    let module = field_text(child, "module_name", source).unwrap_or_default();
                    let names = imported_names(child, source);
                    if names.is_empty() {
                        imports.push(format!("{module}.*"));
                    }
                    imports.extend(names.into_iter().map(|name| format!("{module}.{name}")));
                }
                _ => {}
            }
        }

        imports
    }

    fn format_comment(&self, text: &str, indent: usize, style: CommentStyle) -> Vec<String> {
        let syntax = self.comment_syntax();
        match style {
            CommentStyle::Google => syntax.docstring_block(text, indent, 4),
            CommentStyle::Numpy => syntax.docstring_block(text, indent, 0),
            _ => syntax.line_comment(text, indent),
        }
    }
}

fn inside_class(node: Node<'_>) -> bool {
    let mut parent = node.parent();
    if let Some(decorated) = parent.filter(|p| p.kind() == "decorated_definition") {
        parent = decorated.parent();
    }
    parent
        .filter(|p| p.kind() == "block")
        .and_then(|block| block.parent())
        .is_some_and(|owner| owner.kind() == "class_definition")
}

fn imported_names(statement: Node<'_>, source: &str) -> Vec<String> {
    let mut cursor = statement.walk();
    statement
        .children_by_field_name("name", &mut cursor)
        .map(|name| {
            if name.kind() == "aliased_import" {
                field_text(name, "name", source).unwrap_or_default()
            } else {
                text(name, source).to_owned()
            }
        })
        .collect()
}

fn docstring(body: Node<'_>, source: &str) -> Option<String> {
    let mut cursor = body.walk();
    let first = body.named_children(&mut cursor).next()?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let mut inner_cursor = first.walk();
    let literal = first
        .named_children(&mut inner_cursor)
        .next()
        .filter(|node| node.kind() == "string")?;
    let raw = text(literal, source);
    let inner = ["\"\"\"", "'''", "\"", "'"]
        .iter()
        .find_map(|quote| raw.strip_prefix(quote).and_then(|rest| rest.strip_suffix(quote)))
        .unwrap_or(raw);

    let doc = inner
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_owned();
    (!doc.is_empty()).then_some(doc)
}

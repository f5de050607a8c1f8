//! Declaration walking shared by the C and C++ plugins.

use scribe_api::{CommentStyle, Declaration, DeclarationKind};
use scribe_plugin_api::{CommentSyntax, SyntaxTree};
use tree_sitter::Node;

use crate::ast::{field_text, in_source_order, leading_comment, preorder, start_line, text};

const TYPE_SPECIFIERS: &[&str] = &[
    "struct_specifier",
    "union_specifier",
    "enum_specifier",
    "class_specifier",
];

const CLASS_BODIES: &[&str] = &["field_declaration_list"];

pub(crate) fn extract_declarations(tree: &SyntaxTree, source: &str) -> Vec<Declaration> {
    let syntax = CommentSyntax::C_LIKE;
    let mut declarations = Vec::new();

    for node in preorder(tree.root()) {
        let (kind, name, anchor) = match node.kind() {
            "function_definition" => {
                let name = node
                    .child_by_field_name("declarator")
                    .map(|declarator| declarator_name(declarator, source))
                    .unwrap_or_default();
                let kind = if in_class_body(node) || name.contains("::") {
                    DeclarationKind::Method
                } else {
                    DeclarationKind::Function
                };
                (kind, name, templated(node))
            }
            kind if TYPE_SPECIFIERS.contains(&kind) => {
                if node.child_by_field_name("body").is_none() {
                    continue;
                }
                match node.parent() {
                    Some(parent) if parent.kind() == "type_definition" => {
                        let alias = parent
                            .child_by_field_name("declarator")
                            .map(|declarator| declarator_name(declarator, source))
                            .unwrap_or_default();
                        (DeclarationKind::Class, alias, parent)
                    }
                    Some(parent) if parent.kind() == "declaration" => (
                        DeclarationKind::Class,
                        field_text(node, "name", source).unwrap_or_default(),
                        parent,
                    ),
                    _ => (
                        DeclarationKind::Class,
                        field_text(node, "name", source).unwrap_or_default(),
                        templated(node),
                    ),
                }
            }
            _ => continue,
        };

        declarations.push(
            Declaration::new(kind, name, start_line(anchor), text(anchor, source))
                .with_existing_doc(leading_comment(anchor, source, &syntax, &["comment"])),
        );
    }

    in_source_order(declarations)
}

pub(crate) fn collect_includes(tree: &SyntaxTree, source: &str) -> Vec<String> {
    preorder(tree.root())
        .into_iter()
        .filter(|node| node.kind() == "preproc_include")
        .filter_map(|include| field_text(include, "path", source))
        .map(|path| path.trim_matches(|c| matches!(c, '"' | '<' | '>')).to_owned())
        .collect()
}

pub(crate) fn format_comment(text: &str, indent: usize, style: CommentStyle) -> Vec<String> {
    let syntax = CommentSyntax::C_LIKE;
    match style {
        CommentStyle::Doxygen => syntax.star_block(text, indent),
        _ => syntax.line_comment(text, indent),
    }
}

/// Follow the `declarator` chain down to the declared identifier.
fn declarator_name(mut node: Node<'_>, source: &str) -> String {
    loop {
        if let Some(inner) = node.child_by_field_name("declarator") {
            node = inner;
            continue;
        }
        if node.kind().ends_with("_declarator") {
            let mut cursor = node.walk();
            let last = node.named_children(&mut cursor).last();
            if let Some(inner) = last {
                node = inner;
                continue;
            }
        }
        return text(node, source).to_owned();
    }
}

fn in_class_body(node: Node<'_>) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        match parent.kind() {
            kind if CLASS_BODIES.contains(&kind) => return true,
            "template_declaration" | "declaration" => current = parent.parent(),
            _ => return false,
        }
    }
    false
}

fn templated(node: Node<'_>) -> Node<'_> {
    match node.parent() {
        Some(parent) if parent.kind() == "template_declaration" => parent,
        _ => node,
    }
}

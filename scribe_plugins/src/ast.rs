//! Small tree-sitter helpers shared by the language plugins.

use scribe_api::Declaration;
use scribe_plugin_api::CommentSyntax;
use tree_sitter::Node;

/// Source text covered by `node`.
pub(crate) fn text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    source.get(node.byte_range()).unwrap_or_default()
}

/// Text of a named field, if present.
pub(crate) fn field_text(node: Node<'_>, field: &str, source: &str) -> Option<String> {
    node.child_by_field_name(field)
        .map(|child| text(child, source).to_owned())
}

/// 1-based start line.
pub(crate) fn start_line(node: Node<'_>) -> u32 {
    u32::try_from(node.start_position().row + 1).unwrap_or(u32::MAX)
}

/// All nodes below `root` in document order, `root` included.
pub(crate) fn preorder(root: Node<'_>) -> Vec<Node<'_>> {
    let mut nodes = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        nodes.push(node);
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    nodes
}

/// Comment block immediately above `anchor`, with delimiters stripped.
///
/// Consecutive comment siblings with no blank line between them are merged.
pub(crate) fn leading_comment(
    anchor: Node<'_>,
    source: &str,
    syntax: &CommentSyntax,
    kinds: &[&str],
) -> Option<String> {
    let mut parts = Vec::new();
    let mut expected_row = anchor.start_position().row;
    let mut current = anchor.prev_named_sibling();

    while let Some(node) = current {
        if !kinds.contains(&node.kind()) || node.end_position().row + 1 != expected_row {
            break;
        }
        parts.push(text(node, source));
        expected_row = node.start_position().row;
        current = node.prev_named_sibling();
    }

    if parts.is_empty() {
        return None;
    }
    parts.reverse();
    let lines = syntax.extract_comments(&parts.join("\n"));
    let doc = lines.join("\n").trim().to_owned();
    (!doc.is_empty()).then_some(doc)
}

/// Sort by start line, keeping document order for ties.
pub(crate) fn in_source_order(mut declarations: Vec<Declaration>) -> Vec<Declaration> {
    declarations.sort_by_key(|decl| decl.start_line);
    declarations
}

use scribe_api::{CommentStyle, Declaration};
use scribe_plugin_api::{parse_source, CommentSyntax, LanguagePlugin, PluginResult, SyntaxTree};

use crate::c_family;

/// C++ plugin backed by `tree-sitter-cpp`. Also claims `.h` headers.
#[derive(Debug, Default, Clone, Copy)]
pub struct CppPlugin;

impl LanguagePlugin for CppPlugin {
    fn id(&self) -> &'static str {
        "cpp"
    }

    fn label(&self) -> &'static str {
        "C++"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".cpp", ".cc", ".cxx", ".hpp", ".hh", ".h"]
    }

    fn comment_syntax(&self) -> CommentSyntax {
        CommentSyntax::C_LIKE
    }

    fn default_style(&self) -> CommentStyle {
        CommentStyle::Doxygen
    }

    fn parse(&self, source: &str) -> PluginResult<SyntaxTree> {
        parse_source(&tree_sitter_cpp::LANGUAGE.into(), source)
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

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_api::DeclarationKind;

    const SOURCE: &str = "#include <vector>\n\nclass Stack {\npublic:\n    void push(int value) {\n        items.push_back(value);\n    }\n\nprivate:\n    std::vector<int> items;\n};\n\ntemplate <typename T>\nT identity(T value) {\n    return value;\n}\n\nint Stack_size(const Stack &s) {\n    return 0;\n}\n";

    #[test]
    fn classes_methods_and_templates() {
        let plugin = CppPlugin;
        let tree = plugin.parse(SOURCE).expect("parse");
        let found = plugin.extract_declarations(&tree, SOURCE);

        let summary: Vec<(DeclarationKind, &str, u32)> = found
            .iter()
            .map(|decl| (decl.kind, decl.name.as_str(), decl.start_line))
            .collect();
        assert_eq!(
            summary,
            vec![
                (DeclarationKind::Class, "Stack", 3),
                (DeclarationKind::Method, "push", 5),
                (DeclarationKind::Function, "identity", 13),
                (DeclarationKind::Function, "Stack_size", 18),
            ]
        );
        assert!(found[2].source_snippet.starts_with("template <typename T>"));
    }

    #[test]
    fn qualified_definitions_are_methods() {
        let source = "int Stack::size() const {\n    return 0;\n}\n";
        let plugin = CppPlugin;
        let tree = plugin.parse(source).expect("parse");
        let found = plugin.extract_declarations(&tree, source);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, DeclarationKind::Method);
        assert_eq!(found[0].name, "Stack::size");
    }
}

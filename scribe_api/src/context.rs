use serde::{Deserialize, Serialize};

use crate::declaration::{Declaration, DeclarationKind};

/// Language-agnostic summary of a file, gathered once and shared by every
/// declaration in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FileFacts {
    /// Imported modules, packages or headers in source order.
    #[serde(default)]
    pub imports: Vec<String>,
    /// Names of top-level functions.
    #[serde(default)]
    pub functions: Vec<String>,
    /// Names of top-level classes and other type definitions.
    #[serde(default)]
    pub classes: Vec<String>,
}

impl FileFacts {
    /// Combine plugin-reported imports with names taken from the extracted
    /// declarations. Only the outermost declarations count as siblings.
    pub fn new(imports: Vec<String>, declarations: &[Declaration]) -> Self {
        let mut functions = Vec::new();
        let mut classes = Vec::new();
        let mut outer_end = 0u32;

        for decl in declarations {
            if decl.start_line <= outer_end {
                continue;
            }
            outer_end = decl.start_line + snippet_span(&decl.source_snippet);
            if decl.name.is_empty() {
                continue;
            }
            match decl.kind {
                DeclarationKind::Function | DeclarationKind::Method => {
                    functions.push(decl.name.clone());
                }
                DeclarationKind::Class => classes.push(decl.name.clone()),
                DeclarationKind::Other => {}
            }
        }

        Self {
            imports,
            functions,
            classes,
        }
    }

    /// Every sibling name except `name`, functions first.
    pub fn sibling_names(&self, name: &str) -> Vec<String> {
        self.functions
            .iter()
            .chain(self.classes.iter())
            .filter(|candidate| candidate.as_str() != name)
            .cloned()
            .collect()
    }
}

fn snippet_span(snippet: &str) -> u32 {
    u32::try_from(snippet.matches('\n').count()).unwrap_or(u32::MAX)
}

/// Read-only oracle input derived from a declaration and its file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationContext {
    /// Declaration kind.
    pub kind: DeclarationKind,
    /// Declaration name.
    pub name: String,
    /// Existing documentation, empty when absent.
    #[serde(default)]
    pub existing_doc: String,
    /// Names of neighbouring top-level declarations.
    #[serde(default)]
    pub sibling_names: Vec<String>,
    /// Imports declared by the file.
    #[serde(default)]
    pub imports: Vec<String>,
    /// Coarse complexity label (`simple`, `moderate`, `complex`).
    pub complexity: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_declarations_are_not_siblings() {
        let declarations = vec![
            Declaration::new(
                DeclarationKind::Class,
                "Greeter",
                1,
                "class Greeter:\n    def hi(self):\n        pass",
            ),
            Declaration::new(DeclarationKind::Method, "hi", 2, "def hi(self):\n        pass"),
            Declaration::new(DeclarationKind::Function, "main", 5, "def main():\n    pass"),
        ];

        let facts = FileFacts::new(vec!["os".into()], &declarations);
        assert_eq!(facts.classes, vec!["Greeter".to_string()]);
        assert_eq!(facts.functions, vec!["main".to_string()]);
        assert_eq!(facts.sibling_names("main"), vec!["Greeter".to_string()]);
    }
}

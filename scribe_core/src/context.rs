use scribe_api::{Declaration, FileFacts, GenerationContext};

const BRANCH_KEYWORDS: &[&str] = &[
    "if", "elif", "else", "for", "foreach", "while", "case", "catch", "except", "and", "or",
];
const BRANCH_OPERATORS: &[&str] = &["&&", "||", "?"];

/// Complexity bucket derived from a snippet's decision points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Complexity {
    /// Straight-line code with at most two branches.
    Simple,
    /// Between three and seven branches.
    Moderate,
    /// Eight or more branches.
    Complex,
}

impl Complexity {
    /// Classify a snippet by counting branch keywords and operators.
    #[must_use]
    pub fn of(snippet: &str) -> Self {
        let keywords = snippet
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|word| BRANCH_KEYWORDS.contains(word))
            .count();
        let operators: usize = BRANCH_OPERATORS
            .iter()
            .map(|op| snippet.matches(op).count())
            .sum();

        match keywords + operators {
            0..=2 => Self::Simple,
            3..=7 => Self::Moderate,
            _ => Self::Complex,
        }
    }

    /// Label handed to the oracle.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Moderate => "moderate",
            Self::Complex => "complex",
        }
    }
}

/// Builds oracle context for declarations of one file.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContextBuilder;

impl ContextBuilder {
    /// Construct the builder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Combine a declaration with facts about its file.
    #[must_use]
    pub fn build(&self, declaration: &Declaration, facts: &FileFacts) -> GenerationContext {
        GenerationContext {
            kind: declaration.kind,
            name: declaration.name.clone(),
            existing_doc: declaration.existing_doc.clone().unwrap_or_default(),
            sibling_names: facts.sibling_names(&declaration.name),
            imports: facts.imports.clone(),
            complexity: Complexity::of(&declaration.source_snippet).label().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_api::DeclarationKind;

    #[test]
    fn complexity_buckets() {
        assert_eq!(Complexity::of("def f():\n    return 1"), Complexity::Simple);
        assert_eq!(
            Complexity::of("if a and b:\n    pass\nelif c:\n    pass"),
            Complexity::Moderate
        );
        let branchy =
            "if a || b && c { } else if d { } for x in y { while z { } } match q { _ => x ? 1 : 2 }";
        assert_eq!(Complexity::of(branchy), Complexity::Complex);
    }

    #[test]
    fn identifiers_containing_keywords_do_not_count() {
        assert_eq!(
            Complexity::of("def format_for_iffy(order, forest):\n    return order"),
            Complexity::Simple
        );
    }

    #[test]
    fn context_carries_file_facts() {
        let declarations = vec![
            Declaration::new(DeclarationKind::Function, "load", 3, "def load():\n    pass")
                .with_existing_doc(Some("Load things.".into())),
            Declaration::new(DeclarationKind::Class, "Store", 6, "class Store:\n    pass"),
        ];
        let facts = FileFacts::new(vec!["os".into()], &declarations);

        let context = ContextBuilder::new().build(&declarations[0], &facts);
        assert_eq!(context.kind, DeclarationKind::Function);
        assert_eq!(context.name, "load");
        assert_eq!(context.existing_doc, "Load things.");
        assert_eq!(context.sibling_names, vec!["Store".to_string()]);
        assert_eq!(context.imports, vec!["os".to_string()]);
        assert_eq!(context.complexity, "simple");
    }
}

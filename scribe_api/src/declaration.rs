use serde::{Deserialize, Serialize};

/// Closed set of declaration kinds every language plugin maps its nodes onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    /// Free-standing function.
    Function,
    /// Function defined inside a class-like body.
    Method,
    /// Class, struct, interface or other type definition.
    Class,
    /// Anything a plugin reports that does not fit the other kinds.
    Other,
}

impl DeclarationKind {
    /// Lowercase label used in prompts and logs.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Method => "method",
            Self::Class => "class",
            Self::Other => "other",
        }
    }
}

/// One annotatable unit located during parsing.
///
/// `start_line` is 1-based and always refers to the unmodified source buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Kind decided by the owning plugin.
    pub kind: DeclarationKind,
    /// Declared name, empty when the node is anonymous.
    pub name: String,
    /// 1-based line the comment is inserted above.
    pub start_line: u32,
    /// Exact source text of the declaration.
    pub source_snippet: String,
    /// Pre-existing docstring or leading comment, if any.
    #[serde(default)]
    pub existing_doc: Option<String>,
}

impl Declaration {
    /// Construct a declaration without existing documentation.
    pub fn new(
        kind: DeclarationKind,
        name: impl Into<String>,
        start_line: u32,
        source_snippet: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            start_line,
            source_snippet: source_snippet.into(),
            existing_doc: None,
        }
    }

    /// Attach existing documentation, dropping blank strings.
    #[must_use]
    pub fn with_existing_doc(mut self, doc: Option<String>) -> Self {
        self.existing_doc = doc.filter(|text| !text.trim().is_empty());
        self
    }

    /// Whether the declaration already carries documentation.
    pub fn is_documented(&self) -> bool {
        self.existing_doc.is_some()
    }
}

//! Boundary to the external comment generator.
//!
//! The [`CommentOracle`] trait is the only place scribe reaches for generated
//! text. [`CommentGenerator`] wraps an oracle with the content-addressed
//! [`CommentCache`]; [`CommandOracle`] and [`OutlineOracle`] are the built-in
//! implementations.

mod cache;
mod command;
mod generator;
mod outline;

use std::fmt::Write as _;

use scribe_api::{CommentStyle, GenerationContext};
use serde::{Deserialize, Serialize};

pub use cache::CommentCache;
pub use command::CommandOracle;
pub use generator::CommentGenerator;
pub use outline::OutlineOracle;

/// Result alias for oracle calls.
pub type OracleResult<T> = std::result::Result<T, OracleError>;

/// Everything the oracle sees about one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRequest {
    /// Plugin identifier of the source language.
    pub language: String,
    /// Exact declaration source.
    pub snippet: String,
    /// Derived context.
    pub context: GenerationContext,
    /// Requested comment style.
    pub style: CommentStyle,
}

impl OracleRequest {
    /// Render a plain-text instruction for text-generation backends.
    #[must_use]
    pub fn prompt(&self) -> String {
        let mut prompt = format!(
            "Write a {} documentation comment for the {} `{}` written in {}.\n",
            self.style,
            self.context.kind.label(),
            self.context.name,
            self.language,
        );
        let _ = writeln!(prompt, "Complexity: {}.", self.context.complexity);
        if !self.context.existing_doc.is_empty() {
            let _ = writeln!(prompt, "Existing documentation: {}", self.context.existing_doc);
        }
        if !self.context.sibling_names.is_empty() {
            let _ = writeln!(
                prompt,
                "Other declarations in the file: {}.",
                self.context.sibling_names.join(", ")
            );
        }
        if !self.context.imports.is_empty() {
            let _ = writeln!(prompt, "Imports: {}.", self.context.imports.join(", "));
        }
        prompt.push_str("Reply with the comment text only, without comment delimiters.\n\n");
        prompt.push_str(&self.snippet);
        prompt
    }
}

/// Generated comment text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleResponse {
    /// Comment body without delimiters.
    pub text: String,
}

impl OracleResponse {
    /// Wrap generated text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Turns a snippet and its context into comment text.
///
/// Implementations may block; callers treat every call as potentially slow.
pub trait CommentOracle: Send + Sync {
    /// Stable identifier used in logs.
    fn id(&self) -> &'static str;

    /// Produce comment text for one declaration.
    ///
    /// # Errors
    ///
    /// Returns an [`OracleError`] when the backend times out, cannot be
    /// reached, or replies with something that is not comment text.
    fn generate(&self, request: &OracleRequest) -> OracleResult<OracleResponse>;
}

/// Failures reported by an oracle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// The backend did not answer before the deadline.
    #[error("oracle timed out after {seconds}s")]
    Timeout {
        /// Deadline that elapsed.
        seconds: u64,
    },
    /// The backend could not be started or reported failure.
    #[error("oracle unavailable: {message}")]
    Unavailable {
        /// Failure description.
        message: String,
    },
    /// The backend answered with something unusable.
    #[error("oracle returned a malformed response: {message}")]
    Malformed {
        /// Failure description.
        message: String,
    },
}

impl OracleError {
    pub(crate) fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_api::DeclarationKind;

    #[test]
    fn prompt_mentions_context() {
        let request = OracleRequest {
            language: "python".into(),
            snippet: "def add(a, b):\n    return a + b".into(),
            context: GenerationContext {
                kind: DeclarationKind::Function,
                name: "add".into(),
                existing_doc: String::new(),
                sibling_names: vec!["sub".into()],
                imports: vec![],
                complexity: "simple".into(),
            },
            style: CommentStyle::Google,
        };

        let prompt = request.prompt();
        assert!(prompt.starts_with(
            "Write a google documentation comment for the function `add` written in python."
        ));
        assert!(prompt.contains("Other declarations in the file: sub."));
        assert!(!prompt.contains("Imports"));
        assert!(prompt.ends_with("return a + b"));
    }
}

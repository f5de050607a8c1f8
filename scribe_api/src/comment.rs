use std::fmt;

use serde::{Deserialize, Serialize};

/// Comment layout requested by the caller.
///
/// Each language honours a subset; anything else falls back to the language's
/// line-comment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommentStyle {
    /// Python triple-quoted block with an indented body.
    #[default]
    Google,
    /// Python triple-quoted block with a flush body.
    Numpy,
    /// C/C++ `/** ... */` block.
    Doxygen,
    /// Java `/** ... */` block.
    Javadoc,
    /// JavaScript `/** ... */` block.
    Jsdoc,
    /// Repeated line-comment token.
    #[serde(alias = "single-line", alias = "single_line")]
    Line,
}

impl CommentStyle {
    /// Resolve a style by name. Unknown names map to [`CommentStyle::Line`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "google" => Self::Google,
            "numpy" => Self::Numpy,
            "doxygen" => Self::Doxygen,
            "javadoc" => Self::Javadoc,
            "jsdoc" => Self::Jsdoc,
            _ => Self::Line,
        }
    }

    /// Canonical lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Numpy => "numpy",
            Self::Doxygen => "doxygen",
            Self::Javadoc => "javadoc",
            Self::Jsdoc => "jsdoc",
            Self::Line => "line",
        }
    }
}

impl fmt::Display for CommentStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Comment lines ready to be spliced above `line`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedComment {
    /// 1-based target line in the original buffer.
    pub line: u32,
    /// Literal lines without trailing newlines.
    pub lines: Vec<String>,
}

impl FormattedComment {
    /// Bind formatted lines to their target line.
    pub fn new(line: u32, lines: Vec<String>) -> Self {
        Self { line, lines }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_style_names_fall_back_to_line() {
        assert_eq!(CommentStyle::from_name("Google"), CommentStyle::Google);
        assert_eq!(CommentStyle::from_name("doxygen"), CommentStyle::Doxygen);
        assert_eq!(CommentStyle::from_name("restructured"), CommentStyle::Line);
        assert_eq!(CommentStyle::from_name(""), CommentStyle::Line);
    }

    #[test]
    fn style_accepts_single_line_alias() {
        let style: CommentStyle = serde_json::from_str("\"single-line\"").expect("alias");
        assert_eq!(style, CommentStyle::Line);
        assert_eq!(style.to_string(), "line");
    }
}

//! Comment delimiters shared by rendering and extraction.

/// Comment delimiters for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentSyntax {
    /// Line-comment token (`#`, `//`).
    pub line: &'static str,
    /// Block-comment open and close tokens, if the language has them.
    pub block: Option<(&'static str, &'static str)>,
    /// Doc-string delimiters treated as comments (Python triple quotes).
    pub docstrings: &'static [&'static str],
}

impl CommentSyntax {
    /// `#` line comments plus triple-quoted doc strings.
    pub const HASH: Self = Self {
        line: "#",
        block: None,
        docstrings: &["\"\"\"", "'''"],
    };

    /// `//` line comments plus `/* */` blocks.
    pub const C_LIKE: Self = Self {
        line: "//",
        block: Some(("/*", "*/")),
        docstrings: &[],
    };

    /// Repeat the line-comment token in front of every text line.
    #[must_use]
    pub fn line_comment(&self, text: &str, indent: usize) -> Vec<String> {
        let pad = " ".repeat(indent);
        text_lines(text)
            .map(|line| with_body(&format!("{pad}{}", self.line), line))
            .collect()
    }

    /// `/** ... */` block with `*`-prefixed continuation lines.
    ///
    /// Falls back to line comments when the language has no block syntax.
    #[must_use]
    pub fn star_block(&self, text: &str, indent: usize) -> Vec<String> {
        let Some((open, close)) = self.block else {
            return self.line_comment(text, indent);
        };

        let pad = " ".repeat(indent);
        let mut lines = vec![format!("{pad}{open}*")];
        lines.extend(text_lines(text).map(|line| with_body(&format!("{pad} *"), line)));
        lines.push(format!("{pad} {close}"));
        lines
    }

    /// Doc-string block: delimiter lines at `indent`, body at `indent + body_offset`.
    ///
    /// Falls back to line comments when the language has no doc strings.
    #[must_use]
    pub fn docstring_block(&self, text: &str, indent: usize, body_offset: usize) -> Vec<String> {
        let Some(delimiter) = self.docstrings.first() else {
            return self.line_comment(text, indent);
        };

        let pad = " ".repeat(indent);
        let body_pad = " ".repeat(indent + body_offset);
        let mut lines = vec![format!("{pad}{delimiter}")];
        lines.extend(text_lines(text).map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{body_pad}{line}")
            }
        }));
        lines.push(format!("{pad}{delimiter}"));
        lines
    }

    /// Extract comment text from `source`, one entry per comment line.
    ///
    /// Scanning is line oriented: only lines that start with a comment token
    /// (after indentation) open a comment, so trailing comments after code are
    /// ignored. Delimiters and `*` continuation prefixes are removed and every
    /// entry is trimmed.
    #[must_use]
    pub fn extract_comments(&self, source: &str) -> Vec<String> {
        let mut comments = Vec::new();
        let mut open: Option<Open> = None;

        for raw in source.lines() {
            let line = raw.trim();

            if let Some(state) = open {
                match line.find(state.close) {
                    Some(index) => {
                        let body = state.strip(&line[..index]);
                        if !body.is_empty() {
                            comments.push(body.to_owned());
                        }
                        open = None;
                    }
                    None => comments.push(state.strip(line).to_owned()),
                }
                continue;
            }

            if let Some(rest) = line.strip_prefix(self.line) {
                comments.push(strip_one_space(rest).trim().to_owned());
                continue;
            }

            if let Some((block_open, block_close)) = self.block {
                if let Some(rest) = line.strip_prefix(block_open) {
                    // `/**/` closes immediately; otherwise drop the doc-comment star.
                    let rest = if rest.starts_with(block_close) {
                        rest
                    } else {
                        rest.strip_prefix('*').unwrap_or(rest)
                    };
                    open = open_region(rest, Open::block(block_close), &mut comments);
                    continue;
                }
            }

            if let Some(delimiter) = self
                .docstrings
                .iter()
                .find(|delimiter| line.starts_with(**delimiter))
            {
                let rest = &line[delimiter.len()..];
                open = open_region(rest, Open::docstring(*delimiter), &mut comments);
            }
        }

        comments
    }
}

#[derive(Debug, Clone, Copy)]
struct Open {
    close: &'static str,
    star_prefixed: bool,
}

impl Open {
    const fn block(close: &'static str) -> Self {
        Self {
            close,
            star_prefixed: true,
        }
    }

    const fn docstring(close: &'static str) -> Self {
        Self {
            close,
            star_prefixed: false,
        }
    }

    fn strip<'a>(&self, text: &'a str) -> &'a str {
        let text = text.trim();
        if self.star_prefixed {
            if let Some(rest) = text.strip_prefix('*') {
                return strip_one_space(rest).trim();
            }
        }
        text
    }
}

/// Handle the remainder of a line that opened a block or doc string. Returns
/// the state to carry into the next line.
fn open_region(rest: &str, state: Open, comments: &mut Vec<String>) -> Option<Open> {
    match rest.find(state.close) {
        Some(index) => {
            let body = rest[..index].trim();
            if !body.is_empty() {
                comments.push(body.to_owned());
            }
            None
        }
        None => {
            let body = rest.trim();
            if !body.is_empty() {
                comments.push(body.to_owned());
            }
            Some(state)
        }
    }
}

fn text_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim_end)
}

fn with_body(prefix: &str, line: &str) -> String {
    if line.is_empty() {
        prefix.to_owned()
    } else {
        format!("{prefix} {line}")
    }
}

fn strip_one_space(text: &str) -> &str {
    text.strip_prefix(' ').unwrap_or(text)
}

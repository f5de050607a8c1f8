//! Splicing formatted comment blocks into source buffers.

use std::collections::BTreeMap;
use std::path::Path;

use git2::Patch;
use scribe_api::FormattedComment;

/// Source text held as lines, remembering the file's line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBuffer {
    lines: Vec<String>,
    crlf: bool,
}

impl SourceBuffer {
    /// Split `text` into lines. A trailing newline yields a final empty line.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let crlf = text.contains("\r\n");
        let lines = text
            .split('\n')
            .map(|line| {
                if crlf {
                    line.strip_suffix('\r').unwrap_or(line).to_owned()
                } else {
                    line.to_owned()
                }
            })
            .collect();
        Self { lines, crlf }
    }

    /// Number of lines, including a trailing empty line.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the buffer holds only the single empty line of an empty file.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    /// All lines without terminators.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Line `number` (1-based).
    #[must_use]
    pub fn line(&self, number: u32) -> Option<&str> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        self.lines.get(index).map(String::as_str)
    }

    /// Leading whitespace of line `number`, empty when out of range.
    #[must_use]
    pub fn indentation(&self, number: u32) -> &str {
        self.line(number).map_or("", leading_whitespace)
    }

    /// Join the lines back with the original terminator.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.lines.join(if self.crlf { "\r\n" } else { "\n" })
    }
}

/// Inserts comment blocks above their target lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct InsertionEngine;

impl InsertionEngine {
    /// Construct the engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Check that every target line exists and is targeted at most once.
    ///
    /// # Errors
    ///
    /// Returns [`InsertionError::AmbiguousLine`] for a repeated line and
    /// [`InsertionError::LineOutOfBounds`] for a line outside the buffer.
    pub fn validate(
        &self,
        buffer: &SourceBuffer,
        lines: impl IntoIterator<Item = u32>,
    ) -> Result<(), InsertionError> {
        let mut seen = std::collections::BTreeSet::new();
        for line in lines {
            check_bounds(buffer, line)?;
            if !seen.insert(line) {
                return Err(InsertionError::AmbiguousLine { line });
            }
        }
        Ok(())
    }

    /// Return a new buffer with every comment placed immediately above its
    /// target line, re-indented to that line's leading whitespace.
    ///
    /// Blocks are spliced from the highest target line down so earlier line
    /// numbers stay valid; original lines keep their relative order.
    ///
    /// # Errors
    ///
    /// Fails without producing output when two comments share a line or a
    /// line falls outside the buffer.
    pub fn insert(
        &self,
        original: &SourceBuffer,
        comments: &[FormattedComment],
    ) -> Result<SourceBuffer, InsertionError> {
        let mut by_line: BTreeMap<u32, &FormattedComment> = BTreeMap::new();
        for comment in comments {
            check_bounds(original, comment.line)?;
            if by_line.insert(comment.line, comment).is_some() {
                return Err(InsertionError::AmbiguousLine { line: comment.line });
            }
        }

        let mut lines = original.lines.clone();
        for (line, comment) in by_line.iter().rev() {
            let target = original.indentation(*line);
            let block = reindent(&comment.lines, target);
            let at = usize::try_from(*line - 1).unwrap_or(usize::MAX);
            lines.splice(at..at, block);
        }

        Ok(SourceBuffer {
            lines,
            crlf: original.crlf,
        })
    }
}

fn check_bounds(buffer: &SourceBuffer, line: u32) -> Result<(), InsertionError> {
    if line == 0 || buffer.line(line).is_none() {
        return Err(InsertionError::LineOutOfBounds {
            line,
            len: buffer.len(),
        });
    }
    Ok(())
}

fn leading_whitespace(line: &str) -> &str {
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

/// Move a block's common indentation to `target`, leaving blank lines empty.
fn reindent(block: &[String], target: &str) -> Vec<String> {
    let base = block
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| leading_whitespace(line))
        .min_by_key(|prefix| prefix.len())
        .unwrap_or("");

    if base == target {
        return block.to_vec();
    }

    let strip = base.len();
    block
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{target}{}", &line[strip..])
            }
        })
        .collect()
}

/// Render a unified diff between two versions of `path`.
///
/// # Errors
///
/// Propagates libgit2 failures while building the patch.
pub fn unified_diff(path: &Path, original: &str, updated: &str) -> Result<String, git2::Error> {
    let mut patch = Patch::from_buffers(
        original.as_bytes(),
        Some(path),
        updated.as_bytes(),
        Some(path),
        None,
    )?;

    let buffer = patch.to_buf()?;
    Ok(String::from_utf8_lossy(buffer.as_ref()).into_owned())
}

/// Errors surfaced while splicing comments into a buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InsertionError {
    /// Two comments target the same line.
    #[error("more than one comment targets line {line}")]
    AmbiguousLine {
        /// Contested line.
        line: u32,
    },
    /// A comment targets a line the buffer does not have.
    #[error("line {line} is out of bounds for a buffer of {len} lines")]
    LineOutOfBounds {
        /// Requested line.
        line: u32,
        /// Buffer length.
        len: usize,
    },
}

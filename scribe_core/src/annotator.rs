//! End-to-end annotation: resolve a plugin, extract declarations, generate
//! comments and splice them into the file.
//!
//! A file is rewritten only after every declaration in it has a comment; any
//! failure leaves it untouched. Directory runs isolate failures per file.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use scribe_api::{CommentStyle, FileFacts, FormattedComment};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::context::ContextBuilder;
use crate::insertion::{unified_diff, InsertionEngine, SourceBuffer};
use crate::oracle::CommentGenerator;
use crate::plugins::{LanguagePlugin, PluginService};
use crate::repository::{display_path, Repository};
use crate::{Error, Result};

const IN_MEMORY_ORIGIN: &str = "<source>";

/// Per-run knobs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotateOptions {
    /// Force a plugin instead of resolving by extension.
    pub language: Option<String>,
    /// Style for plugins without an entry in `styles`; the plugin default
    /// applies when unset.
    pub style: Option<CommentStyle>,
    /// Per-plugin style overrides.
    pub styles: BTreeMap<String, CommentStyle>,
    /// Rewrite files instead of returning a preview.
    pub write: bool,
    /// Commit each rewritten file with this message.
    pub commit_message: Option<String>,
}

impl AnnotateOptions {
    /// Style used for files handled by `plugin`.
    #[must_use]
    pub fn style_for(&self, plugin: &dyn LanguagePlugin) -> CommentStyle {
        self.styles
            .get(plugin.id())
            .copied()
            .or(self.style)
            .unwrap_or_else(|| plugin.default_style())
    }
}

/// Result of annotating a buffer in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Plugin that handled the source.
    pub language: String,
    /// Source with comments inserted.
    pub text: String,
    /// Number of comment blocks inserted.
    pub inserted: usize,
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// File that was processed.
    pub path: PathBuf,
    /// Plugin that handled it.
    pub language: String,
    /// Number of comment blocks inserted.
    pub inserted: usize,
    /// Whether the file on disk was rewritten.
    pub written: bool,
    /// Unified diff of the change when not written.
    pub patch: Option<String>,
    /// Commit id when the rewrite was committed.
    pub commit: Option<String>,
}

/// One entry of a directory run.
#[derive(Debug)]
pub struct FileReport {
    /// File the entry refers to.
    pub path: PathBuf,
    /// Outcome or the error that aborted this file.
    pub result: Result<FileOutcome>,
}

/// Per-file results of [`Annotator::annotate_tree`], in walk order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Every visited file.
    pub files: Vec<FileReport>,
}

impl BatchReport {
    /// Successfully processed files.
    pub fn succeeded(&self) -> impl Iterator<Item = &FileOutcome> + '_ {
        self.files.iter().filter_map(|report| report.result.as_ref().ok())
    }

    /// Files that failed, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &Error)> + '_ {
        self.files.iter().filter_map(|report| match &report.result {
            Ok(_) => None,
            Err(err) => Some((report.path.as_path(), err)),
        })
    }
}

/// Drives the annotation pipeline.
pub struct Annotator {
    plugins: PluginService,
    generator: CommentGenerator,
    contexts: ContextBuilder,
    engine: InsertionEngine,
    repository: Option<Repository>,
}

impl Annotator {
    /// Build an annotator that never commits.
    #[must_use]
    pub fn new(plugins: PluginService, generator: CommentGenerator) -> Self {
        Self {
            plugins,
            generator,
            contexts: ContextBuilder::new(),
            engine: InsertionEngine::new(),
            repository: None,
        }
    }

    /// Attach the repository used for commits.
    #[must_use]
    pub fn with_repository(mut self, repository: Repository) -> Self {
        self.repository = Some(repository);
        self
    }

    /// The comment generator, for cache inspection.
    #[must_use]
    pub const fn generator(&self) -> &CommentGenerator {
        &self.generator
    }

    /// Annotate `source` in memory using the plugin's default style.
    ///
    /// # Errors
    ///
    /// Fails with the first unsupported-language, parse, oracle or insertion
    /// error.
    pub fn annotate_source(&self, language: &str, source: &str) -> Result<Annotation> {
        let plugin = self.plugins.resolve(language)?;
        let style = plugin.default_style();
        self.annotate_text(plugin.as_ref(), IN_MEMORY_ORIGIN, source, style)
    }

    /// Annotate `source` in memory with an explicit style.
    ///
    /// # Errors
    ///
    /// See [`Annotator::annotate_source`].
    pub fn annotate_source_with_style(
        &self,
        language: &str,
        source: &str,
        style: CommentStyle,
    ) -> Result<Annotation> {
        let plugin = self.plugins.resolve(language)?;
        self.annotate_text(plugin.as_ref(), IN_MEMORY_ORIGIN, source, style)
    }

    /// Annotate one file, returning a preview or rewriting it per `options`.
    ///
    /// # Errors
    ///
    /// Any failure before the rewrite leaves the file as it was. When
    /// `options.write` and a commit are both requested, a commit failure is
    /// returned after the rewritten file is already on disk.
    pub fn annotate_file(&self, path: &Path, options: &AnnotateOptions) -> Result<FileOutcome> {
        let plugin = match &options.language {
            Some(language) => self.plugins.resolve(language)?,
            None => self.plugins.resolve_path(path)?,
        };
        let source = std::fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
        let style = options.style_for(plugin.as_ref());
        let annotation = self.annotate_text(plugin.as_ref(), &display_path(path), &source, style)?;

        let mut outcome = FileOutcome {
            path: path.to_path_buf(),
            language: annotation.language,
            inserted: annotation.inserted,
            written: false,
            patch: None,
            commit: None,
        };

        let mut commit_message = None;
        if annotation.inserted > 0 {
            if options.write {
                write_atomically(path, &annotation.text)?;
                outcome.written = true;
                commit_message = options.commit_message.as_deref();
                info!(path = %path.display(), inserted = outcome.inserted, "annotated file");
            } else {
                outcome.patch = Some(unified_diff(path, &source, &annotation.text)?);
            }
        }

        if let Err(err) = self.generator.cache().persist() {
            warn!(error = %err, "failed to persist comment cache");
        }

        if let (Some(message), Some(repository)) = (commit_message, &self.repository) {
            outcome.commit = Some(repository.commit_path(path, message)?);
        }
        Ok(outcome)
    }

    /// Annotate every supported file under `root`, continuing past failures.
    ///
    /// Hidden directories (such as `.git`) are skipped.
    pub fn annotate_tree(&self, root: &Path, options: &AnnotateOptions) -> BatchReport {
        let forced = match &options.language {
            Some(language) => match self.plugins.resolve(language) {
                Ok(plugin) => Some(plugin),
                Err(err) => {
                    return BatchReport {
                        files: vec![FileReport {
                            path: root.to_path_buf(),
                            result: Err(err),
                        }],
                    }
                }
            },
            None => None,
        };

        let mut report = BatchReport::default();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(root).to_path_buf();
                    warn!(path = %path.display(), error = %err, "failed to walk directory");
                    report.files.push(FileReport {
                        result: Err(Error::io(&path, err.into())),
                        path,
                    });
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let handled = match &forced {
                Some(plugin) => has_extension(path, plugin.extensions()),
                None => self.plugins.supports_path(path),
            };
            if !handled {
                continue;
            }

            let result = self.annotate_file(path, options);
            if let Err(err) = &result {
                warn!(path = %path.display(), error = %err, "skipping file");
            }
            report.files.push(FileReport {
                path: path.to_path_buf(),
                result,
            });
        }

        report
    }

    fn annotate_text(
        &self,
        plugin: &dyn LanguagePlugin,
        origin: &str,
        source: &str,
        style: CommentStyle,
    ) -> Result<Annotation> {
        let tree = PluginService::parse(plugin, origin, source)?;
        let declarations = plugin.extract_declarations(&tree, source);
        let facts = FileFacts::new(plugin.collect_imports(&tree, source), &declarations);
        let buffer = SourceBuffer::from_text(source);

        self.engine
            .validate(&buffer, declarations.iter().map(|decl| decl.start_line))
            .map_err(|source| Error::Insertion {
                path: origin.to_owned(),
                source,
            })?;

        let mut comments = Vec::with_capacity(declarations.len());
        for declaration in &declarations {
            let context = self.contexts.build(declaration, &facts);
            debug!(
                path = origin,
                line = declaration.start_line,
                kind = declaration.kind.label(),
                name = %declaration.name,
                "generating comment"
            );
            let text = self
                .generator
                .generate(plugin.id(), &declaration.source_snippet, &context, style)
                .map_err(|source| Error::Oracle {
                    path: origin.to_owned(),
                    line: declaration.start_line,
                    name: declaration.name.clone(),
                    source,
                })?;

            let indent = buffer.indentation(declaration.start_line).chars().count();
            comments.push(FormattedComment::new(
                declaration.start_line,
                plugin.format_comment(&text, indent, style),
            ));
        }

        let updated = self
            .engine
            .insert(&buffer, &comments)
            .map_err(|source| Error::Insertion {
                path: origin.to_owned(),
                source,
            })?;

        Ok(Annotation {
            language: plugin.id().to_owned(),
            text: updated.to_text(),
            inserted: comments.len(),
        })
    }
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator")
            .field("plugins", &self.plugins)
            .field("generator", &self.generator)
            .field("repository", &self.repository)
            .finish_non_exhaustive()
    }
}

fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|source| Error::io(dir, source))?;
    file.write_all(contents.as_bytes())
        .map_err(|source| Error::io(path, source))?;
    if let Ok(metadata) = std::fs::metadata(path) {
        if let Err(err) = std::fs::set_permissions(file.path(), metadata.permissions()) {
            warn!(path = %path.display(), error = %err, "failed to carry file permissions over");
        }
    }
    file.persist(path).map_err(|err| Error::io(path, err.error))?;
    Ok(())
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|name| name.starts_with('.'))
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|candidate| candidate.trim_start_matches('.') == ext)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_plugins::{CPlugin, PythonPlugin};

    #[test]
    fn style_resolution_prefers_overrides() {
        let mut options = AnnotateOptions::default();
        assert_eq!(options.style_for(&PythonPlugin), CommentStyle::Google);
        assert_eq!(options.style_for(&CPlugin), CommentStyle::Doxygen);

        options.style = Some(CommentStyle::Line);
        options.styles.insert("c".into(), CommentStyle::Doxygen);
        assert_eq!(options.style_for(&PythonPlugin), CommentStyle::Line);
        assert_eq!(options.style_for(&CPlugin), CommentStyle::Doxygen);
    }

    #[test]
    fn extension_matching_ignores_leading_dot() {
        assert!(has_extension(Path::new("a/b.py"), &[".py"]));
        assert!(!has_extension(Path::new("a/b.PY"), &[".py"]));
        assert!(!has_extension(Path::new("a/b.rs"), &[".py"]));
        assert!(!has_extension(Path::new("Makefile"), &[".py"]));
    }
}

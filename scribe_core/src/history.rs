//! Per-commit comment changes for a single file.

use std::collections::BTreeSet;
use std::path::Path;

use git2::{DiffOptions, Sort};
use scribe_api::CommitCommentDelta;
use tracing::debug;

use crate::plugins::{LanguagePlugin, PluginService};
use crate::repository::Repository;
use crate::Result;

/// Reports how a file's comments changed across the commits that touched it.
pub struct CommentHistory<'repo> {
    repository: &'repo Repository,
    plugins: &'repo PluginService,
}

impl<'repo> CommentHistory<'repo> {
    /// Bind the differ to a repository and the plugin table used to read
    /// comments.
    #[must_use]
    pub const fn new(repository: &'repo Repository, plugins: &'repo PluginService) -> Self {
        Self {
            repository,
            plugins,
        }
    }

    /// Walk history from HEAD, newest first, and report every commit whose
    /// change to `path` altered the set of comment lines.
    ///
    /// A root commit compares against an empty file. Commits that delete the
    /// file are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnsupportedLanguage`] before walking when the
    /// extension has no plugin, and git errors encountered while walking.
    pub fn comment_history(&self, path: impl AsRef<Path>) -> Result<Vec<CommitCommentDelta>> {
        let relative = self.repository.relative_path(path)?;
        let plugin = self.plugins.resolve_path(&relative)?;

        if self.repository.head_commit()?.is_none() {
            return Ok(Vec::new());
        }

        let git = self.repository.git_repo();
        let mut revwalk = git.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push_head()?;

        let mut deltas = Vec::new();
        for oid in revwalk {
            let commit = git.find_commit(oid?)?;
            let tree = commit.tree()?;
            let parent_tree = if commit.parent_count() > 0 {
                Some(commit.parent(0)?.tree()?)
            } else {
                None
            };

            let mut options = DiffOptions::new();
            options
                .pathspec(relative.as_path())
                .disable_pathspec_match(true);
            let diff =
                git.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut options))?;
            let Some(delta) = diff.deltas().next() else {
                continue;
            };
            if delta.new_file().id().is_zero() {
                continue;
            }

            let old_text = self.repository.blob_text(delta.old_file().id())?;
            let new_text = self.repository.blob_text(delta.new_file().id())?;
            let old_comments = comment_set(plugin.as_ref(), &old_text);
            let new_comments = comment_set(plugin.as_ref(), &new_text);
            if old_comments == new_comments {
                continue;
            }

            debug!(
                commit = %commit.id(),
                path = %relative.display(),
                before = old_comments.len(),
                after = new_comments.len(),
                "comment set changed"
            );
            deltas.push(CommitCommentDelta {
                commit_id: commit.id().to_string(),
                timestamp: commit.time().seconds(),
                summary: commit.summary().map(str::to_owned),
                old_comments,
                new_comments,
            });
        }

        Ok(deltas)
    }
}

impl std::fmt::Debug for CommentHistory<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentHistory")
            .field("repository", self.repository)
            .finish_non_exhaustive()
    }
}

/// Distinct non-empty comment lines of `source`.
pub fn comment_set(plugin: &dyn LanguagePlugin, source: &str) -> BTreeSet<String> {
    plugin
        .extract_comments(source)
        .into_iter()
        .filter(|line| !line.is_empty())
        .collect()
}

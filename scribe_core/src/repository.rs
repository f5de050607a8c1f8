//! Repository access built on top of libgit2.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use git2::{ErrorClass, ErrorCode, Oid, Repository as GitRepository, Signature};

use crate::{Error, Result};

const FALLBACK_AUTHOR: (&str, &str) = ("scribe", "scribe@localhost");

/// Handle to the repository whose files scribe annotates and inspects.
pub struct Repository {
    inner: GitRepository,
    root: PathBuf,
}

impl Repository {
    /// Open a repository from the given filesystem path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be canonicalized, does not resolve
    /// to a git repository, or if libgit2 reports an unsupported repository
    /// layout (such as a bare repository).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let original = path.as_ref();
        let canonical =
            std::fs::canonicalize(original).map_err(|source| Error::io(original, source))?;

        let repo = match GitRepository::discover(&canonical) {
            Ok(repo) => repo,
            Err(err)
                if err.class() == ErrorClass::Repository && err.code() == ErrorCode::NotFound =>
            {
                return Err(Error::NotARepository {
                    path: display_path(&canonical),
                })
            }
            Err(err) => return Err(Error::from(err)),
        };

        let workdir = repo.workdir().ok_or_else(|| Error::BareRepository {
            path: display_path(&canonical),
        })?;
        let root = std::fs::canonicalize(workdir).map_err(|source| Error::io(workdir, source))?;

        Ok(Self { inner: repo, root })
    }

    /// Returns the absolute path to the repository root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Borrow the underlying libgit2 handle.
    #[must_use]
    pub const fn git_repo(&self) -> &GitRepository {
        &self.inner
    }

    /// Resolve `path` to a path relative to the working tree root.
    ///
    /// Relative inputs are taken as relative to the root already; absolute
    /// inputs must live beneath it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathOutsideRepository`] when the path escapes the
    /// working tree.
    pub fn relative_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let relative = if path.is_absolute() {
            match path.strip_prefix(&self.root) {
                Ok(stripped) => stripped.to_path_buf(),
                Err(_) => {
                    let canonical =
                        std::fs::canonicalize(path).map_err(|source| Error::io(path, source))?;
                    canonical
                        .strip_prefix(&self.root)
                        .map(Path::to_path_buf)
                        .map_err(|_| Error::PathOutsideRepository {
                            path: display_path(path),
                        })?
                }
            }
        } else {
            path.to_path_buf()
        };

        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
        if escapes || relative.as_os_str().is_empty() {
            return Err(Error::PathOutsideRepository {
                path: display_path(path),
            });
        }

        Ok(relative
            .components()
            .filter(|component| matches!(component, Component::Normal(_)))
            .collect())
    }

    /// Returns the commit HEAD points at, or `None` on an unborn branch.
    ///
    /// # Errors
    ///
    /// Returns any error produced while resolving the HEAD reference.
    pub fn head_commit(&self) -> Result<Option<git2::Commit<'_>>> {
        let head = match self.inner.head() {
            Ok(head) => head,
            Err(err)
                if matches!(
                    (err.class(), err.code()),
                    (
                        ErrorClass::Reference,
                        ErrorCode::NotFound | ErrorCode::UnbornBranch
                    )
                ) =>
            {
                return Ok(None)
            }
            Err(err) => return Err(Error::from(err)),
        };

        let resolved = head.resolve()?;
        Ok(Some(resolved.peel_to_commit()?))
    }

    /// Blob contents as text; the zero id reads as an empty file.
    ///
    /// # Errors
    ///
    /// Propagates libgit2 lookup failures.
    pub fn blob_text(&self, id: Oid) -> Result<String> {
        if id.is_zero() {
            return Ok(String::new());
        }
        let blob = self.inner.find_blob(id)?;
        Ok(String::from_utf8_lossy(blob.content()).into_owned())
    }

    /// Stage a single working-tree file and commit it on top of HEAD.
    ///
    /// Uses the repository's configured identity when present.
    ///
    /// # Errors
    ///
    /// Returns an error if the path lies outside the working tree or any
    /// index, tree or commit operation fails.
    pub fn commit_path(&self, path: impl AsRef<Path>, message: &str) -> Result<String> {
        let relative = self.relative_path(path)?;
        let mut index = self.inner.index()?;
        index.add_path(&relative)?;
        index.write()?;
        let tree_id = index.write_tree()?;
        let tree = self.inner.find_tree(tree_id)?;

        let signature = match self.inner.signature() {
            Ok(signature) => signature,
            Err(_) => Signature::now(FALLBACK_AUTHOR.0, FALLBACK_AUTHOR.1)?,
        };

        let parents: Vec<git2::Commit<'_>> = self.head_commit()?.into_iter().collect();
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();
        let oid = self.inner.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parent_refs,
        )?;

        tracing::info!(commit = %oid, path = %relative.display(), "committed file");
        Ok(oid.to_string())
    }
}

pub(crate) fn display_path(path: &Path) -> String {
    path.to_path_buf()
        .into_os_string()
        .to_string_lossy()
        .into_owned()
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_non_repository_returns_error() {
        let temp = TempDir::new().expect("tempdir");
        let err = Repository::open(temp.path());
        assert!(matches!(err, Err(Error::NotARepository { .. })));
    }

    #[test]
    fn relative_paths_are_normalized() -> Result<()> {
        let temp = TempDir::new().expect("tempdir");
        GitRepository::init(temp.path())?;
        let repo = Repository::open(temp.path())?;

        assert_eq!(repo.relative_path("./src/a.py")?, PathBuf::from("src/a.py"));
        assert_eq!(
            repo.relative_path(repo.root().join("b.py"))?,
            PathBuf::from("b.py")
        );
        assert!(matches!(
            repo.relative_path("../elsewhere.py"),
            Err(Error::PathOutsideRepository { .. })
        ));
        Ok(())
    }

    #[test]
    fn commit_path_creates_root_then_child_commit() -> Result<()> {
        let temp = TempDir::new().expect("tempdir");
        GitRepository::init(temp.path())?;
        let repo = Repository::open(temp.path())?;
        assert!(repo.head_commit()?.is_none());

        std::fs::write(temp.path().join("a.py"), "x = 1\n").expect("write file");
        let first = repo.commit_path("a.py", "first")?;
        std::fs::write(temp.path().join("a.py"), "x = 2\n").expect("write file");
        let second = repo.commit_path("a.py", "second")?;

        let head = repo.head_commit()?.expect("head commit");
        assert_eq!(head.id().to_string(), second);
        assert_eq!(head.parent_id(0)?.to_string(), first);
        assert_eq!(head.summary(), Some("second"));
        Ok(())
    }

    #[test]
    fn zero_blob_reads_as_empty() -> Result<()> {
        let temp = TempDir::new().expect("tempdir");
        GitRepository::init(temp.path())?;
        let repo = Repository::open(temp.path())?;
        assert_eq!(repo.blob_text(Oid::zero())?, "");
        Ok(())
    }
}

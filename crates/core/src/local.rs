use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::{FetchError, ListError};
use crate::source::{ContentFetcher, FileLister, RepoSlug, is_comparable_source_path};
use crate::types::SourceFile;

/// Repositories checked out on disk as `<root>/<owner>/<name>`.
///
/// Useful for classroom setups where submissions are already cloned, and for
/// comparing without network access.
#[derive(Debug, Clone)]
pub struct LocalCheckouts {
    root: PathBuf,
    respect_gitignore: bool,
}

impl LocalCheckouts {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            respect_gitignore: true,
        }
    }

    pub fn respect_gitignore(mut self, yes: bool) -> Self {
        self.respect_gitignore = yes;
        self
    }

    pub fn repo_dir(&self, repo: &RepoSlug) -> PathBuf {
        self.root.join(&repo.owner).join(&repo.name)
    }

    fn validate_repo_dir(&self, repo: &RepoSlug) -> Result<PathBuf, ListError> {
        let dir = self.repo_dir(repo);
        match fs::metadata(&dir) {
            Ok(meta) if meta.is_dir() => Ok(dir),
            Ok(_) => Err(ListError::NotFound { repo: repo.clone() }),
            Err(err) => Err(map_list_io_error(repo, err)),
        }
    }
}

fn map_list_io_error(repo: &RepoSlug, err: io::Error) -> ListError {
    match err.kind() {
        io::ErrorKind::NotFound => ListError::NotFound { repo: repo.clone() },
        io::ErrorKind::PermissionDenied => ListError::Forbidden { repo: repo.clone() },
        _ => ListError::Io {
            repo: repo.clone(),
            source: err,
        },
    }
}

fn make_rel_path(root: &Path, abs_path: &Path) -> Option<String> {
    abs_path
        .strip_prefix(root)
        .ok()
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
}

impl FileLister for LocalCheckouts {
    fn list_files(&self, repo: &RepoSlug) -> Result<Vec<SourceFile>, ListError> {
        let dir = self.validate_repo_dir(repo)?;
        let is_git_repo = dir.join(".git").exists();

        let mut builder = WalkBuilder::new(&dir);
        builder
            .hidden(false)
            .follow_links(false)
            .ignore(false)
            .git_ignore(self.respect_gitignore)
            .git_global(false)
            .git_exclude(self.respect_gitignore && is_git_repo)
            .parents(false)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        let mut files = Vec::new();
        for result in builder.build() {
            let entry = match result {
                Ok(e) => e,
                Err(err) => {
                    // An unreadable subdirectory only hides its own files.
                    tracing::debug!(repo = %repo, error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if entry.depth() == 0 {
                continue;
            }
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let Some(rel_path) = make_rel_path(&dir, entry.path()) else {
                continue;
            };
            if !is_comparable_source_path(&rel_path) {
                continue;
            }

            let size = entry.metadata().ok().map(|m| m.len());
            files.push(SourceFile {
                content_id: rel_path.clone(),
                path: rel_path,
                size,
            });
        }

        Ok(files)
    }
}

impl ContentFetcher for LocalCheckouts {
    fn fetch_content(&self, repo: &RepoSlug, file: &SourceFile) -> Result<String, FetchError> {
        let path = self.repo_dir(repo).join(&file.content_id);
        let bytes = fs::read(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => FetchError::NotFound {
                path: file.path.clone(),
            },
            _ => FetchError::Io {
                path: file.path.clone(),
                source: err,
            },
        })?;
        if bytes.contains(&0) {
            return Err(FetchError::NotText {
                path: file.path.clone(),
            });
        }
        String::from_utf8(bytes).map_err(|_| FetchError::NotText {
            path: file.path.clone(),
        })
    }
}

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{FetchError, ListError, RepoParseError};
use crate::types::SourceFile;

pub const SOURCE_EXTENSIONS: &[&str] = &[
    "js", "ts", "py", "java", "cpp", "c", "h", "cs", "php", "rb", "go", "rs",
];

/// A path containing any of these anywhere is never listed.
pub const EXCLUDED_PATH_SEGMENTS: &[&str] = &["node_modules/", ".git/", "dist/", "build/"];

static GITHUB_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com/([^/]+)/([^/?#]+)").expect("github url regex")
});

/// `owner/name` identifier of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Accepts `owner/repo` or any URL containing `github.com/owner/repo`.
    pub fn parse(input: &str) -> Result<Self, RepoParseError> {
        let invalid = || RepoParseError {
            input: input.to_string(),
        };
        let trimmed = input.trim();

        let (owner, name) = if trimmed.contains("github.com") {
            let caps = GITHUB_URL.captures(trimmed).ok_or_else(invalid)?;
            let name = &caps[2];
            let name = name.strip_suffix(".git").unwrap_or(name);
            (caps[1].to_string(), name.to_string())
        } else {
            let (owner, name) = trimmed.split_once('/').ok_or_else(invalid)?;
            (owner.to_string(), name.trim_end_matches('/').to_string())
        };

        if !is_valid_segment(&owner) || !is_valid_segment(&name) {
            return Err(invalid());
        }
        Ok(Self { owner, name })
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\'])
        && !segment.chars().any(char::is_whitespace)
}

impl FromStr for RepoSlug {
    type Err = RepoParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Whether a `/`-separated repository path is a source file worth comparing.
pub fn is_comparable_source_path(path: &str) -> bool {
    if EXCLUDED_PATH_SEGMENTS.iter().any(|seg| path.contains(seg)) {
        return false;
    }
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let Some((_, ext)) = file_name.rsplit_once('.') else {
        return false;
    };
    SOURCE_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(ext))
}

/// Enumerates the comparable source files of a repository.
///
/// Implementations filter with [`is_comparable_source_path`]. Any error is
/// fatal to the comparison that asked for the listing.
pub trait FileLister {
    fn list_files(&self, repo: &RepoSlug) -> Result<Vec<SourceFile>, ListError>;
}

/// Fetches the content of one listed file.
///
/// An `Err` only means the file is unavailable; callers skip it.
pub trait ContentFetcher {
    fn fetch_content(&self, repo: &RepoSlug, file: &SourceFile) -> Result<String, FetchError>;
}

impl<T: FileLister + ?Sized> FileLister for &T {
    fn list_files(&self, repo: &RepoSlug) -> Result<Vec<SourceFile>, ListError> {
        (**self).list_files(repo)
    }
}

impl<T: ContentFetcher + ?Sized> ContentFetcher for &T {
    fn fetch_content(&self, repo: &RepoSlug, file: &SourceFile) -> Result<String, FetchError> {
        (**self).fetch_content(repo, file)
    }
}

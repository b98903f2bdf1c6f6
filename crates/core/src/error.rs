use std::io;

use crate::source::RepoSlug;

/// A repository argument that is neither `owner/repo` nor a GitHub URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid repository `{input}`: expected owner/repo or https://github.com/owner/repo")]
pub struct RepoParseError {
    pub input: String,
}

/// The file listing of a whole repository could not be obtained.
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("repository {repo} not found")]
    NotFound { repo: RepoSlug },
    #[error("access to repository {repo} is forbidden")]
    Forbidden { repo: RepoSlug },
    #[error("rate limit exceeded while listing {repo}")]
    RateLimited { repo: RepoSlug },
    #[error("repository {repo} requires authentication")]
    Unauthorized { repo: RepoSlug },
    #[error("failed to list {repo}{}: {message}", http_status_suffix(.status))]
    Network {
        repo: RepoSlug,
        status: Option<u16>,
        message: String,
    },
    #[error("failed to list {repo}: {source}")]
    Io { repo: RepoSlug, source: io::Error },
}

impl ListError {
    pub fn repo(&self) -> &RepoSlug {
        match self {
            Self::NotFound { repo }
            | Self::Forbidden { repo }
            | Self::RateLimited { repo }
            | Self::Unauthorized { repo }
            | Self::Network { repo, .. }
            | Self::Io { repo, .. } => repo,
        }
    }
}

/// Content of a single file is unavailable. Never fatal to a comparison.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{path}: not found")]
    NotFound { path: String },
    #[error("{path}: not a text file")]
    NotText { path: String },
    #[error("{path}: HTTP {status}")]
    Status { path: String, status: u16 },
    #[error("{path}: {message}")]
    Transport { path: String, message: String },
    #[error("{path}: {source}")]
    Io { path: String, source: io::Error },
}

fn http_status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error(transparent)]
    InvalidRepository(#[from] RepoParseError),
    #[error(transparent)]
    Listing(#[from] ListError),
    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

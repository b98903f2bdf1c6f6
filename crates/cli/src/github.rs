//! GitHub REST client providing repository listings and blob contents.

use std::io;
use std::time::Duration;

use repo_diff_match_core::{
    ContentFetcher, FetchError, FileLister, ListError, RepoSlug, SourceFile,
    is_comparable_source_path,
};
use serde::Deserialize;

pub(crate) const DEFAULT_API_URL: &str = "https://api.github.com";
pub(crate) const DEFAULT_BRANCH: &str = "main";

const DEFAULT_USER_AGENT: &str = concat!("repodm/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GitHubConfig {
    pub(crate) api_url: String,
    pub(crate) branch: String,
    pub(crate) user_agent: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

pub(crate) struct GitHubClient {
    agent: ureq::Agent,
    config: GitHubConfig,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    sha: String,
    #[serde(default)]
    size: Option<u64>,
}

impl GitHubClient {
    pub(crate) fn new(config: GitHubConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT)
            .user_agent(&config.user_agent)
            .build();
        Self { agent, config }
    }

    fn repo_url(&self, repo: &RepoSlug) -> String {
        format!(
            "{}/repos/{}/{}",
            self.config.api_url.trim_end_matches('/'),
            repo.owner,
            repo.name
        )
    }

    fn tree_url(&self, repo: &RepoSlug) -> String {
        format!(
            "{}/git/trees/{}?recursive=1",
            self.repo_url(repo),
            self.config.branch
        )
    }

    fn blob_url(&self, repo: &RepoSlug, sha: &str) -> String {
        format!("{}/git/blobs/{sha}", self.repo_url(repo))
    }
}

impl FileLister for GitHubClient {
    fn list_files(&self, repo: &RepoSlug) -> Result<Vec<SourceFile>, ListError> {
        let url = self.tree_url(repo);
        tracing::debug!(%url, "listing repository tree");

        let response = match self
            .agent
            .get(&url)
            .set("Accept", "application/vnd.github+json")
            .call()
        {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                let remaining = response
                    .header("x-ratelimit-remaining")
                    .map(str::to_string);
                let body = response.into_string().unwrap_or_default();
                return Err(classify_list_status(
                    repo,
                    status,
                    remaining.as_deref(),
                    &body,
                ));
            }
            Err(ureq::Error::Transport(err)) => {
                return Err(ListError::Network {
                    repo: repo.clone(),
                    status: None,
                    message: err.to_string(),
                });
            }
        };

        let tree: TreeResponse = response.into_json().map_err(|err| ListError::Network {
            repo: repo.clone(),
            status: None,
            message: format!("invalid tree response: {err}"),
        })?;
        if tree.truncated {
            tracing::warn!(repo = %repo, "GitHub truncated the tree listing; some files are missing");
        }
        Ok(source_files_from_tree(tree))
    }
}

impl ContentFetcher for GitHubClient {
    fn fetch_content(&self, repo: &RepoSlug, file: &SourceFile) -> Result<String, FetchError> {
        let url = self.blob_url(repo, &file.content_id);
        let path = || file.path.clone();

        match self
            .agent
            .get(&url)
            .set("Accept", "application/vnd.github.v3.raw")
            .call()
        {
            Ok(response) => response.into_string().map_err(|err| match err.kind() {
                io::ErrorKind::InvalidData => FetchError::NotText { path: path() },
                _ => FetchError::Io {
                    path: path(),
                    source: err,
                },
            }),
            Err(ureq::Error::Status(404, _)) => Err(FetchError::NotFound { path: path() }),
            Err(ureq::Error::Status(status, _)) => Err(FetchError::Status {
                path: path(),
                status,
            }),
            Err(ureq::Error::Transport(err)) => Err(FetchError::Transport {
                path: path(),
                message: err.to_string(),
            }),
        }
    }
}

fn source_files_from_tree(tree: TreeResponse) -> Vec<SourceFile> {
    tree.tree
        .into_iter()
        .filter(|entry| entry.kind == "blob" && is_comparable_source_path(&entry.path))
        .map(|entry| SourceFile {
            path: entry.path,
            content_id: entry.sha,
            size: entry.size,
        })
        .collect()
}

fn classify_list_status(
    repo: &RepoSlug,
    status: u16,
    rate_limit_remaining: Option<&str>,
    body: &str,
) -> ListError {
    let repo = repo.clone();
    match status {
        404 => ListError::NotFound { repo },
        401 => ListError::Unauthorized { repo },
        429 => ListError::RateLimited { repo },
        403 if rate_limit_remaining.map(str::trim) == Some("0") => ListError::RateLimited { repo },
        403 => ListError::Forbidden { repo },
        _ => ListError::Network {
            repo,
            status: Some(status),
            message: api_message(body),
        },
    }
}

/// The `message` of a GitHub error body, or the raw body.
fn api_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ApiError {
        message: String,
    }

    match serde_json::from_str::<ApiError>(body) {
        Ok(err) => err.message,
        Err(_) => body.trim().to_string(),
    }
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use repo_diff_match_core::{
    CompareOptions, DEFAULT_BATCH_SIZE, DEFAULT_MAX_FILE_CHARS, DEFAULT_MAX_FILES_PER_REPO,
    RepoSlug,
};

use crate::github::{DEFAULT_API_URL, DEFAULT_BRANCH};

#[derive(Debug, Parser)]
#[command(
    name = "repodm",
    version,
    about = "Compare GitHub repositories for plagiarism detection",
    after_help = concat!(
        "Examples:\n",
        "  repodm compare alice/hw1 bob/hw1\n",
        "  repodm compare https://github.com/alice/hw1 https://github.com/bob/hw1 --json\n",
        "  repodm compare --local ./submissions alice/hw1 bob/hw1 --stats\n",
    )
)]
pub(crate) struct Cli {
    /// Log debug details to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Compare two repositories (format: owner/repo or full GitHub URL)
    Compare(CompareArgs),
}

#[derive(Debug, Clone, Args)]
pub(crate) struct CompareArgs {
    /// Source repository
    pub(crate) repo_a: RepoSlug,

    /// Target repository
    pub(crate) repo_b: RepoSlug,

    /// Output JSON
    #[arg(long)]
    pub(crate) json: bool,

    /// Include compare stats (JSON) or print them to stderr
    #[arg(long)]
    pub(crate) stats: bool,

    /// Exit non-zero if files were truncated or skipped
    #[arg(long)]
    pub(crate) strict: bool,

    /// Read repositories from <DIR>/<owner>/<repo> instead of GitHub
    #[arg(long, value_name = "DIR")]
    pub(crate) local: Option<PathBuf>,

    /// With --local, do not respect .gitignore rules
    #[arg(long, requires = "local")]
    pub(crate) no_gitignore: bool,

    /// Branch whose tree is listed
    #[arg(long, default_value = DEFAULT_BRANCH)]
    pub(crate) branch: String,

    /// GitHub REST API base URL
    #[arg(long, value_name = "URL", default_value = DEFAULT_API_URL)]
    pub(crate) api_url: String,

    /// Compare only the first <N> source files of each repository
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_FILES_PER_REPO)]
    pub(crate) max_files: usize,

    /// Skip files longer than <N> characters
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_FILE_CHARS)]
    pub(crate) max_file_size: usize,

    /// Number of source-repository files held in memory at once
    #[arg(
        long,
        value_name = "N",
        default_value_t = DEFAULT_BATCH_SIZE,
        value_parser = parse_batch_size
    )]
    pub(crate) batch_size: usize,

    /// Refetch target files for every source file instead of caching them
    #[arg(long)]
    pub(crate) no_cache: bool,
}

impl CompareArgs {
    pub(crate) fn compare_options(&self) -> CompareOptions {
        CompareOptions {
            max_files_per_repo: self.max_files,
            max_file_chars: self.max_file_size,
            batch_size: self.batch_size,
            cache_side_b: !self.no_cache,
        }
    }
}

fn parse_batch_size(raw: &str) -> Result<usize, String> {
    let value = raw
        .parse::<usize>()
        .map_err(|_| "must be an integer".to_string())?;
    if value == 0 {
        return Err("must be at least 1".to_string());
    }
    Ok(value)
}

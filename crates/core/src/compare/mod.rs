mod accumulate;

#[cfg(test)]
mod tests;

use std::borrow::Cow;
use std::thread;

use crate::error::{CompareError, FetchError, ListError};
use crate::normalize::{exceeds_chars, normalize};
use crate::similarity::{SimilarityMethod, score_pair};
use crate::source::{ContentFetcher, FileLister, RepoSlug};
use crate::types::{CompareOptions, CompareOutcome, CompareStats, ComparisonReport, SourceFile};

use accumulate::ReportBuilder;

impl CompareOptions {
    pub fn validate(&self) -> Result<(), CompareError> {
        if self.batch_size == 0 {
            return Err(CompareError::InvalidOptions(
                "batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Lists both repositories, then compares every pair of their files.
///
/// Listing failures abort the comparison. Files whose content cannot be
/// fetched are skipped.
pub fn compare_repositories<L, F>(
    repo_a: &RepoSlug,
    repo_b: &RepoSlug,
    lister: &L,
    fetcher: &F,
    options: &CompareOptions,
) -> Result<ComparisonReport, CompareError>
where
    L: FileLister + Sync + ?Sized,
    F: ContentFetcher + ?Sized,
{
    Ok(compare_repositories_with_stats(repo_a, repo_b, lister, fetcher, options)?.result)
}

pub fn compare_repositories_with_stats<L, F>(
    repo_a: &RepoSlug,
    repo_b: &RepoSlug,
    lister: &L,
    fetcher: &F,
    options: &CompareOptions,
) -> Result<CompareOutcome<ComparisonReport>, CompareError>
where
    L: FileLister + Sync + ?Sized,
    F: ContentFetcher + ?Sized,
{
    options.validate()?;

    let (files_a, files_b) = list_both(repo_a, repo_b, lister)?;
    Ok(compare_files_with_stats(
        repo_a, &files_a, repo_b, &files_b, fetcher, options,
    ))
}

fn list_both<L>(
    repo_a: &RepoSlug,
    repo_b: &RepoSlug,
    lister: &L,
) -> Result<(Vec<SourceFile>, Vec<SourceFile>), ListError>
where
    L: FileLister + Sync + ?Sized,
{
    let list = |repo: &RepoSlug| {
        tracing::info!(repo = %repo, "fetching files");
        let files = lister.list_files(repo)?;
        tracing::info!(repo = %repo, count = files.len(), "found source files");
        Ok::<_, ListError>(files)
    };

    thread::scope(|scope| {
        let handle_b = scope.spawn(|| list(repo_b));
        let files_a = list(repo_a);
        let files_b = match handle_b.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        };
        Ok((files_a?, files_b?))
    })
}

pub fn compare_files<F>(
    repo_a: &RepoSlug,
    files_a: &[SourceFile],
    repo_b: &RepoSlug,
    files_b: &[SourceFile],
    fetcher: &F,
    options: &CompareOptions,
) -> ComparisonReport
where
    F: ContentFetcher + ?Sized,
{
    compare_files_with_stats(repo_a, files_a, repo_b, files_b, fetcher, options).result
}

/// Scores every side-A file against every side-B file.
///
/// Side A is walked in batches of `options.batch_size`; only the current
/// batch's normalized text is held. A zero `batch_size` is treated as 1.
pub fn compare_files_with_stats<F>(
    repo_a: &RepoSlug,
    files_a: &[SourceFile],
    repo_b: &RepoSlug,
    files_b: &[SourceFile],
    fetcher: &F,
    options: &CompareOptions,
) -> CompareOutcome<ComparisonReport>
where
    F: ContentFetcher + ?Sized,
{
    let mut stats = CompareStats {
        listed_files_a: files_a.len() as u64,
        listed_files_b: files_b.len() as u64,
        ..CompareStats::default()
    };

    let max_files = options.max_files_per_repo;
    let files_a = cap_files(files_a, max_files, &mut stats.skipped_budget_max_files_a);
    let files_b = cap_files(files_b, max_files, &mut stats.skipped_budget_max_files_b);
    if stats.was_truncated() {
        tracing::warn!(
            skipped_a = stats.skipped_budget_max_files_a,
            skipped_b = stats.skipped_budget_max_files_b,
            "large repositories detected; analyzing the first {max_files} files from each repo"
        );
    }

    let mut side_b = SideB::new(repo_b, files_b, fetcher, options);
    let mut report = ReportBuilder::default();

    for batch in files_a.chunks(options.batch_size.max(1)) {
        stats.batches = stats.batches.saturating_add(1);

        let normalized_a: Vec<(&SourceFile, String)> = batch
            .iter()
            .filter_map(
                |file| match load_normalized(fetcher, repo_a, file, options.max_file_chars) {
                    Ok(text) => Some((file, text)),
                    Err(skip) => {
                        skip.record(&mut stats);
                        None
                    }
                },
            )
            .collect();

        for (file_a, text_a) in &normalized_a {
            for idx_b in 0..files_b.len() {
                let Some(text_b) = side_b.normalized(idx_b, &mut stats) else {
                    continue;
                };

                let scored = score_pair(text_a, &text_b);
                stats.compared_pairs = stats.compared_pairs.saturating_add(1);
                if scored.method == SimilarityMethod::LengthGate {
                    stats.length_gated_pairs = stats.length_gated_pairs.saturating_add(1);
                }
                report.record(&file_a.path, &files_b[idx_b].path, scored.score);
            }
        }
    }

    let result = report.finish();
    tracing::info!(
        identical = result.summary.identical_count,
        similar = result.summary.similar_count,
        pairs = stats.compared_pairs,
        "analysis complete"
    );
    CompareOutcome { result, stats }
}

fn cap_files<'a>(files: &'a [SourceFile], max: usize, skipped: &mut u64) -> &'a [SourceFile] {
    if files.len() <= max {
        return files;
    }
    *skipped = (files.len() - max) as u64;
    &files[..max]
}

#[derive(Debug)]
enum Skip {
    FetchFailed(FetchError),
    TooLarge { path: String, chars: usize },
    Empty { path: String },
}

impl Skip {
    fn record(&self, stats: &mut CompareStats) {
        match self {
            Self::FetchFailed(err) => {
                tracing::debug!(error = %err, "skipping file: content unavailable");
                stats.skipped_fetch_failed = stats.skipped_fetch_failed.saturating_add(1);
            }
            Self::TooLarge { path, chars } => {
                tracing::debug!(path = %path, chars, "skipping file: too large");
                stats.skipped_too_large = stats.skipped_too_large.saturating_add(1);
            }
            Self::Empty { path } => {
                tracing::debug!(path = %path, "skipping file: empty");
                stats.skipped_empty = stats.skipped_empty.saturating_add(1);
            }
        }
    }
}

/// Fetches and normalizes one file. The raw content is dropped on return.
fn load_normalized<F>(
    fetcher: &F,
    repo: &RepoSlug,
    file: &SourceFile,
    max_file_chars: usize,
) -> Result<String, Skip>
where
    F: ContentFetcher + ?Sized,
{
    let content = fetcher
        .fetch_content(repo, file)
        .map_err(Skip::FetchFailed)?;
    if content.is_empty() {
        return Err(Skip::Empty {
            path: file.path.clone(),
        });
    }
    if exceeds_chars(&content, max_file_chars) {
        return Err(Skip::TooLarge {
            path: file.path.clone(),
            chars: content.chars().count(),
        });
    }
    Ok(normalize(&content))
}

#[derive(Debug)]
enum Slot {
    Pending,
    Skipped,
    Ready(String),
}

/// Side-B texts, either cached across batches or refetched per pair.
///
/// Skips are counted once per file regardless of how often it is refetched.
struct SideB<'a, F: ?Sized> {
    repo: &'a RepoSlug,
    files: &'a [SourceFile],
    fetcher: &'a F,
    max_file_chars: usize,
    cache: Option<Vec<Slot>>,
    skip_recorded: Vec<bool>,
}

impl<'a, F> SideB<'a, F>
where
    F: ContentFetcher + ?Sized,
{
    fn new(
        repo: &'a RepoSlug,
        files: &'a [SourceFile],
        fetcher: &'a F,
        options: &CompareOptions,
    ) -> Self {
        let cache = options
            .cache_side_b
            .then(|| files.iter().map(|_| Slot::Pending).collect());
        Self {
            repo,
            files,
            fetcher,
            max_file_chars: options.max_file_chars,
            cache,
            skip_recorded: vec![false; files.len()],
        }
    }

    fn normalized(&mut self, idx: usize, stats: &mut CompareStats) -> Option<Cow<'_, str>> {
        let file = &self.files[idx];

        let Some(cache) = self.cache.as_mut() else {
            return match load_normalized(self.fetcher, self.repo, file, self.max_file_chars) {
                Ok(text) => Some(Cow::Owned(text)),
                Err(skip) => {
                    if !self.skip_recorded[idx] {
                        self.skip_recorded[idx] = true;
                        skip.record(stats);
                    }
                    None
                }
            };
        };

        if let Slot::Pending = cache[idx] {
            cache[idx] = match load_normalized(self.fetcher, self.repo, file, self.max_file_chars) {
                Ok(text) => Slot::Ready(text),
                Err(skip) => {
                    skip.record(stats);
                    Slot::Skipped
                }
            };
        }

        match &cache[idx] {
            Slot::Ready(text) => Some(Cow::Borrowed(text.as_str())),
            Slot::Pending | Slot::Skipped => None,
        }
    }
}

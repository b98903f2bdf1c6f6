use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::types::{DEFAULT_MAX_FILE_CHARS, DEFAULT_MAX_FILES_PER_REPO, IdenticalPair};

/// Repositories held in memory. `None` content simulates a failed fetch.
#[derive(Default)]
struct MemoryRepos {
    repos: HashMap<RepoSlug, Vec<(String, Option<String>)>>,
    listings: AtomicUsize,
    fetches: AtomicUsize,
}

impl MemoryRepos {
    fn with_repo(mut self, slug: &RepoSlug, files: Vec<(&str, Option<String>)>) -> Self {
        let files = files
            .into_iter()
            .map(|(path, content)| (path.to_string(), content))
            .collect();
        self.repos.insert(slug.clone(), files);
        self
    }

    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl FileLister for MemoryRepos {
    fn list_files(&self, repo: &RepoSlug) -> Result<Vec<SourceFile>, ListError> {
        self.listings.fetch_add(1, Ordering::Relaxed);
        let files = self
            .repos
            .get(repo)
            .ok_or_else(|| ListError::NotFound { repo: repo.clone() })?;
        Ok(files
            .iter()
            .map(|(path, content)| SourceFile {
                path: path.clone(),
                content_id: path.clone(),
                size: content.as_ref().map(|c| c.len() as u64),
            })
            .collect())
    }
}

impl ContentFetcher for MemoryRepos {
    fn fetch_content(&self, repo: &RepoSlug, file: &SourceFile) -> Result<String, FetchError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.repos
            .get(repo)
            .and_then(|files| files.iter().find(|(path, _)| *path == file.content_id))
            .and_then(|(_, content)| content.clone())
            .ok_or_else(|| FetchError::NotFound {
                path: file.path.clone(),
            })
    }
}

fn slugs() -> (RepoSlug, RepoSlug) {
    (RepoSlug::new("alice", "hw"), RepoSlug::new("bob", "hw"))
}

fn text(s: &str) -> Option<String> {
    Some(s.to_string())
}

#[test]
fn identical_after_normalization_lands_only_in_identical_pairs() {
    let (a, b) = slugs();
    let repos = MemoryRepos::default()
        .with_repo(
            &a,
            vec![("a.js", text("function f() {\n  return 1; // one\n}\n"))],
        )
        .with_repo(&b, vec![("x.py", text("FUNCTION f() { return 1 } # one"))]);

    let report = compare_repositories(&a, &b, &repos, &repos, &CompareOptions::default())
        .expect("compare");

    assert_eq!(
        report.identical_pairs,
        vec![IdenticalPair {
            path_a: "a.js".to_string(),
            path_b: "x.py".to_string(),
        }]
    );
    assert!(report.similar_pairs.is_empty());
    assert_eq!(report.summary.identical_count, 1);
    assert_eq!(report.summary.similar_count, 0);
}

#[test]
fn score_of_exactly_point_seven_is_discarded() {
    let (a, b) = slugs();
    let repos = MemoryRepos::default()
        .with_repo(&a, vec![("a.c", text("abcdefghij"))])
        .with_repo(
            &b,
            vec![("seven.c", text("abcdefgxyz")), ("eight.c", text("abcdefghyz"))],
        );

    let report = compare_repositories(&a, &b, &repos, &repos, &CompareOptions::default())
        .expect("compare");

    assert!(report.identical_pairs.is_empty());
    assert_eq!(report.similar_pairs.len(), 1);
    assert_eq!(report.similar_pairs[0].path_b, "eight.c");
    assert!((report.similar_pairs[0].score - 0.8).abs() < 1e-12);
}

#[test]
fn similar_pairs_are_sorted_by_descending_score() {
    let (a, b) = slugs();
    let repos = MemoryRepos::default()
        .with_repo(
            &a,
            vec![("low.c", text("abcdefghyz")), ("high.c", text("abcdefghiz"))],
        )
        .with_repo(&b, vec![("ref.c", text("abcdefghij"))]);

    let outcome =
        compare_repositories_with_stats(&a, &b, &repos, &repos, &CompareOptions::default())
            .expect("compare");

    let order: Vec<&str> = outcome
        .result
        .similar_pairs
        .iter()
        .map(|p| p.path_a.as_str())
        .collect();
    assert_eq!(order, vec!["high.c", "low.c"]);
    assert_eq!(outcome.result.summary.high_similarity_count, 0);
    assert!((outcome.result.summary.average_score - 0.85).abs() < 1e-12);
    assert_eq!(outcome.stats.compared_pairs, 2);
}

#[test]
fn caps_each_side_at_max_files_and_signals_truncation() {
    let (a, b) = slugs();
    let files_a: Vec<SourceFile> = (0..150)
        .map(|i| SourceFile {
            path: format!("f{i:03}.js"),
            content_id: format!("f{i:03}.js"),
            size: None,
        })
        .collect();
    let files_b = vec![SourceFile {
        path: "only.js".to_string(),
        content_id: "only.js".to_string(),
        size: None,
    }];
    let repos = MemoryRepos::default()
        .with_repo(
            &a,
            files_a
                .iter()
                .map(|f| (f.path.as_str(), text("let x = 1;")))
                .collect(),
        )
        .with_repo(&b, vec![("only.js", text("let x = 1;"))]);

    let outcome = compare_files_with_stats(
        &a,
        &files_a,
        &b,
        &files_b,
        &repos,
        &CompareOptions::default(),
    );

    assert!(outcome.stats.was_truncated());
    assert_eq!(outcome.stats.listed_files_a, 150);
    assert_eq!(outcome.stats.skipped_budget_max_files_a, 50);
    assert_eq!(outcome.stats.skipped_budget_max_files_b, 0);
    assert_eq!(outcome.stats.compared_pairs, DEFAULT_MAX_FILES_PER_REPO as u64);
    assert_eq!(outcome.result.identical_pairs.len(), 100);
    assert_eq!(outcome.result.identical_pairs[99].path_a, "f099.js");
}

#[test]
fn oversized_files_contribute_no_pairs() {
    let (a, b) = slugs();
    let big = "a".repeat(DEFAULT_MAX_FILE_CHARS + 1);
    let at_limit = "b".repeat(DEFAULT_MAX_FILE_CHARS);
    let repos = MemoryRepos::default()
        .with_repo(&a, vec![("big.js", Some(big.clone())), ("edge.js", Some(at_limit.clone()))])
        .with_repo(&b, vec![("big.py", Some(big)), ("edge.py", Some(at_limit))]);

    let outcome =
        compare_repositories_with_stats(&a, &b, &repos, &repos, &CompareOptions::default())
            .expect("compare");

    assert_eq!(outcome.stats.skipped_too_large, 2);
    assert_eq!(outcome.stats.compared_pairs, 1);
    assert_eq!(outcome.result.identical_pairs.len(), 1);
    assert_eq!(outcome.result.identical_pairs[0].path_a, "edge.js");
    assert!(
        outcome
            .result
            .similar_pairs
            .iter()
            .all(|p| !p.path_a.starts_with("big") && !p.path_b.starts_with("big"))
    );
}

#[test]
fn fetch_failures_skip_the_file_without_aborting() {
    let (a, b) = slugs();
    let repos = MemoryRepos::default()
        .with_repo(&a, vec![("gone.rs", None), ("main.rs", text("fn main() {}"))])
        .with_repo(&b, vec![("lost.rs", None), ("main.rs", text("fn main() {}"))]);

    let outcome =
        compare_repositories_with_stats(&a, &b, &repos, &repos, &CompareOptions::default())
            .expect("compare");

    assert_eq!(outcome.stats.skipped_fetch_failed, 2);
    assert_eq!(outcome.stats.compared_pairs, 1);
    assert_eq!(outcome.result.identical_pairs.len(), 1);
}

#[test]
fn empty_repository_yields_zeroed_report() {
    let (a, b) = slugs();
    let repos = MemoryRepos::default()
        .with_repo(&a, vec![("main.go", text("package main"))])
        .with_repo(&b, Vec::new());

    let outcome =
        compare_repositories_with_stats(&a, &b, &repos, &repos, &CompareOptions::default())
            .expect("compare");

    assert!(outcome.result.is_empty());
    assert_eq!(outcome.result.summary.similar_count, 0);
    assert_eq!(outcome.result.summary.high_similarity_count, 0);
    assert_eq!(outcome.result.summary.average_score, 0.0);
    assert_eq!(outcome.stats.compared_pairs, 0);
    assert!(!outcome.stats.was_truncated());
}

#[test]
fn listing_failure_is_fatal() {
    let (a, b) = slugs();
    let repos = MemoryRepos::default().with_repo(&a, vec![("main.go", text("package main"))]);

    let err = compare_repositories(&a, &b, &repos, &repos, &CompareOptions::default())
        .unwrap_err();

    match err {
        CompareError::Listing(ListError::NotFound { repo }) => assert_eq!(repo, b),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(repos.fetch_count(), 0);
}

#[test]
fn zero_batch_size_is_rejected_before_listing() {
    let (a, b) = slugs();
    let repos = MemoryRepos::default();
    let options = CompareOptions {
        batch_size: 0,
        ..CompareOptions::default()
    };

    let err = compare_repositories(&a, &b, &repos, &repos, &options).unwrap_err();
    assert!(matches!(err, CompareError::InvalidOptions(_)));
    assert_eq!(repos.listings.load(Ordering::Relaxed), 0);
}

#[test]
fn side_a_is_processed_in_batches() {
    let (a, b) = slugs();
    let files: Vec<(String, Option<String>)> = (0..25)
        .map(|i| (format!("f{i}.ts"), text(&format!("export const v{i} = {i};"))))
        .collect();
    let repos = MemoryRepos::default()
        .with_repo(&a, files.iter().map(|(p, c)| (p.as_str(), c.clone())).collect())
        .with_repo(&b, vec![("v.ts", text("export const v0 = 0;"))]);

    let outcome =
        compare_repositories_with_stats(&a, &b, &repos, &repos, &CompareOptions::default())
            .expect("compare");

    assert_eq!(outcome.stats.batches, 3);
    assert_eq!(outcome.stats.compared_pairs, 25);
    assert_eq!(outcome.result.identical_pairs.len(), 1);
}

#[test]
fn side_b_cache_changes_fetch_count_but_not_results() {
    let (a, b) = slugs();
    let build = || {
        MemoryRepos::default()
            .with_repo(
                &a,
                vec![
                    ("one.rb", text("def one\n  1\nend")),
                    ("two.rb", text("def two\n  2\nend")),
                    ("three.rb", text("def three\n  3\nend")),
                ],
            )
            .with_repo(
                &b,
                vec![
                    ("one.rb", text("def one\n  1\nend")),
                    ("uno.rb", text("def uno\n  1\nend")),
                    ("broken.rb", None),
                ],
            )
    };

    let cached_repos = build();
    let cached = compare_repositories_with_stats(
        &a,
        &b,
        &cached_repos,
        &cached_repos,
        &CompareOptions::default(),
    )
    .expect("compare");

    let uncached_repos = build();
    let uncached = compare_repositories_with_stats(
        &a,
        &b,
        &uncached_repos,
        &uncached_repos,
        &CompareOptions {
            cache_side_b: false,
            ..CompareOptions::default()
        },
    )
    .expect("compare");

    assert_eq!(cached.result, uncached.result);
    assert_eq!(cached.stats, uncached.stats);
    assert_eq!(cached.stats.skipped_fetch_failed, 1);
    // 3 side-A fetches, then 3 side-B fetches once vs. once per side-A file.
    assert_eq!(cached_repos.fetch_count(), 6);
    assert_eq!(uncached_repos.fetch_count(), 12);
}

#[test]
fn pairs_rejected_by_length_gate_are_counted() {
    let (a, b) = slugs();
    let repos = MemoryRepos::default()
        .with_repo(&a, vec![("tiny.php", text("echo 1"))])
        .with_repo(&b, vec![("huge.php", Some("echo 1 ".repeat(200)))]);

    let outcome =
        compare_repositories_with_stats(&a, &b, &repos, &repos, &CompareOptions::default())
            .expect("compare");

    assert_eq!(outcome.stats.compared_pairs, 1);
    assert_eq!(outcome.stats.length_gated_pairs, 1);
    assert!(outcome.result.is_empty());
}

#[test]
fn compares_local_checkouts_end_to_end() -> std::io::Result<()> {
    use crate::local::LocalCheckouts;

    let tmp = tempfile::tempdir()?;
    let write = |rel: &str, content: &str| -> std::io::Result<()> {
        let path = tmp.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    };
    write("alice/hw/src/sum.py", "def total(xs):\n    # add up\n    return sum(xs)\n")?;
    write("alice/hw/notes.txt", "not source")?;
    write("bob/hw/lib/sum.py", "def total(xs):\n    return sum(xs)  # same\n")?;

    let (a, b) = slugs();
    let checkouts = LocalCheckouts::new(tmp.path());
    let outcome =
        compare_repositories_with_stats(&a, &b, &checkouts, &checkouts, &CompareOptions::default())
            .expect("compare");

    assert_eq!(
        outcome.result.identical_pairs,
        vec![IdenticalPair {
            path_a: "src/sum.py".to_string(),
            path_b: "lib/sum.py".to_string(),
        }]
    );
    assert_eq!(outcome.stats.listed_files_a, 1);
    assert_eq!(outcome.stats.listed_files_b, 1);
    assert_eq!(outcome.stats.compared_pairs, 1);
    Ok(())
}

#[test]
fn empty_files_are_skipped_on_both_sides() {
    let (a, b) = slugs();
    let repos = MemoryRepos::default()
        .with_repo(
            &a,
            vec![
                ("pkg/__init__.py", text("")),
                ("util/__init__.py", text("")),
                ("main.py", text("print(total([1, 2]))")),
            ],
        )
        .with_repo(
            &b,
            vec![
                ("lib/__init__.py", text("")),
                ("x/__init__.py", text("")),
                ("main.py", text("print(total([1, 2]))")),
            ],
        );

    let outcome =
        compare_repositories_with_stats(&a, &b, &repos, &repos, &CompareOptions::default())
            .expect("compare");

    assert_eq!(
        outcome.result.identical_pairs,
        vec![IdenticalPair {
            path_a: "main.py".to_string(),
            path_b: "main.py".to_string(),
        }]
    );
    assert!(outcome.result.similar_pairs.is_empty());
    assert_eq!(outcome.stats.skipped_empty, 4);
    assert_eq!(outcome.stats.compared_pairs, 1);
    assert_eq!(outcome.stats.skipped_files(), 0);
}

#[test]
fn comment_only_files_are_still_compared() {
    let (a, b) = slugs();
    let repos = MemoryRepos::default()
        .with_repo(&a, vec![("notes.py", text("# just a note\n"))])
        .with_repo(&b, vec![("todo.rb", text("# something else"))]);

    let outcome =
        compare_repositories_with_stats(&a, &b, &repos, &repos, &CompareOptions::default())
            .expect("compare");

    assert_eq!(outcome.result.identical_pairs.len(), 1);
    assert_eq!(outcome.stats.skipped_empty, 0);
    assert_eq!(outcome.stats.compared_pairs, 1);
}

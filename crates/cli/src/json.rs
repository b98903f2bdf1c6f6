use std::io;

use repo_diff_match_core::{CompareStats, ComparisonReport};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonCompareStats {
    pub(crate) listed_files_a: u64,
    pub(crate) listed_files_b: u64,
    pub(crate) skipped_budget_max_files_a: u64,
    pub(crate) skipped_budget_max_files_b: u64,
    pub(crate) skipped_fetch_failed: u64,
    pub(crate) skipped_too_large: u64,
    pub(crate) skipped_empty: u64,
    pub(crate) compared_pairs: u64,
    pub(crate) length_gated_pairs: u64,
    pub(crate) batches: u64,
    pub(crate) truncated: bool,
}

impl From<&CompareStats> for JsonCompareStats {
    fn from(stats: &CompareStats) -> Self {
        Self {
            truncated: stats.was_truncated(),
            listed_files_a: stats.listed_files_a,
            listed_files_b: stats.listed_files_b,
            skipped_budget_max_files_a: stats.skipped_budget_max_files_a,
            skipped_budget_max_files_b: stats.skipped_budget_max_files_b,
            skipped_fetch_failed: stats.skipped_fetch_failed,
            skipped_too_large: stats.skipped_too_large,
            skipped_empty: stats.skipped_empty,
            compared_pairs: stats.compared_pairs,
            length_gated_pairs: stats.length_gated_pairs,
            batches: stats.batches,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonIdenticalPair {
    pub(crate) file_a: String,
    pub(crate) file_b: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonSimilarPair {
    pub(crate) file_a: String,
    pub(crate) file_b: String,
    pub(crate) similarity: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonSummary {
    pub(crate) similar_count: usize,
    pub(crate) identical_count: usize,
    pub(crate) high_similarity_count: usize,
    pub(crate) average_similarity: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonComparisonReport {
    pub(crate) repo_a: String,
    pub(crate) repo_b: String,
    pub(crate) identical_files: Vec<JsonIdenticalPair>,
    pub(crate) similarities: Vec<JsonSimilarPair>,
    pub(crate) summary: JsonSummary,
}

pub(crate) fn map_report(
    repo_a: String,
    repo_b: String,
    report: ComparisonReport,
) -> JsonComparisonReport {
    JsonComparisonReport {
        repo_a,
        repo_b,
        identical_files: report
            .identical_pairs
            .into_iter()
            .map(|p| JsonIdenticalPair {
                file_a: p.path_a,
                file_b: p.path_b,
            })
            .collect(),
        similarities: report
            .similar_pairs
            .into_iter()
            .map(|p| JsonSimilarPair {
                file_a: p.path_a,
                file_b: p.path_b,
                similarity: p.score,
            })
            .collect(),
        summary: JsonSummary {
            similar_count: report.summary.similar_count,
            identical_count: report.summary.identical_count,
            high_similarity_count: report.summary.high_similarity_count,
            average_similarity: report.summary.average_score,
        },
    }
}

pub(crate) fn write_json<T: Serialize>(value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::other(format!("json encode: {e}")))?;
    println!("{json}");
    Ok(())
}

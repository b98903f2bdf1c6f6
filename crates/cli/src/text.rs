use repo_diff_match_core::CompareStats;

use crate::json::JsonComparisonReport;

const IDENTICAL_PREVIEW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub(crate) fn from_average(average: f64) -> Self {
        if average > 0.8 {
            Self::High
        } else if average > 0.6 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    fn verdict(self) -> &'static str {
        match self {
            Self::High => "High plagiarism risk detected!",
            Self::Moderate => "Moderate similarity detected",
            Self::Low => "Low plagiarism risk",
        }
    }
}

fn tier(score: f64) -> &'static str {
    if score > 0.9 {
        "high"
    } else if score > 0.8 {
        "elevated"
    } else {
        "moderate"
    }
}

fn percent(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

/// Strict mode fails when any file was left out of the comparison.
pub(crate) fn has_skips(stats: &CompareStats) -> bool {
    stats.was_truncated() || stats.skipped_files() > 0
}

pub(crate) fn format_compare_stats(stats: &CompareStats) -> String {
    let mut out = String::new();
    out.push_str("== compare stats ==\n");
    out.push_str(&format!(
        "listed_a={} listed_b={} pairs={} length_gated={} batches={}\n",
        stats.listed_files_a,
        stats.listed_files_b,
        stats.compared_pairs,
        stats.length_gated_pairs,
        stats.batches
    ));

    let mut skips: Vec<(&str, u64)> = vec![
        ("budget_max_files_a", stats.skipped_budget_max_files_a),
        ("budget_max_files_b", stats.skipped_budget_max_files_b),
        ("fetch_failed", stats.skipped_fetch_failed),
        ("too_large", stats.skipped_too_large),
        ("empty", stats.skipped_empty),
    ];
    skips.retain(|(_, v)| *v > 0);
    if !skips.is_empty() {
        out.push_str("skipped:\n");
        for (k, v) in skips {
            out.push_str(&format!("- {k}={v}\n"));
        }
    }
    out.push('\n');
    out
}

pub(crate) fn format_text_report(report: &JsonComparisonReport) -> String {
    let mut out = String::new();
    out.push_str("Comparing repositories:\n");
    out.push_str(&format!("  Source: {}\n", report.repo_a));
    out.push_str(&format!("  Target: {}\n\n", report.repo_b));
    out.push_str("Similarity Report\n\n");

    let identical = &report.identical_files;
    if !identical.is_empty() {
        out.push_str(&format!(
            "Identical files (skipped): {}\n",
            identical.len()
        ));
        for pair in identical.iter().take(IDENTICAL_PREVIEW) {
            out.push_str(&format!("  {} <-> {}\n", pair.file_a, pair.file_b));
        }
        if identical.len() > IDENTICAL_PREVIEW {
            out.push_str(&format!(
                "  ... and {} more\n",
                identical.len() - IDENTICAL_PREVIEW
            ));
        }
        out.push('\n');
    }

    if report.similarities.is_empty() {
        out.push_str("No significant similarities found\n");
        return out;
    }

    for pair in &report.similarities {
        out.push_str(&format!(
            "{} similarity [{}]\n",
            percent(pair.similarity),
            tier(pair.similarity)
        ));
        out.push_str(&format!("  {} <-> {}\n\n", pair.file_a, pair.file_b));
    }

    let summary = &report.summary;
    out.push_str("Summary:\n");
    out.push_str(&format!("  Similar files: {}\n", summary.similar_count));
    out.push_str(&format!(
        "  Identical files (skipped): {}\n",
        summary.identical_count
    ));
    out.push_str(&format!(
        "  High similarity (>90%): {}\n",
        summary.high_similarity_count
    ));
    out.push_str(&format!(
        "  Average similarity: {}\n",
        percent(summary.average_similarity)
    ));
    out.push('\n');
    out.push_str(RiskLevel::from_average(summary.average_similarity).verdict());
    out.push('\n');
    out
}

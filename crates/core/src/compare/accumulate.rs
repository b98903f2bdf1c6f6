use crate::types::{
    ComparisonReport, HIGH_SIMILARITY_THRESHOLD, IdenticalPair, ReportSummary, SIMILAR_THRESHOLD,
    SimilarityResult,
};

#[derive(Debug, Default)]
pub(super) struct ReportBuilder {
    identical: Vec<IdenticalPair>,
    similar: Vec<SimilarityResult>,
}

impl ReportBuilder {
    pub(super) fn record(&mut self, path_a: &str, path_b: &str, score: f64) {
        if score == 1.0 {
            self.identical.push(IdenticalPair {
                path_a: path_a.to_string(),
                path_b: path_b.to_string(),
            });
        } else if score > SIMILAR_THRESHOLD {
            self.similar.push(SimilarityResult {
                path_a: path_a.to_string(),
                path_b: path_b.to_string(),
                score,
            });
        }
    }

    pub(super) fn finish(mut self) -> ComparisonReport {
        // Stable: equal scores keep encounter order.
        self.similar.sort_by(|a, b| b.score.total_cmp(&a.score));

        let summary = summarize(&self.identical, &self.similar);
        ComparisonReport {
            identical_pairs: self.identical,
            similar_pairs: self.similar,
            summary,
        }
    }
}

fn summarize(identical: &[IdenticalPair], similar: &[SimilarityResult]) -> ReportSummary {
    let average_score = if similar.is_empty() {
        0.0
    } else {
        similar.iter().map(|p| p.score).sum::<f64>() / similar.len() as f64
    };
    ReportSummary {
        similar_count: similar.len(),
        identical_count: identical.len(),
        high_similarity_count: similar
            .iter()
            .filter(|p| p.score > HIGH_SIMILARITY_THRESHOLD)
            .count(),
        average_score,
    }
}

/// Pairs scoring at or below this are not reported.
pub const SIMILAR_THRESHOLD: f64 = 0.7;
/// Pairs scoring above this count towards `high_similarity_count`.
pub const HIGH_SIMILARITY_THRESHOLD: f64 = 0.9;

pub const DEFAULT_MAX_FILES_PER_REPO: usize = 100;
pub const DEFAULT_MAX_FILE_CHARS: usize = 50_000;
pub const DEFAULT_BATCH_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareOptions {
    /// Only the first `max_files_per_repo` listed files of each side are compared.
    pub max_files_per_repo: usize,
    /// Files whose fetched content exceeds this many characters are skipped.
    pub max_file_chars: usize,
    /// Number of side-A files normalized and held at once.
    pub batch_size: usize,
    /// Keep side-B normalized text across batches instead of refetching it.
    pub cache_side_b: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            max_files_per_repo: DEFAULT_MAX_FILES_PER_REPO,
            max_file_chars: DEFAULT_MAX_FILE_CHARS,
            batch_size: DEFAULT_BATCH_SIZE,
            cache_side_b: true,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompareStats {
    pub listed_files_a: u64,
    pub listed_files_b: u64,
    pub skipped_budget_max_files_a: u64,
    pub skipped_budget_max_files_b: u64,
    pub skipped_fetch_failed: u64,
    pub skipped_too_large: u64,
    /// Empty files carry nothing to compare and are not counted as skips.
    pub skipped_empty: u64,
    pub compared_pairs: u64,
    pub length_gated_pairs: u64,
    pub batches: u64,
}

impl CompareStats {
    /// True when either side had more files than `max_files_per_repo`.
    pub fn was_truncated(&self) -> bool {
        self.skipped_budget_max_files_a > 0 || self.skipped_budget_max_files_b > 0
    }

    pub fn skipped_files(&self) -> u64 {
        self.skipped_fetch_failed.saturating_add(self.skipped_too_large)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompareOutcome<T> {
    pub result: T,
    pub stats: CompareStats,
}

/// A listed file of one repository. Content is fetched on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    /// Blob sha for GitHub listings, relative path for local checkouts.
    pub content_id: String,
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdenticalPair {
    pub path_a: String,
    pub path_b: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityResult {
    pub path_a: String,
    pub path_b: String,
    pub score: f64,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReportSummary {
    pub similar_count: usize,
    pub identical_count: usize,
    pub high_similarity_count: usize,
    /// Mean score over similar pairs; 0.0 when there are none.
    pub average_score: f64,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ComparisonReport {
    pub identical_pairs: Vec<IdenticalPair>,
    /// Sorted by descending score; ties keep encounter order.
    pub similar_pairs: Vec<SimilarityResult>,
    pub summary: ReportSummary,
}

impl ComparisonReport {
    pub fn is_empty(&self) -> bool {
        self.identical_pairs.is_empty() && self.similar_pairs.is_empty()
    }
}

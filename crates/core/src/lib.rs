mod compare;
mod error;
mod local;
mod normalize;
mod similarity;
mod source;
mod types;

pub use compare::{
    compare_files, compare_files_with_stats, compare_repositories,
    compare_repositories_with_stats,
};

pub use error::{CompareError, FetchError, ListError, RepoParseError};

pub use local::LocalCheckouts;

pub use normalize::{MAX_NORMALIZED_INPUT_CHARS, normalize};

pub use similarity::{
    EXACT_METHOD_MAX_CHARS, LENGTH_GATE_RATIO, PairScore, SimilarityMethod, frequency_similarity,
    levenshtein_distance, score_pair, similarity,
};

pub use source::{
    ContentFetcher, EXCLUDED_PATH_SEGMENTS, FileLister, RepoSlug, SOURCE_EXTENSIONS,
    is_comparable_source_path,
};

pub use types::{
    CompareOptions, CompareOutcome, CompareStats, ComparisonReport, DEFAULT_BATCH_SIZE,
    DEFAULT_MAX_FILE_CHARS, DEFAULT_MAX_FILES_PER_REPO, HIGH_SIMILARITY_THRESHOLD, IdenticalPair,
    ReportSummary, SIMILAR_THRESHOLD, SimilarityResult, SourceFile,
};

use std::collections::HashMap;

/// Pairs whose length difference exceeds this share of the longer length score 0.
pub const LENGTH_GATE_RATIO: f64 = 0.8;
/// Longer inputs fall back to [`frequency_similarity`].
pub const EXACT_METHOD_MAX_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityMethod {
    /// Rejected before comparing; the score is 0.
    LengthGate,
    /// Both inputs empty; the score is 1.
    Empty,
    Exact,
    Approximate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairScore {
    pub score: f64,
    pub method: SimilarityMethod,
}

/// Similarity of two normalized strings, in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    score_pair(a, b).score
}

/// Like [`similarity`], but also reports which path produced the score.
pub fn score_pair(a: &str, b: &str) -> PairScore {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let max_len = a_chars.len().max(b_chars.len());
    let length_diff = a_chars.len().abs_diff(b_chars.len());
    if length_diff as f64 > max_len as f64 * LENGTH_GATE_RATIO {
        return PairScore {
            score: 0.0,
            method: SimilarityMethod::LengthGate,
        };
    }

    let (longer, shorter) = if b_chars.len() > a_chars.len() {
        (&b_chars, &a_chars)
    } else {
        (&a_chars, &b_chars)
    };
    if longer.is_empty() {
        return PairScore {
            score: 1.0,
            method: SimilarityMethod::Empty,
        };
    }

    if longer.len() > EXACT_METHOD_MAX_CHARS {
        return PairScore {
            score: frequency_similarity_chars(&a_chars, &b_chars),
            method: SimilarityMethod::Approximate,
        };
    }

    let distance = levenshtein_chars(longer, shorter);
    PairScore {
        score: (longer.len() - distance) as f64 / longer.len() as f64,
        method: SimilarityMethod::Exact,
    }
}

/// Levenshtein edit distance over characters, unit costs.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    levenshtein_chars(&a, &b)
}

fn levenshtein_chars(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Multiset intersection over union of the two strings' character counts.
///
/// Order-insensitive and linear in the input length. Returns 0 when both
/// inputs are empty.
pub fn frequency_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    frequency_similarity_chars(&a, &b)
}

fn frequency_similarity_chars(a: &[char], b: &[char]) -> f64 {
    let mut counts: HashMap<char, (u64, u64)> = HashMap::new();
    for &c in a {
        counts.entry(c).or_default().0 += 1;
    }
    for &c in b {
        counts.entry(c).or_default().1 += 1;
    }

    let mut shared = 0u64;
    let mut total = 0u64;
    for (fa, fb) in counts.into_values() {
        shared += fa.min(fb);
        total += fa.max(fb);
    }

    if total == 0 {
        return 0.0;
    }
    shared as f64 / total as f64
}

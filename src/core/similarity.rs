// Text similarity between two OCR extracts.
//
// The default scorer is TF-IDF + cosine computed over the pair itself (no
// external corpus). Jaccard and normalized Levenshtein are independent
// alternatives.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Tokens this short or shorter are dropped.
const MIN_TOKEN_CHARS: usize = 2;

/// Number of documents the IDF is computed over.
const PAIR_DOCUMENTS: f64 = 2.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMethod {
    #[default]
    TfIdf,
    Jaccard,
    Levenshtein,
}

impl SimilarityMethod {
    pub fn score(self, text1: &str, text2: &str) -> f64 {
        match self {
            SimilarityMethod::TfIdf => calculate_similarity(text1, text2),
            SimilarityMethod::Jaccard => jaccard_similarity(text1, text2),
            SimilarityMethod::Levenshtein => levenshtein_similarity(text1, text2),
        }
    }
}

/// Lowercase, replace punctuation with spaces, collapse whitespace.
pub fn normalize_text(text: &str) -> String {
    let replaced: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            // Unicode alphanumerics, not ASCII `\w`: accented French words
            // stay whole tokens.
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split normalized text into terms, dropping very short ones.
pub fn tokenize(normalized: &str) -> Vec<&str> {
    normalized
        .split_whitespace()
        .filter(|token| token.chars().count() > MIN_TOKEN_CHARS)
        .collect()
}

/// TF-IDF cosine similarity in `[0, 1]`.
pub fn calculate_similarity(text1: &str, text2: &str) -> f64 {
    if text1.is_empty() || text2.is_empty() {
        return 0.0;
    }

    let normalized1 = normalize_text(text1);
    let normalized2 = normalize_text(text2);
    if normalized1 == normalized2 {
        return 1.0;
    }

    let tokens1 = tokenize(&normalized1);
    let tokens2 = tokenize(&normalized2);
    if tokens1.is_empty() || tokens2.is_empty() {
        return 0.0;
    }

    let tf1 = term_frequencies(&tokens1);
    let tf2 = term_frequencies(&tokens2);

    // Sorted so the cosine sums run in the same order whichever side is first.
    let vocabulary: BTreeSet<&str> = tf1.keys().chain(tf2.keys()).copied().collect();

    let mut vector1 = Vec::with_capacity(vocabulary.len());
    let mut vector2 = Vec::with_capacity(vocabulary.len());
    for term in &vocabulary {
        let freq1 = tf1.get(term).copied().unwrap_or(0.0);
        let freq2 = tf2.get(term).copied().unwrap_or(0.0);
        let document_frequency = [freq1, freq2].iter().filter(|f| **f > 0.0).count();
        let idf = inverse_document_frequency(document_frequency);
        vector1.push(freq1 * idf);
        vector2.push(freq2 * idf);
    }

    cosine_similarity(&vector1, &vector2)
}

/// Occurrences of each term divided by the total token count.
fn term_frequencies<'a>(tokens: &[&'a str]) -> BTreeMap<&'a str, f64> {
    let mut counts: BTreeMap<&'a str, usize> = BTreeMap::new();
    for token in tokens {
        *counts.entry(*token).or_default() += 1;
    }

    let total = tokens.len() as f64;
    counts
        .into_iter()
        .map(|(term, count)| (term, count as f64 / total))
        .collect()
}

/// Smoothed IDF, always > 0 so shared terms still contribute.
fn inverse_document_frequency(document_frequency: usize) -> f64 {
    ((PAIR_DOCUMENTS + 1.0) / (document_frequency as f64 + 1.0)).ln() + 1.0
}

fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let (mut dot, mut magnitude_a, mut magnitude_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        magnitude_a += x * x;
        magnitude_b += y * y;
    }

    let magnitude_a = magnitude_a.sqrt();
    let magnitude_b = magnitude_b.sqrt();
    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    (dot / (magnitude_a * magnitude_b)).clamp(0.0, 1.0)
}

/// Intersection over union of the two token sets.
pub fn jaccard_similarity(text1: &str, text2: &str) -> f64 {
    let normalized1 = normalize_text(text1);
    let normalized2 = normalize_text(text2);
    let set1: HashSet<&str> = tokenize(&normalized1).into_iter().collect();
    let set2: HashSet<&str> = tokenize(&normalized2).into_iter().collect();

    match (set1.is_empty(), set2.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        _ => {}
    }

    let intersection = set1.intersection(&set2).count();
    let union = set1.union(&set2).count();
    intersection as f64 / union as f64
}

/// Classic edit distance over the raw characters.
pub fn levenshtein_distance(text1: &str, text2: &str) -> usize {
    strsim::levenshtein(text1, text2)
}

/// `1 - distance / max(len)`, `1.0` when both strings are empty.
pub fn levenshtein_similarity(text1: &str, text2: &str) -> f64 {
    strsim::normalized_levenshtein(text1, text2)
}

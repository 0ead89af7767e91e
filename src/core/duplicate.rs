// Result types of a duplicate analysis:
// - Per-candidate comparison signals
// - Classification (exact / probable / none) and the suggested action
// - Modal payload and diagnostic metadata returned to the caller

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::document::CandidateDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateStatus {
    ExactDuplicate,    // Same checksum
    ProbableDuplicate, // Similar text or same period
    NotDuplicate,
}

impl DuplicateStatus {
    pub fn is_duplicate(self) -> bool {
        !matches!(self, DuplicateStatus::NotDuplicate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    Replace,
    Cancel,
    KeepBoth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityComparison {
    NewBetter,
    ExistingBetter,
    Equal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateSignals {
    pub checksum_match: bool,
    pub text_similarity: f64,
    pub same_period: bool,
    pub same_context: bool,
    pub quality_comparison: QualityComparison,
    /// Human-readable comparison lines: pages, OCR quality, size, similarity.
    pub differences: Vec<String>,
}

impl DuplicateSignals {
    /// Signals reported when nothing matched.
    pub fn empty() -> Self {
        Self {
            checksum_match: false,
            text_similarity: 0.0,
            same_period: false,
            same_context: false,
            quality_comparison: QualityComparison::Equal,
            differences: Vec::new(),
        }
    }
}

/// Reference to the stored document the upload was matched against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedDocument {
    pub id: String,
    pub name: String,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&CandidateDocument> for MatchedDocument {
    fn from(candidate: &CandidateDocument) -> Self {
        Self {
            id: candidate.id.clone(),
            name: candidate.name.clone(),
            url: candidate.url.clone(),
            uploaded_at: candidate.uploaded_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalLevel {
    Danger,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalCta {
    pub label: String,
    pub action: SuggestedAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalContent {
    pub level: ModalLevel,
    pub title: String,
    pub message: String,
    pub primary_cta: ModalCta,
    pub secondary_cta: ModalCta,
    pub show_comparison: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupMetadata {
    pub decision_reason: String,
    pub timestamp: DateTime<Utc>,
    pub processing_time_ms: f64,
    /// Candidates examined before the scan stopped.
    pub candidates_analyzed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupOutput {
    pub status: DuplicateStatus,
    pub matched_document: Option<MatchedDocument>,
    pub signals: DuplicateSignals,
    pub suggested_action: SuggestedAction,
    pub modal: ModalContent,
    pub metadata: DedupMetadata,
}

impl DedupOutput {
    pub fn is_duplicate(&self) -> bool {
        self.status.is_duplicate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_value(DuplicateStatus::ExactDuplicate).unwrap(),
            "exact_duplicate"
        );
        assert_eq!(
            serde_json::to_value(SuggestedAction::KeepBoth).unwrap(),
            "keep_both"
        );
        assert_eq!(
            serde_json::to_value(QualityComparison::ExistingBetter).unwrap(),
            "existing_better"
        );
        assert_eq!(serde_json::to_value(ModalLevel::Danger).unwrap(), "danger");
    }

    #[test]
    fn test_is_duplicate() {
        assert!(DuplicateStatus::ExactDuplicate.is_duplicate());
        assert!(DuplicateStatus::ProbableDuplicate.is_duplicate());
        assert!(!DuplicateStatus::NotDuplicate.is_duplicate());
    }

    #[test]
    fn test_empty_signals_serialize_camel_case() {
        let value = serde_json::to_value(DuplicateSignals::empty()).unwrap();
        assert_eq!(value["checksumMatch"], false);
        assert_eq!(value["textSimilarity"], 0.0);
        assert_eq!(value["qualityComparison"], "equal");
        assert_eq!(value["differences"].as_array().unwrap().len(), 0);
    }
}

//! Duplicate detection for uploaded documents.
//!
//! Given a newly uploaded file and the documents already on record, decide
//! whether the upload is an exact duplicate, a probable duplicate or a
//! distinct document, and recommend what to do with it.

pub mod core;
pub mod services;

pub use crate::core::config::{ConfigError, DedupConfig, DedupConfigOverrides};
pub use crate::core::document::{
    AnalyzeRequest, CandidateDocument, CandidateOcr, DocumentContext, DocumentPeriod,
    ExtractedFields, NewFileInput, OcrData,
};
pub use crate::core::duplicate::{
    DedupMetadata, DedupOutput, DuplicateSignals, DuplicateStatus, MatchedDocument, ModalContent,
    ModalCta, ModalLevel, QualityComparison, SuggestedAction,
};
pub use crate::core::locale::Locale;
pub use crate::services::DedupService;

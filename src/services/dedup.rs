use chrono::Utc;
use log::debug;
use rayon::prelude::*;
use std::time::Instant;

use crate::core::config::DedupConfig;
use crate::core::document::{AnalyzeRequest, CandidateDocument};
use crate::core::duplicate::{
    DedupMetadata, DedupOutput, DuplicateSignals, DuplicateStatus, MatchedDocument,
    SuggestedAction,
};
use crate::services::policy;
use crate::services::signals::compute_signals;

/// Decides whether an upload duplicates a document already on record.
///
/// Holds only its configuration, so one instance can serve concurrent
/// analyses. Performs no I/O.
#[derive(Debug, Clone, Default)]
pub struct DedupService {
    config: DedupConfig,
}

struct BestMatch<'a> {
    candidate: &'a CandidateDocument,
    signals: DuplicateSignals,
    status: DuplicateStatus,
}

impl DedupService {
    pub fn new(config: DedupConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    pub fn analyze(&self, request: &AnalyzeRequest) -> DedupOutput {
        let started = Instant::now();
        let new_file = &request.new_file;
        let threshold = self.config.text_similarity_threshold;
        let locale = self.config.locale;

        if request.candidates.is_empty() {
            self.debug(format_args!("no candidates for {}", new_file.name));
            return self.no_duplicate(started, 0);
        }

        let mut best: Option<BestMatch<'_>> = None;
        let mut analyzed = 0;

        for candidate in &request.candidates {
            analyzed += 1;
            let signals = compute_signals(new_file, candidate, locale);
            let status = policy::classify(&signals, threshold);
            self.debug(format_args!(
                "candidate {}: status={:?} checksum_match={} similarity={:.4} same_period={} same_context={}",
                candidate.id,
                status,
                signals.checksum_match,
                signals.text_similarity,
                signals.same_period,
                signals.same_context
            ));

            match status {
                DuplicateStatus::ExactDuplicate => {
                    best = Some(BestMatch {
                        candidate,
                        signals,
                        status,
                    });
                    break;
                }
                // Later probable matches replace earlier ones.
                DuplicateStatus::ProbableDuplicate => {
                    if let Some(previous) = &best {
                        self.debug(format_args!(
                            "probable match {} replaces {}",
                            candidate.id, previous.candidate.id
                        ));
                    }
                    best = Some(BestMatch {
                        candidate,
                        signals,
                        status,
                    });
                }
                DuplicateStatus::NotDuplicate => {}
            }
        }

        let Some(best) = best else {
            self.debug(format_args!(
                "no duplicate for {} among {} candidates",
                new_file.name, analyzed
            ));
            return self.no_duplicate(started, analyzed);
        };

        let suggested_action = policy::suggest_action(best.status, &best.signals);
        let modal = policy::build_modal(best.status, suggested_action, best.candidate, locale);
        let decision_reason = policy::decision_reason(best.status, &best.signals, threshold, locale);

        self.debug(format_args!(
            "{} matched {}: {:?}, suggested {:?} ({})",
            new_file.name, best.candidate.id, best.status, suggested_action, decision_reason
        ));

        DedupOutput {
            status: best.status,
            matched_document: Some(MatchedDocument::from(best.candidate)),
            signals: best.signals,
            suggested_action,
            modal,
            metadata: DedupMetadata {
                decision_reason,
                timestamp: Utc::now(),
                processing_time_ms: elapsed_ms(started),
                candidates_analyzed: analyzed,
            },
        }
    }

    /// Analyze independent uploads in parallel. Outputs follow input order.
    pub fn analyze_batch(&self, requests: &[AnalyzeRequest]) -> Vec<DedupOutput> {
        self.analyze_batch_with(requests, |_| {})
    }

    /// Like `analyze_batch`, calling `on_done` as each analysis completes
    /// (in completion order, from worker threads).
    pub fn analyze_batch_with<F>(&self, requests: &[AnalyzeRequest], on_done: F) -> Vec<DedupOutput>
    where
        F: Fn(&DedupOutput) + Sync,
    {
        requests
            .par_iter()
            .map(|request| self.analyze(request))
            .inspect(|output| on_done(output))
            .collect()
    }

    fn no_duplicate(&self, started: Instant, analyzed: usize) -> DedupOutput {
        let locale = self.config.locale;
        DedupOutput {
            status: DuplicateStatus::NotDuplicate,
            matched_document: None,
            signals: DuplicateSignals::empty(),
            suggested_action: SuggestedAction::KeepBoth,
            modal: policy::no_duplicate_modal(locale),
            metadata: DedupMetadata {
                decision_reason: locale.messages().reason_none.to_string(),
                timestamp: Utc::now(),
                processing_time_ms: elapsed_ms(started),
                candidates_analyzed: analyzed,
            },
        }
    }

    fn debug(&self, args: std::fmt::Arguments<'_>) {
        if self.config.enable_debug_logs {
            debug!("[dedup] {}", args);
        }
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::{DocumentContext, DocumentPeriod, NewFileInput};
    use crate::core::duplicate::{ModalLevel, QualityComparison};
    use crate::core::locale::Locale;
    use chrono::{Duration, TimeZone};

    const RECEIPT: &str = "Quittance de loyer du mois de mars 2024. Reçu de Monsieur Martin \
                           la somme de 850 euros au titre du loyer et des charges pour le \
                           logement situé 4 place Bellecour à Lyon.";
    const RECEIPT_SCAN: &str = "Quittance de loyer du mois de mars 2024. Reçu de Monsieur Martin \
                                la somme de 850 euros au titre du loyer et des charges pour le \
                                logement situé 4 place Bellecour Lyon.";
    const INSURANCE: &str = "Attestation d'assurance habitation multirisque valable jusqu'au \
                             31 décembre, garanties incendie et dégâts des eaux.";

    fn context(property: &str) -> DocumentContext {
        DocumentContext {
            property_id: Some(property.to_string()),
            tenant_id: Some("tenant-martin".to_string()),
            lease_id: Some("lease-12".to_string()),
            transaction_id: None,
        }
    }

    fn upload() -> NewFileInput {
        NewFileInput::new("quittance-mars.pdf")
            .with_checksum("abc123")
            .with_size(48_000)
            .with_pages(1)
            .with_ocr(RECEIPT, 0.92)
            .with_context(context("property-1"))
    }

    fn stored(id: &str) -> CandidateDocument {
        let uploaded_at = Utc.with_ymd_and_hms(2024, 4, 2, 9, 30, 0).unwrap();
        CandidateDocument::new(id, format!("{id}.pdf"), uploaded_at)
            .with_url(format!("/documents/{id}"))
            .with_checksum(format!("sum-{id}"))
            .with_size(48_000)
            .with_pages(1)
            .with_ocr(INSURANCE, 0.92)
            .with_context(context("property-1"))
    }

    fn service() -> DedupService {
        DedupService::new(DedupConfig::default())
    }

    #[test]
    fn test_empty_candidates() {
        let output = service().analyze(&AnalyzeRequest::new(upload(), Vec::new()));

        assert_eq!(output.status, DuplicateStatus::NotDuplicate);
        assert_eq!(output.suggested_action, SuggestedAction::KeepBoth);
        assert!(output.matched_document.is_none());
        assert_eq!(output.signals, DuplicateSignals::empty());
        assert_eq!(output.modal.level, ModalLevel::Info);
        assert!(!output.modal.show_comparison);
        assert_eq!(output.metadata.decision_reason, "Aucun doublon détecté");
        assert_eq!(output.metadata.candidates_analyzed, 0);
        assert!(output.metadata.processing_time_ms >= 0.0);
    }

    #[test]
    fn test_exact_duplicate() {
        let candidate = stored("receipt-old").with_checksum("abc123");
        let output = service().analyze(&AnalyzeRequest::new(upload(), vec![candidate]));

        assert_eq!(output.status, DuplicateStatus::ExactDuplicate);
        assert_eq!(output.suggested_action, SuggestedAction::Cancel);
        assert_eq!(output.signals.text_similarity, 1.0);
        assert_eq!(output.modal.level, ModalLevel::Danger);
        assert!(output.modal.show_comparison);
        assert_eq!(output.metadata.decision_reason, "Checksum identique (doublon exact)");
        let matched = output.matched_document.unwrap();
        assert_eq!(matched.id, "receipt-old");
        assert_eq!(matched.url, "/documents/receipt-old");
    }

    #[test]
    fn test_exact_duplicate_wins_regardless_of_order() {
        let probable = stored("probable").with_ocr(RECEIPT_SCAN, 0.9);
        let exact = stored("exact").with_checksum("abc123");

        for candidates in [
            vec![probable.clone(), exact.clone()],
            vec![exact.clone(), probable.clone()],
        ] {
            let output = service().analyze(&AnalyzeRequest::new(upload(), candidates));
            assert_eq!(output.status, DuplicateStatus::ExactDuplicate);
            assert_eq!(output.matched_document.unwrap().id, "exact");
        }
    }

    #[test]
    fn test_exact_duplicate_stops_the_scan() {
        let candidates = vec![
            stored("unrelated"),
            stored("exact").with_checksum("abc123"),
            stored("never-seen").with_ocr(RECEIPT_SCAN, 0.9),
        ];
        let output = service().analyze(&AnalyzeRequest::new(upload(), candidates));
        assert_eq!(output.metadata.candidates_analyzed, 2);
        assert_eq!(output.matched_document.unwrap().id, "exact");
    }

    #[test]
    fn test_last_probable_match_wins() {
        let period = DocumentPeriod::new("2024-03-01", "2024-03-31");
        let candidates = vec![
            stored("first-probable").with_ocr(RECEIPT_SCAN, 0.9),
            stored("unrelated"),
            stored("second-probable").with_period(period.clone()),
        ];
        let upload = upload().with_period(period);

        let output = service().analyze(&AnalyzeRequest::new(upload, candidates));
        assert_eq!(output.status, DuplicateStatus::ProbableDuplicate);
        assert_eq!(output.matched_document.unwrap().id, "second-probable");
        assert_eq!(output.metadata.candidates_analyzed, 3);
    }

    #[test]
    fn test_probable_by_period_with_different_owner() {
        let period = DocumentPeriod::new("2024-03-01", "2024-03-31");
        let candidate = stored("other-property")
            .with_period(period.clone())
            .with_context(context("property-2"));
        let upload = upload().with_period(period);

        let output = service().analyze(&AnalyzeRequest::new(upload, vec![candidate]));
        assert_eq!(output.status, DuplicateStatus::ProbableDuplicate);
        assert!(!output.signals.same_context);
        assert!(output.signals.same_period);
        assert_eq!(output.suggested_action, SuggestedAction::KeepBoth);
        assert_eq!(output.modal.level, ModalLevel::Warning);
        assert_eq!(output.metadata.decision_reason, "Doublon probable : même période");
    }

    #[test]
    fn test_probable_same_context_better_new_file() {
        let candidate = stored("receipt-scan").with_ocr(RECEIPT_SCAN, 0.92);
        let upload = upload().with_pages(3);

        let output = service().analyze(&AnalyzeRequest::new(upload, vec![candidate]));
        assert_eq!(output.status, DuplicateStatus::ProbableDuplicate);
        assert!(output.signals.text_similarity >= 0.85);
        assert!(output.signals.same_context);
        assert_eq!(output.signals.quality_comparison, QualityComparison::NewBetter);
        assert_eq!(output.suggested_action, SuggestedAction::Replace);
        assert_eq!(output.modal.primary_cta.action, SuggestedAction::Replace);
        assert_eq!(output.modal.secondary_cta.action, SuggestedAction::Cancel);
        assert!(
            output
                .metadata
                .decision_reason
                .starts_with("Doublon probable : similarité textuelle élevée (")
        );
    }

    #[test]
    fn test_probable_same_context_existing_better() {
        let candidate = stored("receipt-scan").with_ocr(RECEIPT_SCAN, 0.99);
        let output = service().analyze(&AnalyzeRequest::new(upload(), vec![candidate]));

        assert_eq!(output.status, DuplicateStatus::ProbableDuplicate);
        assert_eq!(
            output.signals.quality_comparison,
            QualityComparison::ExistingBetter
        );
        assert_eq!(output.suggested_action, SuggestedAction::Cancel);
        assert_eq!(output.modal.secondary_cta.action, SuggestedAction::KeepBoth);
    }

    #[test]
    fn test_clearly_distinct_documents() {
        let candidates = vec![stored("insurance"), stored("insurance-2")];
        let output = service().analyze(&AnalyzeRequest::new(upload(), candidates));

        assert_eq!(output.status, DuplicateStatus::NotDuplicate);
        assert_eq!(output.suggested_action, SuggestedAction::KeepBoth);
        assert!(output.matched_document.is_none());
        assert!(!output.modal.show_comparison);
        assert_eq!(output.metadata.candidates_analyzed, 2);
    }

    #[test]
    fn test_threshold_is_configurable() {
        // Same receipt for another month: similarity around 0.92.
        let candidate = stored("receipt-april").with_ocr(RECEIPT.replace("mars", "avril"), 0.92);
        let request = AnalyzeRequest::new(upload(), vec![candidate]);

        let strict = DedupService::new(DedupConfig {
            text_similarity_threshold: 0.95,
            ..Default::default()
        });
        assert_eq!(strict.analyze(&request).status, DuplicateStatus::NotDuplicate);
        assert_eq!(
            service().analyze(&request).status,
            DuplicateStatus::ProbableDuplicate
        );
    }

    #[test]
    fn test_english_locale() {
        let service = DedupService::new(DedupConfig {
            locale: Locale::En,
            enable_debug_logs: true,
            ..Default::default()
        });
        let candidate = stored("receipt-old")
            .with_checksum("abc123")
            .with_ocr(RECEIPT, 0.92);
        let output = service.analyze(&AnalyzeRequest::new(upload(), vec![candidate]));

        assert_eq!(output.modal.title, "Exact duplicate detected");
        assert!(output.modal.message.ends_with("04/02/2024."));
        assert_eq!(output.signals.differences.len(), 4);
        assert_eq!(output.signals.differences[3], "Text similarity: 100.0%");
    }

    #[test]
    fn test_candidates_are_not_mutated() {
        let candidates = vec![stored("exact").with_checksum("abc123"), stored("other")];
        let request = AnalyzeRequest::new(upload(), candidates);
        let before = request.clone();
        service().analyze(&request);
        assert_eq!(request, before);
    }

    #[test]
    fn test_analyze_batch_keeps_order() {
        let period = DocumentPeriod::new("2024-03-01", "2024-03-31");
        let requests = vec![
            AnalyzeRequest::new(upload(), vec![stored("exact").with_checksum("abc123")]),
            AnalyzeRequest::new(upload(), Vec::new()),
            AnalyzeRequest::new(
                upload().with_period(period.clone()),
                vec![stored("same-period").with_period(period)],
            ),
        ];

        let outputs = service().analyze_batch(&requests);
        let statuses: Vec<_> = outputs.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![
                DuplicateStatus::ExactDuplicate,
                DuplicateStatus::NotDuplicate,
                DuplicateStatus::ProbableDuplicate,
            ]
        );
    }

    #[test]
    fn test_analyze_batch_reports_each_output() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let requests = vec![
            AnalyzeRequest::new(upload(), vec![stored("exact").with_checksum("abc123")]),
            AnalyzeRequest::new(upload(), Vec::new()),
            AnalyzeRequest::new(upload(), vec![stored("other")]),
        ];
        let completed = AtomicUsize::new(0);
        let duplicates = AtomicUsize::new(0);

        let outputs = service().analyze_batch_with(&requests, |output| {
            completed.fetch_add(1, Ordering::Relaxed);
            if output.is_duplicate() {
                duplicates.fetch_add(1, Ordering::Relaxed);
            }
        });

        assert_eq!(outputs.len(), 3);
        assert_eq!(completed.load(Ordering::Relaxed), 3);
        assert_eq!(duplicates.load(Ordering::Relaxed), 1);
        assert_eq!(outputs[0].status, DuplicateStatus::ExactDuplicate);
    }

    #[test]
    fn test_timestamp_is_current() {
        let before = Utc::now();
        let output = service().analyze(&AnalyzeRequest::new(upload(), vec![stored("other")]));
        assert!(output.metadata.timestamp >= before);
        assert!(output.metadata.timestamp <= Utc::now() + Duration::seconds(1));
    }

    #[test]
    fn test_service_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DedupService>();
    }
}

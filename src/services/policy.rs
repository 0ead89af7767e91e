use crate::core::document::CandidateDocument;
use crate::core::duplicate::{
    DuplicateSignals, DuplicateStatus, ModalContent, ModalCta, ModalLevel, QualityComparison,
    SuggestedAction,
};
use crate::core::locale::{Locale, Messages};
use crate::services::signals::format_percent;

/// Checksum first, then similarity or period.
pub fn classify(signals: &DuplicateSignals, text_similarity_threshold: f64) -> DuplicateStatus {
    if signals.checksum_match {
        DuplicateStatus::ExactDuplicate
    } else if signals.text_similarity >= text_similarity_threshold || signals.same_period {
        DuplicateStatus::ProbableDuplicate
    } else {
        DuplicateStatus::NotDuplicate
    }
}

pub fn suggest_action(status: DuplicateStatus, signals: &DuplicateSignals) -> SuggestedAction {
    match status {
        DuplicateStatus::ExactDuplicate => SuggestedAction::Cancel,
        DuplicateStatus::ProbableDuplicate => {
            if !signals.same_context {
                // Different entities may legitimately hold look-alike documents.
                SuggestedAction::KeepBoth
            } else if signals.quality_comparison == QualityComparison::NewBetter {
                SuggestedAction::Replace
            } else {
                SuggestedAction::Cancel
            }
        }
        DuplicateStatus::NotDuplicate => SuggestedAction::KeepBoth,
    }
}

/// Modal shown when a duplicate was found.
pub fn build_modal(
    status: DuplicateStatus,
    action: SuggestedAction,
    matched: &CandidateDocument,
    locale: Locale,
) -> ModalContent {
    let messages = locale.messages();
    let date = matched
        .uploaded_at
        .format(messages.date_format)
        .to_string();

    let (level, title, template) = match status {
        DuplicateStatus::ExactDuplicate => {
            (ModalLevel::Danger, messages.exact_title, messages.exact_message)
        }
        DuplicateStatus::ProbableDuplicate => (
            ModalLevel::Warning,
            messages.probable_title,
            messages.probable_message,
        ),
        DuplicateStatus::NotDuplicate => return no_duplicate_modal(locale),
    };

    let (primary_cta, secondary_cta) = if action == SuggestedAction::Replace {
        (
            cta(messages.cta_replace, SuggestedAction::Replace),
            cta(messages.cta_cancel, SuggestedAction::Cancel),
        )
    } else {
        (
            cta(messages.cta_cancel, SuggestedAction::Cancel),
            cta(messages.cta_keep_both, SuggestedAction::KeepBoth),
        )
    };

    ModalContent {
        level,
        title: title.to_string(),
        message: template
            .replace("{name}", &matched.name)
            .replace("{date}", &date),
        primary_cta,
        secondary_cta,
        show_comparison: true,
    }
}

/// Informational modal for the no-candidate and no-match responses.
pub fn no_duplicate_modal(locale: Locale) -> ModalContent {
    let messages = locale.messages();
    ModalContent {
        level: ModalLevel::Info,
        title: messages.none_title.to_string(),
        message: messages.none_message.to_string(),
        primary_cta: cta(messages.cta_continue, SuggestedAction::KeepBoth),
        secondary_cta: cta(messages.cta_cancel, SuggestedAction::Cancel),
        show_comparison: false,
    }
}

fn cta(label: &str, action: SuggestedAction) -> ModalCta {
    ModalCta {
        label: label.to_string(),
        action,
    }
}

/// Diagnostic explanation returned in the output metadata.
pub fn decision_reason(
    status: DuplicateStatus,
    signals: &DuplicateSignals,
    text_similarity_threshold: f64,
    locale: Locale,
) -> String {
    let messages: &Messages = locale.messages();
    match status {
        DuplicateStatus::ExactDuplicate => messages.reason_exact.to_string(),
        DuplicateStatus::ProbableDuplicate => {
            let mut reasons = Vec::new();
            if signals.text_similarity >= text_similarity_threshold {
                reasons.push(
                    messages
                        .reason_text_similarity
                        .replace("{value}", &format_percent(signals.text_similarity)),
                );
            }
            if signals.same_period {
                reasons.push(messages.reason_same_period.to_string());
            }
            format!("{}{}", messages.reason_probable_prefix, reasons.join(", "))
        }
        DuplicateStatus::NotDuplicate => messages.reason_none.to_string(),
    }
}

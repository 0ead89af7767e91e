use crate::core::document::{CandidateDocument, NewFileInput};
use crate::core::duplicate::{DuplicateSignals, QualityComparison};
use crate::core::locale::{Locale, Messages};
use crate::core::similarity::calculate_similarity;

/// OCR confidence gap above which one side counts as better.
pub const OCR_QUALITY_EPSILON: f64 = 0.05;

/// Size gap in bytes above which the larger file counts as better.
pub const SIZE_EPSILON_BYTES: u64 = 1024;

/// Compare the upload against one stored document.
pub fn compute_signals(
    new_file: &NewFileInput,
    candidate: &CandidateDocument,
    locale: Locale,
) -> DuplicateSignals {
    let checksum_match = new_file.checksum == candidate.checksum;

    // Identical bytes, so the OCR text is not worth comparing.
    let text_similarity = if checksum_match {
        1.0
    } else {
        calculate_similarity(&new_file.ocr.text, &candidate.ocr.text_preview)
    };

    let same_period = match (new_file.period(), candidate.period()) {
        (Some(new_period), Some(existing_period)) => {
            new_period.from == existing_period.from && new_period.to == existing_period.to
        }
        _ => false,
    };

    // Property, tenant, lease and transaction ids; unset on both sides is a match.
    let same_context = new_file.context == candidate.context;

    DuplicateSignals {
        checksum_match,
        text_similarity,
        same_period,
        same_context,
        quality_comparison: compare_quality(new_file, candidate),
        differences: describe_differences(new_file, candidate, locale),
    }
}

/// Page count first, then OCR confidence, then file size.
pub fn compare_quality(new_file: &NewFileInput, candidate: &CandidateDocument) -> QualityComparison {
    if new_file.pages != candidate.pages {
        return better_side(new_file.pages > candidate.pages);
    }

    let quality_gap = new_file.ocr.quality - candidate.ocr.quality;
    if quality_gap.abs() > OCR_QUALITY_EPSILON {
        return better_side(quality_gap > 0.0);
    }

    if new_file.size.abs_diff(candidate.size) > SIZE_EPSILON_BYTES {
        return better_side(new_file.size > candidate.size);
    }

    QualityComparison::Equal
}

fn better_side(new_wins: bool) -> QualityComparison {
    if new_wins {
        QualityComparison::NewBetter
    } else {
        QualityComparison::ExistingBetter
    }
}

/// Four display lines: pages, OCR quality, size and text similarity.
///
/// The similarity line is always recomputed from the OCR text, even when
/// the checksums already match.
pub fn describe_differences(
    new_file: &NewFileInput,
    candidate: &CandidateDocument,
    locale: Locale,
) -> Vec<String> {
    let messages = locale.messages();

    let pages_winner = (new_file.pages != candidate.pages)
        .then(|| better_side(new_file.pages > candidate.pages));
    let pages = annotate(
        fill_comparison(
            messages.diff_pages,
            &new_file.pages.to_string(),
            &candidate.pages.to_string(),
        ),
        pages_winner,
        messages,
    );

    let quality_gap = new_file.ocr.quality - candidate.ocr.quality;
    let quality_winner =
        (quality_gap.abs() > OCR_QUALITY_EPSILON).then(|| better_side(quality_gap > 0.0));
    let quality = annotate(
        fill_comparison(
            messages.diff_ocr_quality,
            &format!("{:.0}", new_file.ocr.quality * 100.0),
            &format!("{:.0}", candidate.ocr.quality * 100.0),
        ),
        quality_winner,
        messages,
    );

    let size_winner = (new_file.size.abs_diff(candidate.size) > SIZE_EPSILON_BYTES)
        .then(|| better_side(new_file.size > candidate.size));
    let size = annotate(
        fill_comparison(
            messages.diff_size,
            &format_kilobytes(new_file.size),
            &format_kilobytes(candidate.size),
        ),
        size_winner,
        messages,
    );

    let similarity = calculate_similarity(&new_file.ocr.text, &candidate.ocr.text_preview);
    let similarity_line = messages
        .diff_text_similarity
        .replace("{value}", &format_percent(similarity));

    vec![pages, quality, size, similarity_line]
}

/// Percentage with one decimal, e.g. `0.9534` -> `"95.3"`.
pub fn format_percent(ratio: f64) -> String {
    format!("{:.1}", ratio * 100.0)
}

fn format_kilobytes(bytes: u64) -> String {
    format!("{:.1}", bytes as f64 / 1024.0)
}

fn fill_comparison(template: &str, new_value: &str, existing_value: &str) -> String {
    template
        .replace("{new}", new_value)
        .replace("{existing}", existing_value)
}

fn annotate(line: String, winner: Option<QualityComparison>, messages: &Messages) -> String {
    match winner {
        Some(QualityComparison::NewBetter) => format!("{line} ({})", messages.new_better),
        Some(QualityComparison::ExistingBetter) => format!("{line} ({})", messages.existing_better),
        Some(QualityComparison::Equal) | None => line,
    }
}

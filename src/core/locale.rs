use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::config::ConfigError;

/// Language of the user-facing strings. Has no effect on classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Fr,
    En,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::Fr => "fr",
            Locale::En => "en",
        }
    }

    pub fn messages(self) -> &'static Messages {
        match self {
            Locale::Fr => &FR,
            Locale::En => &EN,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" => Ok(Locale::Fr),
            "en" => Ok(Locale::En),
            _ => Err(ConfigError::UnsupportedLocale {
                locale: s.to_string(),
            }),
        }
    }
}

/// Message templates for one locale.
///
/// Placeholders: `{name}` and `{date}` in modal messages, `{new}` and
/// `{existing}` in comparison lines, `{value}` in percentages.
#[derive(Debug)]
pub struct Messages {
    pub date_format: &'static str,

    pub exact_title: &'static str,
    pub exact_message: &'static str,
    pub probable_title: &'static str,
    pub probable_message: &'static str,
    pub none_title: &'static str,
    pub none_message: &'static str,

    pub cta_replace: &'static str,
    pub cta_cancel: &'static str,
    pub cta_keep_both: &'static str,
    pub cta_continue: &'static str,

    pub reason_exact: &'static str,
    pub reason_probable_prefix: &'static str,
    pub reason_text_similarity: &'static str,
    pub reason_same_period: &'static str,
    pub reason_none: &'static str,

    pub diff_pages: &'static str,
    pub diff_ocr_quality: &'static str,
    pub diff_size: &'static str,
    pub diff_text_similarity: &'static str,
    pub new_better: &'static str,
    pub existing_better: &'static str,
}

static FR: Messages = Messages {
    date_format: "%d/%m/%Y",

    exact_title: "Doublon exact détecté",
    exact_message: "Ce fichier est identique à « {name} », déjà importé le {date}.",
    probable_title: "Doublon probable détecté",
    probable_message: "Ce fichier ressemble fortement à « {name} », importé le {date}.",
    none_title: "Aucun doublon",
    none_message: "Aucun document similaire n'a été trouvé.",

    cta_replace: "Remplacer",
    cta_cancel: "Annuler",
    cta_keep_both: "Conserver les deux",
    cta_continue: "Continuer",

    reason_exact: "Checksum identique (doublon exact)",
    reason_probable_prefix: "Doublon probable : ",
    reason_text_similarity: "similarité textuelle élevée ({value}%)",
    reason_same_period: "même période",
    reason_none: "Aucun doublon détecté",

    diff_pages: "Pages : {new} (nouveau) vs {existing} (existant)",
    diff_ocr_quality: "Qualité OCR : {new}% (nouveau) vs {existing}% (existant)",
    diff_size: "Taille : {new} Ko (nouveau) vs {existing} Ko (existant)",
    diff_text_similarity: "Similarité textuelle : {value}%",
    new_better: "nouveau meilleur",
    existing_better: "existant meilleur",
};

static EN: Messages = Messages {
    date_format: "%m/%d/%Y",

    exact_title: "Exact duplicate detected",
    exact_message: "This file is identical to \"{name}\", already uploaded on {date}.",
    probable_title: "Probable duplicate detected",
    probable_message: "This file closely resembles \"{name}\", uploaded on {date}.",
    none_title: "No duplicate",
    none_message: "No similar document was found.",

    cta_replace: "Replace",
    cta_cancel: "Cancel",
    cta_keep_both: "Keep both",
    cta_continue: "Continue",

    reason_exact: "Identical checksum (exact duplicate)",
    reason_probable_prefix: "Probable duplicate: ",
    reason_text_similarity: "high text similarity ({value}%)",
    reason_same_period: "same period",
    reason_none: "No duplicate detected",

    diff_pages: "Pages: {new} (new) vs {existing} (existing)",
    diff_ocr_quality: "OCR quality: {new}% (new) vs {existing}% (existing)",
    diff_size: "Size: {new} KB (new) vs {existing} KB (existing)",
    diff_text_similarity: "Text similarity: {value}%",
    new_better: "new is better",
    existing_better: "existing is better",
};

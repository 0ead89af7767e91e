use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OCR output for the uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrData {
    #[serde(default)]
    pub text: String,
    /// Extraction confidence in `[0, 1]`.
    #[serde(default)]
    pub quality: f64,
}

/// OCR output stored for an existing document. Only a preview of the text
/// is kept, so it may be truncated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateOcr {
    #[serde(default)]
    pub text_preview: String,
    #[serde(default)]
    pub quality: f64,
}

/// Business entities a document is attached to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
    #[serde(
        default,
        rename = "tenantId",
        alias = "Tenant",
        skip_serializing_if = "Option::is_none"
    )]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

/// Date range stated inside the document (an invoice period, a rent
/// receipt month). Kept as the raw strings that were extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPeriod {
    pub from: String,
    pub to: String,
}

impl DocumentPeriod {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<DocumentPeriod>,
}

/// The file being uploaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFileInput {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub pages: u32,
    /// Required: an absent checksum would compare equal to another absent one.
    pub checksum: String,
    #[serde(default)]
    pub ocr: OcrData,
    #[serde(default)]
    pub context: DocumentContext,
    #[serde(default)]
    pub extracted: ExtractedFields,
}

impl NewFileInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = checksum.into();
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_pages(mut self, pages: u32) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_ocr(mut self, text: impl Into<String>, quality: f64) -> Self {
        self.ocr = OcrData {
            text: text.into(),
            quality,
        };
        self
    }

    pub fn with_context(mut self, context: DocumentContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_period(mut self, period: DocumentPeriod) -> Self {
        self.extracted.period = Some(period);
        self
    }

    pub fn period(&self) -> Option<&DocumentPeriod> {
        self.extracted.period.as_ref()
    }
}

/// A document already on record that the upload is compared against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub pages: u32,
    pub checksum: String,
    #[serde(default)]
    pub ocr: CandidateOcr,
    #[serde(default)]
    pub context: DocumentContext,
    #[serde(default)]
    pub extracted: ExtractedFields,
}

impl CandidateDocument {
    pub fn new(id: impl Into<String>, name: impl Into<String>, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: String::new(),
            uploaded_at,
            size: 0,
            pages: 0,
            checksum: String::new(),
            ocr: CandidateOcr::default(),
            context: DocumentContext::default(),
            extracted: ExtractedFields::default(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = checksum.into();
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_pages(mut self, pages: u32) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_ocr(mut self, text_preview: impl Into<String>, quality: f64) -> Self {
        self.ocr = CandidateOcr {
            text_preview: text_preview.into(),
            quality,
        };
        self
    }

    pub fn with_context(mut self, context: DocumentContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_period(mut self, period: DocumentPeriod) -> Self {
        self.extracted.period = Some(period);
        self
    }

    pub fn period(&self) -> Option<&DocumentPeriod> {
        self.extracted.period.as_ref()
    }
}

/// Input of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub new_file: NewFileInput,
    #[serde(default)]
    pub candidates: Vec<CandidateDocument>,
}

impl AnalyzeRequest {
    pub fn new(new_file: NewFileInput, candidates: Vec<CandidateDocument>) -> Self {
        Self {
            new_file,
            candidates,
        }
    }
}

//! Identity-document gate (external OCR collaborator contract).
//!
//! The core consumes identity verification, it does not own it. The OCR engine
//! is behind `TextExtractor` (fallible, network/process-bound); `DocumentGate`
//! wraps it and **never fails**: on extractor error all flags come back false
//! with the diagnostic in `raw_text`, and an admin decides manually. Flag
//! derivation mirrors the national-id card layout: an identifier word, the
//! `dddd dddd dddd` number, and a date-of-birth marker.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::model::DocumentScan;

/// External text-extraction collaborator (OCR). Implementations may fail;
/// the gate absorbs that.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, image_ref: &str) -> anyhow::Result<String>;
}

/// Placeholder used until a real OCR service is wired in. Always fails, so
/// every scan comes back all-false and verification stays a manual check.
pub struct NoExtractor;

#[async_trait]
impl TextExtractor for NoExtractor {
    async fn extract(&self, _image_ref: &str) -> anyhow::Result<String> {
        anyhow::bail!("no OCR collaborator configured")
    }
}

static NUMERIC_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}\s\d{4}\s\d{4}").expect("numeric pattern regex"));

const IDENTIFIER_WORDS: [&str; 3] = ["aadhaar", "government of india", "uidai"];
const DOB_MARKERS: [&str; 3] = ["dob", "year of birth", "date of birth"];

/// Derive decision-support flags from extracted document text. Pure.
pub fn scan_text(text: &str) -> DocumentScan {
    let lower = text.to_lowercase();
    DocumentScan {
        has_identifier_word: IDENTIFIER_WORDS.iter().any(|w| lower.contains(w)),
        has_numeric_pattern: NUMERIC_PATTERN.is_match(&lower),
        has_date_of_birth_pattern: DOB_MARKERS.iter().any(|w| lower.contains(w)),
        raw_text: text.to_string(),
    }
}

pub struct DocumentGate {
    extractor: Box<dyn TextExtractor>,
}

impl DocumentGate {
    pub fn new(extractor: Box<dyn TextExtractor>) -> Self {
        Self { extractor }
    }

    /// Check a document image reference. Never raises: extractor faults yield
    /// all-false flags plus a diagnostic, and the admin decision proceeds
    /// manually.
    pub async fn check_document(&self, image_ref: &str) -> DocumentScan {
        match self.extractor.extract(image_ref).await {
            Ok(text) => scan_text(&text),
            Err(e) => {
                warn!(target: "identity", error = %e, "document text extraction failed");
                DocumentScan {
                    has_identifier_word: false,
                    has_numeric_pattern: false,
                    has_date_of_birth_pattern: false,
                    raw_text: format!("extraction failed: {e}"),
                }
            }
        }
    }
}

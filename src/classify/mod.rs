//! Two-stage classification pipeline: deterministic keyword rules first, AI
//! fallback second.
//!
//! The ordering is a cost/latency optimization: rule matches are pure,
//! zero-latency and short-circuit the external dependency entirely. Only the
//! fallback path may suspend (one bounded network call). Rule-path results are
//! idempotent; AI-path results are expected non-determinism.

pub mod ai_adapter;
pub mod rules;

use std::sync::Arc;

use tracing::info;

use crate::config::ai::AiConfig;
use crate::model::Classification;

pub use ai_adapter::{AiFallback, DynProvider, AI_DEFAULT_CONFIDENCE};
pub use rules::{KeywordTable, RULE_CONFIDENCE};

pub struct ClassifierPipeline {
    table: &'static KeywordTable,
    fallback: AiFallback,
}

impl ClassifierPipeline {
    pub fn new(provider: DynProvider) -> Self {
        Self {
            table: KeywordTable::builtin(),
            fallback: AiFallback::new(provider),
        }
    }

    /// Build from `config/ai.json` (missing/invalid config disables the AI
    /// path; the pipeline still classifies via rules + safe default).
    pub fn from_config(cfg: &AiConfig) -> Self {
        Self::new(ai_adapter::provider_from_config(cfg))
    }

    /// Classify free text. Never fails: rules first, then the fallback with
    /// its fault-to-default contract.
    pub async fn classify(&self, text: &str) -> Classification {
        if let Some(hit) = self.table.match_text(text) {
            metrics::counter!("classify_rule_hits_total").increment(1);
            // Never log raw complaint text; hashed id only.
            info!(
                target: "classify",
                id = %anon_hash(text),
                category = %hit.category,
                "rule matched"
            );
            return hit;
        }

        metrics::counter!("classify_ai_calls_total").increment(1);
        let inferred = self.fallback.infer(text).await;
        info!(
            target: "classify",
            id = %anon_hash(text),
            provider = self.fallback.provider_name(),
            category = %inferred.category,
            confidence = inferred.confidence,
            "ai fallback"
        );
        inferred
    }
}

pub type SharedClassifier = Arc<ClassifierPipeline>;

/// Short anonymized id for log lines (SHA-256 prefix).
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

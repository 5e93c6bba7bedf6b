//! Deterministic keyword matcher (first stage of the classifier).
//!
//! The table is an immutable, versioned configuration: the declaration order
//! of categories in `config/keywords.toml` is the priority ranking, and the
//! first matching variant of the first matching category wins. Rule matches
//! never grade severity (fixed Medium) and carry `RULE_CONFIDENCE`.
//! `match_text` never fails; no match returns `None`.

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::model::{Classification, CrimeCategory};

/// Confidence attached to every rule match. Deterministic substring hits are
/// treated as certain.
pub const RULE_CONFIDENCE: f32 = 1.0;

const BUILTIN_TOML: &str = include_str!("../../config/keywords.toml");

static BUILTIN: Lazy<KeywordTable> =
    Lazy::new(|| KeywordTable::from_toml_str(BUILTIN_TOML).expect("valid builtin keyword table"));

/* ----------------------------
Config schema (from TOML)
---------------------------- */

#[derive(Debug, Clone, Deserialize)]
struct KeywordRoot {
    #[allow(dead_code)] // informational only (kept for config docs)
    version: u32,
    categories: Vec<CategoryCfg>,
}

#[derive(Debug, Clone, Deserialize)]
struct CategoryCfg {
    name: String,
    keywords: Vec<String>,
}

/* ----------------------------
Compiled table
---------------------------- */

#[derive(Debug)]
pub struct KeywordTable {
    // Declaration order preserved; this IS the priority ranking.
    entries: Vec<(CrimeCategory, Vec<String>)>,
}

impl KeywordTable {
    /// Parse a table from a TOML string. Category names must belong to the
    /// closed classifiable set; keywords are lowercased once at load time.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let root: KeywordRoot = toml::from_str(toml_str)?;
        let mut entries = Vec::with_capacity(root.categories.len());
        for cat in &root.categories {
            let category = CrimeCategory::from_label(&cat.name)
                .ok_or_else(|| anyhow::anyhow!("unknown crime category `{}`", cat.name))?;
            if cat.keywords.is_empty() {
                anyhow::bail!("category `{}` has no keywords", cat.name);
            }
            let keywords = cat
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect::<Vec<_>>();
            entries.push((category, keywords));
        }
        if entries.is_empty() {
            anyhow::bail!("keyword table has no categories");
        }
        Ok(Self { entries })
    }

    /// The table embedded at build time, loaded once.
    pub fn builtin() -> &'static KeywordTable {
        &BUILTIN
    }

    pub fn category_count(&self) -> usize {
        self.entries.len()
    }

    /// First-match classification: lowercase the input, walk categories in
    /// declaration order, test each variant by substring containment. Pure and
    /// idempotent; returns `None` when nothing matches.
    pub fn match_text(&self, text: &str) -> Option<Classification> {
        let lower = text.to_lowercase();
        for (category, keywords) in &self.entries {
            if keywords.iter().any(|k| lower.contains(k.as_str())) {
                return Some(Classification::rule_matched(*category, RULE_CONFIDENCE));
            }
        }
        None
    }
}

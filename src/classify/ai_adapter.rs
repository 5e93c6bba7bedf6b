//! AI fallback adapter: provider abstraction + fault-to-default contract.
//!
//! Invoked only when the keyword rules found nothing. The external model is a
//! black box that *should* answer with a small JSON payload; this adapter
//! extracts that payload defensively (first `{` to last `}`) and recovers any
//! fault — transport error, timeout, malformed payload — into a fixed safe
//! default. `infer` therefore never fails and never blocks complaint creation.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ai::AiConfig;
use crate::model::{clamp01, Classification, CrimeCategory, Severity};

/// Confidence recorded for a successful inference when the model payload does
/// not carry its own `confidence` field. No deeper certainty is available.
pub const AI_DEFAULT_CONFIDENCE: f32 = 0.6;

/// Fixed result substituted on any fault. Classification must always produce
/// something; degraded output is tagged with confidence 0.
pub fn safe_default() -> Classification {
    Classification::ai_inferred(CrimeCategory::Other, Severity::Medium, 0.0)
}

// ------------------------------------------------------------
// Provider abstraction + concrete providers
// ------------------------------------------------------------

/// Low-level provider: performs the remote call and returns the model's raw
/// text output. `None` covers every transport-level fault; payload parsing is
/// the adapter's job so mocks can feed it arbitrary prose.
pub trait Provider: Send + Sync + 'static {
    fn fetch<'a>(
        &'a self,
        input: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;
    fn name(&self) -> &'static str;
}

pub type DynProvider = Arc<dyn Provider>;

/// OpenAI provider (Chat Completions API). Requires an API key.
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model_override: Option<&str>) -> Self {
        // Bounded timeouts: a hung classification call must not stall
        // complaint creation beyond these.
        let http = reqwest::Client::builder()
            .user_agent("fir-desk/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        let model = model_override.unwrap_or("gpt-4o-mini").to_string();
        Self {
            http,
            api_key,
            model,
        }
    }
}

const CLASSIFY_INSTRUCTION: &str = "You classify citizen police complaints written in English, Hindi, or Hinglish. \
Map the complaint to exactly ONE crime_type from: \
\"Theft\", \"Cyber Crime\", \"Harassment\", \"Lost Property\", \"Fraud\", \"Robbery\", \"Assault\", \"Other\". \
Also determine severity: \"Low\", \"Medium\", or \"High\". \
Return ONLY valid JSON, e.g. {\"crime_type\": \"Theft\", \"severity\": \"Medium\"}.";

impl Provider for OpenAiProvider {
    fn fetch<'a>(
        &'a self,
        input: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move {
            if self.api_key.is_empty() {
                return None;
            }

            #[derive(Serialize)]
            struct Msg<'a> {
                role: &'a str,
                content: &'a str,
            }
            #[derive(Serialize)]
            struct Req<'a> {
                model: &'a str,
                messages: Vec<Msg<'a>>,
                temperature: f32,
                max_tokens: u32,
            }
            #[derive(Deserialize)]
            struct Resp {
                choices: Vec<Choice>,
            }
            #[derive(Deserialize)]
            struct Choice {
                message: ChoiceMsg,
            }
            #[derive(Deserialize)]
            struct ChoiceMsg {
                content: String,
            }

            let req = Req {
                model: &self.model,
                messages: vec![
                    Msg {
                        role: "system",
                        content: CLASSIFY_INSTRUCTION,
                    },
                    Msg {
                        role: "user",
                        content: input,
                    },
                ],
                temperature: 0.0,
                max_tokens: 60,
            };

            let resp = self
                .http
                .post("https://api.openai.com/v1/chat/completions")
                .bearer_auth(&self.api_key)
                .json(&req)
                .send()
                .await
                .ok()?;

            if !resp.status().is_success() {
                return None;
            }
            let body: Resp = resp.json().await.ok()?;
            body.choices.into_iter().next().map(|c| c.message.content)
        })
    }
    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Returns `None` always; used when AI classification is disabled. Every
/// fallback call then degrades to the safe default.
pub struct DisabledProvider;

impl Provider for DisabledProvider {
    fn fetch<'a>(
        &'a self,
        _input: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async { None })
    }
    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Programmable provider for tests: a fixed response (or simulated fault) plus
/// an atomic call counter so tests can assert the fast path skipped the call.
#[derive(Clone)]
pub struct MockProvider {
    pub response: Option<String>,
    pub calls: Arc<std::sync::atomic::AtomicUsize>,
}

impl MockProvider {
    pub fn returning(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            calls: Arc::new(std::sync::atomic::AtomicUsize::new(0)),
        }
    }

    /// Simulates an unreachable endpoint / network failure.
    pub fn failing() -> Self {
        Self {
            response: None,
            calls: Arc::new(std::sync::atomic::AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl Provider for MockProvider {
    fn fetch<'a>(
        &'a self,
        _input: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let out = self.response.clone();
        Box::pin(async move { out })
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Factory: build a provider according to config. Unknown providers and
/// disabled configs yield `DisabledProvider` (classification still works, it
/// just always degrades to the safe default on the fallback path).
pub fn provider_from_config(config: &AiConfig) -> DynProvider {
    if !config.enabled {
        return Arc::new(DisabledProvider);
    }
    match config.provider.as_str() {
        "openai" => Arc::new(OpenAiProvider::new(
            config.api_key.clone(),
            config.model.as_deref(),
        )),
        other => {
            warn!(provider = other, "unsupported AI provider, disabling");
            Arc::new(DisabledProvider)
        }
    }
}

// ------------------------------------------------------------
// Adapter
// ------------------------------------------------------------

pub struct AiFallback {
    provider: DynProvider,
}

impl AiFallback {
    pub fn new(provider: DynProvider) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Always yields a classification; never raises to the caller.
    pub async fn infer(&self, text: &str) -> Classification {
        match self.provider.fetch(text).await {
            Some(raw) => match parse_payload(&raw) {
                Some(c) => c,
                None => {
                    metrics::counter!("classify_ai_faults_total").increment(1);
                    warn!(provider = self.provider.name(), "unparseable AI payload");
                    safe_default()
                }
            },
            None => {
                metrics::counter!("classify_ai_faults_total").increment(1);
                warn!(provider = self.provider.name(), "AI provider fault");
                safe_default()
            }
        }
    }
}

/// Structured payload expected inside the model output.
#[derive(Debug, Deserialize)]
struct AiPayload {
    crime_type: String,
    severity: String,
    #[serde(default)]
    confidence: Option<f32>,
}

/// Extract the outermost `{...}` span from surrounding prose and parse it.
/// Category values are matched case-insensitively against the enumerated set;
/// unmatched values collapse to Other (same for severity, to Medium).
fn parse_payload(raw: &str) -> Option<Classification> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    let payload: AiPayload = serde_json::from_str(&raw[start..=end]).ok()?;

    let category = CrimeCategory::from_label(&payload.crime_type).unwrap_or(CrimeCategory::Other);
    let severity = Severity::from_label(&payload.severity).unwrap_or(Severity::Medium);
    let confidence = clamp01(payload.confidence.unwrap_or(AI_DEFAULT_CONFIDENCE));

    Some(Classification::ai_inferred(category, severity, confidence))
}

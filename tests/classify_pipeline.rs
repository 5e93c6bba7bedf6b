// tests/classify_pipeline.rs
//
// End-to-end behavior of the two-stage classifier: keyword rules first, AI
// fallback second, safe default on provider fault. The provider is always a
// mock; nothing here touches the network.

use std::sync::Arc;

use fir_desk::classify::ai_adapter::{DisabledProvider, MockProvider};
use fir_desk::classify::{ClassifierPipeline, AI_DEFAULT_CONFIDENCE, RULE_CONFIDENCE};
use fir_desk::model::{CrimeCategory, Provenance, Severity};

#[tokio::test]
async fn keyword_hit_is_deterministic_and_skips_the_provider() {
    let mock = MockProvider::returning(r#"{"crime_type":"Fraud","severity":"High"}"#);
    let pipeline = ClassifierPipeline::new(Arc::new(mock.clone()));

    let first = pipeline.classify("My bike was stolen near the market").await;
    let second = pipeline.classify("My bike was stolen near the market").await;

    assert_eq!(first.category, CrimeCategory::Theft);
    assert_eq!(first.severity, Severity::Medium);
    assert_eq!(first.confidence, RULE_CONFIDENCE);
    assert_eq!(first.provenance, Provenance::RuleMatched);
    assert_eq!(first, second, "rule path must be idempotent");
    assert_eq!(mock.call_count(), 0, "rule hit must not reach the provider");
}

#[tokio::test]
async fn unmatched_text_goes_to_the_provider_once() {
    let mock = MockProvider::returning(
        r#"Sure! Here is the result: {"crime_type":"fraud","severity":"high"} hope that helps"#,
    );
    let pipeline = ClassifierPipeline::new(Arc::new(mock.clone()));

    let c = pipeline
        .classify("Strange unprecedented event occurred involving documents")
        .await;

    assert_eq!(mock.call_count(), 1);
    assert_eq!(c.provenance, Provenance::AiInferred);
    // Prose around the JSON object is tolerated, labels are case-insensitive.
    assert_eq!(c.category, CrimeCategory::Fraud);
    assert_eq!(c.severity, Severity::High);
    assert_eq!(c.confidence, AI_DEFAULT_CONFIDENCE);
}

#[tokio::test]
async fn provider_fault_degrades_to_the_safe_default() {
    let mock = MockProvider::failing();
    let pipeline = ClassifierPipeline::new(Arc::new(mock.clone()));

    let c = pipeline
        .classify("Strange unprecedented event occurred involving documents")
        .await;

    assert_eq!(mock.call_count(), 1);
    assert_eq!(c.category, CrimeCategory::Other);
    assert_eq!(c.severity, Severity::Medium);
    assert_eq!(c.confidence, 0.0, "a defaulted answer must not look confident");
    assert_eq!(c.provenance, Provenance::AiInferred);
}

#[tokio::test]
async fn garbage_payload_degrades_to_the_safe_default() {
    for raw in ["no json here at all", "{not valid", r#"{"unexpected":"shape"}"#] {
        let pipeline = ClassifierPipeline::new(Arc::new(MockProvider::returning(raw)));
        let c = pipeline.classify("completely unmatched narrative").await;
        assert_eq!(c.category, CrimeCategory::Other, "payload: {raw}");
        assert_eq!(c.severity, Severity::Medium, "payload: {raw}");
    }
}

#[tokio::test]
async fn unknown_labels_collapse_to_other_and_medium() {
    let pipeline = ClassifierPipeline::new(Arc::new(MockProvider::returning(
        r#"{"crime_type":"Arson","severity":"Catastrophic"}"#,
    )));
    let c = pipeline.classify("completely unmatched narrative").await;
    assert_eq!(c.category, CrimeCategory::Other);
    assert_eq!(c.severity, Severity::Medium);
}

#[tokio::test]
async fn disabled_provider_still_classifies() {
    let pipeline = ClassifierPipeline::new(Arc::new(DisabledProvider));

    // Rule path unaffected.
    let c = pipeline.classify("otp shared with a caller, account emptied").await;
    assert_eq!(c.category, CrimeCategory::CyberCrime);
    assert_eq!(c.provenance, Provenance::RuleMatched);

    // Fallback path degrades instead of failing.
    let c = pipeline.classify("completely unmatched narrative").await;
    assert_eq!(c.category, CrimeCategory::Other);
    assert_eq!(c.severity, Severity::Medium);
}

use std::collections::BTreeSet;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use fitnexus_agent::assistant::{FitAssistant, EMPTY_CATALOG_MESSAGE, NO_MATCH_MESSAGE};
use fitnexus_agent::composer::FitVerdict;
use fitnexus_agent::llm::LlmClient;
use fitnexus_core::catalog::{Catalog, CatalogEntry};
use fitnexus_core::profile::ShopperProfile;
use fitnexus_core::retrieval::FallbackPolicy;

const GENERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Deterministic stand-in for the generation service. Records every
/// context it receives and replies with a fixed script.
struct ScriptedClient {
    reply: &'static str,
    seen_contexts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new(reply: &'static str) -> Self {
        Self { reply, seen_contexts: Mutex::new(Vec::new()) }
    }

    fn last_context(&self) -> String {
        self.seen_contexts
            .lock()
            .expect("context lock")
            .last()
            .cloned()
            .expect("a context was recorded")
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, _system_prompt: &str, user_message: &str) -> Result<String> {
        self.seen_contexts.lock().expect("context lock").push(user_message.to_string());
        Ok(self.reply.to_string())
    }
}

struct BrokenClient;

#[async_trait]
impl LlmClient for BrokenClient {
    async fn complete(&self, _system_prompt: &str, _user_message: &str) -> Result<String> {
        Err(anyhow!("upstream outage"))
    }
}

fn outerwear_entry(name: &str, description: &str, fit_type: &str, image: &str) -> CatalogEntry {
    CatalogEntry {
        name: name.to_string(),
        category: "Outerwear".to_string(),
        description: description.to_string(),
        fit_type: fit_type.to_string(),
        stretch: "medium".to_string(),
        fit_advice: "Runs roomy through the body.".to_string(),
        image_url: Some(image.to_string()),
    }
}

fn outerwear_catalog() -> Catalog {
    Catalog::new(vec![
        outerwear_entry("Oversized Fleece Half-Zip", "fleece jacket", "oversized", "img1"),
        outerwear_entry("CloudSoft Longline Zip-Up", "longline fleece jacket", "longline", "img2"),
    ])
}

fn long_torso_profile() -> ShopperProfile {
    ShopperProfile {
        height_band: "5'8\"-5'11\"".to_string(),
        body_type: "Rectangle".to_string(),
        usual_size: "M".to_string(),
        fit_preference: "Relaxed".to_string(),
        challenges: BTreeSet::from(["Long Torso".to_string()]),
    }
}

fn assistant_with(
    catalog: Catalog,
    client: Box<dyn LlmClient>,
    fallback: FallbackPolicy,
) -> FitAssistant {
    FitAssistant::new(catalog, client, fallback, GENERATION_TIMEOUT)
}

#[tokio::test]
async fn unmatchable_query_falls_back_to_first_entry_with_layer_alternatives() {
    let assistant = assistant_with(
        outerwear_catalog(),
        Box::new(ScriptedClient::new("The oversized cut leaves room for your long torso.")),
        FallbackPolicy::GeneralAdvice,
    );

    let result = assistant.think("will this fit me", &long_torso_profile()).await;

    assert_eq!(result.product_name.as_deref(), Some("Oversized Fleece Half-Zip"));
    assert_eq!(result.image.as_deref(), Some("img1"));
    assert_eq!(result.verdict, FitVerdict::GoodFit);
}

#[tokio::test]
async fn fallback_context_carries_profile_and_both_fit_types() {
    let client = ScriptedClient::new("The oversized cut works for you.");
    let contexts = std::sync::Arc::new(client);

    // Share the recording client with the assistant through a forwarding box.
    struct Forward(std::sync::Arc<ScriptedClient>);

    #[async_trait]
    impl LlmClient for Forward {
        async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String> {
            self.0.complete(system_prompt, user_message).await
        }
    }

    let assistant = assistant_with(
        outerwear_catalog(),
        Box::new(Forward(contexts.clone())),
        FallbackPolicy::GeneralAdvice,
    );

    let result = assistant.think("will this fit me", &long_torso_profile()).await;
    assert_eq!(result.product_name.as_deref(), Some("Oversized Fleece Half-Zip"));

    let context = contexts.last_context();
    assert!(context.contains("Long Torso"), "context should carry the profile challenge");
    assert!(context.contains("Fit type: oversized"), "context should carry the target fit type");
    assert!(
        context.contains("CloudSoft Longline Zip-Up (fit type: longline"),
        "context should list the layered alternative with its fit type"
    );
    assert!(
        !context.contains("2. "),
        "the only alternative should be the other layered entry"
    );
}

#[tokio::test]
async fn no_match_under_general_advice_returns_first_catalog_product() {
    let assistant = assistant_with(
        outerwear_catalog(),
        Box::new(ScriptedClient::new("A solid pick with an oversized fit.")),
        FallbackPolicy::GeneralAdvice,
    );

    let result = assistant.think("hoodie with thumbholes", &ShopperProfile::default()).await;

    assert_eq!(result.product_name.as_deref(), Some("Oversized Fleece Half-Zip"));
    assert!(!result.text.is_empty());
}

#[tokio::test]
async fn no_match_under_report_policy_returns_the_fixed_message() {
    let assistant = assistant_with(
        outerwear_catalog(),
        Box::new(ScriptedClient::new("unused")),
        FallbackPolicy::ReportNoMatch,
    );

    let result = assistant.think("ballgown", &ShopperProfile::default()).await;

    assert_eq!(result.text, NO_MATCH_MESSAGE);
    assert_eq!(result.product_name, None);
    assert_eq!(result.image, None);
    assert_eq!(result.verdict, FitVerdict::GoodFit);
}

#[tokio::test]
async fn matched_query_targets_the_best_scored_entry() {
    let assistant = assistant_with(
        outerwear_catalog(),
        Box::new(ScriptedClient::new("The longline cut suits a long torso.")),
        FallbackPolicy::ReportNoMatch,
    );

    let result = assistant.think("longline fleece", &long_torso_profile()).await;

    assert_eq!(result.product_name.as_deref(), Some("CloudSoft Longline Zip-Up"));
    assert_eq!(result.image.as_deref(), Some("img2"));
}

#[tokio::test]
async fn pivot_phrases_in_generated_text_flag_a_pivot() {
    let assistant = assistant_with(
        outerwear_catalog(),
        Box::new(ScriptedClient::new(
            "That one will swamp you. Try the CloudSoft Longline Zip-Up instead.",
        )),
        FallbackPolicy::GeneralAdvice,
    );

    let result = assistant.think("fleece", &long_torso_profile()).await;

    assert_eq!(result.verdict, FitVerdict::Pivot);
    // The result still identifies the evaluated target; the UI resolves the
    // pivot from the verdict plus the alternative named in the text.
    assert_eq!(result.product_name.as_deref(), Some("Oversized Fleece Half-Zip"));
}

#[tokio::test]
async fn generation_outage_degrades_to_canned_advice() {
    let assistant = assistant_with(
        outerwear_catalog(),
        Box::new(BrokenClient),
        FallbackPolicy::GeneralAdvice,
    );

    let result = assistant.think("fleece", &long_torso_profile()).await;

    assert_eq!(result.product_name.as_deref(), Some("Oversized Fleece Half-Zip"));
    assert!(result.text.contains("Oversized Fleece Half-Zip"));
    assert!(result.text.contains("oversized"));
    assert_eq!(result.verdict, FitVerdict::GoodFit);
}

#[tokio::test]
async fn empty_catalog_short_circuits_with_explicit_message() {
    let assistant = assistant_with(
        Catalog::default(),
        Box::new(ScriptedClient::new("unused")),
        FallbackPolicy::GeneralAdvice,
    );

    let result = assistant.think("fleece", &ShopperProfile::default()).await;

    assert_eq!(result.text, EMPTY_CATALOG_MESSAGE);
    assert_eq!(result.product_name, None);
}

#[tokio::test]
async fn stop_word_only_query_follows_the_configured_policy() {
    let assistant = assistant_with(
        outerwear_catalog(),
        Box::new(ScriptedClient::new("unused")),
        FallbackPolicy::ReportNoMatch,
    );

    let result = assistant.think("can you show me", &ShopperProfile::default()).await;
    assert_eq!(result.text, NO_MATCH_MESSAGE);
}

//! Builds the generation context and classifies the returned advice.

use std::fmt::Write as _;
use std::time::Duration;

use thiserror::Error;

use fitnexus_core::catalog::CatalogEntry;
use fitnexus_core::profile::ShopperProfile;

use crate::llm::LlmClient;

/// System instruction sent with every completion. The numbered rules are
/// what the pivot classifier and the downstream UI branch on.
pub const SYSTEM_PROMPT: &str = "You are FitNexus, an expert fashion fit consultant. \
Use only the provided shopper profile and product data to answer. Be conversational but \
concise, and highlight fit details specifically. Follow these rules: \
(1) If the target product is a poor fit for this shopper, say so plainly, recommend exactly \
one of the listed alternatives by name, and introduce it with the word \"instead\" or \
\"alternative\". \
(2) If the target product is a good fit, be affirmative and do not use the words \"instead\" \
or \"alternative\" anywhere in your answer. \
(3) Always mention at least one concrete attribute of the target product, such as its fit \
type or stretch, rather than a generic reassurance.";

/// Words that mark generated advice as recommending a pivot away from the
/// target. Detection is substring-only: prose that happens to use these
/// words conversationally will misclassify. The behavior under ambiguous
/// text is exactly the substring rule, nothing smarter.
const PIVOT_MARKERS: &[&str] = &["instead", "alternative"];

/// Post-hoc classification of generated advice, used by the UI to decide
/// whether to pivot the display to the recommended alternative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FitVerdict {
    #[default]
    GoodFit,
    Pivot,
}

impl FitVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GoodFit => "good_fit",
            Self::Pivot => "pivot",
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("advice generation timed out after {0} seconds")]
    TimedOut(u64),
    #[error("advice generation failed: {0}")]
    Unavailable(#[source] anyhow::Error),
}

/// Assembles the structured context handed to the generation service.
/// Three unambiguous blocks: shopper profile, target product attributes,
/// labeled alternatives.
pub fn compose_context(
    profile: &ShopperProfile,
    target: &CatalogEntry,
    alternatives: &[&CatalogEntry],
) -> String {
    let mut context = String::new();

    context.push_str("SHOPPER PROFILE:\n");
    let _ = writeln!(context, "Height: {}", or_unspecified(&profile.height_band));
    let _ = writeln!(context, "Body type: {}", or_unspecified(&profile.body_type));
    let _ = writeln!(context, "Usual size: {}", or_unspecified(&profile.usual_size));
    let _ = writeln!(context, "Fit preference: {}", or_unspecified(&profile.fit_preference));
    let challenges = if profile.has_challenges() {
        profile.challenge_list().join(", ")
    } else {
        "None reported".to_string()
    };
    let _ = writeln!(context, "Fit challenges: {challenges}");

    context.push_str("\nTARGET PRODUCT:\n");
    let _ = writeln!(context, "Name: {}", target.name);
    let _ = writeln!(context, "Category: {}", target.category);
    let _ = writeln!(context, "Fit type: {}", target.fit_type);
    let _ = writeln!(context, "Stretch: {}", target.stretch);
    let _ = writeln!(context, "Expert advice: {}", target.fit_advice);
    let _ = writeln!(context, "Description: {}", target.description);

    context.push_str("\nALTERNATIVES:\n");
    if alternatives.is_empty() {
        context.push_str("(none available)\n");
    } else {
        for (index, alternative) in alternatives.iter().enumerate() {
            let _ = writeln!(
                context,
                "{}. {} (fit type: {}, stretch: {})",
                index + 1,
                alternative.name,
                alternative.fit_type,
                alternative.stretch
            );
        }
    }

    context
}

fn or_unspecified(value: &str) -> &str {
    if value.trim().is_empty() {
        "unspecified"
    } else {
        value
    }
}

/// Runs one bounded completion call. Timeouts and transport failures both
/// surface as `GenerationError` so the facade can substitute its canned
/// result instead of propagating a fault.
pub async fn generate_advice(
    client: &dyn LlmClient,
    context: &str,
    timeout: Duration,
) -> Result<String, GenerationError> {
    match tokio::time::timeout(timeout, client.complete(SYSTEM_PROMPT, context)).await {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(error)) => Err(GenerationError::Unavailable(error)),
        Err(_) => Err(GenerationError::TimedOut(timeout.as_secs())),
    }
}

/// Classifies generated advice by pivot-marker substring search,
/// case-insensitive.
pub fn classify(advice: &str) -> FitVerdict {
    let lowered = advice.to_lowercase();
    if PIVOT_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        FitVerdict::Pivot
    } else {
        FitVerdict::GoodFit
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::time::Duration;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    use fitnexus_core::catalog::CatalogEntry;
    use fitnexus_core::profile::ShopperProfile;

    use super::{classify, compose_context, generate_advice, FitVerdict, GenerationError};
    use crate::llm::LlmClient;

    struct FailingClient;

    #[async_trait]
    impl LlmClient for FailingClient {
        async fn complete(&self, _system_prompt: &str, _user_message: &str) -> Result<String> {
            Err(anyhow!("service unavailable"))
        }
    }

    struct StallingClient;

    #[async_trait]
    impl LlmClient for StallingClient {
        async fn complete(&self, _system_prompt: &str, _user_message: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    fn entry(name: &str, fit_type: &str) -> CatalogEntry {
        CatalogEntry {
            name: name.to_string(),
            category: "Outerwear".to_string(),
            description: "fleece jacket".to_string(),
            fit_type: fit_type.to_string(),
            stretch: "medium".to_string(),
            fit_advice: "Runs large through the shoulders.".to_string(),
            image_url: None,
        }
    }

    fn profile_with(challenges: &[&str]) -> ShopperProfile {
        ShopperProfile {
            height_band: "5'4\"-5'7\"".to_string(),
            body_type: "Pear".to_string(),
            usual_size: "M".to_string(),
            fit_preference: "Relaxed".to_string(),
            challenges: challenges.iter().map(|tag| tag.to_string()).collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn context_separates_the_three_blocks() {
        let target = entry("Oversized Fleece Half-Zip", "oversized");
        let alternative = entry("CloudSoft Longline Zip-Up", "longline");
        let context =
            compose_context(&profile_with(&["Long Torso"]), &target, &[&alternative]);

        let profile_at = context.find("SHOPPER PROFILE:").expect("profile block");
        let target_at = context.find("TARGET PRODUCT:").expect("target block");
        let alternatives_at = context.find("ALTERNATIVES:").expect("alternatives block");
        assert!(profile_at < target_at && target_at < alternatives_at);

        assert!(context.contains("Fit challenges: Long Torso"));
        assert!(context.contains("Fit type: oversized"));
        assert!(context.contains("1. CloudSoft Longline Zip-Up (fit type: longline"));
    }

    #[test]
    fn context_marks_missing_alternatives() {
        let target = entry("Oversized Fleece Half-Zip", "oversized");
        let context = compose_context(&profile_with(&[]), &target, &[]);
        assert!(context.contains("(none available)"));
        assert!(context.contains("Fit challenges: None reported"));
    }

    #[test]
    fn pivot_markers_classify_as_pivot() {
        assert_eq!(classify("Try the CloudSoft Zip-Up instead."), FitVerdict::Pivot);
        assert_eq!(classify("A better ALTERNATIVE is the longline cut."), FitVerdict::Pivot);
    }

    #[test]
    fn affirmative_advice_classifies_as_good_fit() {
        assert_eq!(
            classify("Great pick - the oversized fit gives your long torso room."),
            FitVerdict::GoodFit
        );
    }

    #[tokio::test]
    async fn failed_generation_reports_unavailable() {
        let error = generate_advice(&FailingClient, "context", Duration::from_secs(5))
            .await
            .err()
            .expect("generation should fail");
        assert!(matches!(error, GenerationError::Unavailable(_)));
    }

    #[tokio::test]
    async fn stalled_generation_times_out() {
        let error = generate_advice(&StallingClient, "context", Duration::from_millis(50))
            .await
            .err()
            .expect("generation should time out");
        assert!(matches!(error, GenerationError::TimedOut(_)));
    }
}

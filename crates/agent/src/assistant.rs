//! Fit-assistant facade: the single entry point external collaborators call.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use fitnexus_core::catalog::{Catalog, CatalogEntry};
use fitnexus_core::config::AppConfig;
use fitnexus_core::errors::{CatalogError, RetrievalError};
use fitnexus_core::normalize::normalize;
use fitnexus_core::profile::ShopperProfile;
use fitnexus_core::retrieval::{score_and_rank, select_alternatives, FallbackPolicy};

use crate::composer::{classify, compose_context, generate_advice, FitVerdict};
use crate::llm::LlmClient;
use crate::providers::client_from_config;

/// Reply used when retrieval finds nothing under the `ReportNoMatch` policy.
pub const NO_MATCH_MESSAGE: &str =
    "I couldn't find a specific product matching that description. Could you be more specific?";

/// Reply used when the catalog itself has no entries.
pub const EMPTY_CATALOG_MESSAGE: &str =
    "The product catalog is empty right now, so I can't look anything up. Please try again in a bit.";

/// The facade's output. Owned by the caller once returned; the target's
/// image and name ride along so the UI can render the product card, and
/// `verdict` tells it whether the advice recommends pivoting away.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FitResult {
    pub text: String,
    pub image: Option<String>,
    pub product_name: Option<String>,
    #[serde(serialize_with = "serialize_verdict")]
    pub verdict: FitVerdict,
}

fn serialize_verdict<S: serde::Serializer>(
    verdict: &FitVerdict,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(verdict.as_str())
}

impl FitResult {
    fn message_only(text: &str) -> Self {
        Self { text: text.to_string(), ..Self::default() }
    }
}

/// Failures that may abort assistant construction. Surfaced once at
/// startup; `think` itself never fails.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("llm client construction failed: {0}")]
    Llm(#[source] anyhow::Error),
}

pub struct FitAssistant {
    catalog: Catalog,
    client: Box<dyn LlmClient>,
    fallback: FallbackPolicy,
    generation_timeout: Duration,
}

struct Selection<'a> {
    target: &'a CatalogEntry,
    alternatives: Vec<&'a CatalogEntry>,
}

impl FitAssistant {
    pub fn new(
        catalog: Catalog,
        client: Box<dyn LlmClient>,
        fallback: FallbackPolicy,
        generation_timeout: Duration,
    ) -> Self {
        Self { catalog, client, fallback, generation_timeout }
    }

    /// Loads the catalog and provider client described by the config.
    pub fn from_config(config: &AppConfig) -> Result<Self, BootstrapError> {
        let catalog = Catalog::load(&config.catalog.path)?;
        info!(
            event_name = "fit.bootstrap.catalog_loaded",
            products = catalog.len(),
            path = %config.catalog.path.display(),
            "catalog loaded"
        );
        let client = client_from_config(&config.llm).map_err(BootstrapError::Llm)?;
        Ok(Self::new(
            catalog,
            client,
            config.retrieval.fallback,
            Duration::from_secs(config.llm.timeout_secs),
        ))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Answers one fit question. Runs normalization, scoring, alternative
    /// selection, context composition, and generation in sequence; every
    /// failure inside the pipeline is converted into a displayable result.
    pub async fn think(&self, query: &str, profile: &ShopperProfile) -> FitResult {
        let correlation_id = Uuid::new_v4().to_string();
        info!(
            event_name = "fit.think.start",
            correlation_id = %correlation_id,
            query = %query,
            "handling fit request"
        );

        let selection = match self.select(query, &correlation_id) {
            Ok(selection) => selection,
            Err(early_result) => return early_result,
        };

        let context = compose_context(profile, selection.target, &selection.alternatives);
        let text = match generate_advice(
            self.client.as_ref(),
            &context,
            self.generation_timeout,
        )
        .await
        {
            Ok(text) => text,
            Err(error) => {
                warn!(
                    event_name = "fit.think.generation_degraded",
                    correlation_id = %correlation_id,
                    error = %error,
                    "generation call failed, substituting canned advice"
                );
                canned_advice(selection.target)
            }
        };

        let verdict = classify(&text);
        info!(
            event_name = "fit.think.completed",
            correlation_id = %correlation_id,
            product = %selection.target.name,
            verdict = verdict.as_str(),
            "fit request answered"
        );

        FitResult {
            text,
            image: selection.target.image_url.clone(),
            product_name: Some(selection.target.name.clone()),
            verdict,
        }
    }

    /// Picks the target and alternative set, or produces the early
    /// fallback result when retrieval cannot.
    fn select(&self, query: &str, correlation_id: &str) -> Result<Selection<'_>, FitResult> {
        let Some(first_entry) = self.catalog.first() else {
            return Err(FitResult::message_only(EMPTY_CATALOG_MESSAGE));
        };

        let ranked = normalize(query).and_then(|tokens| score_and_rank(&tokens, &self.catalog));
        match ranked {
            Ok(ranked) => {
                let target = ranked[0].entry;
                let alternatives = select_alternatives(target, &ranked[1..], &self.catalog);
                Ok(Selection { target, alternatives })
            }
            Err(RetrievalError::EmptyCatalog) => {
                Err(FitResult::message_only(EMPTY_CATALOG_MESSAGE))
            }
            Err(reason) => {
                warn!(
                    event_name = "fit.think.no_candidates",
                    correlation_id = %correlation_id,
                    reason = %reason,
                    policy = self.fallback.as_str(),
                    "retrieval produced no candidates"
                );
                match self.fallback {
                    FallbackPolicy::ReportNoMatch => {
                        Err(FitResult::message_only(NO_MATCH_MESSAGE))
                    }
                    FallbackPolicy::GeneralAdvice => {
                        let alternatives = select_alternatives(first_entry, &[], &self.catalog);
                        Ok(Selection { target: first_entry, alternatives })
                    }
                }
            }
        }
    }
}

/// Deterministic substitute used when the generation call fails or times
/// out. Built only from catalog data and free of pivot markers, so it
/// always classifies as a good fit.
fn canned_advice(target: &CatalogEntry) -> String {
    format!(
        "I couldn't reach the styling service just now, but here is what we know about {}: {} \
         Fit type: {}; stretch: {}.",
        target.name, target.fit_advice, target.fit_type, target.stretch
    )
}

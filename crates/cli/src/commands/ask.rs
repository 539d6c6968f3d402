use std::collections::BTreeSet;

use serde::Serialize;

use fitnexus_agent::assistant::FitAssistant;
use fitnexus_core::config::{AppConfig, LoadOptions, LogFormat};
use fitnexus_core::profile::{
    reconcile_challenges, ShopperProfile, FIT_CHALLENGES, NO_CHALLENGES_TAG,
};

use crate::commands::CommandResult;

/// One fit question plus the shopper profile flags that accompany it.
#[derive(Debug, Clone)]
pub struct AskRequest {
    pub query: String,
    pub height: String,
    pub body_type: String,
    pub usual_size: String,
    pub preference: String,
    pub challenges: Vec<String>,
}

#[derive(Debug, Serialize)]
struct AskReport {
    command: &'static str,
    status: &'static str,
    product_name: Option<String>,
    image: Option<String>,
    verdict: &'static str,
    text: String,
}

pub fn run(request: AskRequest) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("ask", "config_validation", error.to_string(), 2)
        }
    };
    init_logging(&config);

    if let Some(unknown) =
        request.challenges.iter().find(|tag| !FIT_CHALLENGES.contains(&tag.as_str()))
    {
        return CommandResult::failure(
            "ask",
            "unknown_challenge",
            format!("unknown fit challenge `{unknown}`; valid tags: {}", FIT_CHALLENGES.join(", ")),
            2,
        );
    }

    let profile = build_profile(&request);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "ask",
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                4,
            )
        }
    };

    let result = runtime.block_on(async {
        let assistant = FitAssistant::from_config(&config)?;
        Ok::<_, fitnexus_agent::assistant::BootstrapError>(
            assistant.think(&request.query, &profile).await,
        )
    });

    match result {
        Ok(fit) => {
            let report = AskReport {
                command: "ask",
                status: "ok",
                product_name: fit.product_name.clone(),
                image: fit.image.clone(),
                verdict: fit.verdict.as_str(),
                text: fit.text.clone(),
            };
            let machine = serde_json::to_string(&report).unwrap_or_else(|error| {
                format!(
                    "{{\"command\":\"ask\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
                    error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
                )
            });
            CommandResult { exit_code: 0, output: format!("{}\n{machine}", fit.text) }
        }
        Err(error) => CommandResult::failure("ask", "bootstrap", error.to_string(), 3),
    }
}

/// Applies the selection-reconciliation rules before the profile crosses
/// into the core: an empty flag list becomes the sentinel, and the sentinel
/// never survives next to specific tags.
fn build_profile(request: &AskRequest) -> ShopperProfile {
    let previous = BTreeSet::from([NO_CHALLENGES_TAG.to_string()]);
    let current: BTreeSet<String> = request.challenges.iter().cloned().collect();
    let challenges = reconcile_challenges(&previous, &current);

    ShopperProfile {
        height_band: request.height.clone(),
        body_type: request.body_type.clone(),
        usual_size: request.usual_size.clone(),
        fit_preference: request.preference.clone(),
        challenges,
    }
}

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    // try_init so repeated invocations in one process (tests) stay quiet.
    let builder = tracing_subscriber::fmt().with_target(false).with_max_level(log_level);
    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Sentinel challenge tag meaning "no fit challenges reported". The
/// selection rules keep it mutually exclusive with every specific tag.
pub const NO_CHALLENGES_TAG: &str = "None";

/// Canonical fit-challenge tags offered during profile setup. Callers
/// validate shopper selections against this list.
pub const FIT_CHALLENGES: &[&str] = &[
    NO_CHALLENGES_TAG,
    "Long Torso",
    "Short Torso",
    "Broad Shoulders",
    "Narrow Shoulders",
    "Long Arms",
    "Short Arms",
    "Full Bust",
    "Small Bust",
    "Round Stomach",
    "Soft Midsection",
    "Curvy Hips",
    "Wide Hips",
    "Narrow Hips",
    "High Hip Shelf",
    "Athletic Thighs",
    "Long Legs",
    "Short Legs",
    "Muscular Calves",
];

/// Request-scoped shopper profile. Created by the caller per request and
/// discarded after the result crosses back.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopperProfile {
    pub height_band: String,
    pub body_type: String,
    pub usual_size: String,
    pub fit_preference: String,
    #[serde(default)]
    pub challenges: BTreeSet<String>,
}

impl ShopperProfile {
    /// True when the shopper reported at least one specific challenge. An
    /// empty set and a `"None"`-only set both mean "no challenges".
    pub fn has_challenges(&self) -> bool {
        self.challenges.iter().any(|tag| tag != NO_CHALLENGES_TAG)
    }

    /// The specific challenge tags, with the sentinel filtered out.
    pub fn challenge_list(&self) -> Vec<&str> {
        self.challenges
            .iter()
            .filter(|tag| tag.as_str() != NO_CHALLENGES_TAG)
            .map(String::as_str)
            .collect()
    }
}

/// Reconciles a challenge multi-selection so the sentinel tag and specific
/// tags stay mutually exclusive.
///
/// Rules, in order: deselecting everything yields `{None}`; newly selecting
/// `"None"` clears the specific tags; `"None"` lingering from before next
/// to specific tags is dropped; any other selection passes through
/// unchanged. Pure and synchronous, so callers can apply it on every
/// selection change.
pub fn reconcile_challenges(
    previous: &BTreeSet<String>,
    current: &BTreeSet<String>,
) -> BTreeSet<String> {
    let none_only = || BTreeSet::from([NO_CHALLENGES_TAG.to_string()]);

    if current.is_empty() {
        return none_only();
    }

    let selected_none = current.contains(NO_CHALLENGES_TAG);
    if selected_none && !previous.contains(NO_CHALLENGES_TAG) {
        return none_only();
    }
    if selected_none && current.len() > 1 {
        return current.iter().filter(|tag| *tag != NO_CHALLENGES_TAG).cloned().collect();
    }

    current.clone()
}

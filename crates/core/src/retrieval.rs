use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogEntry};
use crate::errors::RetrievalError;

/// Upper bound on the alternative set handed to the composer.
pub const MAX_ALTERNATIVES: usize = 3;

/// Name/description keywords that mark an entry as layered outerwear for
/// alternative selection.
const LAYER_KEYWORDS: &[&str] =
    &["hoodie", "jacket", "pullover", "sweatshirt", "fleece", "coat", "zip"];

/// What the facade does when ranking yields zero candidates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Advise over the leading catalog entries as if they had matched.
    #[default]
    GeneralAdvice,
    /// Reply with the fixed "couldn't find that" message.
    ReportNoMatch,
}

impl FallbackPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GeneralAdvice => "general_advice",
            Self::ReportNoMatch => "report_no_match",
        }
    }
}

impl std::str::FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "general_advice" => Ok(Self::GeneralAdvice),
            "report_no_match" => Ok(Self::ReportNoMatch),
            other => Err(format!(
                "unsupported fallback policy `{other}` (expected general_advice|report_no_match)"
            )),
        }
    }
}

/// Request-scoped pairing of a catalog entry and its relevance score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoredCandidate<'a> {
    pub entry: &'a CatalogEntry,
    pub score: usize,
}

/// Scores every catalog entry against the query tokens and ranks the
/// matches best-first.
///
/// The score is the number of tokens occurring as substrings of the
/// entry's searchable text; zero-scored entries are excluded. Ties keep
/// catalog iteration order via the stable sort — a deterministic, not a
/// semantic, tie-break. The zero-candidate fallback decision belongs to
/// the caller, not here.
pub fn score_and_rank<'a>(
    tokens: &[String],
    catalog: &'a Catalog,
) -> Result<Vec<ScoredCandidate<'a>>, RetrievalError> {
    if catalog.is_empty() {
        return Err(RetrievalError::EmptyCatalog);
    }

    let mut ranked = Vec::new();
    for entry in catalog.entries() {
        let searchable = entry.searchable_text();
        let score = tokens.iter().filter(|token| searchable.contains(token.as_str())).count();
        if score > 0 {
            ranked.push(ScoredCandidate { entry, score });
        }
    }

    if ranked.is_empty() {
        return Err(RetrievalError::NoMatch);
    }
    ranked.sort_by(|left, right| right.score.cmp(&left.score));
    Ok(ranked)
}

/// Whether an entry belongs to the layered-outerwear category.
pub fn is_layered(entry: &CatalogEntry) -> bool {
    let text = format!("{} {}", entry.name, entry.description).to_lowercase();
    LAYER_KEYWORDS.iter().any(|keyword| text.contains(keyword))
}

/// Selects the alternative set for a chosen target.
///
/// Tier one is category-aware: a layered target only admits other layered
/// entries, any other target admits every other entry, in catalog order.
/// Only when that filter comes up empty does tier two fill in from the
/// next-highest-scored non-target candidates. Both tiers cap at
/// `MAX_ALTERNATIVES`.
pub fn select_alternatives<'a>(
    target: &CatalogEntry,
    ranked: &[ScoredCandidate<'a>],
    catalog: &'a Catalog,
) -> Vec<&'a CatalogEntry> {
    let target_is_layer = is_layered(target);

    let alternatives: Vec<&CatalogEntry> = catalog
        .entries()
        .iter()
        .filter(|candidate| candidate.name != target.name)
        .filter(|candidate| !target_is_layer || is_layered(candidate))
        .take(MAX_ALTERNATIVES)
        .collect();

    if !alternatives.is_empty() {
        return alternatives;
    }

    ranked
        .iter()
        .filter(|candidate| candidate.entry.name != target.name)
        .map(|candidate| candidate.entry)
        .take(MAX_ALTERNATIVES)
        .collect()
}

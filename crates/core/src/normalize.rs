use crate::errors::RetrievalError;

/// Domain synonyms, applied as substring substitutions before tokenization
/// so multi-word sources collapse to single catalog terms. Entries are
/// matched against text that has already been lower-cased and stripped of
/// punctuation ("zip-up" arrives as "zipup").
const SYNONYMS: &[(&str, &str)] = &[
    ("sweat shirt", "hoodie"),
    ("sweatshirt", "hoodie"),
    ("zipup", "zip"),
    ("jumper", "pullover"),
    ("trousers", "leggings"),
    ("slacks", "leggings"),
    ("pants", "leggings"),
    ("denim", "jeans"),
];

/// Articles, auxiliaries, and conversational filler that carry no product
/// signal.
const STOP_WORDS: &[&str] = &[
    "a", "about", "an", "and", "are", "can", "could", "do", "for", "have", "i", "in", "is",
    "me", "my", "need", "on", "please", "recommend", "show", "tell", "the", "want", "what",
    "would", "you",
];

/// Normalizes a raw shopper query into scoring tokens.
///
/// Steps, in order: lower-case, strip punctuation, substitute synonyms,
/// split on whitespace, drop stop words. A query that leaves nothing behind
/// signals `NoUsableQuery` so the caller can take its fallback path instead
/// of scoring against an empty token list.
pub fn normalize(raw_query: &str) -> Result<Vec<String>, RetrievalError> {
    let lowered = raw_query.to_lowercase();

    let mut cleaned = String::with_capacity(lowered.len());
    for character in lowered.chars() {
        if !character.is_ascii_punctuation() {
            cleaned.push(character);
        }
    }

    for (source, canonical) in SYNONYMS {
        if cleaned.contains(source) {
            cleaned = cleaned.replace(source, canonical);
        }
    }

    let tokens: Vec<String> = cleaned
        .split_whitespace()
        .filter(|token| !STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect();

    if tokens.is_empty() {
        return Err(RetrievalError::NoUsableQuery);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::normalize;
    use crate::errors::RetrievalError;

    #[test]
    fn lowercases_and_strips_punctuation() {
        let tokens = normalize("Boxy Hoodie!!!").expect("usable tokens");
        assert_eq!(tokens, vec!["boxy", "hoodie"]);
    }

    #[test]
    fn stop_word_only_query_signals_no_usable_terms() {
        assert_eq!(normalize("can you show me"), Err(RetrievalError::NoUsableQuery));
        assert_eq!(normalize(""), Err(RetrievalError::NoUsableQuery));
        assert_eq!(normalize("?!"), Err(RetrievalError::NoUsableQuery));
    }

    #[test]
    fn synonyms_collapse_to_catalog_vocabulary() {
        assert_eq!(normalize("sweatshirt").expect("tokens"), vec!["hoodie"]);
        assert_eq!(normalize("comfy pants").expect("tokens"), vec!["comfy", "leggings"]);
    }

    #[test]
    fn multi_word_synonym_collapses_before_tokenization() {
        assert_eq!(normalize("a sweat shirt").expect("tokens"), vec!["hoodie"]);
    }

    #[test]
    fn hyphenated_zip_up_becomes_zip() {
        assert_eq!(normalize("cozy zip-up").expect("tokens"), vec!["cozy", "zip"]);
    }

    #[test]
    fn canonical_and_synonym_queries_normalize_identically() {
        assert_eq!(normalize("show me a hoodie"), normalize("show me a sweatshirt"));
    }

    #[test]
    fn filler_heavy_query_keeps_only_product_terms() {
        let tokens = normalize("can you recommend leggings for me, please?").expect("tokens");
        assert_eq!(tokens, vec!["leggings"]);
    }
}

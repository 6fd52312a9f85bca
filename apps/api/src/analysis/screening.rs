//! Keyword pre-screening for the wellbeing stage.
//!
//! A plain case-insensitive substring scan. Matches are context for the wellbeing
//! prompt only; they never skip or short-circuit an LLM call.

/// Stronger signals. Scanned first so they lead the result.
const FLAG_KEYWORDS: &[&str] = &[
    "hoffnungslos",
    "hilflos",
    "selbstverletzung",
    "suizid",
    "nicht mehr weiter",
    "keinen sinn",
    "aufgeben",
];

const MILD_KEYWORDS: &[&str] = &[
    "stress",
    "überfordert",
    "erschöpft",
    "müde",
    "schlaf",
    "sorgen",
    "angst",
    "zweifel",
    "unsicher",
    "schwierig",
];

/// Returns every listed keyword found in `text`: flag matches first, then mild,
/// each in declaration order. Empty means no signal.
pub fn screen(text: &str) -> Vec<&'static str> {
    let text_lower = text.to_lowercase();

    FLAG_KEYWORDS
        .iter()
        .chain(MILD_KEYWORDS)
        .copied()
        .filter(|keyword| text_lower.contains(keyword))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_matches_precede_mild_matches() {
        let found = screen("I feel hoffnungslos and müde");
        assert_eq!(found, vec!["hoffnungslos", "müde"]);
    }

    #[test]
    fn test_order_follows_declaration_not_position_in_text() {
        let found = screen("Schlaf fehlt, viel Stress, ich will aufgeben");
        assert_eq!(found, vec!["aufgeben", "stress", "schlaf"]);
    }

    #[test]
    fn test_match_is_case_insensitive_including_umlauts() {
        assert_eq!(screen("ÜBERFORDERT mit allem"), vec!["überfordert"]);
    }

    #[test]
    fn test_substring_matches_inside_words() {
        // "schlaf" is found inside "Schlafmangel", mirroring a plain substring scan.
        assert_eq!(screen("Schlafmangel vor Prüfungen"), vec!["schlaf"]);
    }

    #[test]
    fn test_no_listed_terms_yields_empty() {
        assert!(screen("The Roman Empire declined over several centuries.").is_empty());
    }

    #[test]
    fn test_multi_word_flag_terms() {
        assert_eq!(
            screen("Es hat alles keinen Sinn mehr"),
            vec!["keinen sinn"]
        );
    }
}

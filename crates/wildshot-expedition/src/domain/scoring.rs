//! Keyword and species-marker scoring of vision analysis text.
//!
//! A photo earns a flat sighting bonus when the analysis mentions wildlife
//! without also reporting its absence, plus a bonus per distinct species the
//! model wrapped in `**` markers.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Points for an analysis that mentions wildlife.
pub const SIGHTING_POINTS: u32 = 5;

/// Points for each distinct marked species.
pub const SPECIES_POINTS: u32 = 5;

/// Substrings that count as a wildlife mention.
pub const ANIMAL_KEYWORDS: [&str; 4] = ["bird", "animal", "mammal", "insect"];

/// Substrings that cancel the sighting bonus.
pub const ABSENCE_KEYWORDS: [&str; 8] = [
    "no birds",
    "no animals",
    "no mammals",
    "no insects",
    "no exotic birds",
    "no exotic animals",
    "no exotic mammals",
    "no exotic insects",
];

static SPECIES_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("species marker pattern is valid"));

/// Scores one analysis. Total and pure: empty or marker-free text scores 0.
#[must_use]
pub fn score_analysis(analysis: &str) -> u32 {
    let lowered = analysis.to_lowercase();

    let mentions_wildlife = ANIMAL_KEYWORDS.iter().any(|k| lowered.contains(k));
    let reports_absence = ABSENCE_KEYWORDS.iter().any(|k| lowered.contains(k));

    let sighting = if mentions_wildlife && !reports_absence {
        SIGHTING_POINTS
    } else {
        0
    };

    let species_count = u32::try_from(species_markers(analysis).len()).unwrap_or(u32::MAX);

    sighting.saturating_add(species_count.saturating_mul(SPECIES_POINTS))
}

/// Returns the distinct `**`-marked species in `analysis`, lower-cased.
///
/// Markers are matched left to right without nesting; an unterminated or
/// empty marker contributes nothing.
#[must_use]
pub fn species_markers(analysis: &str) -> BTreeSet<String> {
    SPECIES_MARKER
        .captures_iter(analysis)
        .map(|caps| caps[1].to_lowercase())
        .collect()
}

/// Returns the marked species in order of first appearance, keeping the
/// model's original casing. Later case-insensitive duplicates are dropped.
#[must_use]
pub fn species_in_order(analysis: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    SPECIES_MARKER
        .captures_iter(analysis)
        .filter_map(|caps| {
            let name = caps[1].to_owned();
            seen.insert(name.to_lowercase()).then_some(name)
        })
        .collect()
}

/// Text before the first `.`, terminated with a `.`, used as a one-line
/// discovery summary.
#[must_use]
pub fn first_sentence(analysis: &str) -> String {
    let head = analysis.split('.').next().unwrap_or_default();
    format!("{head}.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_analysis_scores_zero() {
        assert_eq!(score_analysis(""), 0);
    }

    #[test]
    fn test_wildlife_mention_earns_sighting_points() {
        assert_eq!(score_analysis("I see a bird in the grass"), 5);
    }

    #[test]
    fn test_absence_keyword_cancels_sighting_points() {
        assert_eq!(score_analysis("no birds or animals visible"), 0);
    }

    #[test]
    fn test_marked_species_add_points_on_top_of_sighting() {
        assert_eq!(
            score_analysis("I see a **Zebra** and a **Giraffe** and a bird"),
            15
        );
    }

    #[test]
    fn test_marked_species_deduplicate_case_insensitively() {
        assert_eq!(score_analysis("**Lion** ... **lion**"), 5);
    }

    #[test]
    fn test_keyword_matching_ignores_case() {
        assert_eq!(score_analysis("A flock of BIRDS overhead"), 5);
        assert_eq!(score_analysis("NO EXOTIC INSECTS here, just an insect-free log"), 0);
    }

    #[test]
    fn test_keywords_match_as_substrings() {
        // "mammals" contains "mammal"; "animalistic" contains "animal".
        assert_eq!(score_analysis("small mammals"), 5);
        assert_eq!(score_analysis("an animalistic rock shape"), 5);
    }

    #[test]
    fn test_absence_does_not_cancel_species_points() {
        // Arrange
        let analysis = "There are no animals, but a **Strangler Fig** and **Bromeliad** grow here.";

        // Act
        let score = score_analysis(analysis);

        // Assert
        assert_eq!(score, 10);
    }

    #[test]
    fn test_unterminated_and_empty_markers_contribute_nothing() {
        assert_eq!(score_analysis("**Jaguar"), 0);
        assert_eq!(score_analysis("****"), 0);
        assert_eq!(score_analysis("plain text with * single * stars"), 0);
    }

    #[test]
    fn test_markers_match_non_greedily_left_to_right() {
        let species = species_markers("**Toucan** and **Macaw** and **toucan**");
        assert_eq!(
            species.into_iter().collect::<Vec<_>>(),
            vec!["macaw".to_owned(), "toucan".to_owned()]
        );
    }

    #[test]
    fn test_marker_content_spanning_extra_asterisk_starts_at_last_pair() {
        // The leading third asterisk cannot start a marker body.
        let species = species_markers("***Okapi**");
        assert_eq!(species.len(), 1);
        assert!(species.contains("okapi"));
    }

    #[test]
    fn test_species_in_order_keeps_first_spelling() {
        let species = species_in_order("**Polar Bear**, **Arctic Fox**, **polar bear**");
        assert_eq!(species, vec!["Polar Bear".to_owned(), "Arctic Fox".to_owned()]);
    }

    #[test]
    fn test_score_is_deterministic() {
        let analysis = "A **Scarlet Macaw** and other birds.";
        assert_eq!(score_analysis(analysis), score_analysis(analysis));
        assert_eq!(score_analysis(analysis), 10);
    }

    #[test]
    fn test_first_sentence_takes_text_before_first_period() {
        assert_eq!(
            first_sentence("A heron wades. Frogs call nearby."),
            "A heron wades."
        );
        assert_eq!(first_sentence("No period here"), "No period here.");
        assert_eq!(first_sentence(""), ".");
    }
}

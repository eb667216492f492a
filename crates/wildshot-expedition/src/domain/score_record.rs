//! Structured `{species, score}` records returned by the score formatter.
//!
//! The record is advisory. The locally computed score is always the one
//! added to the expedition; the record only supplies a display label.

use serde::Deserialize;

use super::scoring::{first_sentence, species_in_order};

/// A parsed formatter record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    /// Species label chosen by the text model.
    pub species: String,
    /// Score restated by the text model.
    pub score: u32,
}

#[derive(Deserialize)]
struct RawRecord {
    #[serde(default)]
    species: Option<serde_json::Value>,
    score: f64,
}

/// Parses the first `{` .. last `}` span of `text` as a record.
///
/// Returns `None` when there is no JSON object, it does not decode, or the
/// score is negative or not finite.
#[must_use]
pub fn parse_score_record(text: &str) -> Option<ScoreRecord> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }

    let raw: RawRecord = serde_json::from_str(&text[start..=end]).ok()?;
    if !raw.score.is_finite() || raw.score < 0.0 {
        return None;
    }

    let species = match raw.species {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(serde_json::Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = raw.score.round().min(f64::from(u32::MAX)) as u32;

    Some(ScoreRecord { species, score })
}

/// Picks the species label shown for a photo: the record's label when it
/// has one, otherwise the marked species, otherwise the first sentence of
/// the analysis.
#[must_use]
pub fn resolve_species_label(record: Option<&ScoreRecord>, analysis: &str) -> String {
    if let Some(record) = record {
        let label = record.species.trim();
        if !label.is_empty() {
            return label.to_owned();
        }
    }

    let marked = species_in_order(analysis);
    if marked.is_empty() {
        first_sentence(analysis)
    } else {
        marked.join(", ")
    }
}

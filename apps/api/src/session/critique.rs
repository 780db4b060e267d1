//! Critique parsing — turns raw model output into a structured critique.
//!
//! The model is asked for `{feedback, rating, sample_answer}` but is not
//! trusted to comply. Parsing is tagged: `Parsed` when the structured fields
//! were recovered, `Unparseable` when they were not. Fallback policy for
//! unparseable output: the whole response becomes one feedback bullet, the
//! rating defaults to the neutral midpoint 3, and the sample answer is empty.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
/// Rating used when the model omitted one entirely.
pub const NEUTRAL_RATING: u8 = 3;

/// A structured critique of one answer.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Critique {
    pub feedback: Vec<String>,
    /// Always within `[1, 5]` after parsing.
    pub rating: u8,
    pub sample_answer: String,
}

/// Tagged parse outcome, so unparseable responses stay visible to callers
/// instead of silently defaulting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CritiqueOutcome {
    Parsed(Critique),
    Unparseable { raw: String },
}

impl CritiqueOutcome {
    /// Applies the documented fallback policy for unparseable output.
    pub fn into_critique(self) -> Critique {
        match self {
            CritiqueOutcome::Parsed(c) => c,
            CritiqueOutcome::Unparseable { raw } => {
                warn!("Critique response was unparseable; using raw text as feedback");
                Critique {
                    feedback: vec![raw],
                    rating: NEUTRAL_RATING,
                    sample_answer: String::new(),
                }
            }
        }
    }
}

/// Parses a critique response. A response counts as parsed when it is a JSON
/// object carrying at least a `feedback` or `rating` field; anything else is
/// `Unparseable`.
pub fn parse_critique(raw: &str) -> CritiqueOutcome {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(_) => {
            return CritiqueOutcome::Unparseable {
                raw: raw.to_string(),
            }
        }
    };

    let Some(obj) = value.as_object() else {
        return CritiqueOutcome::Unparseable {
            raw: raw.to_string(),
        };
    };

    if !obj.contains_key("feedback") && !obj.contains_key("rating") {
        return CritiqueOutcome::Unparseable {
            raw: raw.to_string(),
        };
    }

    let feedback = parse_feedback(obj.get("feedback"));
    let rating = clamp_rating(parse_raw_rating(obj.get("rating")));
    let sample_answer = obj
        .get("sample_answer")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    CritiqueOutcome::Parsed(Critique {
        feedback,
        rating,
        sample_answer,
    })
}

/// Accepts a list of strings or a single string.
fn parse_feedback(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Accepts an integer, a float, or a numeric string.
fn parse_raw_rating(value: Option<&Value>) -> Option<i64> {
    match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Clamps a raw rating into `[1, 5]`. A missing rating becomes the neutral
/// midpoint. Anomalies are logged, never fatal.
pub fn clamp_rating(raw: Option<i64>) -> u8 {
    match raw {
        Some(r) if (MIN_RATING as i64..=MAX_RATING as i64).contains(&r) => r as u8,
        Some(r) => {
            let clamped = r.clamp(MIN_RATING as i64, MAX_RATING as i64) as u8;
            warn!("Model rating {r} out of range; clamped to {clamped}");
            clamped
        }
        None => {
            warn!("Model omitted the rating; defaulting to {NEUTRAL_RATING}");
            NEUTRAL_RATING
        }
    }
}

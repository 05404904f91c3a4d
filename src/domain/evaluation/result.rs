//! Evaluation verdict value object

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::completion::{parse_object, MalformedReply};
use crate::domain::topic::clamp_percent;

/// Sentinel the evaluator uses instead of a follow-up question
pub const MASTERED_SENTINEL: &str = "MASTERED";

/// What the tutor wants the student to do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Followup {
    /// Question, clarification request, or hint plus re-explain request
    Prompt(String),
    /// The topic needs no further questioning
    Mastered,
}

impl Followup {
    fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(MASTERED_SENTINEL) {
            Self::Mastered
        } else {
            Self::Prompt(trimmed.to_string())
        }
    }

    pub fn is_mastered(&self) -> bool {
        matches!(self, Self::Mastered)
    }
}

impl fmt::Display for Followup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prompt(text) => f.write_str(text),
            Self::Mastered => f.write_str(MASTERED_SENTINEL),
        }
    }
}

/// Parsed verdict for one explanation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationResult {
    /// Clamped into [0, 100]
    pub score: u8,
    pub feedback: String,
    pub followup: Followup,
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    score: Value,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    followup: String,
}

impl EvaluationResult {
    /// Recover a verdict from a free-text completion reply
    pub fn from_reply(raw: &str) -> Result<Self, MalformedReply> {
        let verdict: RawVerdict = parse_object(raw)?;
        let score = score_value(&verdict.score).ok_or_else(|| MalformedReply {
            expected: "object",
            raw: raw.to_string(),
        })?;

        Ok(Self {
            score: clamp_percent(score),
            feedback: verdict.feedback.trim().to_string(),
            followup: Followup::parse(&verdict.followup),
        })
    }
}

/// Accept integers, floats (rounded) and numeric strings
fn score_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim().trim_end_matches('%').trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.round() as i64))
        }
        _ => None,
    }
}

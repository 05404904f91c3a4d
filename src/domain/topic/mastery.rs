//! Mastery value object and merge policy

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::InvalidOptionError;

/// Highest representable mastery / score
pub const MAX_PERCENT: u8 = 100;

/// Clamp an arbitrary upstream number into [0, 100]
pub fn clamp_percent(raw: i64) -> u8 {
    raw.clamp(0, MAX_PERCENT as i64) as u8
}

/// Demonstrated understanding of a topic, always within [0, 100].
/// Out-of-range values are clamped on construction and on deserialization.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "i64", into = "u8")]
pub struct Mastery(u8);

impl Mastery {
    pub const ZERO: Self = Self(0);

    /// Build from any integer, clamping into range
    pub fn clamped(raw: i64) -> Self {
        Self(clamp_percent(raw))
    }

    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Presentation band for this mastery
    pub const fn band(&self) -> MasteryBand {
        if self.0 > 85 {
            MasteryBand::Strong
        } else if self.0 > 60 {
            MasteryBand::Developing
        } else {
            MasteryBand::Weak
        }
    }
}

impl From<i64> for Mastery {
    fn from(raw: i64) -> Self {
        Self::clamped(raw)
    }
}

impl From<Mastery> for u8 {
    fn from(m: Mastery) -> Self {
        m.0
    }
}

impl fmt::Display for Mastery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Coarse mastery bands used when rendering progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasteryBand {
    /// 60 or below
    Weak,
    /// 61 to 85
    Developing,
    /// Above 85
    Strong,
}

/// How a new evaluation score combines with the mastery already recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MasteryPolicy {
    /// Keep the best score ever reached; mastery never decreases
    #[default]
    KeepHighest,
    /// Replace mastery with the latest score
    Overwrite,
}

impl MasteryPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::KeepHighest => "highest",
            Self::Overwrite => "overwrite",
        }
    }

    /// Combine the current mastery with a (clamped) score
    pub fn merge(&self, current: Mastery, score: u8) -> Mastery {
        let score = Mastery::clamped(score as i64);
        match self {
            Self::KeepHighest => current.max(score),
            Self::Overwrite => score,
        }
    }
}

impl FromStr for MasteryPolicy {
    type Err = InvalidOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "highest" | "max" => Ok(Self::KeepHighest),
            "overwrite" | "latest" => Ok(Self::Overwrite),
            _ => Err(InvalidOptionError {
                option: "mastery policy",
                input: s.to_string(),
                valid: "highest, overwrite",
            }),
        }
    }
}

impl fmt::Display for MasteryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

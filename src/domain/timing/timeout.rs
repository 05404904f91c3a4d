//! Timeout value object for outstanding collaborator calls

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::TimeoutParseError;

/// Default bound on a single remote call (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// How long a single call to a remote collaborator may stay outstanding.
/// Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timeout {
    millis: u64,
}

impl Timeout {
    /// Create a timeout from milliseconds
    pub const fn from_millis(ms: u64) -> Self {
        Self { millis: ms }
    }

    /// Create a timeout from seconds
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            millis: secs * 1000,
        }
    }

    pub const fn as_secs(&self) -> u64 {
        self.millis / 1000
    }

    pub const fn as_millis(&self) -> u64 {
        self.millis
    }

    /// Convert to std::time::Duration
    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.millis)
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Self::from_secs(DEFAULT_TIMEOUT_SECS)
    }
}

impl FromStr for Timeout {
    type Err = TimeoutParseError;

    /// Accepts "30s", "2m", "2m30s" (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TimeoutParseError {
            input: s.to_string(),
        };
        let input = s.trim().to_ascii_lowercase();

        let (minutes, rest) = match input.split_once('m') {
            Some((m, rest)) => (Some(m), rest),
            None => (None, input.as_str()),
        };
        let seconds = if rest.is_empty() {
            None
        } else {
            Some(rest.strip_suffix('s').ok_or_else(err)?)
        };

        if minutes.is_none() && seconds.is_none() {
            return Err(err());
        }

        let parse_part = |part: Option<&str>| -> Result<u64, TimeoutParseError> {
            match part {
                None => Ok(0),
                Some(p) if !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()) => {
                    p.parse().map_err(|_| err())
                }
                Some(_) => Err(err()),
            }
        };

        let mins = parse_part(minutes)?;
        let secs = parse_part(seconds)?;
        let total_secs = mins
            .checked_mul(60)
            .and_then(|m| m.checked_add(secs))
            .ok_or_else(err)?;

        if total_secs == 0 {
            return Err(err());
        }

        Ok(Self::from_secs(total_secs))
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.as_secs();
        match (secs / 60, secs % 60) {
            (0, s) => write!(f, "{}s", s),
            (m, 0) => write!(f, "{}m", m),
            (m, s) => write!(f, "{}m{}s", m, s),
        }
    }
}

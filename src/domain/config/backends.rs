//! Adapter selection options

use std::fmt;
use std::str::FromStr;

use crate::domain::error::InvalidOptionError;

/// Which collaborator turns PDF bytes into text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PdfReaderKind {
    /// The companion server's parse-pdf endpoint
    #[default]
    Server,
    /// The completion service, sent the PDF as a document block
    Completion,
}

impl PdfReaderKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Completion => "completion",
        }
    }
}

impl FromStr for PdfReaderKind {
    type Err = InvalidOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "server" => Ok(Self::Server),
            "completion" => Ok(Self::Completion),
            _ => Err(InvalidOptionError {
                option: "pdf reader",
                input: s.to_string(),
                valid: "server, completion",
            }),
        }
    }
}

impl fmt::Display for PdfReaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where topic sets are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StoreKind {
    /// JSON files under the user data directory
    #[default]
    File,
    /// The companion server's topics endpoint
    Http,
}

impl StoreKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Http => "http",
        }
    }
}

impl FromStr for StoreKind {
    type Err = InvalidOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "http" | "server" => Ok(Self::Http),
            _ => Err(InvalidOptionError {
                option: "store",
                input: s.to_string(),
                valid: "file, http",
            }),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

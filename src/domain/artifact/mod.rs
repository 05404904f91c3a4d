//! Artifact domain module

mod media;
mod extracted_text;

pub use media::{Artifact, MediaKind, UNKNOWN_MEDIA_TYPE};
pub use extracted_text::{char_prefix, ExtractedText, EVALUATION_PREFIX_CHARS, TOPIC_PREFIX_CHARS};

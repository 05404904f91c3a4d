//! Transcript value object

/// Ordered, append-only sequence of finalized segments.
/// Rendered with single-space separators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    segments: Vec<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finalized segment. Blank segments are ignored.
    pub fn push(&mut self, segment: &str) {
        let segment = segment.trim();
        if !segment.is_empty() {
            self.segments.push(segment.to_string());
        }
    }

    /// The whole transcript, segments joined by single spaces
    pub fn text(&self) -> String {
        self.segments.join(" ")
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True when there is nothing worth submitting
    pub fn is_blank(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }
}

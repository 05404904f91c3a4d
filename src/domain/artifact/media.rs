//! Uploaded artifact value object

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::domain::error::UnsupportedMediaType;

/// Media type declared for files whose extension is not recognised
pub const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// Media kinds the extractor knows how to turn into text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    PlainText,
    Pdf,
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl MediaKind {
    /// Get the MIME type string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PlainText => "text/plain",
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }

    pub const fn is_image(&self) -> bool {
        matches!(self, Self::Png | Self::Jpeg | Self::Gif | Self::Webp)
    }

    /// Map a file extension to a media kind (case-insensitive, no dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" => Some(Self::PlainText),
            "pdf" => Some(Self::Pdf),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

impl FromStr for MediaKind {
    type Err = UnsupportedMediaType;

    /// Parse a declared media type. Parameters such as `; charset=utf-8` are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let essence = s.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "text/plain" => Ok(Self::PlainText),
            "application/pdf" => Ok(Self::Pdf),
            "image/png" => Ok(Self::Png),
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/gif" => Ok(Self::Gif),
            "image/webp" => Ok(Self::Webp),
            _ => Err(UnsupportedMediaType {
                media_type: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw bytes of an uploaded file plus the media type it was declared with.
/// Lives only for the duration of an extraction.
#[derive(Debug, Clone)]
pub struct Artifact {
    data: Vec<u8>,
    media_type: String,
}

impl Artifact {
    /// Create an artifact with a declared media type
    pub fn new(data: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            data,
            media_type: media_type.into(),
        }
    }

    /// Create a plain-text artifact
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(text.into().into_bytes(), MediaKind::PlainText.as_str())
    }

    /// Create an artifact whose media type is inferred from the file extension.
    /// Unknown extensions are declared as `application/octet-stream`.
    pub fn from_path_bytes(path: &Path, data: Vec<u8>) -> Self {
        let media_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(MediaKind::from_extension)
            .map(|k| k.as_str())
            .unwrap_or(UNKNOWN_MEDIA_TYPE);
        Self::new(data, media_type)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The media type exactly as declared
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Resolve the declared media type to a supported kind
    pub fn kind(&self) -> Result<MediaKind, UnsupportedMediaType> {
        self.media_type.parse()
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Encode the bytes as standard base64
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_supported_kinds() {
        assert_eq!("text/plain".parse::<MediaKind>().unwrap(), MediaKind::PlainText);
        assert_eq!("application/pdf".parse::<MediaKind>().unwrap(), MediaKind::Pdf);
        assert_eq!("image/png".parse::<MediaKind>().unwrap(), MediaKind::Png);
        assert_eq!("image/jpeg".parse::<MediaKind>().unwrap(), MediaKind::Jpeg);
        assert_eq!("image/gif".parse::<MediaKind>().unwrap(), MediaKind::Gif);
        assert_eq!("image/webp".parse::<MediaKind>().unwrap(), MediaKind::Webp);
    }

    #[test]
    fn parse_ignores_parameters_and_case() {
        assert_eq!(
            "Text/Plain; charset=utf-8".parse::<MediaKind>().unwrap(),
            MediaKind::PlainText
        );
    }

    #[test]
    fn parse_rejects_other_kinds() {
        let err = "audio/ogg".parse::<MediaKind>().unwrap_err();
        assert_eq!(err.media_type, "audio/ogg");
        assert!("image/svg+xml".parse::<MediaKind>().is_err());
        assert!("".parse::<MediaKind>().is_err());
    }

    #[test]
    fn image_kinds() {
        assert!(MediaKind::Png.is_image());
        assert!(MediaKind::Webp.is_image());
        assert!(!MediaKind::Pdf.is_image());
        assert!(!MediaKind::PlainText.is_image());
    }

    #[test]
    fn infer_from_path() {
        let a = Artifact::from_path_bytes(Path::new("notes/Chapter1.PDF"), vec![1]);
        assert_eq!(a.media_type(), "application/pdf");

        let b = Artifact::from_path_bytes(Path::new("scan.jpg"), vec![1]);
        assert_eq!(b.kind().unwrap(), MediaKind::Jpeg);

        let c = Artifact::from_path_bytes(Path::new("song.mp3"), vec![1]);
        assert_eq!(c.media_type(), UNKNOWN_MEDIA_TYPE);
        assert!(c.kind().is_err());
    }

    #[test]
    fn text_artifact() {
        let a = Artifact::text("hello");
        assert_eq!(a.kind().unwrap(), MediaKind::PlainText);
        assert_eq!(a.data(), b"hello");
        assert_eq!(a.size_bytes(), 5);
    }

    #[test]
    fn base64_encoding() {
        use base64::Engine;
        let a = Artifact::new(vec![1, 2, 3, 4], "application/pdf");
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(a.to_base64())
            .unwrap();
        assert_eq!(decoded, vec![1, 2, 3, 4]);
    }
}

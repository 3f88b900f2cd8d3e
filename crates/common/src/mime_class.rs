use serde::{Deserialize, Serialize};

/// Coarse preview classification of a file, derived from its original
/// filename's extension.
///
/// This is a rendering hint for the view-only path, never a security
/// boundary: a misclassified file is still decrypted safely and simply
/// fails to render. Caller-supplied MIME headers are never consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MimeClass {
    Image,
    Pdf,
    Video,
    Unsupported,
}

impl MimeClass {
    /// Classify a file by its original filename's extension
    pub fn classify(filename: &str) -> Self {
        let mime = mime_guess::from_path(filename).first_or_octet_stream();
        if mime.type_() == mime::IMAGE {
            MimeClass::Image
        } else if mime.type_() == mime::APPLICATION && mime.subtype() == mime::PDF {
            MimeClass::Pdf
        } else if mime.type_() == mime::VIDEO {
            MimeClass::Video
        } else {
            MimeClass::Unsupported
        }
    }

    /// Whether an inline preview can be rendered for this class
    pub fn previewable(&self) -> bool {
        !matches!(self, MimeClass::Unsupported)
    }
}

impl std::fmt::Display for MimeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MimeClass::Image => write!(f, "image"),
            MimeClass::Pdf => write!(f, "pdf"),
            MimeClass::Video => write!(f, "video"),
            MimeClass::Unsupported => write!(f, "unsupported"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_common_extensions() {
        let cases = vec![
            ("photo.png", MimeClass::Image),
            ("photo.JPG", MimeClass::Image),
            ("scan.gif", MimeClass::Image),
            ("report.pdf", MimeClass::Pdf),
            ("clip.mp4", MimeClass::Video),
            ("clip.webm", MimeClass::Video),
            ("archive.zip", MimeClass::Unsupported),
            ("notes.txt", MimeClass::Unsupported),
            ("no_extension", MimeClass::Unsupported),
        ];

        for (filename, expected) in cases {
            assert_eq!(MimeClass::classify(filename), expected, "{}", filename);
        }
    }

    #[test]
    fn test_previewable() {
        assert!(MimeClass::Image.previewable());
        assert!(MimeClass::Pdf.previewable());
        assert!(MimeClass::Video.previewable());
        assert!(!MimeClass::Unsupported.previewable());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&MimeClass::Pdf).unwrap();
        assert_eq!(json, r#""pdf""#);
        let back: MimeClass = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MimeClass::Pdf);
    }
}

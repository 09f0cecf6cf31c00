//! Content-kind dispatch by file extension.

/// The closed set of content families this worker extracts from.
///
/// Dispatch is a total function over this enum; adding a family means adding
/// a variant and the compiler walks you through every match site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Image,
    Audio,
    Video,
    Pdf,
    Text,
}

const IMAGE_EXTENSIONS: [&str; 4] = [".png", ".jpg", ".jpeg", ".gif"];
const AUDIO_EXTENSIONS: [&str; 3] = [".mp3", ".wav", ".m4a"];
const VIDEO_EXTENSIONS: [&str; 2] = [".mp4", ".mov"];
const PDF_EXTENSIONS: [&str; 1] = [".pdf"];
const TEXT_EXTENSIONS: [&str; 1] = [".txt"];

impl ContentKind {
    /// Map a lowercased dotted extension to its content family.
    ///
    /// `None` means the extension is unsupported and the job is skipped.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(ContentKind::Image)
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            Some(ContentKind::Audio)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(ContentKind::Video)
        } else if PDF_EXTENSIONS.contains(&ext.as_str()) {
            Some(ContentKind::Pdf)
        } else if TEXT_EXTENSIONS.contains(&ext.as_str()) {
            Some(ContentKind::Text)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Image => "image",
            ContentKind::Audio => "audio",
            ContentKind::Video => "video",
            ContentKind::Pdf => "pdf",
            ContentKind::Text => "text",
        }
    }
}

/// MIME type for an image extension, for the captioning backend.
pub fn image_mime_type(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        ".png" => "image/png",
        ".gif" => "image/gif",
        _ => "image/jpeg",
    }
}

/// Every extension this worker advertises on registration.
pub fn supported_extensions() -> Vec<String> {
    IMAGE_EXTENSIONS
        .iter()
        .chain(AUDIO_EXTENSIONS.iter())
        .chain(VIDEO_EXTENSIONS.iter())
        .chain(PDF_EXTENSIONS.iter())
        .chain(TEXT_EXTENSIONS.iter())
        .map(|s| s.to_string())
        .collect()
}

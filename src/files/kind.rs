//! File kind classification.
//!
//! # Responsibilities
//! - Classify by filename extension (fixed allow-list)
//! - Sniff a MIME type from the leading bytes
//! - Pick the Content-Type sent to storage for the file part
//!
//! # Design Decisions
//! - Extension wins over sniffing; SVG cannot be sniffed reliably
//! - Short files are sniffed on whatever bytes exist; never an error
//! - Unknown is a normal outcome, not an error, at this layer

use std::path::Path;

/// Bytes inspected when sniffing content.
pub const SNIFF_LEN: usize = 512;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Extension → Content-Type, for every extension with a known kind.
const EXTENSION_CONTENT_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("bmp", "image/bmp"),
    ("ico", "image/x-icon"),
    ("tiff", "image/tiff"),
    ("tif", "image/tiff"),
    ("pdf", "application/pdf"),
];

const IMAGE_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    "image/tiff",
    "image/bmp",
    "image/x-icon",
    "image/vnd.microsoft.icon",
];

/// Category a file is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Image,
    Document,
    Unknown,
}

impl FileKind {
    /// Value of the `Kindfile` form field. Unknown is sent as an empty string.
    pub fn kindfile(&self) -> &'static str {
        match self {
            FileKind::Image => "Images",
            FileKind::Document => "Documents",
            FileKind::Unknown => "",
        }
    }
}

/// Result of classifying one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: FileKind,
    pub content_type: &'static str,
}

/// Lower-cased extension of `filename`, without the dot.
pub fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Content-Type registered for the filename's extension.
pub fn content_type_for_extension(filename: &str) -> Option<&'static str> {
    let ext = extension(filename)?;
    EXTENSION_CONTENT_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, ct)| *ct)
}

pub fn classify_by_extension(filename: &str) -> FileKind {
    content_type_for_extension(filename)
        .map(kind_for_mime)
        .unwrap_or(FileKind::Unknown)
}

pub fn is_image_extension(filename: &str) -> bool {
    classify_by_extension(filename) == FileKind::Image
}

/// MIME type detected from the first [`SNIFF_LEN`] bytes, if recognizable.
pub fn sniff_mime(content: &[u8]) -> Option<&'static str> {
    let head = &content[..content.len().min(SNIFF_LEN)];
    infer::get(head).map(|t| t.mime_type())
}

pub fn kind_for_mime(mime: &str) -> FileKind {
    if IMAGE_MIME_TYPES.iter().any(|m| *m == mime) {
        FileKind::Image
    } else if mime == "application/pdf" {
        FileKind::Document
    } else {
        FileKind::Unknown
    }
}

/// Classify an upload: extension first, then sniffed content.
pub fn classify(filename: &str, content: &[u8]) -> Classification {
    let sniffed = sniff_mime(content);
    let by_extension = classify_by_extension(filename);

    let kind = match by_extension {
        FileKind::Unknown => sniffed.map(kind_for_mime).unwrap_or(FileKind::Unknown),
        known => known,
    };
    let content_type = content_type_for_extension(filename)
        .or(sniffed)
        .unwrap_or(OCTET_STREAM);

    Classification { kind, content_type }
}

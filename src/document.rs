//! The input document type (spec §3, "Document").

use crate::prelude::*;

/// A document type we know how to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// A paper check.
    Check,
    /// A retail receipt.
    Receipt,
}

impl DocumentKind {
    /// Parse a document kind from the `type` query parameter used by
    /// `POST /process` (spec §6).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "check" => Some(DocumentKind::Check),
            "receipt" => Some(DocumentKind::Receipt),
            _ => None,
        }
    }

    /// The name used in the `documentType` response field.
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Check => "check",
            DocumentKind::Receipt => "receipt",
        }
    }
}

/// The media type of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    /// A still image (JPEG, PNG, HEIC, ...).
    Image,
    /// A PDF document.
    Pdf,
}

impl MediaType {
    /// Sniff the media type from the document's magic bytes.
    ///
    /// Returns `None` if the bytes don't match a type we support.
    pub fn sniff(content: &[u8]) -> Option<Self> {
        let kind = infer::get(content)?;
        match kind.mime_type() {
            "application/pdf" => Some(MediaType::Pdf),
            mime if mime.starts_with("image/") => Some(MediaType::Image),
            _ => None,
        }
    }

    /// The MIME type to embed in a `data:` URL for this document.
    pub fn mime_type(self, content: &[u8]) -> &'static str {
        match self {
            MediaType::Pdf => "application/pdf",
            MediaType::Image => infer::get(content)
                .map(|kind| kind.mime_type())
                .unwrap_or("image/jpeg"),
        }
    }
}

/// A document submitted for scanning.
#[derive(Debug, Clone)]
pub struct Document {
    /// The raw bytes of the document.
    pub content: Vec<u8>,
    /// The document's media type.
    pub media_type: MediaType,
    /// An optional display name (e.g. an uploaded filename).
    pub name: Option<String>,
}

impl Document {
    /// Construct and validate a [`Document`] from raw bytes.
    ///
    /// This is the "validate input" step of spec §4.1, step 1: content
    /// must be non-empty, the sniffed type must be supported, and the
    /// size must be within `max_bytes`.
    pub fn from_bytes(content: Vec<u8>, max_bytes: usize) -> Result<Self> {
        if content.is_empty() {
            return Err(ScanError::Validation("document body is empty".into()));
        }
        if content.len() > max_bytes {
            return Err(ScanError::Validation(format!(
                "document is {} bytes, which exceeds the {max_bytes}-byte limit",
                content.len()
            )));
        }
        let media_type = MediaType::sniff(&content).ok_or_else(|| {
            ScanError::Validation(
                "unsupported document type; expected image/jpeg, image/png, image/heic, or application/pdf".into(),
            )
        })?;
        Ok(Self {
            content,
            media_type,
            name: None,
        })
    }

    /// Render this document as a `data:` URL, suitable for passing to a
    /// vision model.
    pub fn to_data_url(&self) -> String {
        crate::data_url::data_url(self.media_type.mime_type(&self.content), &self.content)
    }
}

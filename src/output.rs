//! Response types produced by the conversion and health endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// MIME type of every page image this service emits.
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// One rendered page, JPEG-encoded and base64-wrapped for JSON transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageImage {
    /// `<base>_page_<n>.jpg`, `n` starting at 1.
    pub filename: String,
    /// Always [`JPEG_CONTENT_TYPE`].
    pub content_type: String,
    /// Standard base64 of the JPEG bytes.
    pub data: String,
}

/// JSON variant: every page in physical page order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertedImages {
    pub images: Vec<PageImage>,
    pub total_pages: usize,
}

/// File variant: the first page as raw JPEG bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpegFile {
    /// Suggested download name, `<base>.jpg`.
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl JpegFile {
    /// Value for the `Content-Disposition` response header.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename={}", self.filename)
    }
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionResult {
    Images(ConvertedImages),
    File(JpegFile),
}

/// Body of every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// `GET /health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
        }
    }
}

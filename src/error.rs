//! Error types for the dispenser service.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`DispenserError`]: **Fatal**, the service cannot start or keep
//!   serving (bad configuration, pdfium missing, socket bind failure).
//!   Returned as `Err(DispenserError)` from [`crate::api::serve`] and the
//!   config builder.
//!
//! * [`ConvertError`]: **per request**, one upload could not be converted.
//!   It never takes the process down; the HTTP layer renders it as an
//!   `{"error": "<message>"}` body with a matching status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

use crate::output::ErrorBody;

/// Fatal errors raised while configuring or running the server.
#[derive(Debug, Error)]
pub enum DispenserError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library{}: {reason}\n\n\
Set PDFIUM_LIB_PATH to the pdfium shared library (or the directory holding it),\n\
or install libpdfium where the system loader can find it.\n",
        location(.path)
    )]
    PdfiumBindingFailed {
        path: Option<PathBuf>,
        reason: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// The listening socket could not be opened.
    #[error("Failed to bind {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The server loop stopped with an I/O error.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// A failure converting a single upload.
///
/// `Display` is the exact message sent to the client in the `error` field.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConvertError {
    /// `Authorization` header absent or not equal to the configured key.
    #[error("Invalid authorization key")]
    Unauthorized,

    /// The multipart body carried no `file` field.
    #[error("No file provided in upload (expected multipart field 'file')")]
    MissingFile,

    /// The multipart body could not be read.
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// The query string could not be parsed.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The upload does not start with a PDF header.
    #[error("File is not a valid PDF (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    /// pdfium could not load or render the document.
    #[error("{0}")]
    Rasterisation(String),

    /// The document produced no pages.
    #[error("PDF conversion failed")]
    EmptyDocument,

    /// A rendered page could not be encoded as JPEG.
    #[error("Image encoding failed: {0}")]
    Encoding(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn location(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" at '{}'", p.display()))
        .unwrap_or_default()
}

impl ConvertError {
    /// HTTP status used when this error is returned to a client.
    pub fn status(&self) -> StatusCode {
        match self {
            ConvertError::Unauthorized => StatusCode::UNAUTHORIZED,
            ConvertError::MissingFile
            | ConvertError::InvalidUpload(_)
            | ConvertError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ConvertError::NotAPdf { .. }
            | ConvertError::Rasterisation(_)
            | ConvertError::EmptyDocument => StatusCode::UNPROCESSABLE_ENTITY,
            ConvertError::Encoding(_) | ConvertError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<image::ImageError> for ConvertError {
    fn from(err: image::ImageError) -> Self {
        ConvertError::Encoding(err.to_string())
    }
}

impl IntoResponse for ConvertError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

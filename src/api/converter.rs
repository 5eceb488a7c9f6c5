//! `POST /converter/pdf-to-jpg`
//!
//! ```bash
//! curl -X POST "http://localhost:8000/converter/pdf-to-jpg?format=json" \
//!     -H "Authorization: $CONVERTER_KEY" \
//!     -F "file=@document.pdf"
//! ```
//!
//! The key is checked before the multipart body is read, so an
//! unauthorised client gets `{"error": "Invalid authorization key"}` no
//! matter what it uploaded.

use super::AppState;
use crate::config::OutputFormat;
use crate::convert::{UploadRequest, UploadedFile};
use crate::error::ConvertError;
use crate::output::{ConversionResult, JPEG_CONTENT_TYPE};
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

/// Name of the multipart field carrying the PDF.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Default, Deserialize)]
pub struct ConvertParams {
    pub format: Option<OutputFormat>,
}

pub async fn pdf_to_jpg(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<ConvertParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ConvertError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.handler.authorize(authorization.as_deref())?;

    let Query(params) = params.map_err(|e| ConvertError::InvalidQuery(e.body_text()))?;
    let multipart = multipart.map_err(|e| ConvertError::InvalidUpload(e.body_text()))?;
    let file = read_file_field(multipart).await?;

    let request = UploadRequest {
        authorization,
        file,
    };

    match state.handler.convert(request, params.format).await? {
        ConversionResult::Images(images) => Ok((StatusCode::OK, Json(images)).into_response()),
        ConversionResult::File(file) => {
            let disposition = HeaderValue::try_from(file.content_disposition()).map_err(|e| {
                ConvertError::Internal(format!("Invalid download file name: {}", e))
            })?;
            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, HeaderValue::from_static(JPEG_CONTENT_TYPE)),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                file.bytes,
            )
                .into_response())
        }
    }
}

/// Pull the `file` field out of the multipart body, skipping anything else.
async fn read_file_field(mut multipart: Multipart) -> Result<UploadedFile, ConvertError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ConvertError::InvalidUpload(format!("Failed to read multipart field: {e}")))?
    {
        if field.name() == Some(FILE_FIELD) {
            let name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ConvertError::InvalidUpload(format!("Failed to read file data: {e}")))?;
            return Ok(UploadedFile { name, bytes });
        }
    }
    Err(ConvertError::MissingFile)
}

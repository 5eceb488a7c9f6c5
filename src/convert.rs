//! The conversion entry point: authorise, rasterise, encode.
//!
//! [`ConversionHandler`] owns everything a request needs that outlives the
//! request itself (the shared key, the rasterizer, the JPEG quality). It is
//! built once at startup and shared behind an `Arc`.

use crate::config::{OutputFormat, ServerConfig};
use crate::error::ConvertError;
use crate::output::{ConversionResult, ConvertedImages, JpegFile};
use crate::pipeline::{encode, Rasterizer};
use axum::body::Bytes;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Base name used when an upload carries no usable file name.
const FALLBACK_BASE_NAME: &str = "document";

/// A file received from the client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied file name, e.g. `report.pdf`.
    pub name: String,
    pub bytes: Bytes,
}

/// Everything the handler needs from one HTTP request.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Raw `Authorization` header value, if the client sent one.
    pub authorization: Option<String>,
    pub file: UploadedFile,
}

/// Strip directories and the last extension: `dir/report.v2.pdf` → `report.v2`.
pub fn base_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_BASE_NAME.to_string())
}

/// `<base>_page_<n>.jpg`
pub fn page_file_name(base: &str, page_num: usize) -> String {
    format!("{}_page_{}.jpg", base, page_num)
}

/// Converts authorised PDF uploads into JPEG pages.
pub struct ConversionHandler {
    converter_key: String,
    rasterizer: Arc<dyn Rasterizer>,
    jpeg_quality: u8,
    default_format: OutputFormat,
}

impl ConversionHandler {
    pub fn new(
        converter_key: impl Into<String>,
        rasterizer: Arc<dyn Rasterizer>,
        jpeg_quality: u8,
    ) -> Self {
        Self {
            converter_key: converter_key.into(),
            rasterizer,
            jpeg_quality: jpeg_quality.clamp(1, 100),
            default_format: OutputFormat::default(),
        }
    }

    pub fn from_config(config: &ServerConfig, rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self::new(config.converter_key.clone(), rasterizer, config.jpeg_quality)
            .with_default_format(config.default_format)
    }

    pub fn with_default_format(mut self, format: OutputFormat) -> Self {
        self.default_format = format;
        self
    }

    pub fn default_format(&self) -> OutputFormat {
        self.default_format
    }

    /// Exact match against the configured key; an absent header never matches.
    pub fn authorize(&self, authorization: Option<&str>) -> Result<(), ConvertError> {
        match authorization {
            Some(value) if value == self.converter_key => Ok(()),
            _ => {
                warn!("Rejected conversion request: invalid authorization key");
                Err(ConvertError::Unauthorized)
            }
        }
    }

    /// Run a full conversion.
    ///
    /// `format` picks the response variant; `None` falls back to the
    /// configured default. All-or-nothing: any failing page fails the call.
    pub async fn convert(
        &self,
        request: UploadRequest,
        format: Option<OutputFormat>,
    ) -> Result<ConversionResult, ConvertError> {
        self.authorize(request.authorization.as_deref())?;

        let start = Instant::now();
        let format = format.unwrap_or(self.default_format);
        let base = base_name(&request.file.name);
        info!(
            "Converting '{}' ({} bytes, format={})",
            request.file.name,
            request.file.bytes.len(),
            format
        );

        let max_pages = match format {
            OutputFormat::Json => None,
            OutputFormat::File => Some(1),
        };

        let rasterizer = Arc::clone(&self.rasterizer);
        let quality = self.jpeg_quality;
        let bytes = request.file.bytes;

        let pages = tokio::task::spawn_blocking(move || -> Result<Vec<Vec<u8>>, ConvertError> {
            let images = rasterizer.rasterize(&bytes, max_pages)?;
            images
                .iter()
                .map(|img| encode::encode_jpeg(img, quality).map_err(ConvertError::from))
                .collect()
        })
        .await
        .map_err(|e| ConvertError::Internal(format!("Render task panicked: {}", e)))??;

        let result = match format {
            OutputFormat::Json => {
                let images: Vec<_> = pages
                    .iter()
                    .enumerate()
                    .map(|(i, jpeg)| encode::to_page_image(page_file_name(&base, i + 1), jpeg))
                    .collect();
                ConversionResult::Images(ConvertedImages {
                    total_pages: images.len(),
                    images,
                })
            }
            OutputFormat::File => {
                let bytes = pages.into_iter().next().ok_or(ConvertError::EmptyDocument)?;
                ConversionResult::File(JpegFile {
                    filename: format!("{}.jpg", base),
                    bytes,
                })
            }
        };

        info!(
            "Converted '{}' in {}ms",
            request.file.name,
            start.elapsed().as_millis()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::MockRasterizer;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    const KEY: &str = "test-key";

    fn handler(rasterizer: MockRasterizer) -> ConversionHandler {
        ConversionHandler::new(KEY, Arc::new(rasterizer), 75)
    }

    fn request(auth: Option<&str>, name: &str, bytes: &'static [u8]) -> UploadRequest {
        UploadRequest {
            authorization: auth.map(str::to_string),
            file: UploadedFile {
                name: name.to_string(),
                bytes: Bytes::from_static(bytes),
            },
        }
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("doc.pdf"), "doc");
        assert_eq!(base_name("report.v2.pdf"), "report.v2");
        assert_eq!(base_name("nested/dir/scan.PDF"), "scan");
        assert_eq!(base_name("README"), "README");
        assert_eq!(base_name(".hidden"), ".hidden");
        assert_eq!(base_name(""), "document");
    }

    #[test]
    fn test_page_file_name() {
        assert_eq!(page_file_name("doc", 1), "doc_page_1.jpg");
        assert_eq!(page_file_name("doc", 12), "doc_page_12.jpg");
    }

    #[test]
    fn authorize_requires_exact_match() {
        let h = handler(MockRasterizer::new(1));
        assert!(h.authorize(Some(KEY)).is_ok());
        assert_eq!(h.authorize(None), Err(ConvertError::Unauthorized));
        assert_eq!(h.authorize(Some("")), Err(ConvertError::Unauthorized));
        assert_eq!(
            h.authorize(Some("test-key ")),
            Err(ConvertError::Unauthorized)
        );
        assert_eq!(
            h.authorize(Some("Bearer test-key")),
            Err(ConvertError::Unauthorized)
        );
    }

    #[tokio::test]
    async fn wrong_key_short_circuits_rasterisation() {
        let mock = Arc::new(MockRasterizer::new(2));
        let h = ConversionHandler::new(KEY, mock.clone(), 75);
        let err = h
            .convert(request(Some("nope"), "doc.pdf", b"%PDF-1.7"), None)
            .await
            .unwrap_err();
        assert_eq!(err, ConvertError::Unauthorized);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn json_variant_lists_pages_in_order() {
        let h = handler(MockRasterizer::new(3));
        let result = h
            .convert(request(Some(KEY), "report.pdf", b"%PDF-1.7"), None)
            .await
            .unwrap();

        let ConversionResult::Images(out) = result else {
            panic!("expected JSON variant");
        };
        assert_eq!(out.total_pages, 3);
        let names: Vec<_> = out.images.iter().map(|p| p.filename.as_str()).collect();
        assert_eq!(
            names,
            ["report_page_1.jpg", "report_page_2.jpg", "report_page_3.jpg"]
        );

        for (i, page) in out.images.iter().enumerate() {
            assert_eq!(page.content_type, "image/jpeg");
            let jpeg = STANDARD.decode(&page.data).unwrap();
            let img = image::load_from_memory(&jpeg).unwrap().to_luma8();
            let expected = MockRasterizer::shade_of(i + 1) as i32;
            let actual = img.get_pixel(4, 4)[0] as i32;
            assert!((actual - expected).abs() <= 3, "page {}: {actual}", i + 1);
        }
    }

    #[tokio::test]
    async fn file_variant_renders_only_first_page() {
        let mock = Arc::new(MockRasterizer::new(4).with_size(20, 10));
        let h = ConversionHandler::new(KEY, mock.clone(), 75);
        let result = h
            .convert(
                request(Some(KEY), "doc.pdf", b"%PDF-1.7"),
                Some(OutputFormat::File),
            )
            .await
            .unwrap();

        let ConversionResult::File(file) = result else {
            panic!("expected file variant");
        };
        assert_eq!(file.filename, "doc.jpg");
        assert_eq!(file.content_disposition(), "attachment; filename=doc.jpg");
        let img = image::load_from_memory(&file.bytes).unwrap();
        assert_eq!((img.width(), img.height()), (20, 10));
        assert_eq!(mock.calls(), vec![Some(1)]);
    }

    #[tokio::test]
    async fn default_format_applies_when_unspecified() {
        let h = handler(MockRasterizer::new(2)).with_default_format(OutputFormat::File);
        let result = h
            .convert(request(Some(KEY), "a.pdf", b"%PDF-1.7"), None)
            .await
            .unwrap();
        assert!(matches!(result, ConversionResult::File(_)));
    }

    #[tokio::test]
    async fn file_variant_with_no_pages_fails() {
        let h = handler(MockRasterizer::new(0));
        let err = h
            .convert(
                request(Some(KEY), "empty.pdf", b"%PDF-1.7"),
                Some(OutputFormat::File),
            )
            .await
            .unwrap_err();
        assert_eq!(err, ConvertError::EmptyDocument);
        assert_eq!(err.to_string(), "PDF conversion failed");
    }

    #[tokio::test]
    async fn json_variant_with_no_pages_is_empty() {
        let h = handler(MockRasterizer::new(0));
        let result = h
            .convert(request(Some(KEY), "empty.pdf", b"%PDF-1.7"), None)
            .await
            .unwrap();
        assert_eq!(
            result,
            ConversionResult::Images(ConvertedImages {
                images: vec![],
                total_pages: 0
            })
        );
    }

    #[tokio::test]
    async fn non_pdf_is_rejected() {
        let h = handler(MockRasterizer::new(1));
        let err = h
            .convert(request(Some(KEY), "notes.txt", b"just some text"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::NotAPdf { .. }));
    }

    #[tokio::test]
    async fn rasteriser_failure_is_surfaced() {
        let h = handler(MockRasterizer::new(1).with_failure("FormatError"));
        let err = h
            .convert(request(Some(KEY), "broken.pdf", b"%PDF-1.7"), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "FormatError");
    }
}

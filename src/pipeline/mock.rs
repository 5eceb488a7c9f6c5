use super::render::{check_pdf_header, Rasterizer};
use crate::error::ConvertError;
use image::{DynamicImage, Rgba, RgbaImage};
use std::sync::{Arc, Mutex};

/// In-memory [`Rasterizer`] that never touches pdfium.
///
/// Produces `page_count` solid-colour pages of `width`×`height` pixels for
/// any input that passes the PDF header check. Page `n` is filled with
/// grey level `n * 10` so ordering can be asserted after JPEG round-trips.
pub struct MockRasterizer {
    page_count: usize,
    width: u32,
    height: u32,
    failure: Option<String>,
    calls: Arc<Mutex<Vec<Option<usize>>>>,
}

impl MockRasterizer {
    pub fn new(page_count: usize) -> Self {
        Self {
            page_count,
            width: 32,
            height: 48,
            failure: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Make every call fail with `message`, as pdfium does on corrupt input.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// The `max_pages` argument of every call so far.
    pub fn calls(&self) -> Vec<Option<usize>> {
        self.calls.lock().unwrap().clone()
    }

    /// Grey level used for page `page_num` (1-indexed).
    pub fn shade_of(page_num: usize) -> u8 {
        (page_num * 10).min(255) as u8
    }
}

impl Rasterizer for MockRasterizer {
    fn rasterize(
        &self,
        pdf: &[u8],
        max_pages: Option<usize>,
    ) -> Result<Vec<DynamicImage>, ConvertError> {
        self.calls.lock().unwrap().push(max_pages);
        check_pdf_header(pdf)?;
        if let Some(ref message) = self.failure {
            return Err(ConvertError::Rasterisation(message.clone()));
        }

        let wanted = max_pages.map_or(self.page_count, |m| m.min(self.page_count));
        Ok((1..=wanted)
            .map(|n| {
                let shade = Self::shade_of(n);
                DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                    self.width,
                    self.height,
                    Rgba([shade, shade, shade, 255]),
                ))
            })
            .collect())
    }
}

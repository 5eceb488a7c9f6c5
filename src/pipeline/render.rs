//! PDF rasterisation: render pages to `DynamicImage` via pdfium.
//!
//! ## Why blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. [`Rasterizer::rasterize`] is therefore a plain blocking call;
//! the handler runs it inside `tokio::task::spawn_blocking`.
//!
//! ## Why cap pixels as well as DPI?
//!
//! Page sizes vary wildly: an A0 poster at 200 DPI would produce a
//! 6,600 × 9,300 px image. `max_rendered_pixels` caps either edge
//! regardless of physical size, keeping memory bounded per request.

use crate::config::{PdfiumLibrary, ServerConfig};
use crate::error::{ConvertError, DispenserError};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info};

/// How far into the upload the `%PDF` header may appear.
const PDF_HEADER_WINDOW: usize = 1024;

/// Turns PDF bytes into one image per page, in physical page order.
pub trait Rasterizer: Send + Sync {
    /// Render at most `max_pages` pages (all pages when `None`).
    fn rasterize(
        &self,
        pdf: &[u8],
        max_pages: Option<usize>,
    ) -> Result<Vec<DynamicImage>, ConvertError>;
}

/// Reject uploads that carry no PDF header near the start of the file.
pub fn check_pdf_header(bytes: &[u8]) -> Result<(), ConvertError> {
    let window = &bytes[..bytes.len().min(PDF_HEADER_WINDOW)];
    if window.windows(4).any(|w| w == b"%PDF") {
        Ok(())
    } else {
        Err(ConvertError::NotAPdf {
            magic: bytes.iter().take(4).copied().collect(),
        })
    }
}

/// [`Rasterizer`] backed by the pdfium shared library.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    library: PdfiumLibrary,
    dpi: u32,
    max_pixels: u32,
}

impl PdfiumRasterizer {
    pub fn new(library: PdfiumLibrary, dpi: u32, max_pixels: u32) -> Self {
        Self {
            library,
            dpi,
            max_pixels,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            config.pdfium_library.clone(),
            config.dpi,
            config.max_rendered_pixels,
        )
    }

    /// Bind to pdfium once so a missing library fails at startup.
    pub fn probe(&self) -> Result<(), DispenserError> {
        self.bind()?;
        info!("pdfium bound ({})", self.describe_library());
        Ok(())
    }

    fn library_path(&self) -> Option<PathBuf> {
        match &self.library {
            PdfiumLibrary::System => None,
            PdfiumLibrary::File(path) => Some(path.clone()),
            PdfiumLibrary::Directory(dir) => Some(Pdfium::pdfium_platform_library_name_at_path(dir)),
        }
    }

    fn describe_library(&self) -> String {
        self.library_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "system library".to_string())
    }

    fn bind(&self) -> Result<Pdfium, DispenserError> {
        let path = self.library_path();
        let bindings = match &path {
            Some(p) => Pdfium::bind_to_library(p),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| DispenserError::PdfiumBindingFailed {
            path,
            reason: e.to_string(),
        })?;
        Ok(Pdfium::new(bindings))
    }

    fn render_config(&self) -> PdfRenderConfig {
        PdfRenderConfig::new()
            .scale_page_by_factor(self.dpi as f32 / 72.0)
            .set_maximum_width(self.max_pixels as i32)
            .set_maximum_height(self.max_pixels as i32)
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn rasterize(
        &self,
        pdf: &[u8],
        max_pages: Option<usize>,
    ) -> Result<Vec<DynamicImage>, ConvertError> {
        let pdfium = self
            .bind()
            .map_err(|e| ConvertError::Internal(e.to_string()))?;

        let document = pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| ConvertError::Rasterisation(e.to_string()))?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        let wanted = max_pages.map_or(total_pages, |m| m.min(total_pages));
        debug!("PDF loaded: {} pages, rendering {}", total_pages, wanted);

        let render_config = self.render_config();
        let mut results = Vec::with_capacity(wanted);

        for (idx, page) in pages.iter().take(wanted).enumerate() {
            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                ConvertError::Rasterisation(format!("page {}: {}", idx + 1, e))
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );
            results.push(image);
        }

        Ok(results)
    }
}

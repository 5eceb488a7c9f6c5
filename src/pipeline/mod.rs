//! Pipeline stages for PDF-to-JPEG conversion.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ render ──▶ encode
//! (bytes)    (pdfium)   (JPEG, base64)
//! ```
//!
//! 1. [`render`]: check the PDF header and rasterise pages behind the
//!    [`Rasterizer`] trait; pdfium work is blocking and runs off the async
//!    workers
//! 2. [`encode`]: flatten to RGB, JPEG-encode, and base64-wrap for JSON
//!
//! [`mock`] provides a pdfium-free [`Rasterizer`] for tests.

pub mod encode;
pub mod mock;
pub mod render;

pub use mock::MockRasterizer;
pub use render::{PdfiumRasterizer, Rasterizer};

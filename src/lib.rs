//! # dispenser
//!
//! A small HTTP service that turns uploaded PDFs into JPEG pages.
//!
//! ## Pipeline Overview
//!
//! ```text
//! POST /converter/pdf-to-jpg
//!  │
//!  ├─ 1. Auth     exact match of the Authorization header against CONVERTER_KEY
//!  ├─ 2. Upload   multipart field `file`
//!  ├─ 3. Render   rasterise pages via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 4. Encode   RGB → JPEG (→ base64 for the JSON variant)
//!  └─ 5. Respond  {"images": [...], "total_pages": N}  or  first page as image/jpeg
//! ```
//!
//! Every failure is answered with `{"error": "<message>"}`; nothing a client
//! sends can take the process down.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dispenser::{serve, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::builder()
//!         .converter_key(std::env::var("CONVERTER_KEY")?)
//!         .api_prefix("/api")
//!         .build()?;
//!     serve(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `dispenser` binary (clap + anyhow + dotenvy + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod api;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use api::{router, serve, AppState};
pub use config::{OutputFormat, PdfiumLibrary, ServerConfig, ServerConfigBuilder};
pub use convert::{ConversionHandler, UploadRequest, UploadedFile};
pub use error::{ConvertError, DispenserError};
pub use output::{ConversionResult, ConvertedImages, ErrorBody, HealthStatus, JpegFile, PageImage};
pub use pipeline::{MockRasterizer, PdfiumRasterizer, Rasterizer};

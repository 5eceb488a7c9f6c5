//! Configuration types for the dispenser server.
//!
//! Every knob lives in [`ServerConfig`], built via its
//! [`ServerConfigBuilder`]. The binary fills the builder from command-line
//! flags and environment variables; tests build it directly.

use crate::error::DispenserError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

/// Configuration for the HTTP server and the conversion pipeline.
///
/// # Example
/// ```rust
/// use dispenser::{OutputFormat, ServerConfig};
///
/// let config = ServerConfig::builder()
///     .converter_key("s3cret")
///     .dpi(150)
///     .default_format(OutputFormat::File)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 150);
/// ```
#[derive(Clone)]
pub struct ServerConfig {
    /// Socket address the server listens on. Default: `0.0.0.0:8000`.
    pub bind_addr: SocketAddr,

    /// Shared secret every conversion request must send verbatim in its
    /// `Authorization` header. Required.
    pub converter_key: String,

    /// Path prefix both routes are mounted under, e.g. `/api`. Default: none.
    pub api_prefix: String,

    /// Rendering DPI used when rasterising each PDF page. Range: 72–400. Default: 200.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 4000.
    ///
    /// A cap independent of DPI: a poster-sized page at 200 DPI would
    /// otherwise allocate hundreds of megabytes of pixels.
    pub max_rendered_pixels: u32,

    /// JPEG quality, 1–100. Default: 75.
    pub jpeg_quality: u8,

    /// Largest accepted request body in bytes. Default: 50 MiB.
    pub max_upload_bytes: usize,

    /// Response variant used when a request carries no `format` parameter.
    pub default_format: OutputFormat,

    /// Where to find the pdfium shared library.
    pub pdfium_library: PdfiumLibrary,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8000)),
            converter_key: String::new(),
            api_prefix: String::new(),
            dpi: 200,
            max_rendered_pixels: 4000,
            jpeg_quality: 75,
            max_upload_bytes: 50 * 1024 * 1024,
            default_format: OutputFormat::default(),
            pdfium_library: PdfiumLibrary::default(),
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("converter_key", &"<redacted>")
            .field("api_prefix", &self.api_prefix)
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("default_format", &self.default_format)
            .field("pdfium_library", &self.pdfium_library)
            .finish()
    }
}

impl ServerConfig {
    /// Create a new builder for `ServerConfig`.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.config.bind_addr = addr;
        self
    }

    pub fn converter_key(mut self, key: impl Into<String>) -> Self {
        self.config.converter_key = key.into();
        self
    }

    /// Mount routes under `prefix`. A trailing `/` is dropped.
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.config.api_prefix = prefix.trim_end_matches('/').to_string();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn default_format(mut self, format: OutputFormat) -> Self {
        self.config.default_format = format;
        self
    }

    pub fn pdfium_library(mut self, library: PdfiumLibrary) -> Self {
        self.config.pdfium_library = library;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServerConfig, DispenserError> {
        let c = &self.config;
        if c.converter_key.is_empty() {
            return Err(DispenserError::InvalidConfig(
                "converter key must not be empty (set CONVERTER_KEY)".into(),
            ));
        }
        if !c.api_prefix.is_empty() && !c.api_prefix.starts_with('/') {
            return Err(DispenserError::InvalidConfig(format!(
                "API prefix must start with '/', got '{}'",
                c.api_prefix
            )));
        }
        if c.max_upload_bytes == 0 {
            return Err(DispenserError::InvalidConfig(
                "Upload limit must be ≥ 1 byte".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Which response the conversion endpoint produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Every page as a base64 JPEG inside a JSON document. (default)
    #[default]
    Json,
    /// The first page only, as a downloadable `image/jpeg` body.
    File,
}

impl FromStr for OutputFormat {
    type Err = DispenserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "file" => Ok(OutputFormat::File),
            other => Err(DispenserError::InvalidConfig(format!(
                "unknown output format '{other}' (expected 'json' or 'file')"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::File => f.write_str("file"),
        }
    }
}

/// Location of the pdfium shared library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PdfiumLibrary {
    /// Let the system loader find `libpdfium` (default).
    #[default]
    System,
    /// An explicit path to the library file.
    File(PathBuf),
    /// A directory holding the platform-named library.
    Directory(PathBuf),
}

impl PdfiumLibrary {
    /// Classify a user-supplied path: existing directories become
    /// [`PdfiumLibrary::Directory`], anything else is treated as a file.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            PdfiumLibrary::Directory(path)
        } else {
            PdfiumLibrary::File(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_key() {
        let err = ServerConfig::builder().build().unwrap_err();
        assert!(err.to_string().contains("converter key"), "got: {err}");
    }

    #[test]
    fn builder_clamps_ranges() {
        let config = ServerConfig::builder()
            .converter_key("k")
            .dpi(10)
            .jpeg_quality(0)
            .max_rendered_pixels(5)
            .build()
            .unwrap();
        assert_eq!(config.dpi, 72);
        assert_eq!(config.jpeg_quality, 1);
        assert_eq!(config.max_rendered_pixels, 100);

        let config = ServerConfig::builder()
            .converter_key("k")
            .dpi(1200)
            .jpeg_quality(250)
            .build()
            .unwrap();
        assert_eq!(config.dpi, 400);
        assert_eq!(config.jpeg_quality, 100);
    }

    #[test]
    fn prefix_is_normalised_and_validated() {
        let config = ServerConfig::builder()
            .converter_key("k")
            .api_prefix("/api/")
            .build()
            .unwrap();
        assert_eq!(config.api_prefix, "/api");

        assert!(ServerConfig::builder()
            .converter_key("k")
            .api_prefix("api")
            .build()
            .is_err());
    }

    #[test]
    fn zero_upload_limit_rejected() {
        assert!(ServerConfig::builder()
            .converter_key("k")
            .max_upload_bytes(0)
            .build()
            .is_err());
    }

    #[test]
    fn debug_redacts_key() {
        let config = ServerConfig::builder()
            .converter_key("top-secret-value")
            .build()
            .unwrap();
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("top-secret-value"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn output_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(" FILE ".parse::<OutputFormat>().unwrap(), OutputFormat::File);
        assert!("png".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Json);
        assert_eq!(OutputFormat::File.to_string(), "file");
    }

    #[test]
    fn output_format_deserialises_lowercase() {
        let f: OutputFormat = serde_json::from_str("\"file\"").unwrap();
        assert_eq!(f, OutputFormat::File);
    }

    #[test]
    fn pdfium_library_from_path() {
        let dir = std::env::temp_dir();
        assert_eq!(
            PdfiumLibrary::from_path(&dir),
            PdfiumLibrary::Directory(dir.clone())
        );
        let file = dir.join("definitely-missing-libpdfium.so");
        assert_eq!(PdfiumLibrary::from_path(&file), PdfiumLibrary::File(file));
    }
}

//! Server binary for dispenser.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables to `ServerConfig` and runs the HTTP server.

use anyhow::{Context, Result};
use clap::Parser;
use dispenser::{serve, OutputFormat, PdfiumLibrary, ServerConfig};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = "\
Endpoints:
  GET  {prefix}/health                 liveness probe
  POST {prefix}/converter/pdf-to-jpg   multipart field `file`, header `Authorization: <key>`
                                       query `format=json` (all pages, base64) or `format=file` (first page)

Environment:
  Variables may also be placed in a .env file in the working directory.";

#[derive(Parser)]
#[command(
    name = "dispenser",
    version,
    about = "Serve a PDF-to-JPEG conversion API backed by pdfium",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "DISPENSER_BIND", default_value = "0.0.0.0:8000")]
    bind: SocketAddr,

    /// Shared secret expected verbatim in the Authorization header.
    #[arg(long, env = "CONVERTER_KEY", hide_env_values = true)]
    converter_key: String,

    /// Mount routes under this prefix, e.g. /api.
    #[arg(long, env = "DISPENSER_API_PREFIX", default_value = "")]
    api_prefix: String,

    /// Rendering DPI (72–400).
    #[arg(long, env = "DISPENSER_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// Cap on either edge of a rendered page, in pixels.
    #[arg(long, env = "DISPENSER_MAX_PIXELS", default_value_t = 4000)]
    max_pixels: u32,

    /// JPEG quality (1–100).
    #[arg(long, env = "DISPENSER_JPEG_QUALITY", default_value_t = 75,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Largest accepted upload, in MiB.
    #[arg(long, env = "DISPENSER_MAX_UPLOAD_MB", default_value_t = 50)]
    max_upload_mb: usize,

    /// Response variant when a request has no `format` parameter: json or file.
    #[arg(long, env = "DISPENSER_DEFAULT_FORMAT", default_value = "json")]
    default_format: OutputFormat,

    /// pdfium shared library, or the directory containing it. Default: system loader.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DISPENSER_VERBOSE")]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig> {
        let library = self
            .pdfium_lib_path
            .map(PdfiumLibrary::from_path)
            .unwrap_or_default();

        ServerConfig::builder()
            .bind_addr(self.bind)
            .converter_key(self.converter_key)
            .api_prefix(self.api_prefix)
            .dpi(self.dpi)
            .max_rendered_pixels(self.max_pixels)
            .jpeg_quality(self.jpeg_quality)
            .max_upload_bytes(self.max_upload_mb.saturating_mul(1024 * 1024))
            .default_format(self.default_format)
            .pdfium_library(library)
            .build()
            .context("Invalid server configuration")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is the normal case in production.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = cli.into_config()?;
    info!("Starting dispenser v{}: {:?}", env!("CARGO_PKG_VERSION"), config);

    serve(config).await.context("Server failed")?;
    Ok(())
}

//! Sheetbridge API Server binary
//!
//! HTTP API for Excel ⟷ JSON conversion, without the rest of the CLI.

use clap::Parser;
use sheetbridge::api::{run_api_server, server::ApiConfig, server::DEFAULT_MAX_UPLOAD_BYTES};
use sheetbridge::cli::convert_options;

#[derive(Parser, Debug)]
#[command(name = "sheetbridge-server")]
#[command(version)]
#[command(about = "Sheetbridge API Server - Excel ⟷ JSON conversion over HTTP")]
#[command(long_about = r#"
Sheetbridge API Server

Conversion endpoints:
  - POST /api/excel-to-json - multipart upload (field "file") → {json, schema}
  - POST /api/json-to-excel - {"json": Document, "format": spec|null} → .xlsx

Additional endpoints:
  - GET  /health            - Health check
  - GET  /version           - Server version info
  - GET  /                  - API documentation

Features:
  - CORS enabled for cross-origin requests
  - Graceful shutdown on SIGINT/SIGTERM
  - Request ids on every response
  - Tracing and structured logging (RUST_LOG)

Example usage:
  sheetbridge-server                           # Start on localhost:8080
  sheetbridge-server --host 0.0.0.0 --port 3000

  curl -F file=@report.xlsx http://localhost:8080/api/excel-to-json

  curl -X POST http://localhost:8080/api/json-to-excel \
    -H "Content-Type: application/json" \
    -d '{"json": {"Sheet1": [{"a": 1}]}, "format": null}' -o out.xlsx
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "SHEETBRIDGE_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "SHEETBRIDGE_PORT")]
    port: u16,

    /// Largest accepted request body in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES, env = "SHEETBRIDGE_MAX_UPLOAD_BYTES")]
    max_upload_bytes: usize,

    /// Regex recognizing date strings on encode (repeatable)
    #[arg(long = "date-pattern", env = "SHEETBRIDGE_DATE_PATTERNS", value_delimiter = ';')]
    date_patterns: Vec<String>,

    /// Convert sheets one at a time instead of in parallel
    #[arg(long, env = "SHEETBRIDGE_NO_PARALLEL")]
    no_parallel: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        max_upload_bytes: args.max_upload_bytes,
        convert: convert_options(&args.date_patterns, args.no_parallel)?,
    };

    run_api_server(config).await
}

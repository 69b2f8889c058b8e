use clap::{Args, Parser, Subcommand};
use sheetbridge::api::server::{ApiConfig, DEFAULT_MAX_UPLOAD_BYTES};
use sheetbridge::cli;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheetbridge")]
#[command(about = "Excel ⟷ JSON conversion with automatic schema detection")]
#[command(long_about = "Sheetbridge - Excel ⟷ JSON conversion with schema inference

Every column's type is inferred from its values:
  boolean ⊏ integer ⊏ float ⊏ string, plus date.
A column is nullable when any of its cells is empty.

COMMANDS:
  decode   - Workbook (.xlsx/.xls) to JSON or YAML
  encode   - JSON or YAML to workbook (.xlsx)
  inspect  - Print the detected schema of a workbook
  serve    - Run the HTTP API

EXAMPLES:
  sheetbridge decode report.xlsx                      # JSON on stdout
  sheetbridge decode report.xlsx -o report.json --with-schema
  sheetbridge encode report.json report.xlsx -f format.json
  sheetbridge inspect report.xlsx
  sheetbridge serve --port 3000")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Conversion flags shared by every command
#[derive(Args, Debug, Clone)]
struct ConvertArgs {
    /// Regex recognizing date strings on encode; needs named groups
    /// year, month, day (optional hour, minute, second, fraction).
    /// Repeat to try several patterns in order; replaces the ISO defaults.
    #[arg(long = "date-pattern", env = "SHEETBRIDGE_DATE_PATTERNS", value_delimiter = ';')]
    date_patterns: Vec<String>,

    /// Convert sheets one at a time instead of in parallel
    #[arg(long, env = "SHEETBRIDGE_NO_PARALLEL")]
    no_parallel: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Decode a workbook into a JSON Document.

The first row of each sheet's used range is the header. Every following
row becomes a record keyed by header name; empty cells become null.

OUTPUT:
  No -o: pretty JSON on stdout
  -o out.json: JSON file
  -o out.yaml: YAML file

--with-schema wraps the output as {\"json\": ..., \"schema\": ...}.

EXAMPLES:
  sheetbridge decode sales.xlsx
  sheetbridge decode sales.xlsx -o sales.yaml --with-schema")]
    /// Decode a workbook into JSON
    Decode {
        /// Path to the workbook (.xlsx, .xls)
        input: PathBuf,

        /// Output file (.json or .yaml); stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include the inferred schema in the output
        #[arg(long)]
        with_schema: bool,

        /// Show verbose steps
        #[arg(short, long)]
        verbose: bool,

        #[command(flatten)]
        convert: ConvertArgs,
    },

    #[command(long_about = "Encode a JSON or YAML Document into an .xlsx workbook.

The Document maps sheet names to arrays of records. Columns are taken
from the first record's keys, then any new keys in order of appearance.

FORMAT SPECIFICATION:
  -f format.json lists the columns to write per sheet, in order:

  {\"Sheet1\": [\"name\", \"age\"]}

  Keys not listed are dropped; listed keys absent from a record are empty.

EXAMPLES:
  sheetbridge encode data.json data.xlsx
  sheetbridge encode data.yaml data.xlsx -f format.yaml")]
    /// Encode JSON/YAML into a workbook
    Encode {
        /// Path to the Document (.json, .yaml, .yml)
        input: PathBuf,

        /// Output workbook path (.xlsx)
        output: PathBuf,

        /// Format Specification file (.json, .yaml)
        #[arg(short, long)]
        format: Option<PathBuf>,

        /// Show verbose steps
        #[arg(short, long)]
        verbose: bool,

        #[command(flatten)]
        convert: ConvertArgs,
    },

    /// Print the detected schema of a workbook
    Inspect {
        /// Path to the workbook (.xlsx, .xls)
        input: PathBuf,

        #[command(flatten)]
        convert: ConvertArgs,
    },

    #[command(long_about = "Run the HTTP API.

ENDPOINTS:
  POST /api/excel-to-json  - multipart upload (field 'file') → {json, schema}
  POST /api/json-to-excel  - {json, format} → .xlsx
  GET  /health, /version, /

Set RUST_LOG to adjust logging (default: sheetbridge=info,tower_http=info).")]
    /// Run the HTTP API
    Serve {
        /// Host address to bind to (use 0.0.0.0 for all interfaces)
        #[arg(short = 'H', long, default_value = "127.0.0.1", env = "SHEETBRIDGE_HOST")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8080", env = "SHEETBRIDGE_PORT")]
        port: u16,

        /// Largest accepted request body in bytes
        #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES, env = "SHEETBRIDGE_MAX_UPLOAD_BYTES")]
        max_upload_bytes: usize,

        #[command(flatten)]
        convert: ConvertArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Decode {
            input,
            output,
            with_schema,
            verbose,
            convert,
        } => {
            let options = cli::convert_options(&convert.date_patterns, convert.no_parallel)?;
            cli::decode(input, output, with_schema, verbose, options)?
        }

        Commands::Encode {
            input,
            output,
            format,
            verbose,
            convert,
        } => {
            let options = cli::convert_options(&convert.date_patterns, convert.no_parallel)?;
            cli::encode(input, output, format, verbose, options)?
        }

        Commands::Inspect { input, convert } => {
            let options = cli::convert_options(&convert.date_patterns, convert.no_parallel)?;
            cli::inspect(input, options)?
        }

        Commands::Serve {
            host,
            port,
            max_upload_bytes,
            convert,
        } => {
            let options = cli::convert_options(&convert.date_patterns, convert.no_parallel)?;
            cli::serve(ApiConfig {
                host,
                port,
                max_upload_bytes,
                convert: options,
            })?
        }
    }

    Ok(())
}

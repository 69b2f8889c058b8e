use crate::api::{run_api_server, server::ApiConfig};
use crate::core::{ConvertOptions, DatePatterns};
use crate::error::{BridgeError, BridgeResult};
use crate::excel::{ExcelExporter, ExcelImporter};
use crate::parser;
use crate::types::{DecodeOutput, WorkbookSchema};
use crate::writer;
use colored::Colorize;
use std::path::PathBuf;

/// Build conversion options from CLI flags.
///
/// Supplied date patterns replace the ISO defaults.
pub fn convert_options(date_patterns: &[String], no_parallel: bool) -> BridgeResult<ConvertOptions> {
    let patterns = if date_patterns.is_empty() {
        DatePatterns::default()
    } else {
        DatePatterns::from_patterns(date_patterns)?
    };
    Ok(ConvertOptions::default()
        .with_date_patterns(patterns)
        .with_parallel(!no_parallel))
}

/// Execute the decode command
///
/// Without an output path the rendered JSON goes to stdout and nothing else
/// is printed, so the output can be piped.
pub fn decode(
    input: PathBuf,
    output: Option<PathBuf>,
    with_schema: bool,
    verbose: bool,
    options: ConvertOptions,
) -> BridgeResult<()> {
    let importer = ExcelImporter::new(options);

    let Some(output) = output else {
        let decoded = importer.decode_file(&input)?;
        print!("{}", writer::render_decode_output(&decoded, with_schema, false)?);
        return Ok(());
    };

    println!("{}", "🔥 Sheetbridge - Excel → JSON".bold().green());
    println!("   Input:  {}", input.display());
    println!("   Output: {}\n", output.display());

    if verbose {
        println!("{}", "📖 Reading workbook...".cyan());
    }

    let decoded = importer.decode_file(&input)?;

    if verbose {
        print_sheet_summary(&decoded);
        println!("{}", "💾 Writing output...".cyan());
    }

    writer::write_decode_output(&output, &decoded, with_schema)?;

    println!("{}", "✅ Decode Complete!".bold().green());
    println!(
        "   {} sheets, {} records → {}\n",
        decoded.document.len(),
        decoded.document.record_count(),
        output.display()
    );
    Ok(())
}

/// Execute the encode command
pub fn encode(
    input: PathBuf,
    output: PathBuf,
    format: Option<PathBuf>,
    verbose: bool,
    options: ConvertOptions,
) -> BridgeResult<()> {
    println!("{}", "🔥 Sheetbridge - JSON → Excel".bold().green());
    println!("   Input:  {}", input.display());
    if let Some(f) = &format {
        println!("   Format: {}", f.display());
    }
    println!("   Output: {}\n", output.display());

    if verbose {
        println!("{}", "📖 Parsing document...".cyan());
    }

    let document = parser::read_document_file(&input)?;
    let format_spec = match &format {
        Some(path) => parser::read_format_file(path)?,
        None => None,
    };

    if verbose {
        println!(
            "   Found {} sheets, {} records\n",
            document.len(),
            document.record_count()
        );
        for (name, records) in &document.sheets {
            let columns = format_spec
                .as_ref()
                .and_then(|spec| spec.columns_for(name))
                .map(|cols| format!("{} columns (explicit)", cols.len()))
                .unwrap_or_else(|| "columns resolved automatically".to_string());
            println!(
                "   📊 Sheet: {} ({} records, {})",
                name.bright_blue(),
                records.len(),
                columns
            );
        }
        println!();
        println!("{}", "📊 Writing workbook...".cyan());
    }

    ExcelExporter::new(options).encode_to_file(&document, format_spec.as_ref(), &output)?;

    println!("{}", "✅ Encode Complete!".bold().green());
    println!("   Excel file: {}\n", output.display());
    Ok(())
}

/// Execute the inspect command: print the detected schema per sheet
pub fn inspect(input: PathBuf, options: ConvertOptions) -> BridgeResult<()> {
    println!("{}", "🔍 Sheetbridge - Schema".bold().green());
    println!("   File: {}\n", input.display());

    let decoded = ExcelImporter::new(options).decode_file(&input)?;
    if decoded.schema.is_empty() {
        println!("{}", "⚠️  Workbook has no sheets".yellow());
        return Ok(());
    }

    print_schema(&decoded);
    println!(
        "{}",
        format!(
            "✅ {} sheets, {} columns",
            decoded.schema.len(),
            total_columns(&decoded.schema)
        )
        .bold()
        .green()
    );
    Ok(())
}

/// Execute the serve command
pub fn serve(config: ApiConfig) -> BridgeResult<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime
        .block_on(run_api_server(config))
        .map_err(|e| BridgeError::Internal(e.to_string()))
}

fn print_sheet_summary(decoded: &DecodeOutput) {
    for (name, schema) in &decoded.schema.sheets {
        let rows = decoded.document.sheet(name).map_or(0, |r| r.len());
        println!(
            "   📊 Sheet: {} ({} columns, {} rows)",
            name.bright_blue(),
            schema.len(),
            rows
        );
    }
    println!();
}

fn print_schema(decoded: &DecodeOutput) {
    for (name, schema) in &decoded.schema.sheets {
        let rows = decoded.document.sheet(name).map_or(0, |r| r.len());
        println!(
            "   📊 {} {}",
            name.bright_blue().bold(),
            format!("({} rows)", rows).dimmed()
        );
        if schema.is_empty() {
            println!("      {}", "(no columns)".dimmed());
        }
        for column in &schema.columns {
            let nullable = if column.nullable { "nullable" } else { "required" };
            println!(
                "      {:<24} {:<8} {}",
                column.name.cyan(),
                column.column_type.as_str().bright_yellow(),
                nullable.dimmed()
            );
        }
        println!();
    }
}

/// Count of columns across all sheets
pub fn total_columns(schema: &WorkbookSchema) -> usize {
    schema.sheets.iter().map(|(_, s)| s.len()).sum()
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;

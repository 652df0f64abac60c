//! # CLI Commands
//!
//! File-based front end for the engine. Each `cmd_*` writes its result to the
//! given writer (stdout from `main`); logs go through `tracing` to stderr.
//!
//! CSV cells are read verbatim: no trimming, so original columns come back
//! out byte for byte. Rows may be ragged on input; the engine reports them.

use crate::error::{Error, Result};
use clap::ValueEnum;
use serde_json::{Map, Value, json};
use skutier_core::{Dataset, Engine, ScoredDataset, ScoringConfig, definitions};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Output encoding of `score`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

// =============================================================================
// INPUT
// =============================================================================

/// Read a header row plus data rows from CSV.
pub fn read_dataset<R: Read>(reader: R) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    debug!(columns = headers.len(), rows = rows.len(), "read CSV");
    Ok(Dataset::new(headers, rows))
}

/// Read a dataset from a CSV file.
pub fn read_dataset_file(path: &Path) -> Result<Dataset> {
    let file = File::open(path).map_err(|e| Error::file(path, e))?;
    read_dataset(file)
}

/// Load a [`ScoringConfig`] from JSON, or defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<ScoringConfig> {
    let Some(path) = path else {
        return Ok(ScoringConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| Error::file(path, e))?;
    let config: ScoringConfig = serde_json::from_str(&text)?;
    debug!(path = %path.display(), ?config, "loaded scoring config");
    Ok(config)
}

// =============================================================================
// OUTPUT
// =============================================================================

/// Write the scored rows as CSV.
pub fn write_csv<W: Write>(scored: &ScoredDataset<'_>, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(scored.headers())?;
    for row in scored.rows() {
        csv_writer.write_record(&row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Scored rows as JSON objects keyed by column, plus diagnostics.
pub fn scored_to_json(scored: &ScoredDataset<'_>) -> Value {
    let headers = scored.headers();
    let original = scored.source().headers().len();
    let rows: Vec<Value> = scored
        .rows()
        .into_iter()
        .map(|row| {
            // Appended cells are empty only for NaN
            let cells = row.into_iter().enumerate().map(|(i, cell)| {
                if i >= original && cell.is_empty() {
                    Value::Null
                } else {
                    Value::String(cell)
                }
            });
            let object: Map<String, Value> = headers.iter().cloned().zip(cells).collect();
            Value::Object(object)
        })
        .collect();

    json!({
        "columns": headers,
        "rows": rows,
        "diagnostics": scored.diagnostics(),
    })
}

/// Score a dataset and log how it went.
pub fn score_dataset<'a>(engine: &Engine, dataset: &'a Dataset) -> Result<ScoredDataset<'a>> {
    let started = Instant::now();
    let scored = engine.run(dataset)?;

    info!(
        rows = scored.results().len(),
        diagnostics = scored.diagnostics().len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "scored batch"
    );
    if !scored.diagnostics().is_empty() {
        let mut counts = std::collections::BTreeMap::<&str, usize>::new();
        for diagnostic in scored.diagnostics() {
            *counts.entry(diagnostic.kind.label()).or_insert(0) += 1;
        }
        warn!(?counts, "data-quality findings");
    }
    Ok(scored)
}

// =============================================================================
// COMMANDS
// =============================================================================

/// `skutier score`
pub fn cmd_score<W: Write>(
    input: &Path,
    output: Option<&Path>,
    format: OutputFormat,
    config: Option<&Path>,
    stdout: W,
) -> Result<()> {
    let engine = Engine::new(load_config(config)?)?;
    let dataset = read_dataset_file(input)?;
    let scored = score_dataset(&engine, &dataset)?;

    match output {
        Some(path) => {
            let file = File::create(path).map_err(|e| Error::file(path, e))?;
            write_scored(&scored, format, BufWriter::new(file))?;
            info!(path = %path.display(), "wrote output");
        }
        None => write_scored(&scored, format, stdout)?,
    }
    Ok(())
}

fn write_scored<W: Write>(scored: &ScoredDataset<'_>, format: OutputFormat, mut writer: W) -> Result<()> {
    match format {
        OutputFormat::Csv => write_csv(scored, writer),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &scored_to_json(scored))?;
            writeln!(writer)?;
            writer.flush()?;
            Ok(())
        }
    }
}

/// `skutier definitions`
pub fn cmd_definitions<W: Write>(json: bool, mut stdout: W) -> Result<()> {
    let definitions = definitions();
    if json {
        serde_json::to_writer_pretty(&mut stdout, &definitions)?;
        writeln!(stdout)?;
    } else {
        write!(stdout, "{}", definitions.to_text())?;
    }
    Ok(())
}

/// `skutier summary`
pub fn cmd_summary<W: Write>(input: &Path, json: bool, config: Option<&Path>, mut stdout: W) -> Result<()> {
    let engine = Engine::new(load_config(config)?)?;
    let dataset = read_dataset_file(input)?;
    let scored = score_dataset(&engine, &dataset)?;
    let report = scored.summary();

    if json {
        serde_json::to_writer_pretty(&mut stdout, &report)?;
        writeln!(stdout)?;
    } else {
        write!(stdout, "{}", report.to_text())?;
    }
    Ok(())
}

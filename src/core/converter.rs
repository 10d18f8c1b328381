//! JSON array-of-records <-> CSV conversion.
//!
//! Both directions read the whole input into memory, transform it, and hand the
//! complete output to [`Storage::write_file`], so a failed conversion never
//! produces an output file.

use crate::config::{ConvertConfig, LocalStorage};
use crate::core::pretty::to_pretty_bytes;
use crate::domain::model::{ConversionSummary, Document, Header, Record};
use crate::domain::ports::Storage;
use crate::utils::error::{Result, ToolboxError};
use crate::utils::validation::validate_delimiter;
use serde_json::{Map, Number, Value};
use std::collections::HashSet;
use std::path::Path;

pub struct FormatConverter<S: Storage> {
    storage: S,
    options: ConvertConfig,
}

impl<S: Storage> FormatConverter<S> {
    pub fn new(storage: S, options: ConvertConfig) -> Self {
        Self { storage, options }
    }

    pub fn json_to_csv(&self, input: &Path, output: &Path) -> Result<ConversionSummary> {
        let delimiter = validate_delimiter("convert.delimiter", self.options.delimiter)?;

        tracing::debug!("Reading JSON document from {}", input.display());
        let raw = self.storage.read_file(input)?;
        let document = parse_json_document(&raw)?;

        let header = Header::from_records(&document, self.options.header_policy);
        let dropped = header.uncovered_keys(&document);
        if !dropped.is_empty() {
            tracing::warn!(
                "Header taken from the first record; dropping fields not in it: {}",
                dropped.join(", ")
            );
        }

        let csv = render_csv(&document, &header, delimiter)?;
        self.storage.write_file(output, &csv)?;

        let summary = ConversionSummary {
            records: document.len(),
            columns: header.len(),
            output_path: output.to_path_buf(),
        };
        tracing::info!(
            "Converted {} JSON records to CSV with columns [{}]",
            summary.records,
            header.columns().join(", ")
        );
        Ok(summary)
    }

    pub fn csv_to_json(&self, input: &Path, output: &Path) -> Result<ConversionSummary> {
        let delimiter = validate_delimiter("convert.delimiter", self.options.delimiter)?;

        tracing::debug!("Reading CSV document from {}", input.display());
        let raw = self.storage.read_file(input)?;
        let (header, document) = parse_csv_document(&raw, delimiter, self.options.infer_types)?;

        let json = render_json(&document, self.options.json_indent)?;
        self.storage.write_file(output, &json)?;

        let summary = ConversionSummary {
            records: document.len(),
            columns: header.len(),
            output_path: output.to_path_buf(),
        };
        tracing::info!(
            "Converted {} CSV rows to JSON (type inference: {})",
            summary.records,
            self.options.infer_types
        );
        Ok(summary)
    }
}

/// Converts the JSON array at `input` into a CSV file at `output` using default options.
pub fn json_to_csv(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<ConversionSummary> {
    FormatConverter::new(LocalStorage::new(), ConvertConfig::default())
        .json_to_csv(input.as_ref(), output.as_ref())
}

/// Converts the CSV file at `input` into a JSON array at `output` using default options.
pub fn csv_to_json(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<ConversionSummary> {
    FormatConverter::new(LocalStorage::new(), ConvertConfig::default())
        .csv_to_json(input.as_ref(), output.as_ref())
}

/// Parses a JSON array of flat objects.
pub fn parse_json_document(raw: &[u8]) -> Result<Document> {
    let value: Value = serde_json::from_slice(raw)
        .map_err(|e| ToolboxError::input_format(format!("malformed JSON: {}", e)))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(ToolboxError::input_format(format!(
                "expected a JSON array of objects at the top level, found {}",
                json_kind(&other)
            )))
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let data = match item {
            Value::Object(data) => data,
            other => {
                return Err(ToolboxError::input_format(format!(
                    "element {} is {}, expected an object",
                    index,
                    json_kind(&other)
                )))
            }
        };

        if let Some((key, nested)) = data.iter().find(|(_, v)| v.is_array() || v.is_object()) {
            return Err(ToolboxError::input_format(format!(
                "record {} field '{}' holds a nested {}; only flat records are supported",
                index,
                key,
                json_kind(nested)
            )));
        }

        records.push(Record::new(data));
    }

    Ok(records)
}

pub fn render_csv(document: &[Record], header: &Header, delimiter: u8) -> Result<Vec<u8>> {
    // A zero-column header is an empty line, as is each row under it.
    if header.is_empty() {
        return Ok(vec![b'\n'; document.len() + 1]);
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(header.columns())?;
    for record in document {
        writer.write_record(
            header
                .columns()
                .iter()
                .map(|column| cell_text(record.data.get(column))),
        )?;
    }

    writer.into_inner().map_err(|e| ToolboxError::ProcessingError {
        message: format!("failed to flush CSV buffer: {}", e.error()),
    })
}

/// Parses CSV with a mandatory header row. Short rows are padded with empty cells.
pub fn parse_csv_document(raw: &[u8], delimiter: u8, infer_types: bool) -> Result<(Header, Document)> {
    if raw.is_empty() {
        return Err(ToolboxError::input_format(
            "CSV input is empty; a header row is required",
        ));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(raw);

    let columns: Vec<String> = reader
        .headers()
        .map_err(malformed_csv)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut seen = HashSet::new();
    if let Some(duplicate) = columns.iter().find(|c| !seen.insert(c.as_str())) {
        return Err(ToolboxError::input_format(format!(
            "duplicate column '{}' in CSV header",
            duplicate
        )));
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(malformed_csv)?;
        if row.len() > columns.len() {
            let line = row.position().map(|p| p.line()).unwrap_or_default();
            return Err(ToolboxError::input_format(format!(
                "line {} has {} fields but the header has {}",
                line,
                row.len(),
                columns.len()
            )));
        }

        let mut data = Map::new();
        for (index, column) in columns.iter().enumerate() {
            let cell = row.get(index).unwrap_or("");
            let value = if infer_types {
                infer_value(cell)
            } else {
                Value::String(cell.to_string())
            };
            data.insert(column.clone(), value);
        }
        records.push(Record::new(data));
    }

    Ok((Header::new(columns), records))
}

pub fn render_json(document: &[Record], indent: usize) -> Result<Vec<u8>> {
    let mut json = to_pretty_bytes(document, indent)?;
    json.push(b'\n');
    Ok(json)
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(nested) => nested.to_string(),
    }
}

/// Only produces a non-string value when it renders back to exactly `cell`.
fn infer_value(cell: &str) -> Value {
    match cell {
        "" => return Value::Null,
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    let number = cell
        .parse::<i64>()
        .ok()
        .map(Number::from)
        .or_else(|| cell.parse::<u64>().ok().map(Number::from))
        .or_else(|| cell.parse::<f64>().ok().and_then(Number::from_f64));

    match number {
        Some(n) if n.to_string() == cell => Value::Number(n),
        _ => Value::String(cell.to_string()),
    }
}

fn malformed_csv(e: csv::Error) -> ToolboxError {
    ToolboxError::input_format(format!("malformed CSV: {}", e))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{ConvertConfig, FetchConfig, PrettyConfig};
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_url, Validate};

/// A flat record. Field order follows the input document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }
}

pub type Document = Vec<Record>;

/// How the CSV header is derived from a document's records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum HeaderPolicy {
    /// Every key of every record, in first-seen order.
    #[default]
    Union,
    /// Keys of the first record only.
    First,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    columns: Vec<String>,
}

impl Header {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn from_records(records: &[Record], policy: HeaderPolicy) -> Self {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();

        let sources: &[Record] = match policy {
            HeaderPolicy::Union => records,
            HeaderPolicy::First => records.get(..1).unwrap_or(&[]),
        };

        for record in sources {
            for key in record.keys() {
                if seen.insert(key.to_string()) {
                    columns.push(key.to_string());
                }
            }
        }

        Self { columns }
    }

    /// Keys present in `records` that this header does not cover, in first-seen order.
    pub fn uncovered_keys(&self, records: &[Record]) -> Vec<String> {
        let known: HashSet<&str> = self.columns.iter().map(String::as_str).collect();
        let mut reported = HashSet::new();
        records
            .iter()
            .flat_map(Record::keys)
            .filter(|key| !known.contains(key) && reported.insert(*key))
            .map(str::to_string)
            .collect()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub records: usize,
    pub columns: usize,
    pub output_path: PathBuf,
}

impl fmt::Display for ConversionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} records ({} columns) to {}",
            self.records,
            self.columns,
            self.output_path.display()
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchReport {
    pub url: String,
    pub method: String,
    pub status: u16,
    pub bytes: usize,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    pub started_at: DateTime<Utc>,
}

impl FetchReport {
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl fmt::Display for FetchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = reqwest::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("");
        write!(
            f,
            "{} {} -> {} {}, {} bytes in {:.1} ms",
            self.method,
            self.url,
            self.status,
            reason,
            self.bytes,
            self.elapsed_ms()
        )
    }
}

fn serialize_millis<S: serde::Serializer>(
    elapsed: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64() * 1000.0)
}

/// Where a command reads its input from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl From<PathBuf> for InputSource {
    fn from(path: PathBuf) -> Self {
        if path.as_os_str() == "-" {
            Self::Stdin
        } else {
            Self::File(path)
        }
    }
}

/// One command with its effective configuration.
#[derive(Debug, Clone)]
pub enum Task {
    JsonToCsv {
        input: PathBuf,
        output: PathBuf,
        options: ConvertConfig,
    },
    CsvToJson {
        input: PathBuf,
        output: PathBuf,
        options: ConvertConfig,
    },
    Pretty {
        input: InputSource,
        options: PrettyConfig,
    },
    Fetch {
        url: String,
        options: FetchConfig,
        as_json: bool,
    },
}

impl Task {
    pub fn name(&self) -> &'static str {
        match self {
            Self::JsonToCsv { .. } => "json2csv",
            Self::CsvToJson { .. } => "csv2json",
            Self::Pretty { .. } => "pretty",
            Self::Fetch { .. } => "fetch",
        }
    }
}

impl Validate for Task {
    fn validate(&self) -> Result<()> {
        match self {
            Self::JsonToCsv { input, output, .. } | Self::CsvToJson { input, output, .. } => {
                validate_path("input", &input.to_string_lossy())?;
                validate_path("output", &output.to_string_lossy())?;
            }
            Self::Pretty {
                input: InputSource::File(path),
                ..
            } => validate_path("input", &path.to_string_lossy())?,
            Self::Pretty { .. } => {}
            Self::Fetch { url, .. } => {
                validate_url("url", url)?;
            }
        }
        Ok(())
    }
}

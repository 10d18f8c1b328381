use crate::config::{FetchMethod, ToolboxConfig};
use crate::domain::model::{HeaderPolicy, InputSource, Task};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "toolbox", version)]
#[command(about = "Developer toolbox: JSON/CSV conversion, pretty JSON and URL fetch timing")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(long, global = true, env = "TOOLBOX_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Convert a JSON array of flat objects to CSV
    #[command(name = "json2csv")]
    Json2Csv {
        input: PathBuf,
        output: PathBuf,

        /// How the header row is derived from the records
        #[arg(long, value_enum)]
        header: Option<HeaderPolicy>,

        #[arg(long)]
        delimiter: Option<char>,
    },

    /// Convert a CSV file with a header row to a JSON array of objects
    #[command(name = "csv2json")]
    Csv2Json {
        input: PathBuf,
        output: PathBuf,

        /// Turn numeric, boolean and empty cells into JSON numbers, booleans and null
        #[arg(long)]
        infer_types: bool,

        #[arg(long)]
        delimiter: Option<char>,

        #[arg(long)]
        indent: Option<usize>,
    },

    /// Pretty-print a JSON document to stdout
    Pretty {
        /// JSON file, or `-` for stdin
        #[arg(default_value = "-")]
        input: PathBuf,

        #[arg(long)]
        indent: Option<usize>,

        #[arg(long)]
        sort_keys: bool,
    },

    /// Time an HTTP fetch of a URL
    Fetch {
        url: String,

        #[arg(long, value_enum)]
        method: Option<FetchMethod>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Print the timing report as JSON
        #[arg(long)]
        json: bool,
    },
}

impl CliConfig {
    /// Folds command-line overrides into `base`. The returned config is what the
    /// task will run with and is the one to validate.
    pub fn resolve(&self, mut base: ToolboxConfig) -> (ToolboxConfig, Task) {
        let task = match self.command.clone() {
            Command::Json2Csv {
                input,
                output,
                header,
                delimiter,
            } => {
                if let Some(header) = header {
                    base.convert.header_policy = header;
                }
                if let Some(delimiter) = delimiter {
                    base.convert.delimiter = delimiter;
                }
                Task::JsonToCsv {
                    input,
                    output,
                    options: base.convert.clone(),
                }
            }
            Command::Csv2Json {
                input,
                output,
                infer_types,
                delimiter,
                indent,
            } => {
                base.convert.infer_types |= infer_types;
                if let Some(delimiter) = delimiter {
                    base.convert.delimiter = delimiter;
                }
                if let Some(indent) = indent {
                    base.convert.json_indent = indent;
                }
                Task::CsvToJson {
                    input,
                    output,
                    options: base.convert.clone(),
                }
            }
            Command::Pretty {
                input,
                indent,
                sort_keys,
            } => {
                if let Some(indent) = indent {
                    base.pretty.indent = indent;
                }
                base.pretty.sort_keys |= sort_keys;
                Task::Pretty {
                    input: InputSource::from(input),
                    options: base.pretty.clone(),
                }
            }
            Command::Fetch {
                url,
                method,
                timeout,
                json,
            } => {
                if let Some(method) = method {
                    base.fetch.method = method;
                }
                if let Some(timeout) = timeout {
                    base.fetch.timeout_seconds = timeout;
                }
                Task::Fetch {
                    url,
                    options: base.fetch.clone(),
                    as_json: json,
                }
            }
        };

        (base, task)
    }
}

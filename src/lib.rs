pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};
pub use config::{LocalStorage, ToolboxConfig};

pub use self::core::converter::{csv_to_json, json_to_csv, FormatConverter};
pub use self::core::fetch::FetchTimer;
pub use self::core::pretty::PrettyPrinter;
pub use self::core::toolbox::Toolbox;
pub use domain::model::{ConversionSummary, FetchReport, Header, HeaderPolicy, Record, Task};
pub use utils::error::{Result, ToolboxError};

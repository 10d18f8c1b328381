use crate::domain::model::HeaderPolicy;
use crate::utils::error::{Result, ToolboxError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Looked up in the working directory when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "toolbox.toml";

pub const MAX_INDENT: usize = 16;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolboxConfig {
    pub convert: ConvertConfig,
    pub pretty: PrettyConfig,
    pub fetch: FetchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub header_policy: HeaderPolicy,
    pub delimiter: char,
    pub infer_types: bool,
    pub json_indent: usize,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            header_policy: HeaderPolicy::Union,
            delimiter: ',',
            infer_types: false,
            json_indent: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrettyConfig {
    pub indent: usize,
    pub sort_keys: bool,
}

impl Default for PrettyConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            sort_keys: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum FetchMethod {
    #[default]
    #[serde(alias = "GET")]
    Get,
    #[serde(alias = "HEAD")]
    Head,
}

impl FetchMethod {
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Head => reqwest::Method::HEAD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub method: FetchMethod,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            method: FetchMethod::Get,
            timeout_seconds: 30,
            user_agent: concat!("dev-toolbox/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl ToolboxConfig {
    /// Reads and parses a TOML config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| ToolboxError::io(&path, e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ToolboxError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// An explicit path must exist; otherwise `toolbox.toml` is used when present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::from_file(path)
            }
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                tracing::debug!("Loading configuration from ./{}", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)
            }
            None => Ok(Self::default()),
        }
    }

    /// Replaces `${VAR}` with the environment value; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ToolboxError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_delimiter("convert.delimiter", self.convert.delimiter)?;
        validation::validate_range("convert.json_indent", self.convert.json_indent, 0, MAX_INDENT)?;
        validation::validate_range("pretty.indent", self.pretty.indent, 0, MAX_INDENT)?;
        validation::validate_positive_number("fetch.timeout_seconds", self.fetch.timeout_seconds, 1)?;
        validation::validate_non_empty_string("fetch.user_agent", &self.fetch.user_agent)?;
        Ok(())
    }
}

impl Validate for ToolboxConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(feature = "cli")]
pub mod cli;
pub mod storage;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use storage::LocalStorage;
pub use toml_config::{
    ConvertConfig, FetchConfig, FetchMethod, LogFormat, LoggingConfig, PrettyConfig,
    ToolboxConfig,
};

#[cfg(feature = "cli")]
pub mod cli;
pub mod env;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliArgs;
pub use toml_config::{
    AmadeusConfig, EmailConfig, NotifyConfig, SearchConfig, SheetyConfig, TrackerConfig,
    TwilioConfig,
};

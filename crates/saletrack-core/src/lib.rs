pub mod app_config;
pub mod config;
pub mod items;
pub mod sites;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use items::{ItemSink, SaleItem, SinkError};
pub use sites::{
    load_sites, parse_sites, SiteDescriptor, SiteSelectors, SitesFile, SizeCategory,
    SizePreferences,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sites file {path}: {source}")]
    SitesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sites file: {0}")]
    SitesFileParse(#[source] serde_yaml::Error),

    #[error("sites config validation failed: {0}")]
    Validation(String),
}

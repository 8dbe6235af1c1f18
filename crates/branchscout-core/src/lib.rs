pub mod aggregate;
pub mod app_config;
pub mod branches;
pub mod config;
pub mod regions;

pub use aggregate::{AbsorbStats, Aggregator, RegionGroup};
pub use app_config::AppConfig;
pub use branches::{BranchRecord, CardFields, IdentityKey};
pub use config::{load_app_config, load_app_config_from_env};
pub use regions::{load_regions, Region, RegionCatalog};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read regions file {path}: {source}")]
    RegionsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse regions file: {0}")]
    RegionsFileParse(#[from] serde_yaml::Error),

    #[error("region catalog validation failed: {0}")]
    Validation(String),
}

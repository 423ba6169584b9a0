use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use log::debug;
use thiserror::Error;

use crate::config::{AppConfig, AppConfigData};
use crate::lib_constants::APP_CONFIG_ENV_PREFIX;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Figment(#[from] figment::Error),
}

pub trait FigmentExt {
    fn setup_app_config(
        self,
        config_file: impl AsRef<Path>,
    ) -> Figment;
}

impl FigmentExt for Figment {
    /// Defaults, overridden by the config file if it exists, overridden by
    /// `LOCNOTES_*` environment variables.
    fn setup_app_config(self, config_file: impl AsRef<Path>) -> Figment {
        self.merge(Serialized::defaults(AppConfigData::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(APP_CONFIG_ENV_PREFIX))
    }
}

impl AppConfig {
    pub fn load(config_file: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
        debug!("loading config from \"{}\"", config_file.as_ref().display());
        let data: AppConfigData = Figment::new()
            .setup_app_config(config_file)
            .extract()?;
        Ok(data.into())
    }
}

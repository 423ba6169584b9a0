use std::path::PathBuf;

use crate::config::app_config::data::AppConfigData;

pub mod data;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AppConfig {
    pub data_directory: PathBuf,
    pub max_collection_size: u64,
}

impl From<AppConfigData> for AppConfig {
    fn from(value: AppConfigData) -> Self {
        AppConfig {
            data_directory: value.data_directory,
            max_collection_size: value.max_collection_size,
        }
    }
}

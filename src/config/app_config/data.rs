use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::lib_constants::{DEFAULT_DATA_DIR, DEFAULT_MAX_COLLECTION_SIZE};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfigData {
    #[serde(default = "app_config_default_data_directory")]
    pub data_directory: PathBuf,

    #[serde(default = "app_config_default_max_collection_size")]
    pub max_collection_size: u64,
}

pub fn app_config_default_data_directory() -> PathBuf {
    DEFAULT_DATA_DIR.into()
}

pub fn app_config_default_max_collection_size() -> u64 {
    DEFAULT_MAX_COLLECTION_SIZE
}

impl Default for AppConfigData {
    fn default() -> Self {
        AppConfigData {
            data_directory: app_config_default_data_directory(),
            max_collection_size: app_config_default_max_collection_size(),
        }
    }
}

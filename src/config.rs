pub mod app_config;
mod loader;

pub use app_config::AppConfig;
pub use app_config::data::AppConfigData;
pub use loader::{ConfigError, FigmentExt};

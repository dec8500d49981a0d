//! Configuration: typed settings and the JSON config file.

pub mod settings;
pub mod store;

pub use settings::{KNOWN_KEYS, SettingKey, Settings, validate_value};
pub use store::{ConfigStore, config_directory};

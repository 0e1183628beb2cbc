//! Data types, configuration, and validation modules
//!
//! Contains the core data structures and configuration management.

mod config;
mod types;
mod validation;

pub(crate) use config::write_atomic;
pub use config::{
    get_config_path, load_config, save_config, DaemonSettings, DeviceSettings, OctoConfig,
};
pub use types::{Channel, DeviceInfo, SensorType, Snapshot, Unit};
pub use validation::{
    validate_config, validate_file_size, validate_freshness_window, validate_publish_interval,
    validate_report_len,
};

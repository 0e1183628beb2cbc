//! Octofan Core Library
//!
//! Decoding and caching of Aquacomputer Octo telemetry.
//!
//! # Features
//!
//! - **Field Layout**: One table describes every field of the status report
//! - **Decoding**: Bounds-checked, scaled extraction into a complete snapshot
//! - **Caching**: Latest snapshot with a freshness window, never torn
//! - **Queries**: Typed and hwmon-style read-only access to every channel
//!
//! # Module Structure
//!
//! - `data/` - Data types, configuration, validation
//! - `layout`, `decoder` - Report format and decoding
//! - `cache`, `device`, `query`, `diagnostics` - State and read access
//! - `source`, `status` - Frame input and status output
//!
//! # Example
//!
//! ```
//! use of_core::{OctoDevice, SensorType, OctoError};
//! use std::time::Duration;
//!
//! let device = OctoDevice::new(Duration::from_secs(2)).unwrap();
//!
//! let mut frame = vec![0u8; 226];
//! frame[0] = 0x01;
//! frame[61..63].copy_from_slice(&248u16.to_be_bytes());
//! device.handle_frame(&frame).unwrap();
//!
//! assert_eq!(device.get_value(SensorType::Temperature, 0).unwrap(), 2480);
//! assert_eq!(device.get_label(SensorType::Temperature, 0).unwrap(), "Temp1");
//! assert!(matches!(device.get_value(SensorType::Temperature, 4), Err(OctoError::ChannelOutOfRange { .. })));
//! ```

// Grouped modules
pub mod data;

// Standalone modules
pub mod cache;
pub mod constants;
pub mod decoder;
pub mod device;
pub mod diagnostics;
pub mod display;
pub mod error;
pub mod layout;
pub mod query;
pub mod source;
pub mod status;

// Re-export primary types from data/
pub use data::{Channel, DeviceInfo, SensorType, Snapshot, Unit};

// Re-export config functions from data/
pub use data::{
    get_config_path, load_config, save_config, DaemonSettings, DeviceSettings, OctoConfig,
};

// Re-export validation functions from data/
pub use data::{
    validate_config, validate_file_size, validate_freshness_window, validate_publish_interval,
    validate_report_len,
};

// Re-export error types
pub use error::{OctoError, Result};

pub use cache::{CacheView, Clock, SensorCache, SystemClock};
pub use decoder::{decode, Decoded};
pub use device::{FrameOutcome, OctoDevice};
pub use diagnostics::Diagnostics;
pub use layout::{ByteOrder, ChannelLayout, FieldSpec, Scale, Width};
pub use query::{parse_attribute, AttributeKind};
pub use source::{pump, CaptureReader, FrameSource, ReportReader};
pub use status::{ChannelStatus, StatusDocument};

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or code
//!     → loader.rs (parse & deserialize)
//!     → LoggerConfig (immutable)
//!     → RequestLogger::new (resolves threshold, timestamp format, route filter)
//!     → shared via Arc by every request
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the logger is built; no reload
//! - All fields have defaults to allow minimal configs
//! - No semantic validation: odd values degrade instead of failing

pub mod loader;
pub mod schema;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{ColorMode, LoggerConfig, RouteFilterHandle};

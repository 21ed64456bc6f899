//! Route selection for the unconditional JSON record.
//!
//! # Data Flow
//! ```text
//! Request URL
//!     → RouteFilter (closure from code, or PathPrefixFilter from config)
//!     → match: emit full JSON record regardless of level and json_logs
//! ```

pub mod matcher;

pub use matcher::{PathPrefixFilter, RouteFilter};

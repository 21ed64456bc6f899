//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request lines:
//!     → logger::RequestLogger → LogSink (stdout/stderr)
//!
//! Diagnostics:
//!     → tracing events → logging.rs subscriber (stderr, RUST_LOG filtered)
//! ```
//!
//! # Design Decisions
//! - Two channels: request lines follow a fixed text/JSON contract, while
//!   diagnostics are ordinary structured tracing events
//! - The library never installs a subscriber; binaries call `logging::init`

pub mod logging;

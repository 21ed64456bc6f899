//! Request/response logging middleware for tower and axum services.

pub mod config;
pub mod http;
pub mod logger;
pub mod observability;
pub mod routing;

pub use config::LoggerConfig;
pub use http::{HttpServer, RequestLoggerLayer};
pub use logger::{RequestLogger, ResponseObservers};

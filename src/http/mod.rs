//! HTTP integration subsystem.
//!
//! # Data Flow
//! ```text
//! Request<Body>
//!     → layer.rs (RequestLoggerService::call, arrival timestamp)
//!     → request.rs (snapshot: url, ip, session, headers, body)
//!     → RequestLogger::begin_at (request-phase lines)
//!     → inner service
//!     → body.rs (LoggedBody: finished at end of stream, failed on error)
//!     → Send to client
//! ```

pub mod body;
pub mod layer;
pub mod request;
pub mod server;

pub use body::LoggedBody;
pub use layer::{RequestLoggerLayer, RequestLoggerService};
pub use request::{ClientIp, ParsedBody, SessionId};
pub use server::HttpServer;

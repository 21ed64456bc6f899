//! Tower layer wiring the request logger into a service stack.

use std::fmt;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, Response};
use futures_util::future::BoxFuture;
use http_body::Body as HttpBody;
use tower::{Layer, Service};

use crate::config::LoggerConfig;
use crate::http::body::LoggedBody;
use crate::http::request;
use crate::logger::RequestLogger;

/// Layer that logs every request passing through the wrapped service.
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/health", get(health))
///     .layer(RequestLoggerLayer::new(LoggerConfig::default()));
/// ```
#[derive(Clone, Debug)]
pub struct RequestLoggerLayer {
    logger: RequestLogger,
}

impl RequestLoggerLayer {
    pub fn new(config: LoggerConfig) -> Self {
        Self::from_logger(RequestLogger::new(config))
    }

    pub fn from_logger(logger: RequestLogger) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &RequestLogger {
        &self.logger
    }
}

impl<S> Layer<S> for RequestLoggerLayer {
    type Service = RequestLoggerService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLoggerService {
            inner,
            logger: self.logger.clone(),
        }
    }
}

/// Service produced by [`RequestLoggerLayer`].
#[derive(Clone)]
pub struct RequestLoggerService<S> {
    inner: S,
    logger: RequestLogger,
}

impl<S> fmt::Debug for RequestLoggerService<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestLoggerService")
            .field("logger", &self.logger)
            .finish_non_exhaustive()
    }
}

impl<S, ResBody> Service<Request<Body>> for RequestLoggerService<S>
where
    S: Service<Request<Body>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: fmt::Display + Send + 'static,
    ResBody: HttpBody + Send + 'static,
{
    type Response = Response<LoggedBody<ResBody>>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        // Keep the service that was driven to readiness.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let logger = self.logger.clone();

        Box::pin(async move {
            // Stamped before the body is buffered.
            let arrival = logger.stamp();
            let (req, snapshot) = request::capture(req, &logger).await;
            let observers = logger.begin_at(arrival, snapshot);

            match inner.call(req).await {
                Ok(response) => Ok(LoggedBody::attach(response, observers)),
                Err(err) => {
                    observers.failed(&err.to_string());
                    Err(err)
                }
            }
        })
    }
}

//! Response body wrapper driving the deferred observers.

use std::fmt;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use axum::http::Response;
use http_body::{Body as HttpBody, Frame, SizeHint};
use pin_project_lite::pin_project;

use crate::logger::ResponseObservers;

pin_project! {
    /// Forwards every frame of the inner body and fires the observers once:
    /// `finished` at end of stream, `failed` on the first stream error.
    ///
    /// A body dropped before either happens fires nothing.
    pub struct LoggedBody<B> {
        #[pin]
        inner: B,
        observers: Option<ResponseObservers>,
        status: u16,
    }
}

impl<B> LoggedBody<B>
where
    B: HttpBody,
{
    /// Wrap a response body. Bodies that are already complete (e.g. empty)
    /// finish immediately.
    pub fn attach(response: Response<B>, observers: ResponseObservers) -> Response<Self> {
        let status = response.status().as_u16();
        let (parts, inner) = response.into_parts();
        let observers = if inner.is_end_stream() {
            observers.finished(status);
            None
        } else {
            Some(observers)
        };
        Response::from_parts(
            parts,
            LoggedBody {
                inner,
                observers,
                status,
            },
        )
    }
}

impl<B> HttpBody for LoggedBody<B>
where
    B: HttpBody,
    B::Error: fmt::Display,
{
    type Data = B::Data;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let mut this = self.project();
        let polled = ready!(this.inner.as_mut().poll_frame(cx));

        match &polled {
            Some(Ok(_)) => {
                if this.inner.is_end_stream() {
                    if let Some(observers) = this.observers.take() {
                        observers.finished(*this.status);
                    }
                }
            }
            Some(Err(err)) => {
                if let Some(observers) = this.observers.take() {
                    observers.failed(&err.to_string());
                }
            }
            None => {
                if let Some(observers) = this.observers.take() {
                    observers.finished(*this.status);
                }
            }
        }

        Poll::Ready(polled)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl<B> fmt::Debug for LoggedBody<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggedBody")
            .field("status", &self.status)
            .field("pending", &self.observers.is_some())
            .finish_non_exhaustive()
    }
}

//! Span-carrying stream wrapper.
//!
//! Without this, a span created around `provider.stream()` would close as soon
//! as the stream was constructed, long before any event arrived.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use pin_project_lite::pin_project;

pin_project! {
    /// A stream that enters `span` every time it is polled.
    pub struct StreamInSpan<S> {
        #[pin]
        inner: S,
        span: tracing::Span,
    }
}

impl<S> StreamInSpan<S> {
    pub fn new(inner: S, span: tracing::Span) -> Self {
        Self { inner, span }
    }
}

impl<S: Stream> Stream for StreamInSpan<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        let _enter = this.span.enter();
        this.inner.poll_next(cx)
    }
}

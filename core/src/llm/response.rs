use alloc::string::String;
use core::{
    future::{Future, IntoFuture},
    mem,
    pin::Pin,
    task::{Context, Poll},
};
use futures_core::Stream;
use pin_project_lite::pin_project;

use super::LLMResponse;

pin_project! {
    /// [`LLMResponse`] implementation over a provider's raw fragment stream.
    ///
    /// Empty fragments are dropped, everything else is surfaced in arrival order while a copy is
    /// accumulated so that awaiting the response yields the full text. The stream ends after the
    /// first error.
    pub struct TextStream<S, E> {
        #[pin]
        inner: S,
        collected: String,
        stream_error: Option<E>,
        finished: bool,
    }
}

impl<S, E> TextStream<S, E>
where
    S: Stream<Item = Result<String, E>>,
    E: core::error::Error,
{
    /// Creates a new text stream adapter.
    #[must_use]
    pub const fn new(stream: S) -> Self {
        Self {
            inner: stream,
            collected: String::new(),
            stream_error: None,
            finished: false,
        }
    }

    /// Text surfaced so far.
    #[must_use]
    pub fn collected(&self) -> &str {
        &self.collected
    }
}

impl<S, E> Stream for TextStream<S, E>
where
    S: Stream<Item = Result<String, E>>,
    E: core::error::Error,
{
    type Item = Result<String, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            if *this.finished {
                return Poll::Ready(None);
            }

            if let Some(err) = this.stream_error.take() {
                *this.finished = true;
                return Poll::Ready(Some(Err(err)));
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(text))) => {
                    if text.is_empty() {
                        continue;
                    }
                    this.collected.push_str(&text);
                    return Poll::Ready(Some(Ok(text)));
                }
                Poll::Ready(Some(Err(err))) => {
                    *this.stream_error = Some(err);
                }
                Poll::Ready(None) => {
                    *this.finished = true;
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl<S, E> LLMResponse for TextStream<S, E>
where
    S: Stream<Item = Result<String, E>> + Send,
    E: core::error::Error + Send + Sync + 'static,
{
    type Error = E;
}

pin_project! {
    /// Future returned when awaiting a [`TextStream`].
    pub struct TextFuture<S, E> {
        #[pin]
        response: Option<TextStream<S, E>>,
    }
}

impl<S, E> Future for TextFuture<S, E>
where
    S: Stream<Item = Result<String, E>>,
    E: core::error::Error,
{
    type Output = Result<String, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();
        let mut response = this.response.as_mut().as_pin_mut().map_or_else(
            || panic!("response future already completed"),
            |stream| stream,
        );

        loop {
            match response.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(_))) => {}
                Poll::Ready(Some(Err(err))) => {
                    this.response.set(None);
                    return Poll::Ready(Err(err));
                }
                Poll::Ready(None) => {
                    let projection = response.as_mut().project();
                    let collected = mem::take(projection.collected);
                    this.response.set(None);
                    return Poll::Ready(Ok(collected));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl<S, E> IntoFuture for TextStream<S, E>
where
    S: Stream<Item = Result<String, E>>,
    E: core::error::Error,
{
    type Output = Result<String, E>;
    type IntoFuture = TextFuture<S, E>;

    fn into_future(self) -> Self::IntoFuture {
        TextFuture {
            response: Some(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::ToString, vec, vec::Vec};
    use core::fmt;

    use futures_lite::{StreamExt, stream};

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    struct Broken;

    impl fmt::Display for Broken {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("broken")
        }
    }

    impl core::error::Error for Broken {}

    fn fragments(
        items: Vec<Result<&str, Broken>>,
    ) -> TextStream<impl Stream<Item = Result<String, Broken>>, Broken> {
        TextStream::new(stream::iter(
            items.into_iter().map(|item| item.map(ToString::to_string)),
        ))
    }

    #[tokio::test]
    async fn yields_fragments_in_order_and_skips_empty_ones() {
        let stream = fragments(vec![Ok("Hel"), Ok(""), Ok("lo"), Ok(" world")]);
        let collected: Vec<_> = stream.map(Result::unwrap).collect().await;
        assert_eq!(collected, vec!["Hel", "lo", " world"]);
    }

    #[tokio::test]
    async fn awaiting_concatenates_everything() {
        let stream = fragments(vec![Ok("Hel"), Ok("lo"), Ok(" world")]);
        assert_eq!(stream.await.unwrap(), "Hello world");
    }

    #[tokio::test]
    async fn stream_ends_after_first_error() {
        let mut stream = fragments(vec![Ok("partial"), Err(Broken), Ok("never")]);
        assert_eq!(stream.next().await, Some(Ok("partial".to_string())));
        assert_eq!(stream.next().await, Some(Err(Broken)));
        assert_eq!(stream.next().await, None);
        assert_eq!(stream.collected(), "partial");
    }

    #[tokio::test]
    async fn awaiting_surfaces_errors() {
        let stream = fragments(vec![Ok("partial"), Err(Broken)]);
        assert_eq!(stream.await, Err(Broken));
    }
}

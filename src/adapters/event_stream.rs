//! SSE response body fed by a producer task.
//!
//! The handler returns the [`CompletionStream`] half as the response body and
//! moves the [`CompletionStreamSender`] into a spawned task. Events reach the
//! wire in send order. When the client goes away the receiver is dropped and
//! every further send fails with [`Disconnected`], which stops the producer.

use axum::{
    body::Body,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::Stream;
use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::domain::event::{word_deltas, CompletionEvent};

/// The receiving side of the stream has been dropped
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("client disconnected")]
pub struct Disconnected;

/// Response body half
pub struct CompletionStream {
    inner: ReceiverStream<Bytes>,
}

impl CompletionStream {
    /// Create a channel pair for building a completion stream
    pub fn channel(buffer: usize) -> (CompletionStreamSender, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (
            CompletionStreamSender { sender: tx },
            Self {
                inner: ReceiverStream::new(rx),
            },
        )
    }
}

impl Stream for CompletionStream {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner)
            .poll_next(cx)
            .map(|chunk| chunk.map(Ok))
    }
}

impl IntoResponse for CompletionStream {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from_stream(self));
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/event-stream"),
        );
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        response
    }
}

/// Producer half
#[derive(Clone)]
pub struct CompletionStreamSender {
    sender: mpsc::Sender<Bytes>,
}

impl CompletionStreamSender {
    /// Send one event
    pub async fn send(&self, event: CompletionEvent) -> Result<(), Disconnected> {
        self.send_raw(event.encode()).await
    }

    /// Send bytes that are already SSE-framed
    pub async fn send_raw(&self, bytes: Bytes) -> Result<(), Disconnected> {
        self.sender.send(bytes).await.map_err(|_| Disconnected)
    }

    /// Stream `text` one word per event, pausing `delay` after each word.
    pub async fn send_words(&self, text: &str, delay: Duration) -> Result<(), Disconnected> {
        for event in word_deltas(text) {
            self.send(event).await?;
            self.pause(delay).await?;
        }
        Ok(())
    }

    /// Keep-alive delta, stop delta, then the `[DONE]` sentinel
    pub async fn finish(&self) -> Result<(), Disconnected> {
        self.send(CompletionEvent::keep_alive()).await?;
        self.terminate().await
    }

    /// Stop delta and `[DONE]` sentinel only
    pub async fn terminate(&self) -> Result<(), Disconnected> {
        self.send(CompletionEvent::Stop).await?;
        self.send(CompletionEvent::Done).await
    }

    /// Sleep for `delay`, returning early if the client disconnects
    pub async fn pause(&self, delay: Duration) -> Result<(), Disconnected> {
        if delay.is_zero() {
            return Ok(());
        }
        tokio::select! {
            _ = tokio::time::sleep(delay) => Ok(()),
            _ = self.sender.closed() => Err(Disconnected),
        }
    }

    /// Resolves once the client has gone away
    pub async fn closed(&self) {
        self.sender.closed().await
    }

    /// Check if the receiver is closed
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

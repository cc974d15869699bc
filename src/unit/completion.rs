// ABOUTME: One-shot completion handles for deferred lookups.
// ABOUTME: Consumed on use, so an outcome can only ever be delivered once.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::resolver::ResolveError;

/// Outcome of one lookup: the serialized metadata document or the resolver's error.
pub type ImageInfoResult = Result<String, ResolveError>;

type Callback = Box<dyn FnOnce(Option<String>, Option<String>) + Send + 'static>;

enum Sink {
    Callback(Callback),
    Channel(oneshot::Sender<ImageInfoResult>),
}

/// Where a finished lookup's outcome goes.
#[must_use = "a completion that is never fired leaves its caller waiting"]
pub struct Completion {
    sink: Sink,
}

impl Completion {
    /// Error-first callback.
    ///
    /// Called with `(None, Some(payload))` on success and `(Some(message), None)`
    /// on failure. Never both, never neither.
    pub fn callback<F>(f: F) -> Self
    where
        F: FnOnce(Option<String>, Option<String>) + Send + 'static,
    {
        Self {
            sink: Sink::Callback(Box::new(f)),
        }
    }

    /// Completion that resolves an awaitable receiver.
    pub fn channel() -> (Self, CompletionReceiver) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                sink: Sink::Channel(tx),
            },
            CompletionReceiver { rx },
        )
    }

    /// Fire the completion. Consumes the handle.
    pub fn complete(self, outcome: ImageInfoResult) {
        match self.sink {
            Sink::Callback(callback) => match outcome {
                Ok(payload) => callback(None, Some(payload)),
                Err(err) => callback(Some(err.into_message()), None),
            },
            Sink::Channel(tx) => {
                if tx.send(outcome).is_err() {
                    tracing::debug!("Completion receiver dropped before delivery");
                }
            }
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.sink {
            Sink::Callback(_) => "callback",
            Sink::Channel(_) => "channel",
        };
        f.debug_struct("Completion").field("sink", &kind).finish()
    }
}

/// Receiving half of [`Completion::channel`].
///
/// Resolves to an error if the lookup was abandoned, which only happens when
/// the host is torn down with work still in flight.
#[derive(Debug)]
pub struct CompletionReceiver {
    rx: oneshot::Receiver<ImageInfoResult>,
}

impl CompletionReceiver {
    /// Take the outcome if it has already been delivered.
    pub fn try_take(&mut self) -> Option<ImageInfoResult> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(abandoned())),
        }
    }
}

impl Future for CompletionReceiver {
    type Output = ImageInfoResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(abandoned())))
    }
}

fn abandoned() -> ResolveError {
    ResolveError::new("lookup abandoned before completion")
}

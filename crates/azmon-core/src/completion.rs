//! Completion handles returned by backends and by the gateway
//!
//! Backends answer a partition either with a deferred single response or
//! with a live stream of responses. Both shapes are carried by
//! [`Completion`]; the gateway hands the same union back to its caller as
//! [`CombinedResult`].

use std::fmt;
use std::future::Future;

use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{self, BoxStream, Stream, StreamExt};

use crate::error::BackendResult;
use crate::models::QueryResponse;

/// Stream of responses emitted by a live backend
pub type LiveStream = BoxStream<'static, BackendResult<QueryResponse>>;

/// How a backend (or the gateway) delivers query results
pub enum Completion {
    /// Exactly one response, available later
    Deferred(BoxFuture<'static, BackendResult<QueryResponse>>),
    /// Zero or more responses over time; the stream may stay open
    Live(LiveStream),
}

/// Result handed to callers of the gateway
pub type CombinedResult = Completion;

impl Completion {
    /// Wrap a future producing a single response
    pub fn deferred<F>(fut: F) -> Self
    where
        F: Future<Output = BackendResult<QueryResponse>> + Send + 'static,
    {
        Completion::Deferred(fut.boxed())
    }

    /// Wrap a stream of responses
    pub fn live<S>(stream: S) -> Self
    where
        S: Stream<Item = BackendResult<QueryResponse>> + Send + 'static,
    {
        Completion::Live(stream.boxed())
    }

    /// An already-resolved response
    pub fn ready(response: QueryResponse) -> Self {
        Completion::Deferred(future::ready(Ok(response)).boxed())
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Completion::Live(_))
    }

    /// Resolve to the first response only.
    ///
    /// Later emissions of a live stream are discarded and the stream is
    /// dropped. A stream that ends without emitting yields an empty response.
    pub async fn first(self) -> BackendResult<QueryResponse> {
        match self {
            Completion::Deferred(fut) => fut.await,
            Completion::Live(mut stream) => match stream.next().await {
                Some(result) => result,
                None => Ok(QueryResponse::empty()),
            },
        }
    }

    /// View either shape as a stream; a deferred response becomes a
    /// single-item stream.
    pub fn into_stream(self) -> LiveStream {
        match self {
            Completion::Deferred(fut) => stream::once(fut).boxed(),
            Completion::Live(stream) => stream,
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Completion::Deferred(_) => f.write_str("Completion::Deferred(..)"),
            Completion::Live(_) => f.write_str("Completion::Live(..)"),
        }
    }
}

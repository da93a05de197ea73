//! The interception shim.
//!
//! [`ResponseInterceptor`] wraps a [`ResponseSink`] and exposes the same
//! `write`/`finish` shape. Nothing reaches the wrapped sink before `finish`:
//! the rewrite needs the complete document, so every write is buffered and
//! headers stay open until the orchestrator completes the response.
//!
//! ```ignore
//! let mut response = ResponseInterceptor::new(sink, options);
//! response.write("<html>…", ());
//! response.finish(Payload::Absent, ())?;
//! ```

use super::rewrite::Orchestrator;
use super::{
    CssReducer, LightningReducer, Outcome, Payload, PurgeError, PurgeOptions, ResponseBuffer,
    ResponseSink,
};

/// A response whose body is collected, purified, then sent in one go.
pub struct ResponseInterceptor<S, R = LightningReducer> {
    sink: S,
    options: PurgeOptions,
    reducer: R,
    buffer: ResponseBuffer,
}

impl<S: ResponseSink> ResponseInterceptor<S> {
    /// Wrap `sink` with the default reducer.
    pub fn new(sink: S, options: PurgeOptions) -> Self {
        Self::with_reducer(sink, options, LightningReducer)
    }
}

impl<S: ResponseSink, R: CssReducer> ResponseInterceptor<S, R> {
    /// Wrap `sink` with a custom reducer.
    pub fn with_reducer(sink: S, options: PurgeOptions, reducer: R) -> Self {
        Self {
            sink,
            options,
            reducer,
            buffer: ResponseBuffer::new(),
        }
    }

    /// Everything collected so far.
    pub fn buffer(&self) -> &ResponseBuffer {
        &self.buffer
    }

    /// Buffer one chunk. The wrapped sink is not touched.
    ///
    /// Trailing args of intermediate writes have nowhere to go once the
    /// chunks are merged, so they are dropped.
    pub fn write(&mut self, payload: impl Into<Payload>, _args: S::Args) {
        self.buffer.accept(payload.into());
    }

    /// Buffer the last chunk, rewrite, and finish the wrapped sink once
    /// with `args`.
    ///
    /// Consumes the interceptor: a response cannot be finished twice.
    pub fn finish(self, payload: impl Into<Payload>, args: S::Args) -> Result<Outcome, PurgeError> {
        let Self {
            sink,
            options,
            reducer,
            mut buffer,
        } = self;

        buffer.accept(payload.into());
        Orchestrator::new(&options, &reducer).complete(sink, buffer.into_string(), args)
    }
}

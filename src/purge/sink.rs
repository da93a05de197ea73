//! The response capability the interceptor wraps.
//!
//! | Sink                 | Transport                                   |
//! |----------------------|---------------------------------------------|
//! | [`MemorySink`]       | In-memory recorder (tests, embedding)       |
//! | [`WriterSink`]       | Any `io::Write` (files, stdout)             |
//! | `serve::HttpSink`    | `tiny_http` request (dev server)            |

use std::io::{self, Write};

use super::Payload;

/// A response that can be written to incrementally and then finished.
///
/// `Args` carries the trailing arguments of a call (an encoding, a callback
/// token, ...). The interceptor forwards the ones given to `finish`
/// unchanged.
pub trait ResponseSink {
    type Args;

    /// Incremental write. May commit headers.
    fn write(&mut self, payload: Payload, args: Self::Args) -> io::Result<()>;

    /// Final write; completes the response.
    fn finish(&mut self, payload: Payload, args: Self::Args) -> io::Result<()>;

    /// Set a response header. Callers check [`headers_sent`](Self::headers_sent) first.
    fn set_header(&mut self, name: &str, value: &str);

    /// Whether headers have already gone out.
    fn headers_sent(&self) -> bool;
}

impl<S: ResponseSink + ?Sized> ResponseSink for &mut S {
    type Args = S::Args;

    fn write(&mut self, payload: Payload, args: Self::Args) -> io::Result<()> {
        (**self).write(payload, args)
    }

    fn finish(&mut self, payload: Payload, args: Self::Args) -> io::Result<()> {
        (**self).finish(payload, args)
    }

    fn set_header(&mut self, name: &str, value: &str) {
        (**self).set_header(name, value);
    }

    fn headers_sent(&self) -> bool {
        (**self).headers_sent()
    }
}

// ============================================================================
// MemorySink
// ============================================================================

/// Records every call, with streaming-response header semantics: the first
/// `write` or `finish` commits headers, and later `set_header` calls are
/// counted as rejected instead of applied.
#[derive(Debug)]
pub struct MemorySink<A = ()> {
    headers: Vec<(String, String)>,
    writes: Vec<(Payload, A)>,
    finished: Option<(Payload, A)>,
    finish_calls: usize,
    headers_sent: bool,
    rejected_headers: usize,
}

impl<A> Default for MemorySink<A> {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            writes: Vec::new(),
            finished: None,
            finish_calls: 0,
            headers_sent: false,
            rejected_headers: 0,
        }
    }
}

impl<A> MemorySink<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose headers already went out.
    pub fn with_headers_sent() -> Self {
        Self {
            headers_sent: true,
            ..Self::default()
        }
    }

    /// Last value set for `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn writes(&self) -> &[(Payload, A)] {
        &self.writes
    }

    /// Payload and trailing args of the `finish` call.
    pub fn finished(&self) -> Option<&(Payload, A)> {
        self.finished.as_ref()
    }

    pub fn finish_calls(&self) -> usize {
        self.finish_calls
    }

    /// `set_header` calls made after headers were sent.
    pub fn rejected_headers(&self) -> usize {
        self.rejected_headers
    }

    /// Everything delivered so far, as text.
    pub fn body(&self) -> String {
        self.writes
            .iter()
            .map(|(payload, _)| payload)
            .chain(self.finished.iter().map(|(payload, _)| payload))
            .filter_map(Payload::as_text)
            .collect()
    }
}

impl<A> ResponseSink for MemorySink<A> {
    type Args = A;

    fn write(&mut self, payload: Payload, args: A) -> io::Result<()> {
        self.headers_sent = true;
        self.writes.push((payload, args));
        Ok(())
    }

    fn finish(&mut self, payload: Payload, args: A) -> io::Result<()> {
        self.headers_sent = true;
        self.finish_calls += 1;
        self.finished = Some((payload, args));
        Ok(())
    }

    fn set_header(&mut self, name: &str, value: &str) {
        if self.headers_sent {
            self.rejected_headers += 1;
            return;
        }
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn headers_sent(&self) -> bool {
        self.headers_sent
    }
}

// ============================================================================
// WriterSink
// ============================================================================

/// Streams payloads straight into an `io::Write`.
///
/// There is no header block on the wire; headers are kept so callers can
/// report them.
pub struct WriterSink<W: Write> {
    writer: W,
    headers: Vec<(String, String)>,
    started: bool,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            headers: Vec::new(),
            started: false,
        }
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResponseSink for WriterSink<W> {
    type Args = ();

    fn write(&mut self, payload: Payload, _args: ()) -> io::Result<()> {
        self.started = true;
        self.writer.write_all(&payload.into_bytes())
    }

    fn finish(&mut self, payload: Payload, _args: ()) -> io::Result<()> {
        self.started = true;
        self.writer.write_all(&payload.into_bytes())?;
        self.writer.flush()
    }

    fn set_header(&mut self, name: &str, value: &str) {
        if !self.started {
            self.headers.push((name.to_string(), value.to_string()));
        }
    }

    fn headers_sent(&self) -> bool {
        self.started
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_commits_headers_on_write() {
        let mut sink = MemorySink::<()>::new();
        sink.set_header("content-type", "text/html");
        assert!(!sink.headers_sent());

        sink.write("a".into(), ()).unwrap();
        assert!(sink.headers_sent());

        sink.set_header("content-length", "1");
        assert_eq!(sink.rejected_headers(), 1);
        assert_eq!(sink.header("Content-Type"), Some("text/html"));
        assert_eq!(sink.header("content-length"), None);

        sink.finish(Payload::Absent, ()).unwrap();
        assert_eq!(sink.body(), "a");
        assert_eq!(sink.finish_calls(), 1);
    }

    #[test]
    fn test_memory_sink_records_args() {
        let mut sink = MemorySink::<&str>::new();
        sink.finish("x".into(), "utf8").unwrap();
        assert_eq!(sink.finished(), Some(&(Payload::from("x"), "utf8")));
    }

    #[test]
    fn test_writer_sink() {
        let mut sink = WriterSink::new(Vec::new());
        sink.set_header("content-length", "6");
        sink.write("abc".into(), ()).unwrap();
        sink.set_header("x-late", "1");
        sink.finish(b"def".to_vec().into(), ()).unwrap();

        assert!(sink.headers_sent());
        assert_eq!(sink.headers().len(), 1);
        assert_eq!(sink.into_inner(), b"abcdef");
    }

    fn complete<S: ResponseSink<Args = ()>>(mut sink: S) {
        sink.set_header("a", "1");
        sink.finish("done".into(), ()).unwrap();
    }

    #[test]
    fn test_forwarding_through_mut_ref() {
        let mut sink = MemorySink::<()>::new();
        complete(&mut sink);
        assert_eq!(sink.header("a"), Some("1"));
        assert_eq!(sink.body(), "done");
    }
}

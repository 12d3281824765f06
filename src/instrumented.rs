//! A response writer that remembers what went through it.

use std::io;

use http::{HeaderMap, StatusCode};

use crate::response::{Flush, ResponseWriter};

/// Wraps a sink and records the status and the number of body bytes written.
///
/// The wrapped sink is borrowed exclusively for the life of the request. A
/// body write (or flush) before any explicit status sets `200 OK` first, so
/// [`status`](Self::status) is only `None` when nothing was sent at all.
///
/// ```rust
/// use tollgate::{BufferedResponse, InstrumentedWriter, ResponseWriter};
///
/// let mut sink = BufferedResponse::new();
/// let mut w = InstrumentedWriter::new(&mut sink);
/// w.write_all(b"hello").unwrap();
/// assert_eq!(w.status(), Some(http::StatusCode::OK));
/// assert_eq!(w.size(), 5);
/// ```
pub struct InstrumentedWriter<'a> {
    inner: &'a mut dyn ResponseWriter,
    status: Option<StatusCode>,
    size: usize,
}

impl<'a> InstrumentedWriter<'a> {
    pub fn new(inner: &'a mut dyn ResponseWriter) -> Self {
        Self { inner, status: None, size: 0 }
    }

    /// Last status set through this writer.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Body bytes accepted by the wrapped sink so far.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether a status has been set (explicitly or by a first write).
    pub fn written(&self) -> bool {
        self.status.is_some()
    }

    /// Canonical reason phrase of the recorded status, `""` when unset.
    pub fn status_text(&self) -> &'static str {
        self.status.and_then(|s| s.canonical_reason()).unwrap_or("")
    }

    /// Flushes the wrapped sink if it can flush; a no-op otherwise.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.inner.flusher().is_none() {
            return Ok(());
        }
        if !self.written() {
            self.set_status(StatusCode::OK);
        }
        match self.inner.flusher() {
            Some(f) => f.flush(),
            None => Ok(()),
        }
    }
}

impl ResponseWriter for InstrumentedWriter<'_> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    // Every call is recorded, even when the wrapped sink has already
    // committed and ignores it.
    fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
        self.inner.set_status(status);
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.written() {
            self.set_status(StatusCode::OK);
        }
        let n = self.inner.write(buf)?;
        self.size += n;
        Ok(n)
    }

    fn flusher(&mut self) -> Option<&mut dyn Flush> {
        if self.inner.flusher().is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl Flush for InstrumentedWriter<'_> {
    fn flush(&mut self) -> io::Result<()> {
        InstrumentedWriter::flush(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::BufferedResponse;

    /// A sink without flushing and with a tiny write window.
    #[derive(Default)]
    struct Trickle {
        headers: HeaderMap,
        statuses: Vec<StatusCode>,
        body: Vec<u8>,
    }

    impl ResponseWriter for Trickle {
        fn headers_mut(&mut self) -> &mut HeaderMap {
            &mut self.headers
        }

        fn set_status(&mut self, status: StatusCode) {
            self.statuses.push(status);
        }

        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(3);
            self.body.extend_from_slice(&buf[..n]);
            Ok(n)
        }
    }

    struct Broken;

    impl ResponseWriter for Broken {
        fn headers_mut(&mut self) -> &mut HeaderMap {
            unreachable!()
        }

        fn set_status(&mut self, _: StatusCode) {}

        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }
    }

    #[test]
    fn fresh_writer_is_unset() {
        let mut sink = BufferedResponse::new();
        let w = InstrumentedWriter::new(&mut sink);
        assert!(!w.written());
        assert_eq!(w.status(), None);
        assert_eq!(w.size(), 0);
        assert_eq!(w.status_text(), "");
    }

    #[test]
    fn first_write_defaults_to_ok_and_sizes_add_up() {
        let mut sink = Trickle::default();
        let mut w = InstrumentedWriter::new(&mut sink);
        w.write_all(b"hello").unwrap();
        w.write_all(b", world").unwrap();
        assert_eq!(w.status(), Some(StatusCode::OK));
        assert_eq!(w.size(), 12);
        assert_eq!(w.status_text(), "OK");
        drop(w);
        // Implicit 200 happens once, not per write.
        assert_eq!(sink.statuses, vec![StatusCode::OK]);
        assert_eq!(sink.body, b"hello, world");
    }

    #[test]
    fn explicit_status_is_not_overridden_by_write() {
        let mut sink = Trickle::default();
        let mut w = InstrumentedWriter::new(&mut sink);
        w.set_status(StatusCode::CREATED);
        w.write_all(b"{}").unwrap();
        assert_eq!(w.status(), Some(StatusCode::CREATED));
        drop(w);
        assert_eq!(sink.statuses, vec![StatusCode::CREATED]);
    }

    #[test]
    fn later_status_is_recorded() {
        let mut sink = BufferedResponse::new();
        let mut w = InstrumentedWriter::new(&mut sink);
        w.set_status(StatusCode::OK);
        w.set_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(w.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        drop(w);
        assert_eq!(sink.status(), Some(StatusCode::OK));
    }

    #[test]
    fn write_errors_propagate_unchanged() {
        let mut sink = Broken;
        let mut w = InstrumentedWriter::new(&mut sink);
        let err = w.write(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(w.size(), 0);
    }

    #[test]
    fn flush_without_capability_is_noop() {
        let mut sink = Trickle::default();
        let mut w = InstrumentedWriter::new(&mut sink);
        w.flush().unwrap();
        assert!(!w.written());
        assert!(w.flusher().is_none());
    }

    #[test]
    fn flush_defaults_to_ok() {
        let mut sink = BufferedResponse::new();
        let mut w = InstrumentedWriter::new(&mut sink);
        w.flush().unwrap();
        assert_eq!(w.status(), Some(StatusCode::OK));
        drop(w);
        assert_eq!(sink.status(), Some(StatusCode::OK));
    }
}

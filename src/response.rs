//! The output sink handlers write to, and the buffered sink the server uses.
//!
//! A handler never builds a response value. It is handed a
//! `&mut dyn ResponseWriter` and pushes headers, a status and body bytes into
//! it. That is what lets decorators observe a response without the handler
//! cooperating: they slip their own writer in between.

use std::io;

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;
use tracing::debug;

// ── Sink contract ─────────────────────────────────────────────────────────────

/// An HTTP output sink.
///
/// Headers must be set before the status; the status must be set before the
/// body. A `write` with no prior status is the sink's business: most default
/// to `200 OK`.
pub trait ResponseWriter {
    /// Response headers. Mutations after the status is committed are not sent.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Sets the response status.
    fn set_status(&mut self, status: StatusCode);

    /// Appends body bytes, returning how many were accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Flushing capability, if the sink has one.
    fn flusher(&mut self) -> Option<&mut dyn Flush> {
        None
    }

    /// Writes the whole buffer, retrying short writes.
    fn write_all(&mut self, mut buf: &[u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.write(buf) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "failed to write whole response body",
                    ));
                }
                Ok(n) => buf = &buf[n..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// Sinks that can push buffered output to the client early.
pub trait Flush {
    fn flush(&mut self) -> io::Result<()>;
}

/// Adapts a sink's body to [`io::Write`] so encoders can stream into it.
pub(crate) struct Body<'a>(pub(crate) &'a mut dyn ResponseWriter);

impl io::Write for Body<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ── BufferedResponse ──────────────────────────────────────────────────────────

/// A sink that buffers the whole response in memory.
///
/// This is what [`Server`](crate::Server) hands to the dispatch handler, and
/// what tests use to inspect output.
///
/// The first `set_status`, `write` or `flush` commits the status line and
/// headers. Later `set_status` calls are ignored, and header edits after the
/// commit go to a detached map that is never sent.
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    detached: HeaderMap,
    body: BytesMut,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed status, `None` until something was written.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Converts the buffer into a response hyper can send.
    ///
    /// A response nobody wrote to is an empty `200 OK`.
    pub fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(self.body.freeze()));
        *res.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *res.headers_mut() = self.headers;
        res
    }
}

impl ResponseWriter for BufferedResponse {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        if self.status.is_some() {
            &mut self.detached
        } else {
            &mut self.headers
        }
    }

    fn set_status(&mut self, status: StatusCode) {
        match self.status {
            None => self.status = Some(status),
            Some(committed) => {
                debug!(%committed, ignored = %status, "status already committed");
            }
        }
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.status.is_none() {
            self.set_status(StatusCode::OK);
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flusher(&mut self) -> Option<&mut dyn Flush> {
        Some(self)
    }
}

impl Flush for BufferedResponse {
    fn flush(&mut self) -> io::Result<()> {
        if self.status.is_none() {
            self.set_status(StatusCode::OK);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use http::header::{CONTENT_TYPE, LOCATION};
    use http::HeaderValue;

    use super::*;

    #[test]
    fn first_status_wins() {
        let mut res = BufferedResponse::new();
        res.set_status(StatusCode::CREATED);
        res.set_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.status(), Some(StatusCode::CREATED));
    }

    #[test]
    fn write_commits_ok() {
        let mut res = BufferedResponse::new();
        res.write_all(b"hello").unwrap();
        assert_eq!(res.status(), Some(StatusCode::OK));
        assert_eq!(res.body(), b"hello");
    }

    #[test]
    fn headers_after_commit_are_not_sent() {
        let mut res = BufferedResponse::new();
        res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        res.set_status(StatusCode::OK);
        res.headers_mut().insert(LOCATION, HeaderValue::from_static("/late"));

        let inner = res.into_inner();
        assert_eq!(inner.headers().get(CONTENT_TYPE).unwrap(), "text/plain");
        assert!(inner.headers().get(LOCATION).is_none());
    }

    #[test]
    fn untouched_response_is_empty_ok() {
        let inner = BufferedResponse::new().into_inner();
        assert_eq!(inner.status(), StatusCode::OK);
    }

    #[test]
    fn flush_commits_ok() {
        let mut res = BufferedResponse::new();
        res.flusher().unwrap().flush().unwrap();
        assert_eq!(res.status(), Some(StatusCode::OK));
    }
}

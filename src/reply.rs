//! Direct response helpers.
//!
//! Each helper sets its headers, then the status, then writes the body, so the
//! default-200-on-first-write rule never kicks in. Use these when the handler
//! already knows the media type; use [`media::write_by_accept`](crate::media::write_by_accept)
//! when the client decides.

use http::header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use http::{HeaderValue, StatusCode};
use serde::Serialize;
use tracing::warn;

use crate::error::Error;
use crate::media::Media;
use crate::response::{Body, ResponseWriter};

/// Content types the helpers set.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    OctetStream, // application/octet-stream  (binary / file download)
    Text,        // text/plain; charset=utf-8
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
        }
    }

    fn header_value(self) -> HeaderValue {
        HeaderValue::from_static(self.as_str())
    }
}

/// Encodes `value` with `media` under `status`.
pub fn encoded<T: Serialize + ?Sized>(
    w: &mut dyn ResponseWriter,
    media: Media,
    status: StatusCode,
    value: &T,
) -> Result<(), Error> {
    w.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(media.content_type()));
    w.set_status(status);
    media.encode(&mut Body(w), value)
}

/// `application/json` body under `status`.
///
/// ```rust
/// use tollgate::{BufferedResponse, reply};
///
/// let mut res = BufferedResponse::new();
/// reply::json(&mut res, http::StatusCode::OK, &serde_json::json!({"id": 1})).unwrap();
/// assert_eq!(res.body(), b"{\"id\":1}\n");
/// ```
pub fn json<T: Serialize + ?Sized>(w: &mut dyn ResponseWriter, status: StatusCode, value: &T) -> Result<(), Error> {
    encoded(w, Media::Json, status, value)
}

/// Raw `application/octet-stream` body under `status`.
pub fn bytes(w: &mut dyn ResponseWriter, status: StatusCode, body: &[u8]) -> Result<(), Error> {
    w.headers_mut().insert(CONTENT_TYPE, ContentType::OctetStream.header_value());
    w.set_status(status);
    w.write_all(body)?;
    Ok(())
}

/// Status with an empty body.
pub fn status(w: &mut dyn ResponseWriter, status: StatusCode) -> Result<(), Error> {
    w.set_status(status);
    Ok(())
}

/// Writes `err` as a plain-text 500 and hands it back as `Err`, so a handler
/// can `return reply::error(w, err)`.
pub fn error(w: &mut dyn ResponseWriter, err: Error) -> Result<(), Error> {
    write_error(w, &err);
    Err(err)
}

/// Plain-text 500 whose body is exactly `err`'s message.
///
/// A failure to write the body is logged and dropped: the caller is already
/// reporting `err`, which is the one that matters.
pub(crate) fn write_error(w: &mut dyn ResponseWriter, err: &Error) {
    let headers = w.headers_mut();
    headers.insert(CONTENT_TYPE, ContentType::Text.header_value());
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    w.set_status(StatusCode::INTERNAL_SERVER_ERROR);
    if let Err(e) = w.write_all(err.to_string().as_bytes()) {
        warn!(error = %e, original = %err, "failed to write error response");
    }
}

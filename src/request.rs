//! Incoming HTTP request type.

use bytes::Bytes;
use http::header::AsHeaderName;
use http::{HeaderMap, Method, Uri};

use crate::context::{Context, Key, keys};
use crate::identity::Identity;
use crate::logger::Logger;
use crate::middleware::Auditor;

/// An incoming HTTP request with its body fully read, plus request-scoped
/// storage.
///
/// Decorators enrich a request by value: [`with_value`](Self::with_value)
/// consumes the request and hands back one carrying the extra entry.
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    context: Context,
}

impl Request {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self { method, uri, headers, body, context: Context::new() }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &Bytes { &self.body }
    pub fn context(&self) -> &Context { &self.context }

    /// Case-insensitive header lookup. Values that are not visible ASCII
    /// read as absent.
    pub fn header(&self, name: impl AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns this request carrying `value` under `key`.
    #[must_use]
    pub fn with_value<T>(self, key: Key<T>, value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        let context = self.context.with_value(key, value);
        Self { context, ..self }
    }

    pub fn value<T: 'static>(&self, key: Key<T>) -> Option<&T> {
        self.context.get(key)
    }

    // ── Accessors for what the built-in decorators store ─────────────────────

    pub fn logger(&self) -> Option<&Logger> {
        self.value(keys::LOGGER)
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.value(keys::TRACE_ID).map(String::as_str)
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.value(keys::CORRELATION_ID).map(String::as_str)
    }

    pub fn token(&self) -> Option<&str> {
        self.value(keys::TOKEN).map(String::as_str)
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.value(keys::IDENTITY)
    }

    pub fn auditor(&self) -> Option<&Auditor> {
        self.value(keys::AUDITOR)
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self::new(parts.method, parts.uri, parts.headers, body)
    }
}

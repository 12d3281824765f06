//! Per-request structured logger.

use std::fmt;

use http::Method;
use tracing::{Span, error, error_span, info};

/// A logger bound to one request.
///
/// Wraps a [`Span`] that carries the request's identifying fields, so
/// every event emitted through it (or inside [`in_scope`](Self::in_scope))
/// is enriched with them. Cloning is cheap and yields the same span.
///
/// The span is declared at `ERROR` so it stays enabled under any level filter
/// that lets the logger's own events through. Its parent is whatever span is
/// current when the decorator runs; the server runs handlers with none, so
/// in production it is a root.
#[derive(Clone, Debug)]
pub struct Logger {
    span: Span,
}

impl Logger {
    /// Logger carrying trace id, method and path.
    pub fn request(tid: &str, method: &Method, path: &str) -> Self {
        let span = error_span!("http", %tid, %method, path);
        Self { span }
    }

    /// Logger carrying trace id, correlation id, method, path and identity token.
    pub fn audited(tid: &str, cid: &str, method: &Method, path: &str, token: &str) -> Self {
        let span = error_span!("http", %tid, %cid, %method, path, token);
        Self { span }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Runs `f` inside the request span; use this to log with extra fields.
    pub fn in_scope<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.span.in_scope(f)
    }

    pub fn info(&self, event: &str) {
        self.in_scope(|| info!("{event}"));
    }

    pub fn error(&self, event: &str, err: &dyn fmt::Display) {
        self.in_scope(|| error!(error = %err, "{event}"));
    }
}

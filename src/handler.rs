//! Fallible handlers, decorators, and the chain that joins them.
//!
//! # Shapes
//!
//! ```text
//! fn(&mut dyn ResponseWriter, Request) -> Result<(), Error>   ← Handler
//! fn(BoxedHandler) -> BoxedHandler                            ← Decorator
//! Dispatch::serve(&mut dyn ResponseWriter, Request)           ← what the server calls
//! ```
//!
//! A [`Handler`] may fail; the server-facing [`Dispatch`] may not. Decorators
//! turn a handler into another handler, and [`compose`] applies a list of them
//! and then [`adapt`]s the result, dropping whatever error is left.
//!
//! # Ordering
//!
//! `compose(h, &[&d1, &d2, &d3])` builds `d1(d2(d3(h)))`. The first decorator
//! listed is the outermost: its "before" logic runs first and its "after"
//! logic runs last.
//!
//! # Who reports errors
//!
//! `adapt` discards errors. A chain must therefore include something that
//! turns errors into responses, normally
//! [`middleware::error_response`](crate::middleware::error_response) or
//! [`middleware::audit`](crate::middleware::audit), which already includes
//! it. `compose` with no decorators is legal; errors from the handler are
//! then silently dropped.

use std::sync::Arc;

use crate::error::Error;
use crate::request::Request;
use crate::response::ResponseWriter;

// ── Handler ───────────────────────────────────────────────────────────────────

/// A request handler that may fail.
///
/// Implemented for every closure or function with the right signature:
///
/// ```rust
/// use tollgate::{Error, Request, ResponseWriter, reply};
///
/// fn hello(w: &mut dyn ResponseWriter, _req: Request) -> Result<(), Error> {
///     reply::bytes(w, http::StatusCode::OK, b"hello")
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    fn serve(&self, w: &mut dyn ResponseWriter, req: Request) -> Result<(), Error>;
}

impl<F> Handler for F
where
    F: Fn(&mut dyn ResponseWriter, Request) -> Result<(), Error> + Send + Sync + 'static,
{
    fn serve(&self, w: &mut dyn ResponseWriter, req: Request) -> Result<(), Error> {
        self(w, req)
    }
}

/// A type-erased handler, shared by every request that reaches it.
pub type BoxedHandler = Arc<dyn Handler>;

/// Erases a handler.
///
/// Decorators build their wrappers through this so closure signatures are
/// inferred from the [`Handler`] bound.
pub fn boxed(handler: impl Handler) -> BoxedHandler {
    Arc::new(handler)
}

// ── Decorator ─────────────────────────────────────────────────────────────────

/// Turns one handler into another.
///
/// Implemented for every `Fn(BoxedHandler) -> BoxedHandler`, which is what
/// the built-in decorators in [`middleware`](crate::middleware) are.
/// A decorator may close over setup-time configuration but must not keep
/// per-request state.
pub trait Decorator: Send + Sync {
    fn decorate(&self, inner: BoxedHandler) -> BoxedHandler;
}

impl<F> Decorator for F
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync,
{
    fn decorate(&self, inner: BoxedHandler) -> BoxedHandler {
        self(inner)
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

/// The infallible, server-facing form of a handler chain.
///
/// Cloning shares the chain.
#[derive(Clone)]
pub struct Dispatch(BoxedHandler);

impl Dispatch {
    /// Runs the chain. Any error that escapes it is discarded here.
    pub fn serve(&self, w: &mut dyn ResponseWriter, req: Request) {
        let _ = self.0.serve(w, req);
    }
}

/// Converts a fallible handler into a [`Dispatch`] by discarding its error.
pub fn adapt(handler: impl Handler) -> Dispatch {
    Dispatch(boxed(handler))
}

/// Wraps `handler` in `decorators`, first listed outermost, and adapts the
/// result for the server.
///
/// ```rust
/// use tollgate::middleware::{error_response, log};
/// use tollgate::{Error, Request, ResponseWriter, compose};
///
/// fn handler(_w: &mut dyn ResponseWriter, _req: Request) -> Result<(), Error> {
///     Err(Error::msg("boom"))
/// }
///
/// let app = compose(handler, &[&log, &error_response]);
/// ```
pub fn compose(handler: impl Handler, decorators: &[&dyn Decorator]) -> Dispatch {
    let chain = decorators
        .iter()
        .rev()
        .fold(boxed(handler), |current, decorator| decorator.decorate(current));
    Dispatch(chain)
}

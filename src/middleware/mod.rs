//! Middleware layer.
//!
//! Each cross-cutting concern is one [`Decorator`](crate::Decorator):
//!
//! - [`error_response`]: turns a handler error into a plain-text 500 and
//!   passes the error on.
//! - [`log`]: trace id, request logger, and a `Request`/`Response` event
//!   pair with status, size and latency.
//! - [`audit`]: everything `log` does, plus correlation id propagation,
//!   identity attribution and an [`Auditor`]; errors are translated
//!   internally.
//!
//! Stack them with [`compose`](crate::compose), first listed outermost:
//!
//! ```rust,no_run
//! use tollgate::middleware::{error_response, log};
//! # use tollgate::{Error, Request, ResponseWriter};
//! # fn handler(_: &mut dyn ResponseWriter, _: Request) -> Result<(), Error> { Ok(()) }
//!
//! let app = tollgate::compose(handler, &[&log, &error_response]);
//! ```

mod audit;
mod error;
mod log;

use std::time::Instant;

use http::HeaderName;
use tracing::info;

use crate::instrumented::InstrumentedWriter;
use crate::logger::Logger;

pub use audit::{Auditor, audit};
pub use error::error_response;
pub use log::log;

/// Response header carrying the trace id the server assigned.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Request and response header carrying the caller's correlation id.
pub const CORRELATION_ID_HEADER: HeaderName = HeaderName::from_static("x-correlation-id");

/// Event names emitted by the logging and audit decorators.
pub mod events {
    pub const REQUEST: &str = "tollgate.http.Request";
    pub const REQUEST_ERR: &str = "tollgate.http.RequestErr";
    pub const RESPONSE: &str = "tollgate.http.Response";
}

/// Fresh trace id (UUID v4).
pub fn new_trace_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn log_response(logger: &Logger, w: &InstrumentedWriter<'_>, start: Instant) {
    logger.in_scope(|| {
        info!(
            status = %w.status_text(),
            size = w.size(),
            request_time = ?start.elapsed(),
            "{}",
            events::RESPONSE
        );
    });
}

use std::fmt;
use std::time::Instant;

use http::HeaderValue;

use super::{CORRELATION_ID_HEADER, REQUEST_ID_HEADER, error_response, events, log_response, new_trace_id};
use crate::context::keys;
use crate::error::Error;
use crate::handler::{BoxedHandler, Handler, boxed};
use crate::identity::Identity;
use crate::instrumented::InstrumentedWriter;
use crate::logger::Logger;
use crate::request::Request;
use crate::response::ResponseWriter;

/// Per-request logging facade that attributes every entry.
///
/// Carries the trace id, the caller's correlation id and the resolved
/// [`Identity`]; its logger's span holds all three, so handlers log through
/// it instead of through a bare [`Logger`].
#[derive(Clone, Debug)]
pub struct Auditor {
    tid: String,
    cid: String,
    logger: Logger,
    identity: Identity,
}

impl Auditor {
    pub fn new(tid: String, cid: String, logger: Logger, identity: Identity) -> Self {
        Self { tid, cid, logger, identity }
    }

    pub fn trace_id(&self) -> &str { &self.tid }
    pub fn correlation_id(&self) -> &str { &self.cid }
    pub fn identity(&self) -> &Identity { &self.identity }
    pub fn logger(&self) -> &Logger { &self.logger }

    pub fn in_scope<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.logger.in_scope(f)
    }

    pub fn info(&self, event: &str) {
        self.logger.info(event);
    }

    pub fn error(&self, event: &str, err: &dyn fmt::Display) {
        self.logger.error(event, err);
    }
}

/// Access logging with attribution.
///
/// Before the inner handler runs:
///
/// - a fresh trace id is echoed in `x-request-id`;
/// - the inbound `x-correlation-id` is echoed back as-is, empty when absent
///   (one is never made up);
/// - trace id, correlation id, identity token, [`Identity`], [`Logger`] and
///   [`Auditor`] are stored in the request.
///
/// The caller is always [`Identity::anonymous`] for now.
///
/// Events are the same as [`log`](super::log), emitted through the auditor.
/// The whole thing is wrapped in [`error_response`], so an unhandled error
/// always becomes a 500 without the caller stacking it separately.
pub fn audit(inner: BoxedHandler) -> BoxedHandler {
    error_response(boxed(move |w: &mut dyn ResponseWriter, req: Request| -> Result<(), Error> {
        audit_handle(&*inner, w, req)
    }))
}

fn audit_handle(inner: &dyn Handler, w: &mut dyn ResponseWriter, req: Request) -> Result<(), Error> {
    let start = Instant::now();
    let tid = new_trace_id();

    let cid_header = req
        .headers()
        .get(CORRELATION_ID_HEADER)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(""));
    // Non-ASCII bytes survive the echo untouched; the stored copy is lossy.
    let cid = String::from_utf8_lossy(cid_header.as_bytes()).into_owned();

    let headers = w.headers_mut();
    headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(&tid)?);
    headers.insert(CORRELATION_ID_HEADER, cid_header);

    let identity = Identity::anonymous();
    let logger = Logger::audited(&tid, &cid, req.method(), req.path(), identity.token());
    let auditor = Auditor::new(tid.clone(), cid.clone(), logger.clone(), identity.clone());
    auditor.info(events::REQUEST);

    let req = req
        .with_value(keys::TRACE_ID, tid)
        .with_value(keys::CORRELATION_ID, cid)
        .with_value(keys::LOGGER, logger)
        .with_value(keys::TOKEN, identity.token().to_owned())
        .with_value(keys::IDENTITY, identity)
        .with_value(keys::AUDITOR, auditor.clone());

    let mut rw = InstrumentedWriter::new(w);
    let result = inner.serve(&mut rw, req);
    if let Err(err) = &result {
        auditor.error(events::REQUEST_ERR, err);
    }
    log_response(auditor.logger(), &rw, start);
    result
}

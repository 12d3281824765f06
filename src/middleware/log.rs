use std::time::Instant;

use super::{events, log_response, new_trace_id};
use crate::context::keys;
use crate::error::Error;
use crate::handler::{BoxedHandler, boxed};
use crate::instrumented::InstrumentedWriter;
use crate::logger::Logger;
use crate::request::Request;
use crate::response::ResponseWriter;

/// Access logging.
///
/// Gives each request a fresh trace id and a [`Logger`] carrying it along
/// with method and path (both stored in the request), logs
/// `tollgate.http.Request`, runs the inner handler against an
/// [`InstrumentedWriter`], and then always logs `tollgate.http.Response` with
/// status text, body size and elapsed time. A handler error is logged as
/// `tollgate.http.RequestErr` and returned unchanged.
pub fn log(inner: BoxedHandler) -> BoxedHandler {
    boxed(move |w: &mut dyn ResponseWriter, req: Request| -> Result<(), Error> {
        let start = Instant::now();
        let tid = new_trace_id();
        let logger = Logger::request(&tid, req.method(), req.path());
        logger.info(events::REQUEST);

        let req = req
            .with_value(keys::TRACE_ID, tid)
            .with_value(keys::LOGGER, logger.clone());

        let mut rw = InstrumentedWriter::new(w);
        let result = inner.serve(&mut rw, req);
        if let Err(err) = &result {
            logger.error(events::REQUEST_ERR, err);
        }
        log_response(&logger, &rw, start);
        result
    })
}

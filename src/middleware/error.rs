use crate::error::Error;
use crate::handler::{BoxedHandler, boxed};
use crate::reply;
use crate::request::Request;
use crate::response::ResponseWriter;

/// Writes any handler error as a `500 Internal Server Error` with the error
/// message as a plain-text body, then returns the same error.
///
/// The error keeps travelling outward so a logging decorator can record it.
/// If writing the error body fails, that failure is logged and dropped.
pub fn error_response(inner: BoxedHandler) -> BoxedHandler {
    boxed(move |w: &mut dyn ResponseWriter, req: Request| -> Result<(), Error> {
        inner.serve(w, req).map_err(|err| {
            reply::write_error(w, &err);
            err
        })
    })
}

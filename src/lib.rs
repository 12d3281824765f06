//! # tollgate
//!
//! Request decorators for HTTP handlers. Every request through the chain is
//! measured, logged and attributed, and the handler does not have to know.
//!
//! ## The contract
//!
//! A handler writes into a [`ResponseWriter`] and may fail:
//!
//! ```text
//! fn(&mut dyn ResponseWriter, Request) -> Result<(), Error>
//! ```
//!
//! A decorator turns one such handler into another. [`compose`] stacks a list
//! of decorators (first listed outermost) and yields a [`Dispatch`], the
//! infallible shape the [`Server`] runs. What tollgate ships:
//!
//! - [`InstrumentedWriter`]: records status and body size of a response
//! - [`middleware::error_response`]: handler error → plain-text 500
//! - [`middleware::log`]: trace id, request logger, access log
//! - [`middleware::audit`]: access log + correlation id + identity + [`middleware::Auditor`]
//! - [`media`]: `Content-Type` / `Accept` driven JSON reading and writing
//! - [`reply`]: direct JSON / bytes / status / error helpers
//!
//! Per-request values travel in the [`Request`] itself. Decorators add them by
//! value, never by mutation, so concurrent requests cannot see each other's.
//!
//! What tollgate does not do: routing, dependency injection, request
//! validation, authentication. Every audited caller is anonymous.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::StatusCode;
//! use tollgate::middleware::audit;
//! use tollgate::{Error, Request, ResponseWriter, Server, compose, media, reply};
//!
//! #[derive(serde::Deserialize, serde::Serialize)]
//! struct Order { item: String }
//!
//! fn create_order(w: &mut dyn ResponseWriter, req: Request) -> Result<(), Error> {
//!     let order: Order = media::read_by_content_type(&req)?;
//!     if let Some(auditor) = req.auditor() {
//!         auditor.info("order.created");
//!     }
//!     reply::json(w, StatusCode::CREATED, &order)
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let app = compose(create_order, &[&audit]);
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//! ```

mod context;
mod error;
mod handler;
mod identity;
mod instrumented;
mod logger;
mod request;
mod response;
mod server;

pub mod media;
pub mod middleware;
pub mod reply;

pub use context::{Context, Key, keys};
pub use error::Error;
pub use handler::{BoxedHandler, Decorator, Dispatch, Handler, adapt, boxed, compose};
pub use identity::Identity;
pub use instrumented::InstrumentedWriter;
pub use logger::Logger;
pub use request::Request;
pub use response::{BufferedResponse, Flush, ResponseWriter};
pub use server::Server;

//! Minimal tollgate demo: one audited JSON endpoint.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -X POST http://localhost:3000/widgets \
//!        -H 'content-type: application/json' \
//!        -H 'accept: application/json' \
//!        -H 'x-correlation-id: demo-1' \
//!        -d '{"name":"sprocket"}'
//!   curl -X POST http://localhost:3000/widgets -H 'content-type: text/plain' -d 'x'

use http::StatusCode;
use serde::{Deserialize, Serialize};
use tollgate::middleware::audit;
use tollgate::{Error, Request, ResponseWriter, Server, compose, media};

#[derive(Deserialize, Serialize)]
struct Widget {
    name: String,
}

// Any error returned here becomes a plain-text 500; audit already wraps
// itself in error_response.
fn create_widget(w: &mut dyn ResponseWriter, req: Request) -> Result<(), Error> {
    let widget: Widget = media::read_by_content_type(&req)?;
    if widget.name.is_empty() {
        return Err(Error::msg("widget name must not be empty"));
    }
    if let Some(auditor) = req.auditor() {
        auditor.in_scope(|| tracing::info!(name = %widget.name, "widget.created"));
    }
    media::write_by_accept(w, &req, StatusCode::CREATED, &widget)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let app = compose(create_widget, &[&audit]);

    Server::bind("0.0.0.0:3000")?.serve(app).await
}

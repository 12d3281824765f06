use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http::StatusCode;
use http::header::CONTENT_TYPE;
use serde::Deserialize;
use tollgate::middleware::{CORRELATION_ID_HEADER, REQUEST_ID_HEADER, audit, error_response, log};
use tollgate::{
    BoxedHandler, BufferedResponse, Error, InstrumentedWriter, Request, ResponseWriter, boxed, compose, media,
};

fn request(headers: &[(&str, &str)], body: &'static [u8]) -> Request {
    let mut b = http::Request::builder().method("POST").uri("/widgets");
    for (k, v) in headers {
        b = b.header(*k, *v);
    }
    b.body(Bytes::from_static(body)).unwrap().into()
}

fn boom(_: &mut dyn ResponseWriter, _: Request) -> Result<(), Error> {
    Err(Error::msg("boom"))
}

// ── Instrumented writer ───────────────────────────────────────────────────────

#[test]
fn first_write_records_ok_and_total_size() {
    let mut sink = BufferedResponse::new();
    let mut w = InstrumentedWriter::new(&mut sink);
    let chunks: [&[u8]; 4] = [b"ab", b"", b"cde", b"f"];
    for chunk in chunks {
        w.write_all(chunk).unwrap();
    }
    assert_eq!(w.status(), Some(StatusCode::OK));
    assert_eq!(w.size(), 6);
}

// ── Composition ───────────────────────────────────────────────────────────────

#[test]
fn decorators_nest_first_outermost() {
    let order = Arc::new(Mutex::new(Vec::new()));

    let mark = |name: &'static str| {
        let order = Arc::clone(&order);
        move |inner: BoxedHandler| -> BoxedHandler {
            let order = Arc::clone(&order);
            boxed(move |w: &mut dyn ResponseWriter, req: Request| -> Result<(), Error> {
                order.lock().unwrap().push(format!("{name}>"));
                let r = inner.serve(w, req);
                order.lock().unwrap().push(format!("<{name}"));
                r
            })
        }
    };
    let (a, b, c) = (mark("a"), mark("b"), mark("c"));

    let app = compose(boom, &[&a, &b, &c, &error_response]);
    app.serve(&mut BufferedResponse::new(), request(&[], b""));

    assert_eq!(*order.lock().unwrap(), ["a>", "b>", "c>", "<c", "<b", "<a"]);
}

#[test]
fn empty_chain_drops_errors_quietly() {
    let mut res = BufferedResponse::new();
    compose(boom, &[]).serve(&mut res, request(&[], b""));
    assert_eq!(res.status(), None);
}

// ── Error translation ─────────────────────────────────────────────────────────

#[test]
fn error_translation_writes_once_and_returns_error() {
    let chain = error_response(boxed(boom));
    let mut res = BufferedResponse::new();

    let err = chain.serve(&mut res, request(&[], b"")).unwrap_err();

    assert_eq!(err.to_string(), "boom");
    assert_eq!(res.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(res.body(), b"boom");
}

#[test]
fn log_then_error_chain_answers_500() {
    let mut res = BufferedResponse::new();
    compose(boom, &[&log, &error_response]).serve(&mut res, request(&[], b""));
    assert_eq!(res.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(res.body(), b"boom");
}

// ── Audit ─────────────────────────────────────────────────────────────────────

#[test]
fn audit_echoes_correlation_and_never_invents_one() {
    let ok = |_: &mut dyn ResponseWriter, _: Request| -> Result<(), Error> { Ok(()) };
    let app = compose(ok, &[&audit]);

    let mut with = BufferedResponse::new();
    app.serve(&mut with, request(&[("x-correlation-id", "abc-123")], b""));
    assert_eq!(with.headers()[CORRELATION_ID_HEADER], "abc-123");
    assert!(!with.headers()[REQUEST_ID_HEADER].is_empty());

    let mut without = BufferedResponse::new();
    app.serve(&mut without, request(&[], b""));
    assert_eq!(without.headers()[CORRELATION_ID_HEADER], "");
    assert!(!without.headers()[REQUEST_ID_HEADER].is_empty());
    assert_ne!(with.headers()[REQUEST_ID_HEADER], without.headers()[REQUEST_ID_HEADER]);
}

#[test]
fn concurrent_audited_requests_are_isolated() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let record = {
        let seen = Arc::clone(&seen);
        move |_: &mut dyn ResponseWriter, req: Request| -> Result<(), Error> {
            let auditor = req.auditor().expect("auditor").clone();
            assert_eq!(req.trace_id(), Some(auditor.trace_id()));
            assert_eq!(req.correlation_id(), Some(auditor.correlation_id()));
            seen.lock().unwrap().push((auditor.trace_id().to_owned(), auditor.correlation_id().to_owned()));
            Ok(())
        }
    };
    let app = compose(record, &[&audit]);

    std::thread::scope(|s| {
        for cid in ["one", "two"] {
            let app = app.clone();
            s.spawn(move || {
                let mut res = BufferedResponse::new();
                app.serve(&mut res, request(&[("x-correlation-id", cid)], b""));
                assert_eq!(res.headers()[CORRELATION_ID_HEADER], cid);
            });
        }
    });

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    let tids: HashSet<_> = seen.iter().map(|(tid, _)| tid.as_str()).collect();
    assert_eq!(tids.len(), 2);
    let cids: HashSet<_> = seen.iter().map(|(_, cid)| cid.as_str()).collect();
    assert_eq!(cids, HashSet::from(["one", "two"]));
}

// ── Content negotiation ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Target {
    a: i32,
}

#[test]
fn reads_json_by_content_type() {
    let req = request(&[("content-type", "application/json")], br#"{"a":1}"#);
    let t: Target = media::read_by_content_type(&req).unwrap();
    assert_eq!(t.a, 1);
}

#[test]
fn plain_text_is_unsupported() {
    let req = request(&[("content-type", "text/plain")], br#"{"a":1}"#);
    let err = media::read_by_content_type::<Target>(&req).unwrap_err();
    assert!(matches!(err, Error::UnsupportedContentType(_)));
    assert!(err.is_negotiation());
}

#[test]
fn audited_handler_round_trips_json() {
    let handler = |w: &mut dyn ResponseWriter, req: Request| -> Result<(), Error> {
        let t: Target = media::read_by_content_type(&req)?;
        media::write_by_accept(w, &req, StatusCode::OK, &serde_json::json!({ "doubled": t.a * 2 }))
    };
    let mut res = BufferedResponse::new();
    compose(handler, &[&audit]).serve(
        &mut res,
        request(&[("content-type", "application/json"), ("accept", "application/json")], br#"{"a":21}"#),
    );

    assert_eq!(res.status(), Some(StatusCode::OK));
    assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(res.body(), b"{\"doubled\":42}\n");
}

#[test]
fn unacceptable_accept_is_a_500_through_audit() {
    let handler = |w: &mut dyn ResponseWriter, req: Request| -> Result<(), Error> {
        media::write_by_accept(w, &req, StatusCode::OK, &1)
    };
    let mut res = BufferedResponse::new();
    compose(handler, &[&audit]).serve(&mut res, request(&[("accept", "text/html")], b""));

    assert_eq!(res.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(res.body(), br#"unsupported accept type: "text/html""#);
}

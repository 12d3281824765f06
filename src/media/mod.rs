//! Body codecs and header-driven content negotiation.
//!
//! Reads pick a codec from `Content-Type`, writes from `Accept`. A header
//! matches a codec when it contains the codec's content type (ASCII case is
//! ignored), so `application/json; charset=utf-8` picks JSON. Nothing falls
//! back: a header that names no registered codec, including `*/*` and a
//! missing header, is an error.
//!
//! Adding a codec means implementing [`Codec`] and adding a [`Media`]
//! variant; [`read_by_content_type`] and [`write_by_accept`] callers do not
//! change.

mod json;

use std::io;

use http::StatusCode;
use http::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::reply;
use crate::request::Request;
use crate::response::ResponseWriter;

pub use json::Json;

/// An encoder/decoder for one media type.
pub trait Codec {
    /// Content type used for matching and for the response header.
    const CONTENT_TYPE: &'static str;

    /// Streams `value` into `out`.
    fn encode<T: Serialize + ?Sized>(out: &mut dyn io::Write, value: &T) -> Result<(), Error>;

    /// Reads one value from `input`.
    fn decode<T: DeserializeOwned>(input: &mut dyn io::Read) -> Result<T, Error>;

    fn to_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, Error>;

    fn from_slice<T: DeserializeOwned>(raw: &[u8]) -> Result<T, Error>;
}

/// The registered media types.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Media {
    Json,
}

impl Media {
    /// Every registered media type, in matching order.
    pub const ALL: &'static [Media] = &[Media::Json];

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => Json::CONTENT_TYPE,
        }
    }

    /// First registered media type named by `header`.
    pub fn negotiate(header: &str) -> Option<Self> {
        let header = header.to_ascii_lowercase();
        Self::ALL.iter().copied().find(|m| header.contains(m.content_type()))
    }

    pub fn encode<T: Serialize + ?Sized>(self, out: &mut dyn io::Write, value: &T) -> Result<(), Error> {
        match self {
            Self::Json => Json::encode(out, value),
        }
    }

    pub fn decode<T: DeserializeOwned>(self, input: &mut dyn io::Read) -> Result<T, Error> {
        match self {
            Self::Json => Json::decode(input),
        }
    }
}

/// Decodes the request body with the codec named by `Content-Type`.
///
/// Fails with [`Error::UnsupportedContentType`] before touching the body if
/// no codec matches.
///
/// ```rust
/// use bytes::Bytes;
/// use tollgate::{Request, media};
///
/// #[derive(serde::Deserialize)]
/// struct In { a: i32 }
///
/// let req: Request = http::Request::builder()
///     .header("content-type", "application/json")
///     .body(Bytes::from_static(br#"{"a":1}"#))
///     .unwrap()
///     .into();
/// let input: In = media::read_by_content_type(&req).unwrap();
/// assert_eq!(input.a, 1);
/// ```
pub fn read_by_content_type<T: DeserializeOwned>(req: &Request) -> Result<T, Error> {
    let content_type = req.header(CONTENT_TYPE).unwrap_or_default();
    let media = Media::negotiate(content_type)
        .ok_or_else(|| Error::UnsupportedContentType(content_type.to_owned()))?;
    let mut body: &[u8] = req.body();
    media.decode(&mut body)
}

/// Encodes `value` with the codec named by `Accept`, setting `Content-Type`
/// and `status` first.
///
/// Fails with [`Error::UnsupportedAccept`] before touching the response if no
/// codec matches.
pub fn write_by_accept<T: Serialize + ?Sized>(
    w: &mut dyn ResponseWriter,
    req: &Request,
    status: StatusCode,
    value: &T,
) -> Result<(), Error> {
    let accept = req.header(ACCEPT).unwrap_or_default();
    let media = Media::negotiate(accept).ok_or_else(|| Error::UnsupportedAccept(accept.to_owned()))?;
    reply::encoded(w, media, status, value)
}

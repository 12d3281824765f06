//! JSON via serde_json.

use std::io;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::Codec;
use crate::error::Error;

/// The JSON codec.
#[derive(Clone, Copy, Debug, Default)]
pub struct Json;

impl Codec for Json {
    const CONTENT_TYPE: &'static str = "application/json";

    // Newline-terminated, one document per call, like a streaming encoder.
    fn encode<T: Serialize + ?Sized>(out: &mut dyn io::Write, value: &T) -> Result<(), Error> {
        serde_json::to_writer(&mut *out, value)?;
        out.write_all(b"\n")?;
        Ok(())
    }

    // Reads the first document only; whatever follows it is left unread.
    fn decode<T: DeserializeOwned>(input: &mut dyn io::Read) -> Result<T, Error> {
        match serde_json::Deserializer::from_reader(input).into_iter().next() {
            Some(value) => Ok(value?),
            None => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "empty JSON body").into()),
        }
    }

    fn to_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, Error> {
        let bytes = serde_json::to_vec(value);
        debug!(
            len = bytes.as_ref().map_or(0, Vec::len),
            ok = bytes.is_ok(),
            "media.json.to_vec"
        );
        Ok(bytes?)
    }

    fn from_slice<T: DeserializeOwned>(raw: &[u8]) -> Result<T, Error> {
        let value = serde_json::from_slice(raw);
        debug!(len = raw.len(), ok = value.is_ok(), "media.json.from_slice");
        Ok(value?)
    }
}

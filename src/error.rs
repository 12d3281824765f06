//! Unified error type.

use std::fmt;

/// The error type returned by handlers, decorators, codecs and the server.
///
/// Handlers return [`Error::Message`] (via [`Error::msg`]) or any boxed error
/// for application failures. The Display form of an application error is its
/// bare message: that string is what ends up in a translated 500 body.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Output sink or socket failure. Propagated verbatim.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// `Content-Type` names no registered codec.
    #[error("unsupported content type: {0:?}")]
    UnsupportedContentType(String),

    /// `Accept` names no registered codec.
    #[error("unsupported accept type: {0:?}")]
    UnsupportedAccept(String),

    /// Body encoding or decoding failed.
    #[error("codec: {0}")]
    Codec(#[from] serde_json::Error),

    /// A generated value could not be used as a header.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),

    /// `Server::bind` was given something that is not `host:port`.
    #[error("invalid socket address: {0}")]
    Addr(#[from] std::net::AddrParseError),

    /// Opaque application error.
    #[error("{0}")]
    Message(String),

    /// Any other application error.
    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Builds an opaque application error from a message.
    ///
    /// ```rust
    /// let err = tollgate::Error::msg("boom");
    /// assert_eq!(err.to_string(), "boom");
    /// ```
    pub fn msg(message: impl fmt::Display) -> Self {
        Self::Message(message.to_string())
    }

    /// `true` for content-negotiation failures, which are always the client's fault.
    pub fn is_negotiation(&self) -> bool {
        matches!(self, Self::UnsupportedContentType(_) | Self::UnsupportedAccept(_))
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for Error {
    fn from(e: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Other(e)
    }
}

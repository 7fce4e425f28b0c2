// SPDX-License-Identifier: MPL-2.0
use std::fmt;

/// Crate-wide error type.
#[derive(Debug, Clone)]
pub enum Error {
    /// A pixel source (base image or overlay) failed to decode.
    Decode(String),
    /// The final raster could not be encoded.
    Encode(String),
    /// The export pipeline could not produce a raster (bad geometry,
    /// allocation failure).
    Render(String),
    /// Configuration could not be read or written.
    Config(String),
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Decode(msg) => write!(f, "decode error: {msg}"),
            Error::Encode(msg) => write!(f, "encode error: {msg}"),
            Error::Render(msg) => write!(f, "render error: {msg}"),
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

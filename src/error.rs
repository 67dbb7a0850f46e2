//! Error types for the pgputils library.
//!
//! Every failure the facade can report has its own variant so callers can
//! branch on the kind of failure instead of parsing messages.

use thiserror::Error;

use crate::types::KeyId;

/// The main error type for pgputils operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The secret key blob did not contain a single usable secret key
    #[error("No secret keys found")]
    NoKeysFound,

    /// The message was encrypted to a key that is not in the supplied key ring
    #[error("Unknown key identifier: {0}")]
    UnknownKeyIdentifier(KeyId),

    /// The passphrase did not unlock the secret key
    #[error("Invalid passphrase")]
    InvalidPassphrase,

    /// A layer of the message could not be parsed or opened
    #[error("Failed to strip encapsulating layer: {0}")]
    MalformedMessage(#[source] LayerFault),

    /// Input could not be read to the end
    #[error("Input is not a readable stream: {0}")]
    UnreadableStream(#[source] std::io::Error),

    /// The message contains a layer this library refuses to strip
    #[error("Unsupported layer: {0}")]
    UnsupportedLayer(String),

    /// Cryptographic operation failed
    #[error("Cryptographic operation failed: {0}")]
    Crypto(String),

    /// Decrypted bytes are not valid UTF-8 text
    #[error("Invalid text: {0}")]
    InvalidText(#[from] std::string::FromUtf8Error),
}

/// The underlying cause of an [`Error::MalformedMessage`].
#[derive(Error, Debug)]
pub enum LayerFault {
    /// rpgp rejected the packet stream
    #[error(transparent)]
    Pgp(#[from] pgp::errors::Error),

    /// The armor or a decoded stream could not be read
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The packet structure itself is unacceptable
    #[error("{0}")]
    Structure(String),
}

/// A specialized Result type for pgputils operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn malformed(cause: impl Into<LayerFault>) -> Self {
        Error::MalformedMessage(cause.into())
    }

    pub(crate) fn structure(msg: impl Into<String>) -> Self {
        Error::MalformedMessage(LayerFault::Structure(msg.into()))
    }
}

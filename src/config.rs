//! Encryption and decryption settings.
//!
//! The defaults reproduce the fixed behaviour of the facade: CAST5, ZIP
//! compression, a `"STREAM"` literal label, and a decrypt loop that treats a
//! message without literal data as empty.

use pgp::crypto::sym::SymmetricKeyAlgorithm;

/// Symmetric cipher used for the message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymmetricCipher {
    /// CAST5 (legacy, readable by every OpenPGP implementation)
    #[default]
    Cast5,
    /// AES with 128-bit keys
    Aes128,
    /// AES with 256-bit keys
    Aes256,
}

impl std::str::FromStr for SymmetricCipher {
    type Err = String;

    /// Parse cipher from string (case-insensitive).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cast5" | "cast-128" | "cast128" => Ok(SymmetricCipher::Cast5),
            "aes128" | "aes-128" => Ok(SymmetricCipher::Aes128),
            "aes256" | "aes-256" => Ok(SymmetricCipher::Aes256),
            _ => Err(format!("unknown cipher: {}", s)),
        }
    }
}

impl SymmetricCipher {
    /// Get a human-readable name for the cipher.
    pub fn name(&self) -> &'static str {
        match self {
            SymmetricCipher::Cast5 => "CAST5",
            SymmetricCipher::Aes128 => "AES-128",
            SymmetricCipher::Aes256 => "AES-256",
        }
    }

    pub(crate) fn algorithm(self) -> SymmetricKeyAlgorithm {
        match self {
            SymmetricCipher::Cast5 => SymmetricKeyAlgorithm::CAST5,
            SymmetricCipher::Aes128 => SymmetricKeyAlgorithm::AES128,
            SymmetricCipher::Aes256 => SymmetricKeyAlgorithm::AES256,
        }
    }
}

/// Compression applied to the encrypted packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Stored in a compressed-data packet without compressing
    Uncompressed,
    /// Raw deflate (RFC 1951)
    #[default]
    Zip,
    /// Deflate with a zlib wrapper (RFC 1950)
    Zlib,
}

impl std::str::FromStr for Compression {
    type Err = String;

    /// Parse compression from string (case-insensitive).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "uncompressed" => Ok(Compression::Uncompressed),
            "zip" | "deflate" => Ok(Compression::Zip),
            "zlib" => Ok(Compression::Zlib),
            _ => Err(format!("unknown compression: {}", s)),
        }
    }
}

impl Compression {
    /// The OpenPGP compression algorithm identifier.
    pub fn id(&self) -> u8 {
        match self {
            Compression::Uncompressed => 0,
            Compression::Zip => 1,
            Compression::Zlib => 2,
        }
    }
}

/// Settings for [`encrypt_with`](crate::encrypt_with).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptConfig {
    /// Cipher for the message body
    pub cipher: SymmetricCipher,
    /// Compression wrapped around the encrypted packets
    pub compression: Compression,
    /// File name recorded in the literal-data packet
    pub label: String,
}

impl Default for EncryptConfig {
    fn default() -> Self {
        Self {
            cipher: SymmetricCipher::default(),
            compression: Compression::default(),
            label: "STREAM".to_string(),
        }
    }
}

/// What to do when a message ends before any literal data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingLiteral {
    /// Report no content (`Ok(None)`)
    #[default]
    Empty,
    /// Fail with [`Error::MalformedMessage`](crate::Error::MalformedMessage)
    Error,
}

/// What to do with layers other than compression, encryption and literal data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnsupportedLayerPolicy {
    /// Log a warning and read through to the literal data
    #[default]
    Skip,
    /// Fail with [`Error::UnsupportedLayer`](crate::Error::UnsupportedLayer)
    Reject,
}

/// Which session-key entry of an encrypted layer to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecipientSelection {
    /// The first public-key entry, whether or not its key is available
    #[default]
    First,
    /// The first public-key entry whose key is in the key table
    FirstKnown,
}

/// Settings for [`decrypt_with`](crate::decrypt_with).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptConfig {
    /// Maximum number of layers stripped before giving up
    pub max_layers: usize,
    /// Behaviour for messages without literal data
    pub missing_literal: MissingLiteral,
    /// Behaviour for signed layers
    pub unsupported_layer: UnsupportedLayerPolicy,
    /// Session-key entry selection
    pub recipient_selection: RecipientSelection,
}

impl Default for DecryptConfig {
    fn default() -> Self {
        Self {
            max_layers: 8,
            missing_literal: MissingLiteral::default(),
            unsupported_layer: UnsupportedLayerPolicy::default(),
            recipient_selection: RecipientSelection::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_fixed_pipeline() {
        let config = EncryptConfig::default();
        assert_eq!(config.cipher, SymmetricCipher::Cast5);
        assert_eq!(config.compression, Compression::Zip);
        assert_eq!(config.label, "STREAM");

        let config = DecryptConfig::default();
        assert_eq!(config.missing_literal, MissingLiteral::Empty);
        assert_eq!(config.unsupported_layer, UnsupportedLayerPolicy::Skip);
        assert_eq!(config.recipient_selection, RecipientSelection::First);
    }

    #[test]
    fn cipher_from_str() {
        assert_eq!("CAST5".parse::<SymmetricCipher>().unwrap(), SymmetricCipher::Cast5);
        assert_eq!("aes-256".parse::<SymmetricCipher>().unwrap(), SymmetricCipher::Aes256);
        assert!("blowfish".parse::<SymmetricCipher>().is_err());
    }

    #[test]
    fn compression_ids_follow_rfc4880() {
        assert_eq!(Compression::Uncompressed.id(), 0);
        assert_eq!(Compression::Zip.id(), 1);
        assert_eq!(Compression::Zlib.id(), 2);
        assert_eq!("deflate".parse::<Compression>().unwrap(), Compression::Zip);
    }
}

//! Public type definitions for the pgputils library.

use std::fmt;
use std::str::FromStr;

/// A 64-bit OpenPGP key identifier.
///
/// For v4 keys this is the legacy key ID (the low 64 bits of the
/// fingerprint); for v6 recipients it is the high 64 bits of the fingerprint.
/// Displayed as 16 upper-case hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(u64);

impl KeyId {
    /// Create a key identifier from its numeric value.
    pub const fn new(id: u64) -> Self {
        KeyId(id)
    }

    /// The numeric value of this identifier.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The all-zero identifier used by anonymous recipients.
    pub fn is_wildcard(self) -> bool {
        self.0 == 0
    }

    /// Read an identifier from the first 8 bytes (big-endian) of `bytes`.
    pub(crate) fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; 8] = bytes.get(..8)?.try_into().ok()?;
        Some(KeyId(u64::from_be_bytes(raw)))
    }
}

impl From<u64> for KeyId {
    fn from(id: u64) -> Self {
        KeyId(id)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

impl FromStr for KeyId {
    type Err = String;

    /// Parse a key ID from hex, with or without a `0x` prefix and spaces.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let cleaned: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let digits = cleaned
            .strip_prefix("0x")
            .or_else(|| cleaned.strip_prefix("0X"))
            .unwrap_or(&cleaned);

        if digits.is_empty() || digits.len() > 16 {
            return Err(format!("invalid key id: {}", s));
        }

        u64::from_str_radix(digits, 16)
            .map(KeyId)
            .map_err(|_| format!("invalid key id: {}", s))
    }
}

/// Which key of a certificate a [`PublicKey`](crate::PublicKey) or
/// [`SecretKey`](crate::SecretKey) refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySlot {
    /// The primary key
    Primary,
    /// The subkey at this index of the certificate
    Subkey(usize),
}

/// A layer stripped from a message during decryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// Compressed data
    Compressed,
    /// Session-key list and the encrypted data it unlocks
    Encrypted,
    /// Signed data, read through without verification
    Signed,
    /// Literal data holding the plaintext
    Literal,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKind::Compressed => write!(f, "compressed"),
            LayerKind::Encrypted => write!(f, "encrypted"),
            LayerKind::Signed => write!(f, "signed"),
            LayerKind::Literal => write!(f, "literal"),
        }
    }
}

/// The outcome of a successful decryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decrypted {
    /// The recovered plaintext
    pub plaintext: Vec<u8>,
    /// Layers in the order they were stripped, ending with
    /// [`LayerKind::Literal`]
    pub layers: Vec<LayerKind>,
    /// The key that opened the encrypted layer, if there was one
    pub recipient: Option<KeyId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_id_displays_as_padded_upper_hex() {
        assert_eq!(KeyId::new(0x567C_B84E_44AC_3CBF).to_string(), "567CB84E44AC3CBF");
        assert_eq!(KeyId::new(0xAB).to_string(), "00000000000000AB");
    }

    #[test]
    fn key_id_parses_common_spellings() {
        let expected = KeyId::new(0x16D8_1690_2F4C_E7C9);
        assert_eq!("16D816902F4CE7C9".parse::<KeyId>().unwrap(), expected);
        assert_eq!("0x16d816902f4ce7c9".parse::<KeyId>().unwrap(), expected);
        assert_eq!("16D8 1690 2F4C E7C9".parse::<KeyId>().unwrap(), expected);
    }

    #[test]
    fn key_id_rejects_garbage() {
        assert!("".parse::<KeyId>().is_err());
        assert!("not-hex".parse::<KeyId>().is_err());
        assert!("16D816902F4CE7C9AA".parse::<KeyId>().is_err());
    }

    #[test]
    fn key_id_from_fingerprint_prefix() {
        let bytes = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0xFF, 0xFF];
        assert_eq!(KeyId::from_bytes(&bytes), Some(KeyId::new(0x0102_0304_0506_0708)));
        assert_eq!(KeyId::from_bytes(&bytes[..7]), None);
    }

    #[test]
    fn wildcard_is_all_zero() {
        assert!(KeyId::new(0).is_wildcard());
        assert!(!KeyId::new(1).is_wildcard());
    }
}

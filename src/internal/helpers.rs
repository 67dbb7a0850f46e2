//! Key parsing and conversion helpers.

use std::io::Cursor;

use pgp::composed::{Deserializable, SignedPublicKey, SignedSecretKey};
use pgp::types::KeyDetails;
use tracing::debug;

use crate::types::KeyId;

/// Parse every secret certificate in an armored or binary blob.
///
/// Certificates that fail to parse are skipped.
pub(crate) fn parse_secret_keys(data: &[u8]) -> Vec<SignedSecretKey> {
    parse_many(data, "secret")
}

/// Parse every public certificate in an armored or binary blob.
///
/// A blob holding secret certificates yields their public halves.
pub(crate) fn parse_public_keys(data: &[u8]) -> Vec<SignedPublicKey> {
    let public = parse_many::<SignedPublicKey>(data, "public");
    if !public.is_empty() {
        return public;
    }

    parse_secret_keys(data)
        .iter()
        .map(|secret| secret.to_public_key())
        .collect()
}

fn parse_many<T: Deserializable>(data: &[u8], kind: &str) -> Vec<T> {
    if data.trim_ascii().is_empty() {
        return Vec::new();
    }

    let (certs, _headers) = match T::from_reader_many(Cursor::new(data)) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(kind, error = %e, "blob is not a key ring");
            return Vec::new();
        }
    };

    certs
        .filter_map(|cert| match cert {
            Ok(cert) => Some(cert),
            Err(e) => {
                debug!(kind, error = %e, "skipping unreadable certificate");
                None
            }
        })
        .collect()
}

/// The 64-bit key identifier of a key.
pub(crate) fn key_id(key: &impl KeyDetails) -> Option<KeyId> {
    KeyId::from_bytes(key.legacy_key_id().as_ref())
}

/// Get the fingerprint as a hex string (uppercase, no spaces).
pub(crate) fn fingerprint_to_hex(key: &impl KeyDetails) -> String {
    hex::encode_upper(key.fingerprint().as_bytes())
}

/// Convert a SystemTime to chrono DateTime.
pub(crate) fn system_time_to_datetime(st: std::time::SystemTime) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from(st)
}

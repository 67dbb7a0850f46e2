//! Secret keys protected with the two-octet checksum scheme.
//!
//! S2K usage 255 encrypts key material in CFB mode and appends a simple
//! checksum instead of a SHA-1 trailer. rpgp reads these keys as usage 254,
//! looks for the SHA-1 trailer and rejects every passphrase, so they are
//! unlocked here instead.

use pgp::types::{KeyDetails, Password, PlainSecretParams, S2kParams, SecretParams};
use tracing::debug;

/// Decrypt CFB protected key material and verify its simple checksum.
///
/// Returns `None` when the material is not CFB protected, or when the
/// passphrase does not yield key material with a valid checksum.
pub(crate) fn unlock_simple_checksum(
    key: &impl KeyDetails,
    params: &SecretParams,
    password: &Password,
) -> Option<PlainSecretParams> {
    let SecretParams::Encrypted(encrypted) = params else {
        return None;
    };
    let (S2kParams::Cfb { sym_alg, s2k, iv } | S2kParams::MalleableCfb { sym_alg, s2k, iv }) =
        encrypted.string_to_key_params()
    else {
        return None;
    };

    let derived = s2k.derive_key(&password.read(), sym_alg.key_size()).ok()?;
    let mut plaintext = encrypted.data().to_vec();
    sym_alg
        .decrypt_with_iv_regular(derived.as_ref(), iv, &mut plaintext)
        .ok()?;

    match PlainSecretParams::try_from_reader(
        &plaintext[..],
        key.version(),
        key.algorithm(),
        key.public_params(),
    ) {
        Ok(params) => Some(params),
        Err(e) => {
            debug!(error = %e, "simple checksum unlock failed");
            None
        }
    }
}

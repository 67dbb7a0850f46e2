//! Encryption functions.
//!
//! Messages are built in four buffered stages: the plaintext is wrapped in a
//! binary literal-data packet, encrypted to the recipient, the encrypted
//! packets are wrapped in a compressed-data packet, and the result is
//! optionally ASCII-armored.

use std::io::Read;

use pgp::composed::MessageBuilder;
use rand::thread_rng;
use tracing::debug;

use crate::codec;
use crate::config::EncryptConfig;
use crate::error::{Error, Result};
use crate::key::PublicKey;
use crate::packet;
use crate::types::KeySlot;

/// Encrypt bytes to a recipient with the default settings.
///
/// The default pipeline uses CAST5 and ZIP compression, and labels the
/// literal data `"STREAM"`.
///
/// The encrypted layer is always a symmetrically encrypted integrity
/// protected packet (SEIPD v1) carrying a modification detection code.
/// rpgp does not write the unprotected legacy packet, so there is no
/// setting to turn the integrity check off. Decryption still accepts
/// unprotected packets from other implementations.
///
/// # Arguments
/// * `plaintext` - The data to encrypt
/// * `recipient` - A key that can encrypt (see [`import_public_key`](crate::import_public_key))
/// * `armor` - If true, output ASCII-armored; otherwise binary
///
/// # Returns
/// The encrypted message.
///
/// # Errors
/// * [`Error::Crypto`] - If the recipient cannot encrypt or encryption fails
///
/// # Example
///
/// ```no_run
/// use pgputils::{decrypt, encrypt, import_public_key};
///
/// let public = std::fs::read("recipient.asc").unwrap();
/// let secret = std::fs::read("recipient-secret.asc").unwrap();
///
/// let recipient = import_public_key(&public).unwrap();
/// let ciphertext = encrypt(b"Hello!", &recipient, true).unwrap();
///
/// let plaintext = decrypt(&ciphertext, &secret, "passphrase").unwrap();
/// assert_eq!(plaintext.as_deref(), Some(&b"Hello!"[..]));
/// ```
pub fn encrypt(plaintext: &[u8], recipient: &PublicKey, armor: bool) -> Result<Vec<u8>> {
    encrypt_with(plaintext, recipient, armor, &EncryptConfig::default())
}

/// Encrypt bytes to a recipient with explicit settings.
pub fn encrypt_with(
    plaintext: &[u8],
    recipient: &PublicKey,
    armor: bool,
    config: &EncryptConfig,
) -> Result<Vec<u8>> {
    if !recipient.can_encrypt() {
        return Err(Error::Crypto(format!(
            "key {} cannot encrypt",
            recipient.key_id()
        )));
    }

    let encrypted = encrypt_literal(plaintext, recipient, config)?;
    debug!(
        cipher = config.cipher.name(),
        bytes = encrypted.len(),
        "encrypted literal data"
    );

    let compressed = packet::compressed_packet(config.compression, &encrypted)?;
    debug!(
        compression = ?config.compression,
        bytes = compressed.len(),
        "compressed encrypted packets"
    );

    if armor {
        Ok(codec::armor(&compressed).into_bytes())
    } else {
        Ok(compressed)
    }
}

/// Read a reader to the end and encrypt its contents with the default settings.
///
/// # Errors
/// * [`Error::UnreadableStream`] - If the reader fails
pub fn encrypt_reader<R: Read>(reader: R, recipient: &PublicKey, armor: bool) -> Result<Vec<u8>> {
    let plaintext = codec::read_fully(reader)?;
    encrypt(&plaintext, recipient, armor)
}

/// Produce the session-key and encrypted-data packets for one recipient.
fn encrypt_literal(
    plaintext: &[u8],
    recipient: &PublicKey,
    config: &EncryptConfig,
) -> Result<Vec<u8>> {
    let mut rng = thread_rng();
    let cert = recipient.cert();

    let mut builder = MessageBuilder::from_bytes(config.label.clone(), plaintext.to_vec())
        .seipd_v1(&mut rng, config.cipher.algorithm());

    match recipient.slot() {
        KeySlot::Primary => builder.encrypt_to_key(&mut rng, &cert.primary_key),
        KeySlot::Subkey(i) => builder.encrypt_to_key(&mut rng, &cert.public_subkeys[i]),
    }
    .map_err(|e| Error::Crypto(e.to_string()))?;

    builder
        .to_vec(&mut rng)
        .map_err(|e| Error::Crypto(e.to_string()))
}

//! Decryption functions.
//!
//! A message is opened one layer at a time. Compressed layers are inflated,
//! encrypted layers are opened with the secret key named by their session-key
//! entry, and the loop ends at literal data. A layer that runs out before any
//! literal data is handled by [`MissingLiteral`]. Each layer takes ownership of the
//! one it replaces, so every intermediate stream is dropped on every exit path.

use std::io::{Cursor, Read};

use pgp::composed::{Esk, Message};
use pgp::packet::{Decompressor, PublicKeyEncryptedSessionKey};
use tracing::{debug, warn};

use crate::codec;
use crate::config::{DecryptConfig, MissingLiteral, RecipientSelection, UnsupportedLayerPolicy};
use crate::error::{Error, Result};
use crate::keyring::{lookup_secret_keys_by_id, SecretKeyTable};
use crate::types::{Decrypted, KeyId, LayerKind};

/// Fingerprint length of v4 keys, whose key ID is the trailing 8 bytes.
const V4_FINGERPRINT_LEN: usize = 20;

/// Decrypt a message with the default settings.
///
/// # Arguments
/// * `message` - The encrypted message (armored or binary)
/// * `secret_key` - The recipient's secret key ring (armored or binary)
/// * `passphrase` - Passphrase protecting the secret key
///
/// # Returns
/// The plaintext, or `None` if the message held no literal data.
///
/// # Errors
/// * [`Error::NoKeysFound`] - If `secret_key` holds no secret keys
/// * [`Error::UnknownKeyIdentifier`] - If the message was encrypted to another key
/// * [`Error::InvalidPassphrase`] - If the passphrase is wrong
/// * [`Error::MalformedMessage`] - If any layer cannot be parsed or opened
pub fn decrypt(message: &[u8], secret_key: &[u8], passphrase: &str) -> Result<Option<Vec<u8>>> {
    decrypt_with(message, secret_key, passphrase, &DecryptConfig::default())
}

/// Decrypt a message with explicit settings.
pub fn decrypt_with(
    message: &[u8],
    secret_key: &[u8],
    passphrase: &str,
    config: &DecryptConfig,
) -> Result<Option<Vec<u8>>> {
    let keys = lookup_secret_keys_by_id(secret_key)?;
    let decrypted = decrypt_with_keys(message, &keys, passphrase, config)?;
    Ok(decrypted.map(|d| d.plaintext))
}

/// Read a reader to the end and decrypt its contents with the default settings.
///
/// # Errors
/// * [`Error::UnreadableStream`] - If the reader fails
pub fn decrypt_reader<R: Read>(
    reader: R,
    secret_key: &[u8],
    passphrase: &str,
) -> Result<Option<Vec<u8>>> {
    let keys = lookup_secret_keys_by_id(secret_key)?;
    let message = codec::read_fully(reader)?;
    let decrypted = decrypt_with_keys(&message, &keys, passphrase, &DecryptConfig::default())?;
    Ok(decrypted.map(|d| d.plaintext))
}

/// Strip every layer of a message using an already built key table.
///
/// Returns the plaintext together with the layers that were stripped and the
/// key that opened the encrypted layer.
pub fn decrypt_with_keys(
    message: &[u8],
    keys: &SecretKeyTable,
    passphrase: &str,
    config: &DecryptConfig,
) -> Result<Option<Decrypted>> {
    let binary = codec::decode(message).map_err(Error::malformed)?;
    if binary.trim_ascii().is_empty() {
        return missing_literal(config);
    }

    let mut current = Message::from_bytes(Cursor::new(binary)).map_err(Error::malformed)?;
    let mut layers = Vec::new();
    let mut recipient = None;

    loop {
        if layers.len() >= config.max_layers {
            return Err(Error::structure(format!(
                "message nests more than {} layers",
                config.max_layers
            )));
        }

        match Layer::of(&current) {
            Layer::Literal => {
                layers.push(LayerKind::Literal);
                let plaintext = current.as_data_vec().map_err(Error::malformed)?;
                debug!(bytes = plaintext.len(), layers = layers.len(), "read literal data");
                return Ok(Some(Decrypted {
                    plaintext,
                    layers,
                    recipient,
                }));
            }
            Layer::Compressed => {
                layers.push(LayerKind::Compressed);
                debug!(depth = layers.len(), "stripping compressed layer");
                let inflated = inflate(current)?;
                if inflated.is_empty() {
                    return missing_literal(config);
                }
                current = Message::from_bytes(Cursor::new(inflated)).map_err(Error::malformed)?;
            }
            Layer::Encrypted { recipients } => {
                layers.push(LayerKind::Encrypted);
                let id = select_recipient(&recipients, keys, config.recipient_selection)?;
                let secret = keys.get(id).ok_or(Error::UnknownKeyIdentifier(id))?;

                debug!(depth = layers.len(), key_id = %id, "stripping encrypted layer");
                let private = secret.extract_private_key(passphrase)?;
                current = private.decrypt_layer(current)?;
                recipient = Some(id);
            }
            Layer::Signed => match config.unsupported_layer {
                UnsupportedLayerPolicy::Reject => {
                    return Err(Error::UnsupportedLayer("signed data".to_string()));
                }
                UnsupportedLayerPolicy::Skip => {
                    warn!(depth = layers.len() + 1, "reading through signed layer without verifying it");
                    layers.push(LayerKind::Signed);
                    layers.push(LayerKind::Literal);
                    let plaintext = current.as_data_vec().map_err(Error::malformed)?;
                    return Ok(Some(Decrypted {
                        plaintext,
                        layers,
                        recipient,
                    }));
                }
            },
        }
    }
}

fn missing_literal(config: &DecryptConfig) -> Result<Option<Decrypted>> {
    match config.missing_literal {
        MissingLiteral::Empty => {
            debug!("message ended before any literal data");
            Ok(None)
        }
        MissingLiteral::Error => Err(Error::structure("message ended before any literal data")),
    }
}

/// Inflate a compressed layer into the packets it holds.
fn inflate(mut message: Message<'_>) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    message.read_to_end(&mut body).map_err(Error::malformed)?;

    let mut inflated = Vec::new();
    Decompressor::from_reader(&body[..])
        .and_then(|mut packets| packets.read_to_end(&mut inflated))
        .map_err(Error::malformed)?;
    Ok(inflated)
}

/// The kind of the outermost layer of a message.
#[derive(Debug)]
enum Layer {
    Literal,
    Compressed,
    Encrypted { recipients: Vec<KeyId> },
    Signed,
}

impl Layer {
    fn of(message: &Message<'_>) -> Self {
        match message {
            Message::Literal { .. } => Layer::Literal,
            Message::Compressed { .. } => Layer::Compressed,
            Message::Encrypted { esk, .. } => Layer::Encrypted {
                recipients: esk.iter().filter_map(recipient_id).collect(),
            },
            _ => Layer::Signed,
        }
    }
}

/// The key identifier a session-key entry is addressed to.
///
/// Anonymous entries name the wildcard identifier; symmetric entries name
/// no key.
fn recipient_id(esk: &Esk) -> Option<KeyId> {
    let Esk::PublicKeyEncryptedSessionKey(pkesk) = esk else {
        return None;
    };

    match pkesk {
        PublicKeyEncryptedSessionKey::V3 { id, .. } => KeyId::from_bytes(id.as_ref()),
        PublicKeyEncryptedSessionKey::V6 { fingerprint, .. } => match fingerprint {
            Some(fp) if fp.as_bytes().len() == V4_FINGERPRINT_LEN => {
                KeyId::from_bytes(&fp.as_bytes()[V4_FINGERPRINT_LEN - 8..])
            }
            Some(fp) => KeyId::from_bytes(fp.as_bytes()),
            None => Some(KeyId::new(0)),
        },
        PublicKeyEncryptedSessionKey::Other { .. } => None,
    }
}

fn select_recipient(
    recipients: &[KeyId],
    keys: &SecretKeyTable,
    selection: RecipientSelection,
) -> Result<KeyId> {
    let first = recipients
        .first()
        .copied()
        .ok_or_else(|| Error::structure("encrypted data without a public-key session key"))?;

    match selection {
        RecipientSelection::First => Ok(first),
        RecipientSelection::FirstKnown => Ok(recipients
            .iter()
            .copied()
            .find(|id| keys.contains(*id))
            .unwrap_or(first)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Compression;
    use crate::error::LayerFault;

    #[test]
    fn empty_message_is_soft_success() {
        let keys = SecretKeyTable::default();
        let config = DecryptConfig::default();

        assert!(decrypt_with_keys(b"", &keys, "", &config).unwrap().is_none());
        assert!(decrypt_with_keys(b"\r\n", &keys, "", &config).unwrap().is_none());
    }

    #[test]
    fn empty_message_can_be_an_error() {
        let keys = SecretKeyTable::default();
        let config = DecryptConfig {
            missing_literal: MissingLiteral::Error,
            ..DecryptConfig::default()
        };

        let err = decrypt_with_keys(b"", &keys, "", &config).unwrap_err();
        assert!(matches!(err, Error::MalformedMessage(_)));
    }

    #[test]
    fn no_keys_is_reported_before_the_message_is_parsed() {
        let err = decrypt(b"\xFF\xFF definitely not a message", b"", "pw").unwrap_err();
        assert!(matches!(err, Error::NoKeysFound));
    }

    #[test]
    fn select_first_recipient() {
        let keys = SecretKeyTable::default();
        let ids = [KeyId::new(1), KeyId::new(2)];

        assert_eq!(
            select_recipient(&ids, &keys, RecipientSelection::First).unwrap(),
            KeyId::new(1)
        );
        assert_eq!(
            select_recipient(&ids, &keys, RecipientSelection::FirstKnown).unwrap(),
            KeyId::new(1)
        );
    }

    #[test]
    fn session_key_list_without_public_key_entries() {
        let keys = SecretKeyTable::default();
        let err = select_recipient(&[], &keys, RecipientSelection::First).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedMessage(LayerFault::Structure(_))
        ));
    }

    #[test]
    fn empty_compressed_layer_is_soft_success() {
        let keys = SecretKeyTable::default();
        let stored_nothing = [0xC8, 0x01, 0x00];
        let zipped_nothing = crate::packet::compressed_packet(Compression::Zip, b"").unwrap();

        for message in [&stored_nothing[..], &zipped_nothing[..]] {
            let decrypted = decrypt_with_keys(message, &keys, "", &DecryptConfig::default()).unwrap();
            assert!(decrypted.is_none());
        }

        let config = DecryptConfig {
            missing_literal: MissingLiteral::Error,
            ..DecryptConfig::default()
        };
        let err = decrypt_with_keys(&stored_nothing, &keys, "", &config).unwrap_err();
        assert!(matches!(err, Error::MalformedMessage(_)));
    }
}

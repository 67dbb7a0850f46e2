//! Key handles.
//!
//! A [`PublicKey`] or [`SecretKey`] names one key of a parsed certificate
//! (the primary key or one of its subkeys). The certificate is shared through
//! an [`Arc`], so handles are cheap to clone and `Send + Sync`.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use pgp::composed::{Message, SignedPublicKey, SignedSecretKey};
use pgp::errors::Error as PgpError;
use pgp::packet;
use pgp::types::{KeyDetails, Password, SecretParams};
use tracing::debug;

use crate::error::{Error, Result};
use crate::internal::{
    fingerprint_to_hex, key_id, primary_can_encrypt, subkey_can_encrypt, system_time_to_datetime,
    unlock_simple_checksum,
};
use crate::types::{KeyId, KeySlot};

/// One public key of a certificate.
#[derive(Debug, Clone)]
pub struct PublicKey {
    cert: Arc<SignedPublicKey>,
    slot: KeySlot,
    key_id: KeyId,
}

impl PublicKey {
    pub(crate) fn new(cert: Arc<SignedPublicKey>, slot: KeySlot) -> Option<Self> {
        let key_id = match slot {
            KeySlot::Primary => key_id(&cert.primary_key)?,
            KeySlot::Subkey(i) => key_id(&cert.public_subkeys.get(i)?.key)?,
        };
        Some(Self { cert, slot, key_id })
    }

    /// The 64-bit key identifier.
    pub fn key_id(&self) -> KeyId {
        self.key_id
    }

    /// Which key of the certificate this is.
    pub fn slot(&self) -> KeySlot {
        self.slot
    }

    /// The fingerprint as upper-case hex.
    pub fn fingerprint(&self) -> String {
        match self.slot {
            KeySlot::Primary => fingerprint_to_hex(&self.cert.primary_key),
            KeySlot::Subkey(i) => fingerprint_to_hex(&self.cert.public_subkeys[i].key),
        }
    }

    /// When the key was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        let created = match self.slot {
            KeySlot::Primary => self.cert.primary_key.created_at(),
            KeySlot::Subkey(i) => self.cert.public_subkeys[i].key.created_at(),
        };
        system_time_to_datetime(created.into())
    }

    /// Whether messages can be encrypted to this key.
    ///
    /// Subkeys must also carry an encryption flag and be neither revoked
    /// nor expired.
    pub fn can_encrypt(&self) -> bool {
        match self.slot {
            KeySlot::Primary => primary_can_encrypt(&self.cert),
            KeySlot::Subkey(i) => subkey_can_encrypt(&self.cert.public_subkeys[i]),
        }
    }

    pub(crate) fn cert(&self) -> &SignedPublicKey {
        &self.cert
    }
}

/// One secret key of a certificate.
///
/// The key material stays locked until
/// [`extract_private_key`](SecretKey::extract_private_key) is called with
/// the right passphrase.
#[derive(Debug, Clone)]
pub struct SecretKey {
    cert: Arc<SignedSecretKey>,
    slot: KeySlot,
    key_id: KeyId,
}

impl SecretKey {
    pub(crate) fn new(cert: Arc<SignedSecretKey>, slot: KeySlot) -> Option<Self> {
        let key_id = match slot {
            KeySlot::Primary => key_id(&cert.primary_key)?,
            KeySlot::Subkey(i) => key_id(&cert.secret_subkeys.get(i)?.key)?,
        };
        Some(Self { cert, slot, key_id })
    }

    /// The 64-bit key identifier, shared with the public counterpart.
    pub fn key_id(&self) -> KeyId {
        self.key_id
    }

    /// Which key of the certificate this is.
    pub fn slot(&self) -> KeySlot {
        self.slot
    }

    /// The fingerprint as upper-case hex.
    pub fn fingerprint(&self) -> String {
        match self.slot {
            KeySlot::Primary => fingerprint_to_hex(&self.cert.primary_key),
            KeySlot::Subkey(i) => fingerprint_to_hex(&self.cert.secret_subkeys[i].key),
        }
    }

    /// The public half of this key.
    pub fn public_key(&self) -> Option<PublicKey> {
        let cert = Arc::new(self.cert.to_public_key());

        let slot = if key_id(&cert.primary_key) == Some(self.key_id) {
            KeySlot::Primary
        } else {
            let index = cert
                .public_subkeys
                .iter()
                .position(|subkey| key_id(&subkey.key) == Some(self.key_id))?;
            KeySlot::Subkey(index)
        };

        PublicKey::new(cert, slot)
    }

    /// Unlock the key material with `passphrase`.
    ///
    /// Keys protected with the older two-octet checksum (S2K usage 255) are
    /// unlocked as well.
    ///
    /// # Errors
    /// * [`Error::InvalidPassphrase`] - If the passphrase fails the key's checksum or hash check
    /// * [`Error::Crypto`] - If the key cannot be unlocked for any other reason
    pub fn extract_private_key(&self, passphrase: &str) -> Result<PrivateKey<'_>> {
        let password = Password::from(passphrase);

        let checked = match self.slot {
            KeySlot::Primary => self.cert.primary_key.unlock(&password, |_, _| Ok(())),
            KeySlot::Subkey(i) => self.cert.secret_subkeys[i]
                .key
                .unlock(&password, |_, _| Ok(())),
        };

        let cert = match checked {
            Ok(inner) => {
                inner.map_err(|e| Error::Crypto(e.to_string()))?;
                Arc::clone(&self.cert)
            }
            Err(err) => match self.unprotected_copy(&password)? {
                Some(cert) => {
                    debug!(key_id = %self.key_id, "unlocked simple-checksum protected key");
                    Arc::new(cert)
                }
                None if is_passphrase_mismatch(&err) => return Err(Error::InvalidPassphrase),
                None => return Err(Error::Crypto(err.to_string())),
            },
        };

        debug!(key_id = %self.key_id, "unlocked secret key");
        Ok(PrivateKey {
            key: self,
            cert,
            password,
        })
    }

    /// A copy of the certificate with this slot's key material unprotected,
    /// if it opens with the simple-checksum scheme.
    fn unprotected_copy(&self, password: &Password) -> Result<Option<SignedSecretKey>> {
        match self.slot {
            KeySlot::Primary => {
                let locked = &self.cert.primary_key;
                let Some(params) =
                    unlock_simple_checksum(locked.public_key(), locked.secret_params(), password)
                else {
                    return Ok(None);
                };
                let unlocked =
                    packet::SecretKey::new(locked.public_key().clone(), SecretParams::Plain(params))
                        .map_err(|e| Error::Crypto(e.to_string()))?;

                let mut cert = SignedSecretKey::clone(&self.cert);
                cert.primary_key = unlocked;
                Ok(Some(cert))
            }
            KeySlot::Subkey(i) => {
                let locked = &self.cert.secret_subkeys[i].key;
                let Some(params) =
                    unlock_simple_checksum(locked.public_key(), locked.secret_params(), password)
                else {
                    return Ok(None);
                };
                let unlocked = packet::SecretSubkey::new(
                    locked.public_key().clone(),
                    SecretParams::Plain(params),
                )
                .map_err(|e| Error::Crypto(e.to_string()))?;

                let mut cert = SignedSecretKey::clone(&self.cert);
                cert.secret_subkeys[i].key = unlocked;
                Ok(Some(cert))
            }
        }
    }
}

/// Whether an unlock failure came from a checksum or hash mismatch.
fn is_passphrase_mismatch(err: &PgpError) -> bool {
    match err {
        PgpError::InvalidInput { .. }
        | PgpError::ChecksumMissmatch { .. }
        | PgpError::Aead { .. } => true,
        PgpError::Message { message, .. } => message.contains("checksum"),
        _ => false,
    }
}

/// An unlocked secret key, able to open one encrypted layer.
pub struct PrivateKey<'k> {
    key: &'k SecretKey,
    cert: Arc<SignedSecretKey>,
    password: Password,
}

impl PrivateKey<'_> {
    /// The identifier of the key that was unlocked.
    pub fn key_id(&self) -> KeyId {
        self.key.key_id
    }

    /// Decrypt an encrypted message layer, yielding the message it holds.
    ///
    /// Legacy packets without modification detection are accepted.
    pub(crate) fn decrypt_layer<'m>(&self, message: Message<'m>) -> Result<Message<'m>> {
        message
            .decrypt_legacy(&self.password, self.cert.as_ref())
            .map_err(Error::malformed)
    }
}

impl fmt::Debug for PrivateKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("key_id", &self.key.key_id)
            .finish_non_exhaustive()
    }
}

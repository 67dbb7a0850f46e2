//! Key ring loading and secret key lookup.
//!
//! A key ring blob (armored or binary) may hold several certificates. Keys
//! are listed in ring order: each certificate's primary key, then its
//! subkeys, certificate by certificate.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::internal::{parse_public_keys, parse_secret_keys};
use crate::key::{PublicKey, SecretKey};
use crate::types::{KeyId, KeySlot};

/// An ordered collection of keys read from one blob.
#[derive(Debug, Clone)]
pub struct KeyRing<K> {
    keys: Vec<K>,
}

impl KeyRing<PublicKey> {
    /// Read every public key in `data`.
    ///
    /// A secret key blob is accepted; its public halves are used.
    /// Certificates that cannot be parsed are skipped.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut keys = Vec::new();

        for cert in parse_public_keys(data) {
            let cert = Arc::new(cert);
            let subkeys = (0..cert.public_subkeys.len()).map(KeySlot::Subkey);
            for slot in std::iter::once(KeySlot::Primary).chain(subkeys) {
                keys.extend(PublicKey::new(Arc::clone(&cert), slot));
            }
        }

        warn_if_unreadable(data, keys.len(), "public");
        KeyRing { keys }
    }
}

impl KeyRing<SecretKey> {
    /// Read every secret key in `data`.
    ///
    /// Subkeys stored without secret material are left out.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut keys = Vec::new();

        for cert in parse_secret_keys(data) {
            let cert = Arc::new(cert);
            let subkeys = (0..cert.secret_subkeys.len()).map(KeySlot::Subkey);
            for slot in std::iter::once(KeySlot::Primary).chain(subkeys) {
                keys.extend(SecretKey::new(Arc::clone(&cert), slot));
            }
        }

        warn_if_unreadable(data, keys.len(), "secret");
        KeyRing { keys }
    }
}

impl<K> KeyRing<K> {
    /// The first key in ring order.
    pub fn first(&self) -> Option<&K> {
        self.keys.first()
    }

    /// Iterate over the keys in ring order.
    pub fn iter(&self) -> std::slice::Iter<'_, K> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<'a, K> IntoIterator for &'a KeyRing<K> {
    type Item = &'a K;
    type IntoIter = std::slice::Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

impl<K> IntoIterator for KeyRing<K> {
    type Item = K;
    type IntoIter = std::vec::IntoIter<K>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter()
    }
}

fn warn_if_unreadable(data: &[u8], found: usize, kind: &str) {
    if found == 0 && !data.trim_ascii().is_empty() {
        warn!(kind, bytes = data.len(), "no keys could be read from key ring");
    }
}

/// Secret keys indexed by key identifier.
#[derive(Debug, Clone, Default)]
pub struct SecretKeyTable {
    keys: HashMap<KeyId, SecretKey>,
}

impl SecretKeyTable {
    /// Look up the secret key with identifier `id`.
    pub fn get(&self, id: KeyId) -> Option<&SecretKey> {
        self.keys.get(&id)
    }

    pub fn contains(&self, id: KeyId) -> bool {
        self.keys.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// All identifiers in the table, sorted.
    pub fn key_ids(&self) -> Vec<KeyId> {
        let mut ids: Vec<KeyId> = self.keys.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl FromIterator<SecretKey> for SecretKeyTable {
    /// Index keys by identifier. On a collision the first key wins.
    fn from_iter<I: IntoIterator<Item = SecretKey>>(iter: I) -> Self {
        let mut keys = HashMap::new();
        for key in iter {
            keys.entry(key.key_id()).or_insert(key);
        }
        SecretKeyTable { keys }
    }
}

/// Import the first public key that can receive encrypted messages.
///
/// # Arguments
/// * `data` - Public (or secret) key ring, armored or binary
///
/// # Returns
/// `None` if no key in the ring can encrypt.
pub fn import_public_key(data: &[u8]) -> Option<PublicKey> {
    let key = KeyRing::<PublicKey>::from_bytes(data)
        .into_iter()
        .find(PublicKey::can_encrypt)?;

    debug!(key_id = %key.key_id(), slot = ?key.slot(), "imported public key");
    Some(key)
}

/// Import the first secret key of a key ring.
pub fn import_secret_key(data: &[u8]) -> Option<SecretKey> {
    KeyRing::<SecretKey>::from_bytes(data).into_iter().next()
}

/// Build the identifier lookup table for a secret key ring.
///
/// Every primary key and every secret subkey is indexed.
///
/// # Errors
/// * [`Error::NoKeysFound`] - If the blob holds no secret keys
pub fn lookup_secret_keys_by_id(data: &[u8]) -> Result<SecretKeyTable> {
    let table: SecretKeyTable = KeyRing::<SecretKey>::from_bytes(data).into_iter().collect();

    if table.is_empty() {
        return Err(Error::NoKeysFound);
    }

    debug!(keys = table.len(), "built secret key table");
    Ok(table)
}

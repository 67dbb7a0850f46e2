//! Encryption usability checks.
//!
//! rpgp leaves key policy to its callers. A key is usable for encryption
//! when its algorithm can encrypt, its binding or self-signatures allow
//! encryption, and it is neither revoked nor expired.

use std::time::{Duration, SystemTime};

use pgp::composed::{SignedPublicKey, SignedPublicSubKey};
use pgp::packet::{KeyFlags, Signature, SignatureType};
use pgp::types::KeyDetails;

/// Whether the primary key itself can receive messages.
///
/// Key flags on the self-signatures limit the primary key to what they
/// name. Old certificates whose self-signatures carry no key flags are
/// judged by algorithm alone.
pub(crate) fn primary_can_encrypt(cert: &SignedPublicKey) -> bool {
    if !cert.primary_key.algorithm().can_encrypt() {
        return false;
    }

    let mut flags = self_signatures(cert)
        .map(Signature::key_flags)
        .filter(|flags| *flags != KeyFlags::default())
        .peekable();
    let flagged = flags.peek().is_none() || flags.any(|flags| allows_encryption(&flags));

    flagged && !is_primary_revoked(cert) && !is_primary_expired(cert, SystemTime::now())
}

/// Whether a subkey can receive messages right now.
pub(crate) fn subkey_can_encrypt(subkey: &SignedPublicSubKey) -> bool {
    if !subkey.key.algorithm().can_encrypt() {
        return false;
    }

    let flagged = subkey
        .signatures
        .iter()
        .any(|sig| allows_encryption(&sig.key_flags()));

    flagged && !is_subkey_revoked(subkey) && !is_subkey_expired(subkey, SystemTime::now())
}

fn allows_encryption(flags: &KeyFlags) -> bool {
    flags.encrypt_comms() || flags.encrypt_storage()
}

/// Direct-key signatures followed by the user ID self-signatures.
fn self_signatures(cert: &SignedPublicKey) -> impl Iterator<Item = &Signature> {
    cert.details.direct_signatures.iter().chain(
        cert.details
            .users
            .iter()
            .flat_map(|user| user.signatures.iter()),
    )
}

fn is_primary_revoked(cert: &SignedPublicKey) -> bool {
    cert.details
        .revocation_signatures
        .iter()
        .any(|sig| sig.typ() == Some(SignatureType::KeyRevocation))
}

/// Expiry comes from the newest self-signature that sets one.
fn is_primary_expired(cert: &SignedPublicKey, now: SystemTime) -> bool {
    let validity = self_signatures(cert)
        .filter(|sig| sig.key_expiration_time().is_some())
        .max_by_key(|sig| sig.created())
        .and_then(|sig| sig.key_expiration_time());

    expired(cert.primary_key.created_at().into(), validity, now)
}

fn is_subkey_revoked(subkey: &SignedPublicSubKey) -> bool {
    subkey
        .signatures
        .iter()
        .any(|sig| sig.typ() == Some(SignatureType::SubkeyRevocation))
}

/// Expiry comes from the most recent binding signature.
fn is_subkey_expired(subkey: &SignedPublicSubKey, now: SystemTime) -> bool {
    let validity = subkey
        .signatures
        .last()
        .and_then(|sig| sig.key_expiration_time());

    expired(subkey.key.created_at().into(), validity, now)
}

/// A validity of zero seconds means the key never expires.
fn expired(created: SystemTime, validity: Option<pgp::types::Duration>, now: SystemTime) -> bool {
    let Some(validity) = validity else {
        return false;
    };

    let seconds = validity.as_secs() as u64;
    if seconds == 0 {
        return false;
    }

    created + Duration::from_secs(seconds) < now
}

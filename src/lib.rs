//! # pgputils
//!
//! A small OpenPGP facade built on [rpgp](https://docs.rs/pgp).
//!
//! Two operations are offered:
//!
//! - **Encryption**: wrap bytes in literal data, encrypt them to one public
//!   key, compress the encrypted packets and optionally ASCII-armor the result
//! - **Decryption**: strip the compression and encryption layers of a
//!   message, in whatever order they are nested, using a secret key ring and
//!   its passphrase
//!
//! ## Quick Start
//!
//! ```no_run
//! use pgputils::*;
//!
//! let public = std::fs::read("bob.asc").unwrap();
//! let secret = std::fs::read("bob-secret.asc").unwrap();
//!
//! let recipient = import_public_key(&public).expect("no key can encrypt");
//! let ciphertext = encrypt(b"Hello!", &recipient, true).unwrap();
//!
//! let plaintext = decrypt(&ciphertext, &secret, "passphrase").unwrap();
//! assert_eq!(plaintext.as_deref(), Some(&b"Hello!"[..]));
//! ```
//!
//! ## Defaults
//!
//! | Setting | Default | Alternatives |
//! |---------|---------|--------------|
//! | Cipher | CAST5 | AES-128, AES-256 |
//! | Compression | ZIP | ZLIB, uncompressed |
//! | Literal label | `STREAM` | any |
//! | Message without literal data | `Ok(None)` | error |
//! | Signed layers | read through | rejected |
//!
//! See [`EncryptConfig`] and [`DecryptConfig`].
//!
//! ## Logging
//!
//! Layers and pipeline stages are reported through [`tracing`]; the library
//! installs no subscriber.

pub mod codec;

mod config;
mod decrypt;
mod encrypt;
mod error;
mod internal;
mod key;
mod keyring;
mod packet;
mod types;

// Re-export error types
pub use error::{Error, LayerFault, Result};

// Re-export public types
pub use types::{Decrypted, KeyId, KeySlot, LayerKind};

// Re-export configuration
pub use config::{
    Compression, DecryptConfig, EncryptConfig, MissingLiteral, RecipientSelection,
    SymmetricCipher, UnsupportedLayerPolicy,
};

// Re-export key handling
pub use key::{PrivateKey, PublicKey, SecretKey};
pub use keyring::{
    import_public_key, import_secret_key, lookup_secret_keys_by_id, KeyRing, SecretKeyTable,
};

// Re-export encryption and decryption
pub use decrypt::{decrypt, decrypt_reader, decrypt_with, decrypt_with_keys};
pub use encrypt::{encrypt, encrypt_reader, encrypt_with};

// Re-export codec helpers
pub use codec::{bytes_to_text, text_to_bytes};

//! Property-based tests for the encryption pipeline and the decrypt loop.

use std::path::PathBuf;
use std::sync::OnceLock;

use pgputils::{
    decrypt_with_keys, encrypt, import_public_key, lookup_secret_keys_by_id, DecryptConfig,
    Error, LayerKind, PublicKey, SecretKeyTable,
};
use proptest::prelude::*;

const BOB_PASSPHRASE: &str = "bob-passphrase";

fn read_fixture(name: &str) -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("files")
        .join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("Failed to read {:?}: {}", path, e))
}

fn bob() -> &'static (PublicKey, SecretKeyTable) {
    static BOB: OnceLock<(PublicKey, SecretKeyTable)> = OnceLock::new();
    BOB.get_or_init(|| {
        let public = import_public_key(&read_fixture("bob_public.asc")).unwrap();
        let table = lookup_secret_keys_by_id(&read_fixture("bob_secret.asc")).unwrap();
        (public, table)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Whatever goes in comes back out, armored or not.
    #[test]
    fn prop_round_trip(plaintext in prop::collection::vec(any::<u8>(), 0..4096), armor in any::<bool>()) {
        let (public, table) = bob();

        let ciphertext = encrypt(&plaintext, public, armor).unwrap();
        let decrypted = decrypt_with_keys(&ciphertext, table, BOB_PASSPHRASE, &DecryptConfig::default())
            .unwrap()
            .unwrap();

        prop_assert_eq!(decrypted.plaintext, plaintext);
    }

    /// Arbitrary bytes either fail as malformed or happen to form an
    /// unencrypted message.
    #[test]
    fn prop_random_bytes_are_malformed_or_unencrypted(message in prop::collection::vec(any::<u8>(), 1..512)) {
        let (_, table) = bob();

        match decrypt_with_keys(&message, table, BOB_PASSPHRASE, &DecryptConfig::default()) {
            Err(Error::MalformedMessage(_)) | Ok(None) => {}
            Ok(Some(decrypted)) => {
                prop_assert!(!decrypted.layers.contains(&LayerKind::Encrypted));
                prop_assert_eq!(decrypted.recipient, None);
                prop_assert_eq!(decrypted.layers.last(), Some(&LayerKind::Literal));
            }
            Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
        }
    }

    /// Cutting a message short never panics and never yields the plaintext.
    #[test]
    fn prop_truncation_never_panics(cut in 1usize..400) {
        let (public, table) = bob();
        let ciphertext = encrypt(&[7u8; 300], public, false).unwrap();
        let cut = cut.min(ciphertext.len() - 1);

        let result = decrypt_with_keys(&ciphertext[..cut], table, BOB_PASSPHRASE, &DecryptConfig::default());
        prop_assert!(result.is_err());
    }
}

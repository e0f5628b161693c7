//! Property-based tests for the secret store seal/open round-trip.
//!
//! These verify that sealing then opening preserves arbitrary key material
//! and that the sealed blob never leaks the plaintext.

use osrbrowser::services::secret_store::SecretStore;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn seal_open_roundtrip_preserves_secret(secret in ".{0,256}") {
        let dir = tempfile::tempdir().unwrap();
        let store = SecretStore::open_at(dir.path()).unwrap();

        let sealed = store.seal(&secret).unwrap();
        let opened = store.open(&sealed).unwrap();

        prop_assert_eq!(opened, secret);
    }

    #[test]
    fn sealed_blob_does_not_contain_plaintext(secret in "[a-zA-Z0-9]{12,64}") {
        let dir = tempfile::tempdir().unwrap();
        let store = SecretStore::open_at(dir.path()).unwrap();

        let sealed = store.seal(&secret).unwrap();
        prop_assert!(!sealed.contains(&secret));
    }

    #[test]
    fn roundtrip_survives_store_reopen(secret in ".{1,128}") {
        let dir = tempfile::tempdir().unwrap();
        let sealed = {
            let store = SecretStore::open_at(dir.path()).unwrap();
            store.seal(&secret).unwrap()
        };

        // A fresh instance reads the same device key file.
        let store = SecretStore::open_at(dir.path()).unwrap();
        prop_assert_eq!(store.open(&sealed).unwrap(), secret);
    }
}

//! Integration test: two parties run every phase against on-disk slot directories
//!
//! Alice and Bob each get their own directory. They swap public values, derive
//! the same session key, and Bob reverses a message Alice sealed. A failed phase
//! must leave every existing slot file byte-identical.

use std::collections::HashMap;
use std::path::Path;

use hsim_core::config::SlotsConfig;
use hsim_core::{HsimError, Slot};
use hsim_crypto::{hex_to_bytes, DomainParameters, Envelope, SymmetricKey};
use hsim_sim::{
    run_derive_key, run_exchange, run_keygen, DirStore, KeyPolicy, MessageSource, SlotStore,
};
use num_bigint::BigUint;
use tempfile::TempDir;

fn store_in(dir: &Path) -> DirStore {
    DirStore::with_dir(dir, SlotsConfig::default())
}

fn snapshot(dir: &Path) -> HashMap<String, Vec<u8>> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| {
            let e = e.unwrap();
            (
                e.file_name().to_string_lossy().into_owned(),
                std::fs::read(e.path()).unwrap(),
            )
        })
        .collect()
}

async fn agree(alice: &DirStore, bob: &DirStore) -> SymmetricKey {
    let params = DomainParameters::standard();

    let a = run_keygen(alice, params, KeyPolicy::Regenerate, None)
        .await
        .expect("alice keygen");
    let b = run_keygen(bob, params, KeyPolicy::Regenerate, None)
        .await
        .expect("bob keygen");

    let ka = run_derive_key(alice, params, Some(b.public_value.to_hex().as_str()), None)
        .await
        .expect("alice derive");
    let kb = run_derive_key(bob, params, Some(a.public_value.to_hex().as_str()), None)
        .await
        .expect("bob derive");

    assert_eq!(ka.as_bytes(), kb.as_bytes(), "both sides must agree on S");
    ka
}

#[tokio::test]
async fn full_exchange_between_two_directories() {
    let tmp = TempDir::new().unwrap();
    let alice = store_in(&tmp.path().join("alice"));
    let bob = store_in(&tmp.path().join("bob"));

    let key = agree(&alice, &bob).await;

    // Alice seals a message and hands the hex to Bob
    let sealed = Envelope::seal("Olá, professor".as_bytes(), &key).unwrap();
    let sealed_hex = hsim_crypto::bytes_to_hex(&sealed.to_bytes());

    let out = run_exchange(&bob, MessageSource::Provided(sealed_hex.clone()), None)
        .await
        .expect("bob exchange");

    let on_disk = std::fs::read_to_string(bob.path(Slot::MessageInverted)).unwrap();
    assert_eq!(on_disk, out.reply_hex);
    assert_eq!(
        std::fs::read_to_string(bob.path(Slot::Message)).unwrap(),
        sealed_hex
    );

    // Alice opens Bob's reply with her copy of S
    let alice_key = SymmetricKey::from_hex(&alice.read(Slot::SessionKey).await.unwrap().unwrap())
        .unwrap();
    let reply = Envelope::split(&hex_to_bytes(&on_disk).unwrap()).unwrap();
    let plain = reply.open(&alice_key).unwrap();
    assert_eq!(plain.as_slice(), "rosseforp ,álO".as_bytes());
    assert_ne!(reply.iv(), sealed.iv());
}

#[tokio::test]
async fn public_value_matches_modpow() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(tmp.path());
    let params = DomainParameters::standard();

    run_keygen(&store, params, KeyPolicy::Regenerate, None)
        .await
        .unwrap();

    let a_hex = std::fs::read_to_string(store.path(Slot::PrivateExponent)).unwrap();
    let aa_hex = std::fs::read_to_string(store.path(Slot::PublicValue)).unwrap();
    let a = BigUint::parse_bytes(a_hex.as_bytes(), 16).unwrap();
    let aa = BigUint::parse_bytes(aa_hex.as_bytes(), 16).unwrap();

    assert!(a.bits() < params.bits());
    assert_eq!(aa, params.g().modpow(&a, params.p()));
    assert_eq!(aa_hex, aa_hex.to_lowercase());
}

#[tokio::test]
async fn reuse_survives_restart() {
    let tmp = TempDir::new().unwrap();
    let params = DomainParameters::standard();

    let first = run_keygen(&store_in(tmp.path()), params, KeyPolicy::ReuseExisting, None)
        .await
        .unwrap();
    let second = run_keygen(&store_in(tmp.path()), params, KeyPolicy::ReuseExisting, None)
        .await
        .unwrap();

    assert!(!first.reused);
    assert!(second.reused);
    assert_eq!(first.public_value, second.public_value);
}

#[tokio::test]
async fn failed_exchange_leaves_slots_untouched() {
    let tmp = TempDir::new().unwrap();
    let alice = store_in(&tmp.path().join("alice"));
    let bob = store_in(&tmp.path().join("bob"));
    agree(&alice, &bob).await;

    // Ciphertext sealed under a different key fails padding or UTF-8 checks
    let wrong = SymmetricKey::from_bytes([0xAB; 16]);
    let sealed = Envelope::seal(&[0u8; 40], &wrong).unwrap();
    bob.write(Slot::Message, &hsim_crypto::bytes_to_hex(&sealed.to_bytes()))
        .await
        .unwrap();

    let before = snapshot(bob.dir());
    let err = run_exchange(&bob, MessageSource::Stored, None)
        .await
        .unwrap_err();

    assert!(
        matches!(err, HsimError::Decryption(_) | HsimError::InvalidUtf8(_)),
        "unexpected error: {err}"
    );
    assert_eq!(snapshot(bob.dir()), before);
    assert!(!bob.path(Slot::MessageInverted).exists());
}

#[tokio::test]
async fn exchange_without_key_material_is_missing_slot() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(tmp.path());

    let err = run_exchange(&store, MessageSource::Stored, None)
        .await
        .unwrap_err();
    assert!(matches!(err, HsimError::MissingSlot(_)));
    assert!(err.is_input_error());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn repeated_keygen_with_same_stem_slot_names() {
    let tmp = TempDir::new().unwrap();
    let names = SlotsConfig {
        private_exponent: "key.a".into(),
        public_value: "key.b".into(),
        ..SlotsConfig::default()
    };
    let store = DirStore::with_dir(tmp.path(), names);
    let params = DomainParameters::standard();

    for _ in 0..50 {
        run_keygen(&store, params, KeyPolicy::Regenerate, None)
            .await
            .expect("keygen with same-stem slot names");

        let a_hex = std::fs::read_to_string(tmp.path().join("key.a")).unwrap();
        let aa_hex = std::fs::read_to_string(tmp.path().join("key.b")).unwrap();
        let a = BigUint::parse_bytes(a_hex.as_bytes(), 16).unwrap();
        let aa = BigUint::parse_bytes(aa_hex.as_bytes(), 16).unwrap();
        assert_eq!(aa, params.g().modpow(&a, params.p()), "a and AA out of sync");
    }

    let stray: Vec<_> = std::fs::read_dir(tmp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(stray.is_empty(), "temp files left behind: {stray:?}");
}

//! Session key derivation from the persisted exponent and the peer's public value.

use hsim_core::{HsimResult, Slot};
use hsim_crypto::{
    compute_shared_secret, derive_session_key, DomainParameters, PrivateExponent, PublicValue,
    SymmetricKey,
};
use tracing::info;

use crate::store::{read_required, SlotStore};
use crate::{blocking, echo, Echo, EchoFn};

/// Compute `S` from `a` and `B`, then write it to the session key slot.
///
/// When `peer_hex` is given it is validated and stored in the peer slot first;
/// otherwise the peer slot must already be populated.
pub async fn run_derive_key<S: SlotStore>(
    store: &S,
    params: &DomainParameters,
    peer_hex: Option<&str>,
    hook: Option<&EchoFn>,
) -> HsimResult<SymmetricKey> {
    if let Some(hex) = peer_hex {
        let peer = PublicValue::from_hex(hex)?;
        store.write(Slot::PeerPublicValue, &peer.to_hex()).await?;
    }

    let (a_hex, b_hex) = tokio::try_join!(
        read_required(store, Slot::PrivateExponent),
        read_required(store, Slot::PeerPublicValue)
    )?;
    let a = PrivateExponent::from_hex(&a_hex)?;
    let peer = PublicValue::from_hex(&b_hex)?;

    let params = params.clone();
    let key = blocking(move || {
        let shared = compute_shared_secret(&peer, &a, &params)?;
        Ok(derive_session_key(&shared))
    })
    .await?;

    let key_hex = key.to_hex();
    store.write(Slot::SessionKey, &key_hex).await?;

    info!("session key derived");
    echo(hook, Echo::SessionKey(&key_hex));
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use hsim_core::HsimError;
    use hsim_crypto::{derive_public_value, generate_private_exponent};

    #[tokio::test]
    async fn test_both_sides_derive_same_key() {
        let params = DomainParameters::standard();
        let alice = MemoryStore::new();
        let bob = MemoryStore::new();

        let a = generate_private_exponent(params).unwrap();
        let b = generate_private_exponent(params).unwrap();
        alice.write(Slot::PrivateExponent, &a.to_hex()).await.unwrap();
        bob.write(Slot::PrivateExponent, &b.to_hex()).await.unwrap();

        let aa = derive_public_value(&a, params).to_hex();
        let bb = derive_public_value(&b, params).to_hex();

        let k_alice = run_derive_key(&alice, params, Some(bb.as_str()), None).await.unwrap();
        let k_bob = run_derive_key(&bob, params, Some(aa.as_str()), None).await.unwrap();

        assert_eq!(k_alice.as_bytes(), k_bob.as_bytes());
        assert_eq!(
            alice.read(Slot::SessionKey).await.unwrap(),
            Some(k_alice.to_hex())
        );
        assert_eq!(alice.read(Slot::PeerPublicValue).await.unwrap(), Some(bb));
    }

    #[tokio::test]
    async fn test_golden_session_key() {
        let params = DomainParameters::standard();
        let store = MemoryStore::new();
        store.write(Slot::PrivateExponent, "2").await.unwrap();

        // B = g, a = 2  =>  V = g^2 mod p
        let g_hex = hsim_crypto::biguint_to_hex(params.g());
        let key = run_derive_key(&store, params, Some(g_hex.as_str()), None).await.unwrap();

        assert_eq!(key.to_hex(), "f95d75d404470d6f35740f23485bd1f2");
    }

    #[tokio::test]
    async fn test_missing_peer() {
        let store = MemoryStore::new();
        store.write(Slot::PrivateExponent, "2").await.unwrap();

        let err = run_derive_key(&store, DomainParameters::standard(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, HsimError::MissingSlot(ref s) if s == "peer_public_value"));
    }

    #[tokio::test]
    async fn test_trivial_peer_rejected_without_key_write() {
        let store = MemoryStore::new();
        store.write(Slot::PrivateExponent, "2").await.unwrap();

        let err = run_derive_key(&store, DomainParameters::standard(), Some("1"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, HsimError::InvalidPeerValue(_)));
        assert!(!store.exists(Slot::SessionKey).await.unwrap());
    }
}

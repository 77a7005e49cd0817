//! Phase 1: Diffie-Hellman key material
//!
//! Fresh material is produced as a two-stage chain on the blocking pool:
//! generate `a`, then derive `AA = g^a mod p` once `a` is ready. Both values are
//! complete before either slot is written.

use hsim_core::{HsimResult, Slot};
use hsim_crypto::{
    derive_public_value, generate_private_exponent, DomainParameters, PrivateExponent,
    PublicValue,
};
use tracing::info;

use crate::store::{read_required, SlotStore};
use crate::{blocking, echo, Echo, EchoFn};

/// What to do when key material already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Reuse the persisted pair if both slots are present, otherwise generate.
    ReuseExisting,
    /// Always generate a new pair.
    Regenerate,
}

/// Result of a Phase 1 run.
#[derive(Debug)]
pub struct KeygenOutcome {
    pub private_exponent: PrivateExponent,
    pub public_value: PublicValue,
    /// true if the pair was loaded rather than generated
    pub reused: bool,
}

/// Whether both key material slots are populated.
pub async fn has_key_material<S: SlotStore>(store: &S) -> HsimResult<bool> {
    let (a, aa) = tokio::try_join!(
        store.exists(Slot::PrivateExponent),
        store.exists(Slot::PublicValue)
    )?;
    Ok(a && aa)
}

/// Run Phase 1 and persist `a` and `AA`.
pub async fn run_keygen<S: SlotStore>(
    store: &S,
    params: &DomainParameters,
    policy: KeyPolicy,
    hook: Option<&EchoFn>,
) -> HsimResult<KeygenOutcome> {
    let reuse = policy == KeyPolicy::ReuseExisting && has_key_material(store).await?;

    let (private_exponent, public_value) = if reuse {
        load_pair(store).await?
    } else {
        generate_pair(params).await?
    };

    let a_hex = private_exponent.to_hex();
    let aa_hex = public_value.to_hex();
    tokio::try_join!(
        store.write(Slot::PrivateExponent, &a_hex),
        store.write(Slot::PublicValue, &aa_hex)
    )?;

    info!(reused = reuse, public_hex_len = aa_hex.len(), "key material ready");
    echo(hook, Echo::PrivateExponent(&a_hex));

    Ok(KeygenOutcome {
        private_exponent,
        public_value,
        reused: reuse,
    })
}

async fn load_pair<S: SlotStore>(store: &S) -> HsimResult<(PrivateExponent, PublicValue)> {
    let (a_hex, aa_hex) = tokio::try_join!(
        read_required(store, Slot::PrivateExponent),
        read_required(store, Slot::PublicValue)
    )?;
    Ok((
        PrivateExponent::from_hex(&a_hex)?,
        PublicValue::from_hex(&aa_hex)?,
    ))
}

async fn generate_pair(params: &DomainParameters) -> HsimResult<(PrivateExponent, PublicValue)> {
    let gen_params = params.clone();
    let a = blocking(move || generate_private_exponent(&gen_params)).await?;

    let derive_params = params.clone();
    let a_for_derive = a.clone();
    let aa = blocking(move || Ok(derive_public_value(&a_for_derive, &derive_params))).await?;

    Ok((a, aa))
}

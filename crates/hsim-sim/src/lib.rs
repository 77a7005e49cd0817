//! hsim-sim: phase runners over persisted slots
//!
//! - `keygen`: Phase 1, Diffie-Hellman exponent + public value
//! - `session`: derive the AES session key from the peer's public value
//! - `exchange`: Phase 2, decrypt -> reverse -> re-encrypt a message envelope
//! - `store`: slot persistence (directory or in-memory)
//!
//! Runners never prompt: every operator choice arrives as an argument. All
//! computation for a phase finishes before anything is written, so a failed
//! phase leaves the persisted slots untouched.

pub mod exchange;
pub mod keygen;
pub mod session;
pub mod store;

pub use exchange::{run_exchange, ExchangeOutcome, MessageSource};
pub use keygen::{run_keygen, KeyPolicy, KeygenOutcome};
pub use session::run_derive_key;
pub use store::{DirStore, MemoryStore, SlotStore};

use hsim_core::{HsimError, HsimResult};

/// A secret value offered to the opt-in echo hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo<'a> {
    PrivateExponent(&'a str),
    SessionKey(&'a str),
    Plaintext(&'a str),
    Reversed(&'a str),
}

impl Echo<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            Echo::PrivateExponent(_) => "a",
            Echo::SessionKey(_) => "S",
            Echo::Plaintext(_) => "decrypted message",
            Echo::Reversed(_) => "reversed message",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Echo::PrivateExponent(v)
            | Echo::SessionKey(v)
            | Echo::Plaintext(v)
            | Echo::Reversed(v) => v,
        }
    }
}

/// Diagnostic hook receiving secret values. Only wired when explicitly enabled.
pub type EchoFn = Box<dyn Fn(Echo<'_>) + Send + Sync>;

pub(crate) fn echo(hook: Option<&EchoFn>, value: Echo<'_>) {
    if let Some(hook) = hook {
        hook(value);
    }
}

/// Run CPU-bound work on the blocking pool and wait for it.
pub(crate) async fn blocking<F, T>(f: F) -> HsimResult<T>
where
    F: FnOnce() -> HsimResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| HsimError::Other(anyhow::anyhow!("blocking task failed: {e}")))?
}

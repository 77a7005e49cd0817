//! Phase 2: decrypt the incoming envelope, reverse it, send it back re-encrypted.

use hsim_core::{HsimResult, Slot};
use hsim_crypto::{bytes_to_hex, hex_to_bytes, process_envelope, Envelope, SymmetricKey};
use tracing::info;

use crate::store::{read_required, SlotStore};
use crate::{blocking, echo, Echo, EchoFn};

/// Where the incoming envelope comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSource {
    /// Use the envelope already in the message slot.
    Stored,
    /// A new envelope as hex text; replaces the message slot before processing.
    Provided(String),
}

/// Result of a Phase 2 run.
#[derive(Debug)]
pub struct ExchangeOutcome {
    pub reply: Envelope,
    /// Reply as persisted (`IV || ciphertext`, hex)
    pub reply_hex: String,
}

/// Run Phase 2 and write the reply envelope to the inverted-message slot.
pub async fn run_exchange<S: SlotStore>(
    store: &S,
    source: MessageSource,
    hook: Option<&EchoFn>,
) -> HsimResult<ExchangeOutcome> {
    if let MessageSource::Provided(hex) = &source {
        let hex = hex.trim();
        hex_to_bytes(hex)?;
        store.write(Slot::Message, hex).await?;
    }

    let (key_hex, message_hex) = tokio::try_join!(
        read_required(store, Slot::SessionKey),
        read_required(store, Slot::Message)
    )?;
    let key = SymmetricKey::from_hex(&key_hex)?;
    let envelope = hex_to_bytes(&message_hex)?;

    let exchange = blocking(move || process_envelope(&envelope, &key)).await?;
    echo(hook, Echo::Plaintext(&exchange.plaintext));
    echo(hook, Echo::Reversed(&exchange.reversed));

    let reply_hex = bytes_to_hex(&exchange.reply.to_bytes());
    store.write(Slot::MessageInverted, &reply_hex).await?;

    info!(reply_bytes = reply_hex.len() / 2, "reversed message written");
    Ok(ExchangeOutcome {
        reply: exchange.reply,
        reply_hex,
    })
}

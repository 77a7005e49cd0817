use thiserror::Error;

pub type HsimResult<T> = Result<T, HsimError>;

#[derive(Debug, Error)]
pub enum HsimError {
    #[error("invalid key length: {len} bytes (expected 16)")]
    InvalidKeyLength { len: usize },

    #[error("invalid IV length: {len} bytes (expected 16)")]
    InvalidIvLength { len: usize },

    #[error("cipher initialization failed: {0}")]
    CipherInit(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("decrypted message is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("invalid hex input: {0}")]
    InvalidHexInput(String),

    #[error("envelope too short: {len} bytes (need at least 16 for the IV)")]
    EnvelopeTooShort { len: usize },

    #[error("secure randomness unavailable: {0}")]
    RandomnessUnavailable(String),

    #[error("invalid peer public value: {0}")]
    InvalidPeerValue(String),

    #[error("slot '{0}' is empty or missing")]
    MissingSlot(String),

    #[error("persistence error on slot '{slot}': {source}")]
    Persistence {
        slot: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HsimError {
    /// True for failures caused by the caller's input rather than the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            HsimError::InvalidKeyLength { .. }
                | HsimError::InvalidIvLength { .. }
                | HsimError::Decryption(_)
                | HsimError::InvalidUtf8(_)
                | HsimError::InvalidHexInput(_)
                | HsimError::EnvelopeTooShort { .. }
                | HsimError::InvalidPeerValue(_)
                | HsimError::MissingSlot(_)
        )
    }
}

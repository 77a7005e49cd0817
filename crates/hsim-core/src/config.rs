use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{HsimError, HsimResult};
use crate::types::Slot;

/// Top-level configuration (loaded from hsim.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HsimConfig {
    pub slots: SlotsConfig,
    pub log: LogConfig,
}

/// File names backing each persisted slot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotsConfig {
    /// Directory holding the slot files (default: current directory)
    pub dir: PathBuf,
    pub private_exponent: String,
    pub public_value: String,
    pub peer_public_value: String,
    pub session_key: String,
    pub message: String,
    pub message_inverted: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for SlotsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            private_exponent: "a.txt".into(),
            public_value: "AA.txt".into(),
            peer_public_value: "BB.txt".into(),
            session_key: "S.key".into(),
            message: "message.enc".into(),
            message_inverted: "message_inverted.enc".into(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl SlotsConfig {
    /// File name configured for a slot.
    pub fn file_name(&self, slot: Slot) -> &str {
        match slot {
            Slot::PrivateExponent => &self.private_exponent,
            Slot::PublicValue => &self.public_value,
            Slot::PeerPublicValue => &self.peer_public_value,
            Slot::SessionKey => &self.session_key,
            Slot::Message => &self.message,
            Slot::MessageInverted => &self.message_inverted,
        }
    }

    /// Full path of a slot file.
    pub fn path(&self, slot: Slot) -> PathBuf {
        self.dir.join(self.file_name(slot))
    }
}

impl HsimConfig {
    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> HsimResult<Self> {
        toml::from_str(content).map_err(|e| HsimError::Config(e.to_string()))
    }

    /// Load from a file, or fall back to defaults when it does not exist.
    pub fn load(path: &Path) -> HsimResult<Self> {
        if !path.exists() {
            tracing::warn!("config file not found: {}  (using defaults)", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| HsimError::Config(format!("reading {}: {e}", path.display())))?;
        Self::from_toml(&content)
            .map_err(|e| HsimError::Config(format!("parsing {}: {e}", path.display())))
    }
}

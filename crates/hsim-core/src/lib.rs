pub mod config;
pub mod error;
pub mod types;

pub use error::{HsimError, HsimResult};
pub use types::Slot;

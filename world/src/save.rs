//! Binary persistence of token movement state and the mode toggle.

use eightway_core::{MovementMode, TokenId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::token::Token;

pub(crate) const SAVE_VERSION: u32 = 1;

/// Reasons save data may fail to encode or restore.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The binary codec rejected the data.
    #[error("save data codec failure")]
    Codec(#[from] bincode::Error),
    /// The data was written by an incompatible version.
    #[error("unsupported save data version {found}; expected {expected}")]
    UnsupportedVersion {
        /// Version found in the data.
        found: u32,
        /// Version this build understands.
        expected: u32,
    },
    /// The token list lacks the player.
    #[error("save data has no player token")]
    MissingPlayer,
}

#[derive(Serialize, Deserialize)]
pub(crate) struct SaveData {
    pub(crate) version: u32,
    pub(crate) global_mode: MovementMode,
    pub(crate) next_event_id: u32,
    pub(crate) frame: u64,
    pub(crate) tokens: Vec<Token>,
}

impl SaveData {
    pub(crate) fn encode(&self) -> Result<Vec<u8>, SaveError> {
        Ok(bincode::serialize(self)?)
    }

    pub(crate) fn decode(bytes: &[u8]) -> Result<Self, SaveError> {
        let data: Self = bincode::deserialize(bytes)?;
        if data.version != SAVE_VERSION {
            return Err(SaveError::UnsupportedVersion {
                found: data.version,
                expected: SAVE_VERSION,
            });
        }
        if data.tokens.first().map(|token| token.id) != Some(TokenId::Player) {
            return Err(SaveError::MissingPlayer);
        }
        Ok(data)
    }
}

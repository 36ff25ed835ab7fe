//! Start-up settings for a world.

use eightway_core::{Direction, TilePos, DEFAULT_MOVE_SPEED, DEFAULT_SEARCH_LIMIT};
use serde::{Deserialize, Serialize};

/// Parameters applied when a world is created.
///
/// Every field has a default so adapters can deserialize partial tables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Process-wide default: whether tokens move in eight directions.
    pub eight_way: bool,
    /// Explicit player override of the default, if any.
    pub player_eight_way: Option<bool>,
    /// Maximum path cost a token explores when seeking a tile.
    pub search_limit: u32,
    /// Base move speed applied to every token, 1 to 6.
    pub move_speed: u8,
    /// Player's initial tile.
    pub player_start: TilePos,
    /// Player's initial facing.
    pub player_direction: Direction,
    /// Number of party followers created with the player.
    pub followers: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            eight_way: false,
            player_eight_way: None,
            search_limit: DEFAULT_SEARCH_LIMIT,
            move_speed: DEFAULT_MOVE_SPEED,
            player_start: TilePos::new(0, 0),
            player_direction: Direction::Down,
            followers: 0,
        }
    }
}

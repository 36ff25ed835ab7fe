#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the eight-way movement suite.
//!
//! This crate defines the message surface that connects the frame driver, the
//! authoritative world and the pure movement systems. Systems translate an
//! [`Intent`] into [`Command`] values after inspecting immutable snapshots, the
//! world executes those commands through its `apply` entry point, and then
//! broadcasts [`Event`] values describing what actually happened.

mod direction;
mod geometry;

use serde::{Deserialize, Serialize};

pub use direction::{delta_of, Direction};
pub use geometry::{MapGeometry, Wrap};

/// Search effort granted to a token when nothing else is configured.
pub const DEFAULT_SEARCH_LIMIT: u32 = 12;

/// Move speed granted to a token when nothing else is configured.
pub const DEFAULT_MOVE_SPEED: u8 = 4;

/// Selects which movement algorithm family handles an intent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementMode {
    /// Legacy behaviour restricted to the four straight directions.
    #[default]
    FourWay,
    /// Eight-direction movement including diagonals.
    EightWay,
}

impl MovementMode {
    /// Maps an "eight-direction enabled" flag onto a mode.
    #[must_use]
    pub const fn from_flag(eight_way: bool) -> Self {
        if eight_way {
            Self::EightWay
        } else {
            Self::FourWay
        }
    }

    /// Reports whether diagonals are enabled.
    #[must_use]
    pub const fn is_eight_way(self) -> bool {
        matches!(self, Self::EightWay)
    }
}

/// Location of a tile expressed in signed map coordinates.
///
/// Coordinates are signed because neighbour resolution on non-looping maps
/// may step outside the map before passability rejects the move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    x: i32,
    y: i32,
}

impl TilePos {
    /// Creates a new tile position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the tile.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the tile.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }
}

/// Identifier of a map event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(u32);

impl EventId {
    /// Creates a new event identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Any movable map entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenId {
    /// The party leader controlled by the player.
    Player,
    /// Party member trailing the player, zero-based.
    Follower(u32),
    /// Map event.
    Event(EventId),
}

impl TokenId {
    /// Resolves the engine's character slot convention.
    ///
    /// `0` designates the calling event, `-1` the player, `-2` and below the
    /// followers (`-2` is the first) and positive values a map event id.
    /// Whether the resolved token exists is the world's concern.
    #[must_use]
    pub fn from_slot(slot: i32, current_event: Option<EventId>) -> Option<Self> {
        match slot {
            0 => current_event.map(Self::Event),
            -1 => Some(Self::Player),
            slot if slot < -1 => Some(Self::Follower(slot.unsigned_abs() - 2)),
            slot => u32::try_from(slot)
                .ok()
                .map(|id| Self::Event(EventId::new(id))),
        }
    }
}

/// Drawing priority of a map event. Only same-as-characters events collide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventPriority {
    /// Drawn under characters; never blocks movement.
    BelowCharacters,
    /// Drawn with characters; blocks other tokens.
    #[default]
    SameAsCharacters,
    /// Drawn over characters; never blocks movement.
    AboveCharacters,
}

/// Motion phase of a token, derived from its tile and render positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MotionState {
    /// Render position matches the tile position.
    Idle,
    /// Render position is catching up along one axis.
    MovingStraight,
    /// Render position is catching up along both axes.
    MovingDiagonally,
    /// The token is airborne.
    Jumping,
}

/// Immutable representation of a single token's movement state.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenSnapshot {
    /// Identifier of the token.
    pub id: TokenId,
    /// Tile the token occupies.
    pub position: TilePos,
    /// Horizontal render position measured in tiles.
    pub real_x: f64,
    /// Vertical render position measured in tiles.
    pub real_y: f64,
    /// Facing direction.
    pub direction: Direction,
    /// Whether facing changes are currently suppressed.
    pub direction_fixed: bool,
    /// Whether the token ignores passability.
    pub through: bool,
    /// Whether the token is dashing.
    pub dashing: bool,
    /// Base move speed, 1 (slowest) to 6 (fastest).
    pub move_speed: u8,
    /// Frames from take-off to the top of the current jump arc.
    pub jump_peak: i32,
    /// Frames remaining in the current jump.
    pub jump_count: i32,
    /// Outcome of the last attempted step.
    pub last_move_succeeded: bool,
    /// Number of completed steps.
    pub steps: u64,
    /// Maximum path cost explored by goal seeking.
    pub search_limit: u32,
    /// Effective movement mode for this token.
    pub mode: MovementMode,
    /// Current motion phase.
    pub state: MotionState,
}

/// Passability oracle bound to one token, supplied by the map collaborator.
pub trait MapQuery {
    /// Dimensions and wrap policy of the map.
    fn geometry(&self) -> MapGeometry;

    /// Movement mode the oracle resolves neighbours with.
    fn mode(&self) -> MovementMode;

    /// Reports whether the token may step from `(x, y)` in `direction`.
    fn can_pass(&self, x: i32, y: i32, direction: Direction) -> bool;

    /// Reports whether the token may step diagonally from `(x, y)` along the
    /// provided horizontal and vertical components.
    fn can_pass_diagonally(&self, x: i32, y: i32, horizontal: Direction, vertical: Direction)
        -> bool;
}

/// High-level movement requests a driver issues on behalf of a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Step in a direction, straight or diagonal (the player's input path).
    Step(Direction),
    /// Step diagonally by combining two straight components.
    MoveDiagonally {
        /// `Left` or `Right`.
        horizontal: Direction,
        /// `Down` or `Up`.
        vertical: Direction,
    },
    /// Step in a random direction if passable.
    MoveRandom,
    /// Step toward another token.
    MoveToward(TokenId),
    /// Step away from another token.
    MoveAwayFrom(TokenId),
    /// Face another token without moving.
    TurnToward(TokenId),
    /// Face away from another token without moving.
    TurnAwayFrom(TokenId),
    /// Step in the facing direction.
    MoveForward,
    /// Step opposite the facing direction without turning around.
    MoveBackward,
    /// Turn 90 degrees clockwise.
    TurnRight90,
    /// Turn 90 degrees counter-clockwise.
    TurnLeft90,
    /// Turn 45 degrees clockwise.
    TurnRight45,
    /// Turn 45 degrees counter-clockwise.
    TurnLeft45,
    /// Turn 45 degrees in a random rotation sense.
    TurnRightOrLeft45,
    /// Face a random direction.
    TurnRandom,
    /// Take one step of the path toward a tile.
    MoveTo(TilePos),
    /// Take one step of the path toward another token's tile.
    MoveToToken(TokenId),
    /// Follow a party member by stepping into the tile it just left.
    Chase(TilePos),
    /// Jump by a tile offset.
    Jump {
        /// Horizontal offset in tiles.
        x_plus: i32,
        /// Vertical offset in tiles.
        y_plus: i32,
    },
    /// Jump a number of tiles along the facing direction.
    JumpDistance(i32),
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances every token by one frame.
    Tick,
    /// Attempts a straight step.
    MoveStraight {
        /// Token attempting to move.
        token: TokenId,
        /// Direction of travel.
        direction: Direction,
    },
    /// Attempts a diagonal step.
    MoveDiagonally {
        /// Token attempting to move.
        token: TokenId,
        /// Horizontal component, `Left` or `Right`.
        horizontal: Direction,
        /// Vertical component, `Down` or `Up`.
        vertical: Direction,
    },
    /// Launches a jump by a tile offset.
    Jump {
        /// Token that jumps.
        token: TokenId,
        /// Horizontal offset in tiles.
        x_plus: i32,
        /// Vertical offset in tiles.
        y_plus: i32,
    },
    /// Turns a token unless its direction is fixed.
    SetDirection {
        /// Token to turn.
        token: TokenId,
        /// New facing.
        direction: Direction,
    },
    /// Locks or unlocks a token's facing.
    SetDirectionFix {
        /// Token to update.
        token: TokenId,
        /// Whether facing changes are suppressed.
        fixed: bool,
    },
    /// Toggles dashing.
    SetDashing {
        /// Token to update.
        token: TokenId,
        /// Whether the token dashes.
        dashing: bool,
    },
    /// Changes a token's base move speed.
    SetMoveSpeed {
        /// Token to update.
        token: TokenId,
        /// New speed, clamped to 1..=6.
        speed: u8,
    },
    /// Toggles whether a token ignores passability.
    SetThrough {
        /// Token to update.
        token: TokenId,
        /// Whether passability is ignored.
        through: bool,
    },
    /// Teleports a token, settling its render position.
    Locate {
        /// Token to move.
        token: TokenId,
        /// Destination tile.
        position: TilePos,
    },
    /// Replaces the process-wide default movement mode.
    SetGlobalMode {
        /// New default mode.
        mode: MovementMode,
    },
    /// Sets or clears a token's own mode, which takes precedence over the default.
    SetTokenMode {
        /// Token to update.
        token: TokenId,
        /// Override, or `None` to follow the default.
        mode: Option<MovementMode>,
    },
    /// Appends a follower at the player's tile.
    AddFollower,
    /// Places a new map event.
    SpawnEvent {
        /// Initial tile.
        position: TilePos,
        /// Initial facing.
        direction: Direction,
        /// Drawing priority.
        priority: EventPriority,
        /// Whether the event ignores passability.
        through: bool,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A frame elapsed.
    FrameAdvanced {
        /// Index of the frame that just completed.
        frame: u64,
    },
    /// A token advanced to a neighbouring tile.
    TokenMoved {
        /// Token that moved.
        token: TokenId,
        /// Tile before the move.
        from: TilePos,
        /// Tile after the move.
        to: TilePos,
        /// Direction of travel.
        direction: Direction,
    },
    /// A step was refused; forwarded to the event-trigger collaborator.
    ObstacleTouched {
        /// Token whose step was refused.
        token: TokenId,
        /// Tile the token tried to enter.
        front: TilePos,
        /// Direction of the refused step.
        direction: Direction,
    },
    /// A token took off.
    TokenJumped {
        /// Token that jumped.
        token: TokenId,
        /// Tile at take-off.
        from: TilePos,
        /// Landing tile.
        to: TilePos,
        /// Frames to the top of the arc.
        peak: i32,
    },
    /// A token's facing changed.
    DirectionChanged {
        /// Token that turned.
        token: TokenId,
        /// New facing.
        direction: Direction,
    },
    /// A movement mode changed.
    ModeChanged {
        /// Token whose override changed, or `None` for the default.
        token: Option<TokenId>,
        /// Mode now in effect for that scope.
        mode: MovementMode,
    },
    /// A follower joined the party.
    FollowerAdded {
        /// Identifier of the new follower.
        token: TokenId,
    },
    /// A map event was placed.
    EventSpawned {
        /// Identifier of the new event.
        token: TokenId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_resolve_like_the_engine() {
        let current = Some(EventId::new(7));
        assert_eq!(TokenId::from_slot(-1, current), Some(TokenId::Player));
        assert_eq!(TokenId::from_slot(-2, current), Some(TokenId::Follower(0)));
        assert_eq!(TokenId::from_slot(-4, current), Some(TokenId::Follower(2)));
        assert_eq!(
            TokenId::from_slot(0, current),
            Some(TokenId::Event(EventId::new(7)))
        );
        assert_eq!(TokenId::from_slot(0, None), None);
        assert_eq!(
            TokenId::from_slot(3, None),
            Some(TokenId::Event(EventId::new(3)))
        );
    }

    #[test]
    fn mode_flag_mapping() {
        assert_eq!(MovementMode::from_flag(true), MovementMode::EightWay);
        assert!(!MovementMode::from_flag(false).is_eight_way());
        assert_eq!(MovementMode::default(), MovementMode::FourWay);
    }

    #[test]
    fn token_ids_round_trip_through_bincode() {
        let token = TokenId::Event(EventId::new(42));
        let bytes = bincode::serialize(&token).expect("serialize");
        let restored: TokenId = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, token);
    }
}

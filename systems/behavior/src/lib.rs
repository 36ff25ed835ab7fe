#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Autonomous behaviour library that turns movement intents into world commands.
//!
//! Every intent is resolved through a [`Locomotion`] strategy chosen once per
//! call from the acting token's movement mode. The legacy four-way strategy
//! reproduces the engine's classic rules; the eight-way strategy adds
//! diagonal steps and 45 degree turns.

use std::fmt;

use eightway_core::{
    Command, Direction, Intent, MapGeometry, MapQuery, MovementMode, TilePos, TokenId,
    TokenSnapshot,
};
use eightway_system_path_search as path_search;
use eightway_world::{query, query::Passability, World};
use rand::{Rng, RngCore};

/// Token about to act, bundled with a passability oracle bound to it.
#[derive(Clone, Debug)]
pub struct Actor<'a> {
    /// Movement state at the time the intent is resolved.
    pub snapshot: TokenSnapshot,
    /// Passability evaluated for this token and its mode.
    pub map: Passability<'a>,
}

impl<'a> Actor<'a> {
    /// Looks up a token in the world. Returns `None` for unknown tokens.
    #[must_use]
    pub fn new(world: &'a World, id: TokenId) -> Option<Self> {
        Some(Self {
            snapshot: query::token(world, id)?,
            map: query::passability(world, id)?,
        })
    }

    fn id(&self) -> TokenId {
        self.snapshot.id
    }

    fn position(&self) -> TilePos {
        self.snapshot.position
    }

    fn geometry(&self) -> MapGeometry {
        self.map.geometry()
    }

    /// Signed offsets from `target` to this token, the short way round on looping maps.
    fn offset_from(&self, target: TilePos) -> (i32, i32) {
        let geometry = self.geometry();
        let position = self.position();
        (
            geometry.delta_x(position.x(), target.x()),
            geometry.delta_y(position.y(), target.y()),
        )
    }

    fn can_move(&self, direction: Direction) -> bool {
        let position = self.position();
        match direction.axes() {
            (Some(horizontal), Some(vertical)) => {
                self.map
                    .can_pass_diagonally(position.x(), position.y(), horizontal, vertical)
            }
            _ => self.map.can_pass(position.x(), position.y(), direction),
        }
    }
}

/// Movement rules for one movement mode.
pub trait Locomotion: fmt::Debug {
    /// Mode the strategy implements.
    fn mode(&self) -> MovementMode;

    /// Steps in a direction, reduced to what the mode can express.
    fn step(&self, actor: &Actor<'_>, direction: Direction, out: &mut Vec<Command>);

    /// Steps in a random direction when that step is passable.
    fn move_random(&self, actor: &Actor<'_>, rng: &mut dyn RngCore, out: &mut Vec<Command>);

    /// Steps toward a tile.
    fn move_toward(&self, actor: &Actor<'_>, target: TilePos, out: &mut Vec<Command>);

    /// Steps away from a tile.
    fn move_away_from(&self, actor: &Actor<'_>, target: TilePos, out: &mut Vec<Command>);

    /// Faces a tile.
    fn turn_toward(&self, actor: &Actor<'_>, target: TilePos, out: &mut Vec<Command>);

    /// Faces away from a tile.
    fn turn_away_from(&self, actor: &Actor<'_>, target: TilePos, out: &mut Vec<Command>);

    /// Quarter turn clockwise.
    fn turn_right_90(&self, actor: &Actor<'_>, out: &mut Vec<Command>);

    /// Quarter turn counter-clockwise.
    fn turn_left_90(&self, actor: &Actor<'_>, out: &mut Vec<Command>);

    /// Smallest clockwise turn the mode supports.
    fn turn_right_45(&self, actor: &Actor<'_>, out: &mut Vec<Command>);

    /// Smallest counter-clockwise turn the mode supports.
    fn turn_left_45(&self, actor: &Actor<'_>, out: &mut Vec<Command>);

    /// Faces a random direction.
    fn turn_random(&self, actor: &Actor<'_>, rng: &mut dyn RngCore, out: &mut Vec<Command>);
}

/// Engine rules restricted to the four straight directions.
#[derive(Clone, Copy, Debug, Default)]
pub struct FourWayLocomotion;

impl FourWayLocomotion {
    /// Tries the dominant axis first and falls back to the other one when the
    /// first step would be refused.
    fn greedy_move(
        actor: &Actor<'_>,
        dx: i32,
        dy: i32,
        horizontal: Direction,
        vertical: Direction,
        out: &mut Vec<Command>,
    ) {
        let (first, second) = if dx.abs() > dy.abs() {
            (Some(horizontal), (dy != 0).then_some(vertical))
        } else if dy != 0 {
            (Some(vertical), (dx != 0).then_some(horizontal))
        } else {
            (None, None)
        };

        let Some(first) = first else {
            return;
        };
        move_in(actor, first, out);
        if !actor.can_move(first) {
            if let Some(second) = second {
                move_in(actor, second, out);
            }
        }
    }

    fn greedy_facing(dx: i32, dy: i32, horizontal: Direction, vertical: Direction) -> Option<Direction> {
        if dx.abs() > dy.abs() {
            Some(horizontal)
        } else if dy != 0 {
            Some(vertical)
        } else {
            None
        }
    }
}

impl Locomotion for FourWayLocomotion {
    fn mode(&self) -> MovementMode {
        MovementMode::FourWay
    }

    fn step(&self, actor: &Actor<'_>, direction: Direction, out: &mut Vec<Command>) {
        let straight = match direction.axes() {
            (_, Some(vertical)) => vertical,
            (Some(horizontal), None) => horizontal,
            (None, None) => return,
        };
        move_in(actor, straight, out);
    }

    fn move_random(&self, actor: &Actor<'_>, rng: &mut dyn RngCore, out: &mut Vec<Command>) {
        let direction = Direction::random_straight(rng);
        if actor.can_move(direction) {
            move_in(actor, direction, out);
        }
    }

    fn move_toward(&self, actor: &Actor<'_>, target: TilePos, out: &mut Vec<Command>) {
        let (sx, sy) = actor.offset_from(target);
        Self::greedy_move(
            actor,
            sx,
            sy,
            if sx > 0 { Direction::Left } else { Direction::Right },
            if sy > 0 { Direction::Up } else { Direction::Down },
            out,
        );
    }

    fn move_away_from(&self, actor: &Actor<'_>, target: TilePos, out: &mut Vec<Command>) {
        let (sx, sy) = actor.offset_from(target);
        Self::greedy_move(
            actor,
            sx,
            sy,
            if sx > 0 { Direction::Right } else { Direction::Left },
            if sy > 0 { Direction::Down } else { Direction::Up },
            out,
        );
    }

    fn turn_toward(&self, actor: &Actor<'_>, target: TilePos, out: &mut Vec<Command>) {
        let (sx, sy) = actor.offset_from(target);
        let facing = Self::greedy_facing(
            sx,
            sy,
            if sx > 0 { Direction::Left } else { Direction::Right },
            if sy > 0 { Direction::Up } else { Direction::Down },
        );
        face(actor, facing, out);
    }

    fn turn_away_from(&self, actor: &Actor<'_>, target: TilePos, out: &mut Vec<Command>) {
        let (sx, sy) = actor.offset_from(target);
        let facing = Self::greedy_facing(
            sx,
            sy,
            if sx > 0 { Direction::Right } else { Direction::Left },
            if sy > 0 { Direction::Down } else { Direction::Up },
        );
        face(actor, facing, out);
    }

    fn turn_right_90(&self, actor: &Actor<'_>, out: &mut Vec<Command>) {
        let facing = actor.snapshot.direction;
        if facing.is_straight() {
            face(actor, Some(facing.rotate_right_90()), out);
        }
    }

    fn turn_left_90(&self, actor: &Actor<'_>, out: &mut Vec<Command>) {
        let facing = actor.snapshot.direction;
        if facing.is_straight() {
            face(actor, Some(facing.rotate_left_90()), out);
        }
    }

    fn turn_right_45(&self, actor: &Actor<'_>, out: &mut Vec<Command>) {
        self.turn_right_90(actor, out);
    }

    fn turn_left_45(&self, actor: &Actor<'_>, out: &mut Vec<Command>) {
        self.turn_left_90(actor, out);
    }

    fn turn_random(&self, actor: &Actor<'_>, rng: &mut dyn RngCore, out: &mut Vec<Command>) {
        face(actor, Some(Direction::random_straight(rng)), out);
    }
}

/// Rules that treat diagonals as first-class directions.
#[derive(Clone, Copy, Debug, Default)]
pub struct EightWayLocomotion;

impl EightWayLocomotion {
    fn try_move(actor: &Actor<'_>, direction: Option<Direction>, out: &mut Vec<Command>) {
        if let Some(direction) = direction {
            if actor.can_move(direction) {
                move_in(actor, direction, out);
            }
        }
    }
}

impl Locomotion for EightWayLocomotion {
    fn mode(&self) -> MovementMode {
        MovementMode::EightWay
    }

    fn step(&self, actor: &Actor<'_>, direction: Direction, out: &mut Vec<Command>) {
        move_in(actor, direction, out);
    }

    fn move_random(&self, actor: &Actor<'_>, rng: &mut dyn RngCore, out: &mut Vec<Command>) {
        Self::try_move(actor, Some(Direction::random(rng)), out);
    }

    fn move_toward(&self, actor: &Actor<'_>, target: TilePos, out: &mut Vec<Command>) {
        let (sx, sy) = actor.offset_from(target);
        Self::try_move(actor, Direction::from_delta(-sx, -sy), out);
    }

    fn move_away_from(&self, actor: &Actor<'_>, target: TilePos, out: &mut Vec<Command>) {
        let (sx, sy) = actor.offset_from(target);
        Self::try_move(actor, Direction::from_delta(sx, sy), out);
    }

    fn turn_toward(&self, actor: &Actor<'_>, target: TilePos, out: &mut Vec<Command>) {
        let (sx, sy) = actor.offset_from(target);
        face(actor, Direction::from_delta(-sx, -sy), out);
    }

    fn turn_away_from(&self, actor: &Actor<'_>, target: TilePos, out: &mut Vec<Command>) {
        let (sx, sy) = actor.offset_from(target);
        face(actor, Direction::from_delta(sx, sy), out);
    }

    fn turn_right_90(&self, actor: &Actor<'_>, out: &mut Vec<Command>) {
        face(actor, Some(actor.snapshot.direction.rotate_right_90()), out);
    }

    fn turn_left_90(&self, actor: &Actor<'_>, out: &mut Vec<Command>) {
        face(actor, Some(actor.snapshot.direction.rotate_left_90()), out);
    }

    fn turn_right_45(&self, actor: &Actor<'_>, out: &mut Vec<Command>) {
        face(actor, Some(actor.snapshot.direction.rotate_right_45()), out);
    }

    fn turn_left_45(&self, actor: &Actor<'_>, out: &mut Vec<Command>) {
        face(actor, Some(actor.snapshot.direction.rotate_left_45()), out);
    }

    fn turn_random(&self, actor: &Actor<'_>, rng: &mut dyn RngCore, out: &mut Vec<Command>) {
        face(actor, Some(Direction::random(rng)), out);
    }
}

/// Strategy implementing a movement mode.
#[must_use]
pub fn locomotion(mode: MovementMode) -> &'static dyn Locomotion {
    match mode {
        MovementMode::FourWay => &FourWayLocomotion,
        MovementMode::EightWay => &EightWayLocomotion,
    }
}

/// Emits the move command for a direction without checking passability.
fn move_in(actor: &Actor<'_>, direction: Direction, out: &mut Vec<Command>) {
    let token = actor.id();
    match direction.axes() {
        (Some(horizontal), Some(vertical)) => out.push(Command::MoveDiagonally {
            token,
            horizontal,
            vertical,
        }),
        _ => out.push(Command::MoveStraight { token, direction }),
    }
}

fn face(actor: &Actor<'_>, direction: Option<Direction>, out: &mut Vec<Command>) {
    if let Some(direction) = direction {
        out.push(Command::SetDirection {
            token: actor.id(),
            direction,
        });
    }
}

/// Pure system that resolves intents into world commands.
#[derive(Debug, Default)]
pub struct Behavior;

impl Behavior {
    /// Resolves one intent for `id`, appending the commands that carry it out.
    ///
    /// Intents naming a missing token or target are dropped.
    pub fn handle<R>(
        &self,
        world: &World,
        id: TokenId,
        intent: &Intent,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng,
    {
        let Some(actor) = Actor::new(world, id) else {
            log::trace!("dropped {intent:?} for missing token {id:?}");
            return;
        };
        let strategy = locomotion(actor.snapshot.mode);
        let target_tile = |target: TokenId| {
            let tile = query::token(world, target).map(|snapshot| snapshot.position);
            if tile.is_none() {
                log::trace!("dropped {intent:?}: target {target:?} does not exist");
            }
            tile
        };

        match *intent {
            Intent::Step(direction) => strategy.step(&actor, direction, out),
            Intent::MoveDiagonally {
                horizontal,
                vertical,
            } => out.push(Command::MoveDiagonally {
                token: id,
                horizontal,
                vertical,
            }),
            Intent::MoveRandom => strategy.move_random(&actor, rng, out),
            Intent::MoveToward(target) => {
                if let Some(tile) = target_tile(target) {
                    strategy.move_toward(&actor, tile, out);
                }
            }
            Intent::MoveAwayFrom(target) => {
                if let Some(tile) = target_tile(target) {
                    strategy.move_away_from(&actor, tile, out);
                }
            }
            Intent::TurnToward(target) => {
                if let Some(tile) = target_tile(target) {
                    strategy.turn_toward(&actor, tile, out);
                }
            }
            Intent::TurnAwayFrom(target) => {
                if let Some(tile) = target_tile(target) {
                    strategy.turn_away_from(&actor, tile, out);
                }
            }
            Intent::MoveForward => strategy.step(&actor, actor.snapshot.direction, out),
            Intent::MoveBackward => {
                out.push(Command::SetDirectionFix {
                    token: id,
                    fixed: true,
                });
                strategy.step(&actor, actor.snapshot.direction.reverse(), out);
                out.push(Command::SetDirectionFix {
                    token: id,
                    fixed: actor.snapshot.direction_fixed,
                });
            }
            Intent::TurnRight90 => strategy.turn_right_90(&actor, out),
            Intent::TurnLeft90 => strategy.turn_left_90(&actor, out),
            Intent::TurnRight45 => strategy.turn_right_45(&actor, out),
            Intent::TurnLeft45 => strategy.turn_left_45(&actor, out),
            Intent::TurnRightOrLeft45 => {
                if rng.gen_bool(0.5) {
                    strategy.turn_right_45(&actor, out);
                } else {
                    strategy.turn_left_45(&actor, out);
                }
            }
            Intent::TurnRandom => strategy.turn_random(&actor, rng, out),
            Intent::MoveTo(goal) => move_to(&actor, goal, out),
            Intent::MoveToToken(target) => {
                if let Some(tile) = target_tile(target) {
                    move_to(&actor, tile, out);
                }
            }
            Intent::Chase(tile) => chase(&actor, tile, out),
            Intent::Jump { x_plus, y_plus } => out.push(Command::Jump {
                token: id,
                x_plus,
                y_plus,
            }),
            Intent::JumpDistance(distance) => {
                let (dx, dy) = actor.snapshot.direction.delta();
                out.push(Command::Jump {
                    token: id,
                    x_plus: dx.saturating_mul(distance),
                    y_plus: dy.saturating_mul(distance),
                });
            }
        }
    }
}

fn move_to(actor: &Actor<'_>, goal: TilePos, out: &mut Vec<Command>) {
    let direction = path_search::find_direction(
        &actor.map,
        actor.position(),
        goal,
        actor.snapshot.search_limit,
    );
    if let Some(direction) = direction {
        move_in(actor, direction, out);
    }
}

fn chase(actor: &Actor<'_>, tile: TilePos, out: &mut Vec<Command>) {
    let (sx, sy) = actor.offset_from(tile);
    let horizontal = if sx > 0 { Direction::Left } else { Direction::Right };
    let vertical = if sy > 0 { Direction::Up } else { Direction::Down };
    match (sx != 0, sy != 0) {
        (true, true) => out.push(Command::MoveDiagonally {
            token: actor.id(),
            horizontal,
            vertical,
        }),
        (true, false) => move_in(actor, horizontal, out),
        (false, true) => move_in(actor, vertical, out),
        (false, false) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategies_report_their_modes() {
        assert_eq!(locomotion(MovementMode::FourWay).mode(), MovementMode::FourWay);
        assert_eq!(locomotion(MovementMode::EightWay).mode(), MovementMode::EightWay);
    }

    #[test]
    fn greedy_facing_prefers_strictly_dominant_horizontal() {
        let facing = |dx, dy| {
            FourWayLocomotion::greedy_facing(dx, dy, Direction::Left, Direction::Up)
        };

        assert_eq!(facing(3, 1), Some(Direction::Left));
        assert_eq!(facing(2, 2), Some(Direction::Up));
        assert_eq!(facing(2, 0), Some(Direction::Left));
        assert_eq!(facing(0, 0), None);
    }
}

//! Per-token movement state and the frame update that animates it.

use eightway_core::{
    Direction, EventPriority, MapGeometry, MotionState, MovementMode, TilePos, TokenId,
    TokenSnapshot, DEFAULT_MOVE_SPEED, DEFAULT_SEARCH_LIMIT,
};
use serde::{Deserialize, Serialize};

const MIN_MOVE_SPEED: u8 = 1;
const MAX_MOVE_SPEED: u8 = 6;
const JUMP_BASELINE_FRAMES: i32 = 10;

/// Movement state owned by a single token. Persisted verbatim in save data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Token {
    pub(crate) id: TokenId,
    x: i32,
    y: i32,
    real_x: f64,
    real_y: f64,
    direction: Direction,
    direction_fixed: bool,
    pub(crate) through: bool,
    pub(crate) dashing: bool,
    move_speed: u8,
    jump_peak: i32,
    jump_count: i32,
    pub(crate) last_move_succeeded: bool,
    steps: u64,
    search_limit: u32,
    pub(crate) priority: EventPriority,
    pub(crate) mode_override: Option<MovementMode>,
}

impl Token {
    pub(crate) fn new(id: TokenId, position: TilePos, direction: Direction) -> Self {
        Self {
            id,
            x: position.x(),
            y: position.y(),
            real_x: f64::from(position.x()),
            real_y: f64::from(position.y()),
            direction,
            direction_fixed: false,
            through: false,
            dashing: false,
            move_speed: DEFAULT_MOVE_SPEED,
            jump_peak: 0,
            jump_count: 0,
            last_move_succeeded: true,
            steps: 0,
            search_limit: DEFAULT_SEARCH_LIMIT,
            priority: EventPriority::SameAsCharacters,
            mode_override: None,
        }
    }

    pub(crate) fn with_limits(mut self, move_speed: u8, search_limit: u32) -> Self {
        self.move_speed = move_speed.clamp(MIN_MOVE_SPEED, MAX_MOVE_SPEED);
        self.search_limit = search_limit;
        self
    }

    pub(crate) const fn position(&self) -> TilePos {
        TilePos::new(self.x, self.y)
    }

    pub(crate) const fn direction(&self) -> Direction {
        self.direction
    }

    pub(crate) const fn move_speed(&self) -> u8 {
        self.move_speed
    }

    pub(crate) fn set_move_speed(&mut self, speed: u8) {
        self.move_speed = speed.clamp(MIN_MOVE_SPEED, MAX_MOVE_SPEED);
    }

    pub(crate) fn set_direction_fix(&mut self, fixed: bool) {
        self.direction_fixed = fixed;
    }

    /// Turns the token unless its facing is fixed. Returns whether it turned.
    pub(crate) fn set_direction(&mut self, direction: Direction) -> bool {
        if self.direction_fixed || self.direction == direction {
            return false;
        }
        self.direction = direction;
        true
    }

    /// Moves the tile position and leaves the render position one step behind.
    pub(crate) fn advance(&mut self, to: TilePos, real_x: i32, real_y: i32) {
        self.x = to.x();
        self.y = to.y();
        self.real_x = f64::from(real_x);
        self.real_y = f64::from(real_y);
        self.steps = self.steps.saturating_add(1);
    }

    /// Teleports the token and settles its render position.
    pub(crate) fn locate(&mut self, position: TilePos) {
        self.x = position.x();
        self.y = position.y();
        self.real_x = f64::from(position.x());
        self.real_y = f64::from(position.y());
        self.jump_count = 0;
    }

    /// Starts a jump; the tile position changes immediately.
    pub(crate) fn launch(&mut self, x_plus: i32, y_plus: i32) -> i32 {
        self.x = self.x.saturating_add(x_plus);
        self.y = self.y.saturating_add(y_plus);
        let distance = f64::from(x_plus).hypot(f64::from(y_plus)).round() as i32;
        self.jump_peak = JUMP_BASELINE_FRAMES
            .saturating_add(distance)
            .saturating_sub(i32::from(self.move_speed));
        self.jump_count = self.jump_peak.saturating_mul(2);
        self.jump_peak
    }

    fn real_move_speed(&self) -> u8 {
        self.move_speed + u8::from(self.dashing)
    }

    fn distance_per_frame(&self) -> f64 {
        f64::from(1_u32 << self.real_move_speed()) / 256.0
    }

    fn is_jumping(&self) -> bool {
        self.jump_count > 0
    }

    pub(crate) fn state(&self) -> MotionState {
        if self.is_jumping() {
            return MotionState::Jumping;
        }
        let moving_x = self.real_x != f64::from(self.x);
        let moving_y = self.real_y != f64::from(self.y);
        match (moving_x, moving_y) {
            (true, true) => MotionState::MovingDiagonally,
            (true, false) | (false, true) => MotionState::MovingStraight,
            (false, false) => MotionState::Idle,
        }
    }

    /// Advances the render position by one frame.
    pub(crate) fn update(&mut self, geometry: &MapGeometry) {
        if self.is_jumping() {
            self.update_jump(geometry);
        } else {
            self.update_move();
        }
    }

    fn update_jump(&mut self, geometry: &MapGeometry) {
        self.jump_count -= 1;
        let remaining = f64::from(self.jump_count);
        self.real_x = (self.real_x * remaining + f64::from(self.x)) / (remaining + 1.0);
        self.real_y = (self.real_y * remaining + f64::from(self.y)) / (remaining + 1.0);
        if self.jump_count == 0 {
            self.locate(TilePos::new(
                geometry.round_x(self.x),
                geometry.round_y(self.y),
            ));
        }
    }

    fn update_move(&mut self) {
        let step = self.distance_per_frame();
        self.real_x = approach(self.real_x, f64::from(self.x), step);
        self.real_y = approach(self.real_y, f64::from(self.y), step);
    }

    pub(crate) fn snapshot(&self, mode: MovementMode) -> TokenSnapshot {
        TokenSnapshot {
            id: self.id,
            position: self.position(),
            real_x: self.real_x,
            real_y: self.real_y,
            direction: self.direction,
            direction_fixed: self.direction_fixed,
            through: self.through,
            dashing: self.dashing,
            move_speed: self.move_speed,
            jump_peak: self.jump_peak,
            jump_count: self.jump_count,
            last_move_succeeded: self.last_move_succeeded,
            steps: self.steps,
            search_limit: self.search_limit,
            mode,
            state: self.state(),
        }
    }
}

fn approach(current: f64, target: f64, step: f64) -> f64 {
    if current < target {
        (current + step).min(target)
    } else if current > target {
        (current - step).max(target)
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eightway_core::Wrap;

    fn geometry() -> MapGeometry {
        MapGeometry::new(8, 8, Wrap::default())
    }

    #[test]
    fn render_position_catches_up_in_sixteen_frames_at_default_speed() {
        let mut token = Token::new(TokenId::Player, TilePos::new(1, 1), Direction::Down);
        token.advance(TilePos::new(2, 1), 1, 1);
        assert_eq!(token.state(), MotionState::MovingStraight);

        for _ in 0..15 {
            token.update(&geometry());
        }
        assert_eq!(token.state(), MotionState::MovingStraight);

        token.update(&geometry());
        assert_eq!(token.state(), MotionState::Idle);
    }

    #[test]
    fn dashing_doubles_the_frame_distance() {
        let mut token = Token::new(TokenId::Player, TilePos::new(1, 1), Direction::Down);
        token.dashing = true;
        token.advance(TilePos::new(2, 2), 1, 1);
        assert_eq!(token.state(), MotionState::MovingDiagonally);

        for _ in 0..8 {
            token.update(&geometry());
        }
        assert_eq!(token.state(), MotionState::Idle);
    }

    #[test]
    fn jump_peak_follows_distance_and_speed() {
        let mut token = Token::new(TokenId::Player, TilePos::new(0, 0), Direction::Down);

        let peak = token.launch(3, 4);

        assert_eq!(peak, 10 + 5 - 4);
        assert_eq!(token.position(), TilePos::new(3, 4));
        assert_eq!(token.state(), MotionState::Jumping);
        for _ in 0..(peak * 2) {
            token.update(&geometry());
        }
        assert_eq!(token.state(), MotionState::Idle);
        assert_eq!(token.snapshot(MovementMode::EightWay).real_x, 3.0);
    }

    #[test]
    fn far_jumps_saturate() {
        let mut token = Token::new(
            TokenId::Player,
            TilePos::new(i32::MAX - 1, 0),
            Direction::Right,
        );

        let peak = token.launch(i32::MAX, i32::MIN);

        assert_eq!(peak, i32::MAX - 4);
        assert_eq!(token.position(), TilePos::new(i32::MAX, i32::MIN));
        assert_eq!(token.state(), MotionState::Jumping);
    }

    #[test]
    fn fixed_direction_ignores_turns() {
        let mut token = Token::new(TokenId::Player, TilePos::new(0, 0), Direction::Down);
        token.set_direction_fix(true);

        assert!(!token.set_direction(Direction::Up));
        assert_eq!(token.direction(), Direction::Down);
    }
}

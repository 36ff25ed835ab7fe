//! Numpad direction codebook shared by every movement component.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Compass direction numbered like the keys of a numeric keypad.
///
/// Codes `0` and `5` mean "no direction / keep current" and have no variant.
/// Every API that accepts a raw code maps them to `None`, which callers treat
/// as a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// Code 1, south-west.
    DownLeft = 1,
    /// Code 2, south.
    Down = 2,
    /// Code 3, south-east.
    DownRight = 3,
    /// Code 4, west.
    Left = 4,
    /// Code 6, east.
    Right = 6,
    /// Code 7, north-west.
    UpLeft = 7,
    /// Code 8, north.
    Up = 8,
    /// Code 9, north-east.
    UpRight = 9,
}

/// Clockwise wheel starting at north. Rotations walk this ring.
const WHEEL: [Direction; 8] = [
    Direction::Up,
    Direction::UpRight,
    Direction::Right,
    Direction::DownRight,
    Direction::Down,
    Direction::DownLeft,
    Direction::Left,
    Direction::UpLeft,
];

impl Direction {
    /// Every direction in ascending numpad order (1, 2, 3, 4, 6, 7, 8, 9).
    pub const ALL: [Direction; 8] = [
        Direction::DownLeft,
        Direction::Down,
        Direction::DownRight,
        Direction::Left,
        Direction::Right,
        Direction::UpLeft,
        Direction::Up,
        Direction::UpRight,
    ];

    /// The four cardinal directions in ascending numpad order (2, 4, 6, 8).
    pub const STRAIGHT: [Direction; 4] = [
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::Up,
    ];

    /// The four intercardinal directions in ascending numpad order (1, 3, 7, 9).
    pub const DIAGONAL: [Direction; 4] = [
        Direction::DownLeft,
        Direction::DownRight,
        Direction::UpLeft,
        Direction::UpRight,
    ];

    /// Decodes a numpad code, returning `None` for 0, 5 and out-of-range values.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::DownLeft),
            2 => Some(Self::Down),
            3 => Some(Self::DownRight),
            4 => Some(Self::Left),
            6 => Some(Self::Right),
            7 => Some(Self::UpLeft),
            8 => Some(Self::Up),
            9 => Some(Self::UpRight),
            _ => None,
        }
    }

    /// Numpad code of the direction.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Unit tile offset `(dx, dy)` of the direction; `y` grows downwards.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::DownLeft => (-1, 1),
            Self::Down => (0, 1),
            Self::DownRight => (1, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::UpLeft => (-1, -1),
            Self::Up => (0, -1),
            Self::UpRight => (1, -1),
        }
    }

    /// Direction matching the signs of the provided offsets.
    ///
    /// Returns `None` when both offsets are zero. Only the sign of each
    /// component is considered, so unit offsets round-trip through [`delta`].
    ///
    /// [`delta`]: Direction::delta
    #[must_use]
    pub const fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx.signum(), dy.signum()) {
            (-1, 1) => Some(Self::DownLeft),
            (0, 1) => Some(Self::Down),
            (1, 1) => Some(Self::DownRight),
            (-1, 0) => Some(Self::Left),
            (1, 0) => Some(Self::Right),
            (-1, -1) => Some(Self::UpLeft),
            (0, -1) => Some(Self::Up),
            (1, -1) => Some(Self::UpRight),
            _ => None,
        }
    }

    /// Combines a horizontal (`Left`/`Right`/none) and vertical
    /// (`Down`/`Up`/none) component into a single direction.
    ///
    /// Components on the wrong axis yield `None`.
    #[must_use]
    pub const fn from_axes(horizontal: Option<Self>, vertical: Option<Self>) -> Option<Self> {
        let dx = match horizontal {
            None => 0,
            Some(Self::Left) => -1,
            Some(Self::Right) => 1,
            Some(_) => return None,
        };
        let dy = match vertical {
            None => 0,
            Some(Self::Down) => 1,
            Some(Self::Up) => -1,
            Some(_) => return None,
        };
        Self::from_delta(dx, dy)
    }

    /// Splits the direction into its horizontal and vertical straight components.
    #[must_use]
    pub const fn axes(self) -> (Option<Self>, Option<Self>) {
        let (dx, dy) = self.delta();
        let horizontal = match dx {
            -1 => Some(Self::Left),
            1 => Some(Self::Right),
            _ => None,
        };
        let vertical = match dy {
            1 => Some(Self::Down),
            -1 => Some(Self::Up),
            _ => None,
        };
        (horizontal, vertical)
    }

    /// Opposite direction.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::DownLeft => Self::UpRight,
            Self::Down => Self::Up,
            Self::DownRight => Self::UpLeft,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::UpLeft => Self::DownRight,
            Self::Up => Self::Down,
            Self::UpRight => Self::DownLeft,
        }
    }

    /// Reports whether the direction is one of 2, 4, 6, 8.
    #[must_use]
    pub const fn is_straight(self) -> bool {
        matches!(self, Self::Down | Self::Left | Self::Right | Self::Up)
    }

    /// Reports whether the direction is one of 1, 3, 7, 9.
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        !self.is_straight()
    }

    /// Reports whether the direction is one of 1, 4, 7.
    #[must_use]
    pub const fn is_left(self) -> bool {
        matches!(self, Self::DownLeft | Self::Left | Self::UpLeft)
    }

    /// Reports whether the direction is one of 3, 6, 9.
    #[must_use]
    pub const fn is_right(self) -> bool {
        matches!(self, Self::DownRight | Self::Right | Self::UpRight)
    }

    /// Reports whether the direction is one of 1, 2, 3.
    #[must_use]
    pub const fn is_low(self) -> bool {
        matches!(self, Self::DownLeft | Self::Down | Self::DownRight)
    }

    /// Reports whether the direction is one of 7, 8, 9.
    #[must_use]
    pub const fn is_up(self) -> bool {
        matches!(self, Self::UpLeft | Self::Up | Self::UpRight)
    }

    /// Picks one of the eight directions.
    ///
    /// A coin flip first chooses between the straight and the diagonal group,
    /// then one member of that group is drawn uniformly.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let group = if rng.gen_bool(0.5) {
            &Self::STRAIGHT
        } else {
            &Self::DIAGONAL
        };
        group[rng.gen_range(0..group.len())]
    }

    /// Picks one of the four straight directions uniformly.
    pub fn random_straight<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::STRAIGHT[rng.gen_range(0..Self::STRAIGHT.len())]
    }

    /// Turns one wheel position clockwise.
    #[must_use]
    pub const fn rotate_right_45(self) -> Self {
        self.step_wheel(1)
    }

    /// Turns one wheel position counter-clockwise.
    #[must_use]
    pub const fn rotate_left_45(self) -> Self {
        self.step_wheel(7)
    }

    /// Turns two wheel positions clockwise.
    #[must_use]
    pub const fn rotate_right_90(self) -> Self {
        self.step_wheel(2)
    }

    /// Turns two wheel positions counter-clockwise.
    #[must_use]
    pub const fn rotate_left_90(self) -> Self {
        self.step_wheel(6)
    }

    const fn step_wheel(self, steps: usize) -> Self {
        WHEEL[(self.wheel_index() + steps) % WHEEL.len()]
    }

    const fn wheel_index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::UpRight => 1,
            Self::Right => 2,
            Self::DownRight => 3,
            Self::Down => 4,
            Self::DownLeft => 5,
            Self::Left => 6,
            Self::UpLeft => 7,
        }
    }

    /// Lower-case compass abbreviation (`"sw"`, `"s"`, ..., `"ne"`).
    #[must_use]
    pub const fn compass(self) -> &'static str {
        match self {
            Self::DownLeft => "sw",
            Self::Down => "s",
            Self::DownRight => "se",
            Self::Left => "w",
            Self::Right => "e",
            Self::UpLeft => "nw",
            Self::Up => "n",
            Self::UpRight => "ne",
        }
    }

    /// Numpad key label (`"1"` through `"9"`).
    #[must_use]
    pub const fn numpad(self) -> &'static str {
        match self {
            Self::DownLeft => "1",
            Self::Down => "2",
            Self::DownRight => "3",
            Self::Left => "4",
            Self::Right => "6",
            Self::UpLeft => "7",
            Self::Up => "8",
            Self::UpRight => "9",
        }
    }

    /// Human readable label used in run reports (`"Down Left"`, ...).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DownLeft => "Down Left",
            Self::Down => "Down",
            Self::DownRight => "Down Right",
            Self::Left => "Left",
            Self::Right => "Right",
            Self::UpLeft => "Up Left",
            Self::Up => "Up",
            Self::UpRight => "Up Right",
        }
    }

    /// Parses a label produced by [`label`](Direction::label).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|direction| direction.label() == label)
    }
}

/// Offset of an optional direction, `(0, 0)` for "no direction".
#[must_use]
pub const fn delta_of(direction: Option<Direction>) -> (i32, i32) {
    match direction {
        Some(direction) => direction.delta(),
        None => (0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn codes_round_trip_and_reject_neutral_values() {
        for direction in Direction::ALL {
            assert_eq!(Direction::from_code(i32::from(direction.code())), Some(direction));
        }
        assert_eq!(Direction::from_code(0), None);
        assert_eq!(Direction::from_code(5), None);
        assert_eq!(Direction::from_code(10), None);
        assert_eq!(Direction::from_code(-2), None);
    }

    #[test]
    fn unit_deltas_round_trip() {
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx == 0 && dy == 0 {
                    assert_eq!(Direction::from_delta(dx, dy), None);
                    continue;
                }
                let direction = Direction::from_delta(dx, dy).expect("unit delta has a direction");
                assert_eq!(direction.delta(), (dx, dy));
            }
        }
        assert_eq!(delta_of(None), (0, 0));
    }

    #[test]
    fn ninety_degree_turns_are_inverse() {
        for direction in Direction::ALL {
            assert_eq!(direction.rotate_right_90().rotate_left_90(), direction);
            assert_eq!(direction.rotate_left_90().rotate_right_90(), direction);
            assert_eq!(direction.rotate_right_45().rotate_left_45(), direction);
        }
    }

    #[test]
    fn full_revolutions_return_to_start() {
        for direction in Direction::ALL {
            let mut by_45 = direction;
            for _ in 0..8 {
                by_45 = by_45.rotate_right_45();
            }
            assert_eq!(by_45, direction);

            let mut by_90 = direction;
            for _ in 0..4 {
                by_90 = by_90.rotate_right_90();
            }
            assert_eq!(by_90, direction);
        }
    }

    #[test]
    fn turn_tables_match_engine_layout() {
        assert_eq!(Direction::Down.rotate_right_90(), Direction::Left);
        assert_eq!(Direction::Up.rotate_right_90(), Direction::Right);
        assert_eq!(Direction::DownLeft.rotate_right_90(), Direction::UpLeft);
        assert_eq!(Direction::Down.rotate_left_90(), Direction::Right);
        assert_eq!(Direction::Up.rotate_right_45(), Direction::UpRight);
        assert_eq!(Direction::Down.rotate_right_45(), Direction::DownLeft);
        assert_eq!(Direction::Right.rotate_left_45(), Direction::UpRight);
    }

    #[test]
    fn classification_triples() {
        let left: Vec<u8> = Direction::ALL
            .into_iter()
            .filter(|d| d.is_left())
            .map(Direction::code)
            .collect();
        assert_eq!(left, vec![1, 4, 7]);
        let up: Vec<u8> = Direction::ALL
            .into_iter()
            .filter(|d| d.is_up())
            .map(Direction::code)
            .collect();
        assert_eq!(up, vec![7, 8, 9]);
        assert!(Direction::DownRight.is_low() && Direction::DownRight.is_right());
        assert!(Direction::Left.is_straight() && !Direction::Left.is_diagonal());
    }

    #[test]
    fn axes_compose_back_into_direction() {
        for direction in Direction::ALL {
            let (horizontal, vertical) = direction.axes();
            assert_eq!(Direction::from_axes(horizontal, vertical), Some(direction));
        }
        assert_eq!(Direction::from_axes(None, None), None);
        assert_eq!(Direction::from_axes(Some(Direction::Up), None), None);
        assert_eq!(
            Direction::from_axes(Some(Direction::Left), Some(Direction::Down)),
            Some(Direction::DownLeft)
        );
    }

    #[test]
    fn labels_round_trip() {
        for direction in Direction::ALL {
            assert_eq!(Direction::from_label(direction.label()), Some(direction));
            assert_eq!(direction.numpad(), direction.code().to_string());
        }
        assert_eq!(Direction::UpRight.compass(), "ne");
        assert_eq!(Direction::from_label("Sideways"), None);
    }

    #[test]
    fn random_direction_covers_both_groups() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
        let mut straight = 0;
        let mut diagonal = 0;
        for _ in 0..2_000 {
            if Direction::random(&mut rng).is_straight() {
                straight += 1;
            } else {
                diagonal += 1;
            }
        }
        assert!(straight > 800 && diagonal > 800, "{straight} vs {diagonal}");
        for _ in 0..100 {
            assert!(Direction::random_straight(&mut rng).is_straight());
        }
    }
}

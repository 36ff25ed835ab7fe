//! Tile passage storage used by the passability oracle.

use eightway_core::{Direction, MapGeometry, TilePos, Wrap};
use thiserror::Error;

const BLOCK_DOWN: u8 = 0x01;
const BLOCK_LEFT: u8 = 0x02;
const BLOCK_RIGHT: u8 = 0x04;
const BLOCK_UP: u8 = 0x08;
const BLOCK_ALL: u8 = BLOCK_DOWN | BLOCK_LEFT | BLOCK_RIGHT | BLOCK_UP;

/// Reasons a textual map layout may be rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    /// The layout has no rows or no columns.
    #[error("map layout is empty")]
    Empty,
    /// A row length differs from the first row.
    #[error("row {row} has {found} tiles; expected {expected}")]
    Ragged {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width established by the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A character has no tile meaning.
    #[error("unknown tile `{symbol}` at ({x}, {y})")]
    UnknownTile {
        /// Offending character.
        symbol: char,
        /// Column of the character.
        x: usize,
        /// Row of the character.
        y: usize,
    },
    /// The layout does not fit the signed coordinate space.
    #[error("map layout is too large")]
    TooLarge,
}

/// Dense grid of per-tile passage flags.
///
/// Each tile stores one "blocked" bit per straight edge, mirroring the
/// engine's four-direction passage flags. Walls have every edge blocked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    geometry: MapGeometry,
    passages: Vec<u8>,
}

impl TileMap {
    /// Creates a map of the provided size with every tile open.
    #[must_use]
    pub fn open(width: u32, height: u32, wrap: Wrap) -> Self {
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        let count = usize::try_from(width)
            .ok()
            .zip(usize::try_from(height).ok())
            .and_then(|(w, h)| w.checked_mul(h))
            .unwrap_or(0);
        Self {
            geometry: MapGeometry::new(width, height, wrap),
            passages: vec![0; count],
        }
    }

    /// Parses a layout where `#` is a wall and `.` is floor.
    pub fn from_rows<S: AsRef<str>>(rows: &[S], wrap: Wrap) -> Result<Self, MapError> {
        let expected = rows.first().map_or(0, |row| row.as_ref().chars().count());
        if expected == 0 {
            return Err(MapError::Empty);
        }

        let width = u32::try_from(expected).map_err(|_| MapError::TooLarge)?;
        let height = u32::try_from(rows.len()).map_err(|_| MapError::TooLarge)?;
        let mut map = Self::open(width, height, wrap);

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != expected {
                return Err(MapError::Ragged {
                    row: y,
                    expected,
                    found,
                });
            }

            for (x, symbol) in row.chars().enumerate() {
                match symbol {
                    '.' => {}
                    '#' => map.passages[y * expected + x] = BLOCK_ALL,
                    _ => return Err(MapError::UnknownTile { symbol, x, y }),
                }
            }
        }

        Ok(map)
    }

    /// Dimensions and wrap policy of the map.
    #[must_use]
    pub const fn geometry(&self) -> MapGeometry {
        self.geometry
    }

    /// Turns a tile into a wall. Out-of-range coordinates are ignored.
    pub fn set_wall(&mut self, position: TilePos) {
        if let Some(index) = self.index(position.x(), position.y()) {
            self.passages[index] = BLOCK_ALL;
        }
    }

    /// Blocks a single straight edge of a tile. Diagonals block both components.
    pub fn block_edge(&mut self, position: TilePos, direction: Direction) {
        if let Some(index) = self.index(position.x(), position.y()) {
            self.passages[index] |= edge_mask(direction);
        }
    }

    /// Reports whether a tile is a wall.
    #[must_use]
    pub fn is_wall(&self, position: TilePos) -> bool {
        self.index(position.x(), position.y())
            .map_or(true, |index| self.passages[index] == BLOCK_ALL)
    }

    /// Reports whether the edge of `(x, y)` facing `direction` is open.
    ///
    /// A diagonal edge is open only when both component edges are.
    #[must_use]
    pub fn is_passable(&self, x: i32, y: i32, direction: Direction) -> bool {
        self.index(x, y)
            .map_or(false, |index| self.passages[index] & edge_mask(direction) == 0)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if !self.geometry.is_valid(x, y) {
            return None;
        }
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        let width = usize::try_from(self.geometry.width()).ok()?;
        y.checked_mul(width)?.checked_add(x)
    }
}

fn edge_mask(direction: Direction) -> u8 {
    let (horizontal, vertical) = direction.axes();
    let horizontal = match horizontal {
        Some(Direction::Left) => BLOCK_LEFT,
        Some(Direction::Right) => BLOCK_RIGHT,
        _ => 0,
    };
    let vertical = match vertical {
        Some(Direction::Down) => BLOCK_DOWN,
        Some(Direction::Up) => BLOCK_UP,
        _ => 0,
    };
    horizontal | vertical
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_walls_and_floor() {
        let map = TileMap::from_rows(&["..#", "#.."], Wrap::default()).expect("valid layout");

        assert_eq!(map.geometry().width(), 3);
        assert_eq!(map.geometry().height(), 2);
        assert!(map.is_wall(TilePos::new(2, 0)));
        assert!(map.is_wall(TilePos::new(0, 1)));
        assert!(!map.is_wall(TilePos::new(1, 1)));
        assert!(map.is_wall(TilePos::new(5, 5)), "outside counts as wall");
    }

    #[test]
    fn rejects_malformed_layouts() {
        let empty: [&str; 0] = [];
        assert_eq!(TileMap::from_rows(&empty, Wrap::default()), Err(MapError::Empty));
        assert_eq!(
            TileMap::from_rows(&["...", ".."], Wrap::default()),
            Err(MapError::Ragged {
                row: 1,
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            TileMap::from_rows(&[".x."], Wrap::default()),
            Err(MapError::UnknownTile {
                symbol: 'x',
                x: 1,
                y: 0
            })
        );
    }

    #[test]
    fn blocked_edges_close_diagonals_that_use_them() {
        let mut map = TileMap::open(3, 3, Wrap::default());
        map.block_edge(TilePos::new(1, 1), Direction::Right);

        assert!(!map.is_passable(1, 1, Direction::Right));
        assert!(!map.is_passable(1, 1, Direction::UpRight));
        assert!(map.is_passable(1, 1, Direction::Up));
        assert!(map.is_passable(1, 1, Direction::DownLeft));
    }
}

//! Tile-space geometry: neighbour resolution, wrap-around and distances.

use serde::{Deserialize, Serialize};

use crate::{Direction, MovementMode, TilePos};

/// Wrap-around policy of a map along each axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wrap {
    /// Whether the map loops horizontally.
    pub horizontal: bool,
    /// Whether the map loops vertically.
    pub vertical: bool,
}

/// Dimensions and wrap policy of a tile map.
///
/// All neighbour computations go through the mode-aware `*_with_direction`
/// helpers: in [`MovementMode::FourWay`] only the straight components of a
/// direction move a coordinate, exactly like the legacy four-direction
/// resolver. Non-looping maps never clamp; blocking out-of-bounds moves is the
/// job of the passability oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapGeometry {
    width: i32,
    height: i32,
    wrap: Wrap,
}

impl MapGeometry {
    /// Creates a geometry description.
    #[must_use]
    pub const fn new(width: i32, height: i32, wrap: Wrap) -> Self {
        Self {
            width,
            height,
            wrap,
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Wrap policy of the map.
    #[must_use]
    pub const fn wrap(&self) -> Wrap {
        self.wrap
    }

    /// Reports whether the coordinate lies inside the map.
    #[must_use]
    pub const fn is_valid(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Applies horizontal wrap to a column.
    #[must_use]
    pub const fn round_x(&self, x: i32) -> i32 {
        if self.wrap.horizontal && self.width > 0 {
            x.rem_euclid(self.width)
        } else {
            x
        }
    }

    /// Applies vertical wrap to a row.
    #[must_use]
    pub const fn round_y(&self, y: i32) -> i32 {
        if self.wrap.vertical && self.height > 0 {
            y.rem_euclid(self.height)
        } else {
            y
        }
    }

    /// Column one step away in `direction`, without wrap.
    #[must_use]
    pub const fn x_with_direction(
        &self,
        x: i32,
        direction: Option<Direction>,
        mode: MovementMode,
    ) -> i32 {
        match (mode, direction) {
            (_, None) => x,
            (MovementMode::FourWay, Some(Direction::Left)) => x - 1,
            (MovementMode::FourWay, Some(Direction::Right)) => x + 1,
            (MovementMode::FourWay, Some(_)) => x,
            (MovementMode::EightWay, Some(direction)) => x + direction.delta().0,
        }
    }

    /// Row one step away in `direction`, without wrap.
    #[must_use]
    pub const fn y_with_direction(
        &self,
        y: i32,
        direction: Option<Direction>,
        mode: MovementMode,
    ) -> i32 {
        match (mode, direction) {
            (_, None) => y,
            (MovementMode::FourWay, Some(Direction::Down)) => y + 1,
            (MovementMode::FourWay, Some(Direction::Up)) => y - 1,
            (MovementMode::FourWay, Some(_)) => y,
            (MovementMode::EightWay, Some(direction)) => y + direction.delta().1,
        }
    }

    /// Column one step away in `direction`, wrapped on looping maps.
    #[must_use]
    pub const fn resolve_x(&self, x: i32, direction: Option<Direction>, mode: MovementMode) -> i32 {
        self.round_x(self.x_with_direction(x, direction, mode))
    }

    /// Row one step away in `direction`, wrapped on looping maps.
    #[must_use]
    pub const fn resolve_y(&self, y: i32, direction: Option<Direction>, mode: MovementMode) -> i32 {
        self.round_y(self.y_with_direction(y, direction, mode))
    }

    /// Tile one step away from `position` in `direction`.
    #[must_use]
    pub const fn resolve(
        &self,
        position: TilePos,
        direction: Option<Direction>,
        mode: MovementMode,
    ) -> TilePos {
        TilePos::new(
            self.resolve_x(position.x(), direction, mode),
            self.resolve_y(position.y(), direction, mode),
        )
    }

    /// Signed column offset `x1 - x2`, taking the short way round looping maps.
    #[must_use]
    pub const fn delta_x(&self, x1: i32, x2: i32) -> i32 {
        shortest_offset(x1 - x2, self.width, self.wrap.horizontal)
    }

    /// Signed row offset `y1 - y2`, taking the short way round looping maps.
    #[must_use]
    pub const fn delta_y(&self, y1: i32, y2: i32) -> i32 {
        shortest_offset(y1 - y2, self.height, self.wrap.vertical)
    }

    /// Four-connected tile distance, the engine's native metric.
    #[must_use]
    pub const fn manhattan_distance(&self, from: TilePos, to: TilePos) -> u32 {
        self.delta_x(from.x(), to.x()).unsigned_abs() + self.delta_y(from.y(), to.y()).unsigned_abs()
    }

    /// Eight-connected tile distance, where a diagonal step costs one.
    #[must_use]
    pub const fn chebyshev_distance(&self, from: TilePos, to: TilePos) -> u32 {
        let dx = self.delta_x(from.x(), to.x()).unsigned_abs();
        let dy = self.delta_y(from.y(), to.y()).unsigned_abs();
        if dx > dy {
            dx
        } else {
            dy
        }
    }

    /// Row-major key used to identify a tile within one search.
    #[must_use]
    pub const fn linear_index(&self, position: TilePos) -> i64 {
        position.y() as i64 * self.width as i64 + position.x() as i64
    }
}

const fn shortest_offset(offset: i32, extent: i32, loops: bool) -> i32 {
    if loops && 2 * offset.abs() > extent {
        if offset < 0 {
            offset + extent
        } else {
            offset - extent
        }
    } else {
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looping(width: i32, height: i32) -> MapGeometry {
        MapGeometry::new(
            width,
            height,
            Wrap {
                horizontal: true,
                vertical: true,
            },
        )
    }

    #[test]
    fn four_way_resolver_ignores_diagonals() {
        let geometry = MapGeometry::new(5, 5, Wrap::default());
        let origin = TilePos::new(2, 2);

        assert_eq!(
            geometry.resolve(origin, Some(Direction::DownRight), MovementMode::FourWay),
            origin
        );
        assert_eq!(
            geometry.resolve(origin, Some(Direction::Left), MovementMode::FourWay),
            TilePos::new(1, 2)
        );
        assert_eq!(
            geometry.resolve(origin, Some(Direction::DownRight), MovementMode::EightWay),
            TilePos::new(3, 3)
        );
        assert_eq!(geometry.resolve(origin, None, MovementMode::EightWay), origin);
    }

    #[test]
    fn non_looping_maps_do_not_clamp() {
        let geometry = MapGeometry::new(3, 3, Wrap::default());
        let corner = TilePos::new(0, 0);

        let next = geometry.resolve(corner, Some(Direction::UpLeft), MovementMode::EightWay);

        assert_eq!(next, TilePos::new(-1, -1));
        assert!(!geometry.is_valid(next.x(), next.y()));
    }

    #[test]
    fn looping_maps_wrap_both_axes() {
        let geometry = looping(4, 3);

        assert_eq!(
            geometry.resolve(TilePos::new(0, 0), Some(Direction::UpLeft), MovementMode::EightWay),
            TilePos::new(3, 2)
        );
        assert_eq!(
            geometry.resolve(TilePos::new(3, 2), Some(Direction::DownRight), MovementMode::EightWay),
            TilePos::new(0, 0)
        );
    }

    #[test]
    fn deltas_take_the_short_way_round() {
        let geometry = looping(10, 10);

        assert_eq!(geometry.delta_x(9, 0), -1);
        assert_eq!(geometry.delta_x(0, 9), 1);
        assert_eq!(geometry.delta_y(2, 7), -5);
        assert_eq!(
            geometry.chebyshev_distance(TilePos::new(0, 0), TilePos::new(9, 8)),
            2
        );

        let flat = MapGeometry::new(10, 10, Wrap::default());
        assert_eq!(flat.delta_x(9, 0), 9);
        assert_eq!(flat.manhattan_distance(TilePos::new(0, 0), TilePos::new(9, 8)), 17);
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bounded best-first search that yields the next step toward a goal tile.
//!
//! The search explores at most `limit` steps of path cost from the start. When
//! the goal is out of reach it falls back to the node closest to the goal by
//! heuristic and steps toward that instead, so callers re-run it every tick.

use std::collections::{HashMap, HashSet};
use std::fmt;

use eightway_core::{Direction, MapGeometry, MapQuery, MovementMode, TilePos};

/// Neighbour set, heuristic and first-step rule for one movement mode.
pub trait Neighborhood: fmt::Debug {
    /// Mode used to resolve neighbour coordinates.
    fn mode(&self) -> MovementMode;

    /// Neighbour directions in expansion order.
    fn directions(&self) -> &'static [Direction];

    /// Admissible estimate of the remaining path cost.
    ///
    /// Owned by the neighbourhood rather than the map, since the map's own
    /// distance is always Manhattan and overestimates once diagonals cost one.
    fn heuristic(&self, geometry: &MapGeometry, from: TilePos, to: TilePos) -> u32;

    /// Direction of the first step from `start` toward `reached`, the node the
    /// search settled on while looking for `goal`.
    fn first_step(
        &self,
        geometry: &MapGeometry,
        start: TilePos,
        reached: TilePos,
        goal: TilePos,
    ) -> Option<Direction>;
}

/// Legacy four-connected search with the engine's greedy fallback.
#[derive(Clone, Copy, Debug, Default)]
pub struct FourWay;

impl Neighborhood for FourWay {
    fn mode(&self) -> MovementMode {
        MovementMode::FourWay
    }

    fn directions(&self) -> &'static [Direction] {
        &Direction::STRAIGHT
    }

    fn heuristic(&self, geometry: &MapGeometry, from: TilePos, to: TilePos) -> u32 {
        geometry.manhattan_distance(from, to)
    }

    fn first_step(
        &self,
        geometry: &MapGeometry,
        start: TilePos,
        reached: TilePos,
        goal: TilePos,
    ) -> Option<Direction> {
        let dx = geometry.delta_x(reached.x(), start.x());
        let dy = geometry.delta_y(reached.y(), start.y());
        if dy > 0 {
            return Some(Direction::Down);
        }
        if dx < 0 {
            return Some(Direction::Left);
        }
        if dx > 0 {
            return Some(Direction::Right);
        }
        if dy < 0 {
            return Some(Direction::Up);
        }

        // Nothing reachable: head straight for the goal along the longer axis.
        let dx = geometry.delta_x(start.x(), goal.x());
        let dy = geometry.delta_y(start.y(), goal.y());
        if dx.abs() > dy.abs() {
            Some(if dx > 0 {
                Direction::Left
            } else {
                Direction::Right
            })
        } else if dy != 0 {
            Some(if dy > 0 { Direction::Up } else { Direction::Down })
        } else {
            None
        }
    }
}

/// Eight-connected search where a diagonal step costs the same as a straight one.
#[derive(Clone, Copy, Debug, Default)]
pub struct EightWay;

impl Neighborhood for EightWay {
    fn mode(&self) -> MovementMode {
        MovementMode::EightWay
    }

    fn directions(&self) -> &'static [Direction] {
        &Direction::ALL
    }

    /// Chebyshev distance, not the map's Manhattan distance.
    fn heuristic(&self, geometry: &MapGeometry, from: TilePos, to: TilePos) -> u32 {
        geometry.chebyshev_distance(from, to)
    }

    fn first_step(
        &self,
        geometry: &MapGeometry,
        start: TilePos,
        reached: TilePos,
        _goal: TilePos,
    ) -> Option<Direction> {
        Direction::from_delta(
            geometry.delta_x(reached.x(), start.x()),
            geometry.delta_y(reached.y(), start.y()),
        )
    }
}

/// Neighbourhood matching a movement mode.
#[must_use]
pub fn neighborhood(mode: MovementMode) -> &'static dyn Neighborhood {
    match mode {
        MovementMode::FourWay => &FourWay,
        MovementMode::EightWay => &EightWay,
    }
}

/// Result of one search invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    /// First step to take, or `None` when no step improves on standing still.
    pub direction: Option<Direction>,
    /// Tile the search walked back from: the goal, or the best fallback node.
    pub target: TilePos,
    /// Whether the goal itself was expanded.
    pub reached_goal: bool,
    /// Number of nodes moved to the closed set.
    pub expanded: usize,
}

#[derive(Clone, Copy, Debug)]
struct Node {
    position: TilePos,
    parent: Option<usize>,
    g: u32,
    f: u32,
}

impl Node {
    const fn estimate(&self) -> u32 {
        self.f - self.g
    }
}

/// Finds the next step toward `goal` using the neighbourhood of the oracle's mode.
#[must_use]
pub fn find_direction<M>(map: &M, start: TilePos, goal: TilePos, limit: u32) -> Option<Direction>
where
    M: MapQuery + ?Sized,
{
    search(map, neighborhood(map.mode()), start, goal, limit).direction
}

/// Runs a bounded best-first search from `start` toward `goal`.
///
/// Nodes whose path cost reaches `limit` are closed without being expanded.
/// Ties on `f` go to the earliest inserted open node, which makes the result
/// depend only on the neighbourhood's expansion order.
#[must_use]
pub fn search<M>(
    map: &M,
    neighborhood: &dyn Neighborhood,
    start: TilePos,
    goal: TilePos,
    limit: u32,
) -> SearchOutcome
where
    M: MapQuery + ?Sized,
{
    if start == goal {
        return SearchOutcome {
            direction: None,
            target: start,
            reached_goal: true,
            expanded: 0,
        };
    }

    let geometry = map.geometry();
    let mode = neighborhood.mode();

    let mut nodes = vec![Node {
        position: start,
        parent: None,
        g: 0,
        f: neighborhood.heuristic(&geometry, start, goal),
    }];
    let mut open: Vec<usize> = vec![0];
    let mut open_keys: HashMap<i64, usize> = HashMap::new();
    let _ = open_keys.insert(geometry.linear_index(start), 0);
    let mut closed: HashSet<i64> = HashSet::new();
    let mut best = 0;
    let mut reached_goal = false;

    while !open.is_empty() {
        let mut slot = 0;
        for (candidate, &index) in open.iter().enumerate() {
            if nodes[index].f < nodes[open[slot]].f {
                slot = candidate;
            }
        }

        let current = open.remove(slot);
        let Node { position, g, .. } = nodes[current];
        let key = geometry.linear_index(position);
        let _ = open_keys.remove(&key);
        let _ = closed.insert(key);

        if position == goal {
            best = current;
            reached_goal = true;
            break;
        }

        if g >= limit {
            continue;
        }

        for &direction in neighborhood.directions() {
            let next = geometry.resolve(position, Some(direction), mode);
            let next_key = geometry.linear_index(next);
            if closed.contains(&next_key) {
                continue;
            }
            if !map.can_pass(position.x(), position.y(), direction) {
                continue;
            }

            let next_g = g + 1;
            let next_f = next_g + neighborhood.heuristic(&geometry, next, goal);
            let index = match open_keys.get(&next_key).copied() {
                Some(index) if next_g < nodes[index].g => index,
                Some(_) => continue,
                None => {
                    nodes.push(Node {
                        position: next,
                        parent: None,
                        g: 0,
                        f: 0,
                    });
                    let index = nodes.len() - 1;
                    open.push(index);
                    let _ = open_keys.insert(next_key, index);
                    index
                }
            };

            let node = &mut nodes[index];
            node.parent = Some(current);
            node.g = next_g;
            node.f = next_f;
            if nodes[index].estimate() < nodes[best].estimate() {
                best = index;
            }
        }
    }

    if !reached_goal {
        log::debug!(
            "search from {start:?} toward {goal:?} exhausted after {} nodes; falling back to {:?}",
            closed.len(),
            nodes[best].position
        );
    }

    let mut node = best;
    while let Some(parent) = nodes[node].parent {
        if parent == 0 {
            break;
        }
        node = parent;
    }

    let target = nodes[best].position;
    SearchOutcome {
        direction: neighborhood.first_step(&geometry, start, nodes[node].position, goal),
        target,
        reached_goal,
        expanded: closed.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eightway_core::Wrap;

    #[test]
    fn neighborhoods_match_their_modes() {
        assert_eq!(neighborhood(MovementMode::FourWay).mode(), MovementMode::FourWay);
        assert_eq!(neighborhood(MovementMode::EightWay).directions().len(), 8);
        assert!(FourWay.directions().iter().all(|d| d.is_straight()));
    }

    #[test]
    fn heuristics_are_admissible_for_their_grids() {
        let geometry = MapGeometry::new(10, 10, Wrap::default());
        let from = TilePos::new(1, 1);
        let to = TilePos::new(4, 3);

        assert_eq!(FourWay.heuristic(&geometry, from, to), 5);
        assert_eq!(EightWay.heuristic(&geometry, from, to), 3);
    }

    #[test]
    fn legacy_first_step_prefers_vertical_down_then_horizontal() {
        let geometry = MapGeometry::new(10, 10, Wrap::default());
        let start = TilePos::new(5, 5);
        let goal = TilePos::new(9, 9);

        assert_eq!(
            FourWay.first_step(&geometry, start, TilePos::new(5, 6), goal),
            Some(Direction::Down)
        );
        assert_eq!(
            FourWay.first_step(&geometry, start, TilePos::new(4, 5), goal),
            Some(Direction::Left)
        );
        assert_eq!(
            FourWay.first_step(&geometry, start, TilePos::new(5, 4), goal),
            Some(Direction::Up)
        );
    }

    #[test]
    fn legacy_first_step_falls_back_to_greedy_axis() {
        let geometry = MapGeometry::new(10, 10, Wrap::default());
        let start = TilePos::new(5, 5);

        assert_eq!(
            FourWay.first_step(&geometry, start, start, TilePos::new(9, 6)),
            Some(Direction::Right)
        );
        assert_eq!(
            FourWay.first_step(&geometry, start, start, TilePos::new(4, 1)),
            Some(Direction::Up)
        );
        assert_eq!(FourWay.first_step(&geometry, start, start, start), None);
    }

    #[test]
    fn eight_way_first_step_is_none_without_progress() {
        let geometry = MapGeometry::new(4, 4, Wrap::default());
        let start = TilePos::new(1, 1);

        assert_eq!(
            EightWay.first_step(&geometry, start, start, TilePos::new(3, 3)),
            None
        );
        assert_eq!(
            EightWay.first_step(&geometry, start, TilePos::new(0, 2), TilePos::new(3, 3)),
            Some(Direction::DownLeft)
        );
    }
}

//! TOML scenario files describing a map, its tokens and their scripted behaviour.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use eightway_core::{
    Command, Direction, Event, EventPriority, Intent, MovementMode, TilePos, TokenId, Wrap,
};
use eightway_world::{self as world, Settings, TileMap, World};
use serde::Deserialize;

/// Parsed scenario file.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    #[serde(default)]
    pub(crate) settings: Settings,
    pub(crate) map: MapSection,
    #[serde(default)]
    pub(crate) player: PlayerSection,
    #[serde(default)]
    pub(crate) events: Vec<EventSection>,
}

/// Layout rows and loop flags.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct MapSection {
    pub(crate) rows: Vec<String>,
    #[serde(default)]
    pub(crate) loop_horizontal: bool,
    #[serde(default)]
    pub(crate) loop_vertical: bool,
}

/// Scripted player input.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PlayerSection {
    /// Directional inputs replayed one per idle frame.
    #[serde(default)]
    pub(crate) route: Vec<Direction>,
    /// Tile the player walks to once the route is exhausted.
    #[serde(default)]
    pub(crate) goal: Option<TilePos>,
    #[serde(default)]
    pub(crate) dash: bool,
}

/// A map event and the behaviour it repeats whenever idle.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct EventSection {
    pub(crate) position: TilePos,
    #[serde(default = "default_direction")]
    pub(crate) direction: Direction,
    #[serde(default)]
    pub(crate) priority: EventPriority,
    #[serde(default)]
    pub(crate) through: bool,
    #[serde(default)]
    pub(crate) eight_way: Option<bool>,
    #[serde(default)]
    pub(crate) behavior: EventBehavior,
}

/// Autonomous routine assigned to an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum EventBehavior {
    /// Stands still.
    #[default]
    Idle,
    /// Wanders randomly.
    Random,
    /// Approaches the player greedily.
    TowardPlayer,
    /// Flees the player.
    AwayFromPlayer,
    /// Walks the searched path to the player's tile.
    SeekPlayer,
    /// Walks the searched path to a tile.
    MoveTo {
        /// Destination tile.
        goal: TilePos,
    },
    /// Keeps walking forward, turning 45 degrees when blocked.
    Patrol,
    /// Spins in place.
    TurnRandom,
}

impl EventBehavior {
    /// Intent the event issues while idle, if any.
    pub(crate) fn intent(self, blocked: bool) -> Option<Intent> {
        match self {
            Self::Idle => None,
            Self::Random => Some(Intent::MoveRandom),
            Self::TowardPlayer => Some(Intent::MoveToward(TokenId::Player)),
            Self::AwayFromPlayer => Some(Intent::MoveAwayFrom(TokenId::Player)),
            Self::SeekPlayer => Some(Intent::MoveToToken(TokenId::Player)),
            Self::MoveTo { goal } => Some(Intent::MoveTo(goal)),
            Self::Patrol if blocked => Some(Intent::TurnRightOrLeft45),
            Self::Patrol => Some(Intent::MoveForward),
            Self::TurnRandom => Some(Intent::TurnRandom),
        }
    }
}

fn default_direction() -> Direction {
    Direction::Down
}

impl Scenario {
    /// Reads and parses a scenario file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to load scenario {}", path.display()))
    }

    /// Parses scenario TOML.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse scenario toml contents")
    }

    /// Builds the world with the player, followers and events in place.
    pub(crate) fn build_world(&self) -> Result<World> {
        let wrap = Wrap {
            horizontal: self.map.loop_horizontal,
            vertical: self.map.loop_vertical,
        };
        let map = TileMap::from_rows(&self.map.rows, wrap).context("invalid map layout")?;
        let mut world = World::new(map, self.settings.clone());

        let mut events = Vec::new();
        if self.player.dash {
            world::apply(
                &mut world,
                Command::SetDashing {
                    token: TokenId::Player,
                    dashing: true,
                },
                &mut events,
            );
        }
        for section in &self.events {
            let mut spawned = Vec::new();
            world::apply(
                &mut world,
                Command::SpawnEvent {
                    position: section.position,
                    direction: section.direction,
                    priority: section.priority,
                    through: section.through,
                },
                &mut spawned,
            );
            let token = spawned.iter().find_map(|event| match event {
                Event::EventSpawned { token } => Some(*token),
                _ => None,
            });
            if let (Some(token), Some(eight_way)) = (token, section.eight_way) {
                world::apply(
                    &mut world,
                    Command::SetTokenMode {
                        token,
                        mode: Some(MovementMode::from_flag(eight_way)),
                    },
                    &mut events,
                );
            }
        }

        log::debug!(
            "built {}x{} world with {} events",
            self.map.rows.first().map_or(0, String::len),
            self.map.rows.len(),
            self.events.len()
        );
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eightway_core::EventId;
    use eightway_world::query;

    const SAMPLE: &str = r#"
[settings]
eight_way = true
followers = 1
player_start = { x = 1, y = 1 }

[map]
rows = [
    ".....",
    ".#...",
    ".....",
]
loop_horizontal = true

[player]
route = ["Right", "DownRight"]

[[events]]
position = { x = 4, y = 2 }
eight_way = false
behavior = { kind = "move_to", goal = { x = 0, y = 0 } }

[[events]]
position = { x = 0, y = 2 }
direction = "Up"
behavior = { kind = "random" }
"#;

    #[test]
    fn parses_sections_with_defaults() {
        let scenario = Scenario::parse(SAMPLE).expect("sample parses");

        assert!(scenario.settings.eight_way);
        assert_eq!(scenario.settings.search_limit, 12);
        assert_eq!(scenario.player.route, vec![Direction::Right, Direction::DownRight]);
        assert_eq!(scenario.events.len(), 2);
        assert_eq!(scenario.events[0].direction, Direction::Down);
        assert_eq!(
            scenario.events[0].behavior,
            EventBehavior::MoveTo {
                goal: TilePos::new(0, 0)
            }
        );
        assert_eq!(scenario.events[1].priority, EventPriority::SameAsCharacters);
    }

    #[test]
    fn builds_world_with_event_modes() {
        let scenario = Scenario::parse(SAMPLE).expect("sample parses");
        let world = scenario.build_world().expect("world builds");

        let first = TokenId::Event(EventId::new(1));
        let second = TokenId::Event(EventId::new(2));
        assert_eq!(query::mode_for(&world, first), MovementMode::FourWay);
        assert_eq!(query::mode_for(&world, second), MovementMode::EightWay);
        assert_eq!(query::followers(&world).len(), 1);
        assert!(query::map(&world).geometry().wrap().horizontal);
    }

    #[test]
    fn rejects_unknown_fields_and_bad_layouts() {
        assert!(Scenario::parse("[map]\nrows = [\"..\"]\nsize = 3\n").is_err());

        let scenario = Scenario::parse("[map]\nrows = [\"..\", \".\"]\n").expect("toml parses");
        assert!(scenario.build_world().is_err());
    }

    #[test]
    fn patrol_turns_only_when_blocked() {
        assert_eq!(EventBehavior::Patrol.intent(false), Some(Intent::MoveForward));
        assert_eq!(
            EventBehavior::Patrol.intent(true),
            Some(Intent::TurnRightOrLeft45)
        );
        assert_eq!(EventBehavior::Idle.intent(true), None);
    }
}

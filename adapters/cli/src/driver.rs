//! Per-frame driver that feeds scripted intents through the behaviour system.

use std::collections::VecDeque;

use eightway_core::{
    Command, Direction, Event, Intent, MotionState, TilePos, TokenId, TokenSnapshot,
};
use eightway_system_behavior::Behavior;
use eightway_world::{self as world, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::scenario::{EventBehavior, Scenario};

/// Totals gathered while a scenario runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RunStats {
    pub(crate) frames: u64,
    pub(crate) moves: u64,
    pub(crate) blocked: u64,
    pub(crate) jumps: u64,
}

/// Owns the world and replays a scenario one frame at a time.
#[derive(Debug)]
pub(crate) struct Driver {
    world: World,
    behavior: Behavior,
    rng: ChaCha8Rng,
    route: VecDeque<Direction>,
    player_goal: Option<TilePos>,
    scripts: Vec<(TokenId, EventBehavior)>,
    blocked: Vec<TokenId>,
    stats: RunStats,
}

impl Driver {
    /// Builds the scenario's world and seeds the random source.
    pub(crate) fn new(scenario: &Scenario, seed: u64) -> anyhow::Result<Self> {
        let world = scenario.build_world()?;
        let scripts = query::events(&world)
            .into_iter()
            .zip(scenario.events.iter().map(|section| section.behavior))
            .collect();
        Ok(Self {
            world,
            behavior: Behavior,
            rng: ChaCha8Rng::seed_from_u64(seed),
            route: scenario.player.route.iter().copied().collect(),
            player_goal: scenario.player.goal,
            scripts,
            blocked: Vec::new(),
            stats: RunStats::default(),
        })
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn stats(&self) -> RunStats {
        self.stats
    }

    /// Advances one frame: the player first, then its followers, then events.
    pub(crate) fn step(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        let party_before: Vec<TilePos> = self
            .party()
            .iter()
            .map(|snapshot| snapshot.position)
            .collect();

        if let Some(intent) = self.player_intent() {
            self.resolve(TokenId::Player, &intent, &mut events);
        }

        let player_moved = events.iter().any(|event| {
            matches!(
                event,
                Event::TokenMoved {
                    token: TokenId::Player,
                    ..
                }
            )
        });
        if player_moved {
            let followers = query::followers(&self.world);
            for (index, follower) in followers.iter().enumerate().rev() {
                let trail = party_before[index];
                self.resolve(*follower, &Intent::Chase(trail), &mut events);
            }
        }

        let scripts = self.scripts.clone();
        for (token, script) in scripts {
            if !self.is_idle(token) {
                continue;
            }
            let blocked = self.blocked.contains(&token);
            if let Some(intent) = script.intent(blocked) {
                self.resolve(token, &intent, &mut events);
            }
        }

        world::apply(&mut self.world, Command::Tick, &mut events);
        self.record(&events);
        events
    }

    /// Runs `frames` frames and returns the accumulated totals.
    pub(crate) fn run(&mut self, frames: u64) -> RunStats {
        for _ in 0..frames {
            let _ = self.step();
        }
        self.stats
    }

    fn party(&self) -> Vec<TokenSnapshot> {
        query::tokens(&self.world)
            .into_iter()
            .filter(|snapshot| !matches!(snapshot.id, TokenId::Event(_)))
            .collect()
    }

    fn is_idle(&self, token: TokenId) -> bool {
        query::token(&self.world, token).is_some_and(|snapshot| snapshot.state == MotionState::Idle)
    }

    fn player_intent(&mut self) -> Option<Intent> {
        if !self.is_idle(TokenId::Player) {
            return None;
        }
        if let Some(direction) = self.route.pop_front() {
            return Some(Intent::Step(direction));
        }
        self.player_goal.map(Intent::MoveTo)
    }

    fn resolve(&mut self, token: TokenId, intent: &Intent, events: &mut Vec<Event>) {
        let mut commands = Vec::new();
        self.behavior
            .handle(&self.world, token, intent, &mut self.rng, &mut commands);
        for command in commands {
            world::apply(&mut self.world, command, events);
        }
    }

    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::FrameAdvanced { frame } => self.stats.frames = *frame,
                Event::TokenMoved { token, .. } => {
                    self.stats.moves += 1;
                    self.blocked.retain(|blocked| blocked != token);
                }
                Event::ObstacleTouched { token, .. } => {
                    self.stats.blocked += 1;
                    if !self.blocked.contains(token) {
                        self.blocked.push(*token);
                    }
                }
                Event::TokenJumped { .. } => self.stats.jumps += 1,
                Event::DirectionChanged { .. }
                | Event::ModeChanged { .. }
                | Event::FollowerAdded { .. }
                | Event::EventSpawned { .. } => {}
            }
        }
    }
}

/// Walks the player toward `goal` one searched step at a time, skipping the
/// animation frames in between. Stops when the goal is reached, no step is
/// offered, or a step is refused.
pub(crate) fn trace_path(world: &mut World, goal: TilePos, max_steps: usize) -> Vec<TilePos> {
    let behavior = Behavior;
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let mut path = Vec::new();

    for _ in 0..max_steps {
        let mut commands = Vec::new();
        behavior.handle(world, TokenId::Player, &Intent::MoveTo(goal), &mut rng, &mut commands);
        if commands.is_empty() {
            break;
        }

        let mut events = Vec::new();
        for command in commands {
            world::apply(world, command, &mut events);
        }
        let Some(to) = events.iter().find_map(|event| match event {
            Event::TokenMoved {
                token: TokenId::Player,
                to,
                ..
            } => Some(*to),
            _ => None,
        }) else {
            log::debug!("path trace stopped: step toward {goal:?} was refused");
            break;
        };
        path.push(to);
        if to == goal {
            break;
        }
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(contents: &str) -> Scenario {
        Scenario::parse(contents).expect("scenario parses")
    }

    #[test]
    fn followers_step_into_vacated_tiles() {
        let scenario = scenario(
            r#"
[settings]
eight_way = true
followers = 2
player_start = { x = 0, y = 0 }

[map]
rows = ["......", "......"]

[player]
route = ["Right", "Right", "DownRight"]
"#,
        );
        let mut driver = Driver::new(&scenario, 1).expect("driver builds");

        let _ = driver.step();
        let positions = |driver: &Driver| -> Vec<TilePos> {
            driver.party().iter().map(|snapshot| snapshot.position).collect()
        };
        assert_eq!(
            positions(&driver),
            vec![TilePos::new(1, 0), TilePos::new(0, 0), TilePos::new(0, 0)]
        );

        let _ = driver.run(15);
        let _ = driver.step();
        assert_eq!(
            positions(&driver),
            vec![TilePos::new(2, 0), TilePos::new(1, 0), TilePos::new(0, 0)]
        );

        let _ = driver.run(15);
        let _ = driver.step();
        assert_eq!(
            positions(&driver),
            vec![TilePos::new(3, 1), TilePos::new(2, 0), TilePos::new(1, 0)]
        );
    }

    #[test]
    fn player_waits_for_render_position_before_next_input() {
        let scenario = scenario(
            r#"
[settings]
eight_way = true

[map]
rows = ["....."]

[player]
route = ["Right", "Right"]
"#,
        );
        let mut driver = Driver::new(&scenario, 1).expect("driver builds");

        let stats = driver.run(10);
        assert_eq!(stats.moves, 1);
        assert_eq!(stats.frames, 10);

        let stats = driver.run(30);
        assert_eq!(stats.moves, 2);
    }

    #[test]
    fn patrol_turns_after_touching_a_wall() {
        let scenario = scenario(
            r#"
[settings]
eight_way = true
player_start = { x = 0, y = 2 }

[map]
rows = ["...", "...", "..."]

[[events]]
position = { x = 1, y = 0 }
direction = "Up"
behavior = { kind = "patrol" }
"#,
        );
        let mut driver = Driver::new(&scenario, 3).expect("driver builds");

        let events = driver.step();
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::ObstacleTouched { .. })));

        let events = driver.step();
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::DirectionChanged { .. })));
        let token = query::events(driver.world())[0];
        let direction = query::token(driver.world(), token)
            .expect("event exists")
            .direction;
        assert!(matches!(direction, Direction::UpLeft | Direction::UpRight));
    }

    #[test]
    fn seeded_runs_replay_identically() {
        let contents = r#"
[settings]
eight_way = true

[map]
rows = ["......", "..#...", "......", "......"]

[[events]]
position = { x = 3, y = 3 }
behavior = { kind = "random" }

[[events]]
position = { x = 5, y = 0 }
behavior = { kind = "turn_random" }
"#;
        let run = |seed| {
            let mut driver = Driver::new(&scenario(contents), seed).expect("driver builds");
            let _ = driver.run(200);
            query::tokens(driver.world())
        };

        assert_eq!(run(11), run(11));
    }

    #[test]
    fn trace_path_reaches_goal_around_walls() {
        let scenario = scenario(
            r#"
[settings]
eight_way = true

[map]
rows = [".#...", ".#...", ".#...", ".....", "....."]
"#,
        );
        let mut world = scenario.build_world().expect("world builds");

        let path = trace_path(&mut world, TilePos::new(4, 0), 20);

        assert_eq!(path.first(), Some(&TilePos::new(0, 1)));
        assert_eq!(path.last(), Some(&TilePos::new(4, 0)));
        assert!(path.len() <= 12);
    }
}

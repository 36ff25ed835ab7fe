#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative map and token state for the eight-way movement suite.
//!
//! The world owns every token's movement state and is the only place where it
//! changes. Mutations arrive as [`Command`] values through [`apply`]; read
//! access goes through the [`query`] module.

mod config;
mod map;
mod save;
mod token;

use eightway_core::{
    Command, Direction, Event, EventId, EventPriority, MovementMode, TilePos, TokenId,
};

pub use config::Settings;
pub use map::{MapError, TileMap};
pub use save::SaveError;

use save::{SaveData, SAVE_VERSION};
use token::Token;

/// Represents the authoritative state of one loaded map.
#[derive(Debug)]
pub struct World {
    map: TileMap,
    tokens: Vec<Token>,
    global_mode: MovementMode,
    settings: Settings,
    next_event_id: u32,
    frame: u64,
}

impl World {
    /// Creates a world holding the player and the configured followers.
    #[must_use]
    pub fn new(map: TileMap, settings: Settings) -> Self {
        let mut player = Token::new(
            TokenId::Player,
            settings.player_start,
            settings.player_direction,
        )
        .with_limits(settings.move_speed, settings.search_limit);
        player.mode_override = settings.player_eight_way.map(MovementMode::from_flag);

        let mut world = Self {
            map,
            tokens: vec![player],
            global_mode: MovementMode::from_flag(settings.eight_way),
            settings,
            next_event_id: 1,
            frame: 0,
        };
        for _ in 0..world.settings.followers {
            let _ = world.add_follower();
        }
        world
    }

    /// Encodes every token's movement state and the default movement mode.
    pub fn save(&self) -> Result<Vec<u8>, SaveError> {
        SaveData {
            version: SAVE_VERSION,
            global_mode: self.global_mode,
            next_event_id: self.next_event_id,
            frame: self.frame,
            tokens: self.tokens.clone(),
        }
        .encode()
    }

    /// Replaces token state with previously saved data. The map is kept.
    pub fn restore(&mut self, bytes: &[u8]) -> Result<(), SaveError> {
        let data = SaveData::decode(bytes).map_err(|error| {
            log::debug!("rejected save data: {error}");
            error
        })?;
        self.global_mode = data.global_mode;
        self.next_event_id = data.next_event_id;
        self.frame = data.frame;
        self.tokens = data.tokens;
        log::debug!("restored {} tokens at frame {}", self.tokens.len(), self.frame);
        Ok(())
    }

    fn token_index(&self, id: TokenId) -> Option<usize> {
        self.tokens.iter().position(|token| token.id == id)
    }

    fn mode_at(&self, index: usize) -> MovementMode {
        self.tokens[index].mode_override.unwrap_or(self.global_mode)
    }

    fn follower_count(&self) -> u32 {
        let count = self
            .tokens
            .iter()
            .filter(|token| matches!(token.id, TokenId::Follower(_)))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn add_follower(&mut self) -> TokenId {
        let id = TokenId::Follower(self.follower_count());
        let leader = &self.tokens[0];
        let mut follower = Token::new(id, leader.position(), leader.direction())
            .with_limits(leader.move_speed(), self.settings.search_limit);
        follower.through = true;

        let insert_at = self
            .tokens
            .iter()
            .position(|token| matches!(token.id, TokenId::Event(_)))
            .unwrap_or(self.tokens.len());
        self.tokens.insert(insert_at, follower);
        id
    }

    fn can_pass_at(&self, index: usize, x: i32, y: i32, direction: Direction, mode: MovementMode) -> bool {
        if let (Some(horizontal), Some(vertical)) = direction.axes() {
            return self.can_pass_diagonally_at(index, x, y, horizontal, vertical, mode);
        }

        let geometry = self.map.geometry();
        let to = geometry.resolve(TilePos::new(x, y), Some(direction), mode);
        if !geometry.is_valid(to.x(), to.y()) {
            return false;
        }
        if self.tokens[index].through {
            return true;
        }
        if !self.map.is_passable(x, y, direction)
            || !self.map.is_passable(to.x(), to.y(), direction.reverse())
        {
            return false;
        }
        !self.is_collided_with_tokens(index, to)
    }

    fn can_pass_diagonally_at(
        &self,
        index: usize,
        x: i32,
        y: i32,
        horizontal: Direction,
        vertical: Direction,
        mode: MovementMode,
    ) -> bool {
        let geometry = self.map.geometry();
        let x2 = geometry.resolve_x(x, Some(horizontal), mode);
        let y2 = geometry.resolve_y(y, Some(vertical), mode);
        let pass = |x, y, direction| self.can_pass_at(index, x, y, direction, mode);

        match mode {
            MovementMode::EightWay => {
                pass(x, y, horizontal)
                    && pass(x, y, vertical)
                    && (pass(x, y2, horizontal) || pass(x2, y, vertical))
            }
            MovementMode::FourWay => {
                (pass(x, y, vertical) && pass(x, y2, horizontal))
                    || (pass(x, y, horizontal) && pass(x2, y, vertical))
            }
        }
    }

    fn is_collided_with_tokens(&self, index: usize, position: TilePos) -> bool {
        self.tokens.iter().enumerate().any(|(other, token)| {
            other != index
                && !token.through
                && token.priority == EventPriority::SameAsCharacters
                && token.position() == position
        })
    }

    fn turn(&mut self, index: usize, direction: Direction, out_events: &mut Vec<Event>) {
        let token = &mut self.tokens[index];
        if token.set_direction(direction) {
            out_events.push(Event::DirectionChanged {
                token: token.id,
                direction,
            });
        }
    }

    fn move_straight(&mut self, index: usize, direction: Direction, out_events: &mut Vec<Event>) {
        if direction.is_diagonal() {
            let (Some(horizontal), Some(vertical)) = direction.axes() else {
                return;
            };
            self.move_diagonally(index, horizontal, vertical, out_events);
            return;
        }

        let mode = self.mode_at(index);
        let geometry = self.map.geometry();
        let from = self.tokens[index].position();
        let to = geometry.resolve(from, Some(direction), mode);
        let passable = self.can_pass_at(index, from.x(), from.y(), direction, mode);

        let token = &mut self.tokens[index];
        token.last_move_succeeded = passable;
        if passable {
            let back = Some(direction.reverse());
            token.advance(
                to,
                geometry.x_with_direction(to.x(), back, mode),
                geometry.y_with_direction(to.y(), back, mode),
            );
            out_events.push(Event::TokenMoved {
                token: token.id,
                from,
                to,
                direction,
            });
        } else {
            log::trace!("{:?} blocked moving {:?} from {:?}", token.id, direction, from);
            out_events.push(Event::ObstacleTouched {
                token: token.id,
                front: to,
                direction,
            });
        }
        self.turn(index, direction, out_events);
    }

    fn move_diagonally(
        &mut self,
        index: usize,
        horizontal: Direction,
        vertical: Direction,
        out_events: &mut Vec<Event>,
    ) {
        let Some(direction) = Direction::from_axes(Some(horizontal), Some(vertical)) else {
            log::trace!("ignored diagonal move with components {horizontal:?}/{vertical:?}");
            return;
        };

        let mode = self.mode_at(index);
        let geometry = self.map.geometry();
        let from = self.tokens[index].position();
        let passable =
            self.can_pass_diagonally_at(index, from.x(), from.y(), horizontal, vertical, mode);

        let token = &mut self.tokens[index];
        token.last_move_succeeded = passable;
        if passable {
            let to = TilePos::new(
                geometry.resolve_x(from.x(), Some(horizontal), mode),
                geometry.resolve_y(from.y(), Some(vertical), mode),
            );
            token.advance(
                to,
                geometry.x_with_direction(to.x(), Some(horizontal.reverse()), mode),
                geometry.y_with_direction(to.y(), Some(vertical.reverse()), mode),
            );
            out_events.push(Event::TokenMoved {
                token: token.id,
                from,
                to,
                direction,
            });
        } else if mode.is_eight_way() {
            log::trace!("{:?} blocked moving {:?} from {:?}", token.id, direction, from);
            out_events.push(Event::ObstacleTouched {
                token: token.id,
                front: geometry.resolve(from, Some(direction), mode),
                direction,
            });
        }

        // Vertical is checked last and may override the horizontal turn.
        if self.tokens[index].direction() == horizontal.reverse() {
            self.turn(index, horizontal, out_events);
        }
        if self.tokens[index].direction() == vertical.reverse() {
            self.turn(index, vertical, out_events);
        }
    }

    fn jump(&mut self, index: usize, x_plus: i32, y_plus: i32, out_events: &mut Vec<Event>) {
        if x_plus.unsigned_abs() > y_plus.unsigned_abs() {
            if x_plus != 0 {
                let facing = if x_plus < 0 {
                    Direction::Left
                } else {
                    Direction::Right
                };
                self.turn(index, facing, out_events);
            }
        } else if y_plus != 0 {
            let facing = if y_plus < 0 {
                Direction::Up
            } else {
                Direction::Down
            };
            self.turn(index, facing, out_events);
        }

        let token = &mut self.tokens[index];
        let from = token.position();
        let peak = token.launch(x_plus, y_plus);
        out_events.push(Event::TokenJumped {
            token: token.id,
            from,
            to: token.position(),
            peak,
        });
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        self.frame = self.frame.saturating_add(1);

        let (leader_speed, leader_dashing) = {
            let leader = &self.tokens[0];
            (leader.move_speed(), leader.dashing)
        };
        let geometry = self.map.geometry();
        for token in &mut self.tokens {
            if matches!(token.id, TokenId::Follower(_)) {
                token.set_move_speed(leader_speed);
                token.dashing = leader_dashing;
            }
            token.update(&geometry);
        }

        out_events.push(Event::FrameAdvanced { frame: self.frame });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands naming a token that does not exist are ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => world.tick(out_events),
        Command::MoveStraight { token, direction } => {
            if let Some(index) = world.token_index(token) {
                world.move_straight(index, direction, out_events);
            }
        }
        Command::MoveDiagonally {
            token,
            horizontal,
            vertical,
        } => {
            if let Some(index) = world.token_index(token) {
                world.move_diagonally(index, horizontal, vertical, out_events);
            }
        }
        Command::Jump {
            token,
            x_plus,
            y_plus,
        } => {
            if let Some(index) = world.token_index(token) {
                world.jump(index, x_plus, y_plus, out_events);
            }
        }
        Command::SetDirection { token, direction } => {
            if let Some(index) = world.token_index(token) {
                world.turn(index, direction, out_events);
            }
        }
        Command::SetDirectionFix { token, fixed } => {
            if let Some(index) = world.token_index(token) {
                world.tokens[index].set_direction_fix(fixed);
            }
        }
        Command::SetDashing { token, dashing } => {
            if let Some(index) = world.token_index(token) {
                world.tokens[index].dashing = dashing;
            }
        }
        Command::SetMoveSpeed { token, speed } => {
            if let Some(index) = world.token_index(token) {
                world.tokens[index].set_move_speed(speed);
            }
        }
        Command::SetThrough { token, through } => {
            if let Some(index) = world.token_index(token) {
                world.tokens[index].through = through;
            }
        }
        Command::Locate { token, position } => {
            if let Some(index) = world.token_index(token) {
                world.tokens[index].locate(position);
            }
        }
        Command::SetGlobalMode { mode } => {
            if world.global_mode != mode {
                log::debug!("default movement mode set to {mode:?}");
                world.global_mode = mode;
                out_events.push(Event::ModeChanged { token: None, mode });
            }
        }
        Command::SetTokenMode { token, mode } => {
            if let Some(index) = world.token_index(token) {
                world.tokens[index].mode_override = mode;
                let effective = world.mode_at(index);
                log::debug!("{token:?} movement mode set to {effective:?}");
                out_events.push(Event::ModeChanged {
                    token: Some(token),
                    mode: effective,
                });
            }
        }
        Command::AddFollower => {
            let token = world.add_follower();
            out_events.push(Event::FollowerAdded { token });
        }
        Command::SpawnEvent {
            position,
            direction,
            priority,
            through,
        } => {
            let token = TokenId::Event(EventId::new(world.next_event_id));
            world.next_event_id = world.next_event_id.saturating_add(1);
            let mut event = Token::new(token, position, direction)
                .with_limits(world.settings.move_speed, world.settings.search_limit);
            event.priority = priority;
            event.through = through;
            world.tokens.push(event);
            out_events.push(Event::EventSpawned { token });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use eightway_core::{
        Direction, EventId, MapGeometry, MapQuery, MovementMode, TokenId, TokenSnapshot,
    };

    use super::{Settings, TileMap, World};

    /// Snapshot of a token's movement state.
    #[must_use]
    pub fn token(world: &World, id: TokenId) -> Option<TokenSnapshot> {
        let index = world.token_index(id)?;
        Some(world.tokens[index].snapshot(world.mode_at(index)))
    }

    /// Snapshots of every token: the player, then followers, then events.
    #[must_use]
    pub fn tokens(world: &World) -> Vec<TokenSnapshot> {
        world
            .tokens
            .iter()
            .enumerate()
            .map(|(index, token)| token.snapshot(world.mode_at(index)))
            .collect()
    }

    /// Identifiers of the followers in party order.
    #[must_use]
    pub fn followers(world: &World) -> Vec<TokenId> {
        world
            .tokens
            .iter()
            .map(|token| token.id)
            .filter(|id| matches!(id, TokenId::Follower(_)))
            .collect()
    }

    /// Identifiers of the map events in creation order.
    #[must_use]
    pub fn events(world: &World) -> Vec<TokenId> {
        world
            .tokens
            .iter()
            .map(|token| token.id)
            .filter(|id| matches!(id, TokenId::Event(_)))
            .collect()
    }

    /// Resolves a character slot to an existing token.
    #[must_use]
    pub fn resolve_slot(world: &World, slot: i32, current_event: Option<EventId>) -> Option<TokenId> {
        TokenId::from_slot(slot, current_event).filter(|id| world.token_index(*id).is_some())
    }

    /// Movement mode in effect for a token. A token's own mode wins over the default.
    #[must_use]
    pub fn mode_for(world: &World, id: TokenId) -> MovementMode {
        world
            .token_index(id)
            .map_or(world.global_mode, |index| world.mode_at(index))
    }

    /// Process-wide default movement mode.
    #[must_use]
    pub fn global_mode(world: &World) -> MovementMode {
        world.global_mode
    }

    /// Provides read-only access to the tile map.
    #[must_use]
    pub fn map(world: &World) -> &TileMap {
        &world.map
    }

    /// Settings the world was created with.
    #[must_use]
    pub fn settings(world: &World) -> &Settings {
        &world.settings
    }

    /// Number of frames elapsed.
    #[must_use]
    pub fn frame(world: &World) -> u64 {
        world.frame
    }

    /// Passability oracle bound to a token and its current movement mode.
    #[must_use]
    pub fn passability(world: &World, id: TokenId) -> Option<Passability<'_>> {
        let index = world.token_index(id)?;
        Some(Passability {
            world,
            index,
            mode: world.mode_at(index),
        })
    }

    /// [`MapQuery`] implementation evaluating moves for one token.
    #[derive(Clone, Copy, Debug)]
    pub struct Passability<'a> {
        world: &'a World,
        index: usize,
        mode: MovementMode,
    }

    impl MapQuery for Passability<'_> {
        fn geometry(&self) -> MapGeometry {
            self.world.map.geometry()
        }

        fn mode(&self) -> MovementMode {
            self.mode
        }

        fn can_pass(&self, x: i32, y: i32, direction: Direction) -> bool {
            self.world.can_pass_at(self.index, x, y, direction, self.mode)
        }

        fn can_pass_diagonally(
            &self,
            x: i32,
            y: i32,
            horizontal: Direction,
            vertical: Direction,
        ) -> bool {
            self.world
                .can_pass_diagonally_at(self.index, x, y, horizontal, vertical, self.mode)
        }
    }
}

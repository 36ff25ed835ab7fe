#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays eight-way movement scenarios.

mod driver;
mod scenario;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eightway_core::{Command, TilePos, TokenId};
use eightway_system_path_search::{neighborhood, search};
use eightway_world::{self as world, query};

use crate::{driver::Driver, scenario::Scenario};

/// Replays grid movement scenarios and inspects path searches.
#[derive(Debug, Parser)]
#[command(name = "eightway", version, about)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Runs a scenario for a number of frames and prints the final token states.
    Run {
        /// Path to the scenario TOML file.
        scenario: PathBuf,
        /// Number of frames to simulate.
        #[arg(long, default_value_t = 240)]
        frames: u64,
        /// Seed for the random behaviours.
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Searches for a route between two tiles of a scenario map.
    Path {
        /// Path to the scenario TOML file.
        scenario: PathBuf,
        /// Start tile as `x,y`.
        #[arg(long, value_parser = parse_tile)]
        from: TilePos,
        /// Goal tile as `x,y`.
        #[arg(long, value_parser = parse_tile)]
        to: TilePos,
    },
}

fn parse_tile(value: &str) -> Result<TilePos, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{value}`"))?;
    let x = x
        .trim()
        .parse()
        .map_err(|error| format!("invalid column `{x}`: {error}"))?;
    let y = y
        .trim()
        .parse()
        .map_err(|error| format!("invalid row `{y}`: {error}"))?;
    Ok(TilePos::new(x, y))
}

/// Entry point for the eight-way movement command-line interface.
fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        CliCommand::Run {
            scenario,
            frames,
            seed,
        } => run(&Scenario::load(&scenario)?, frames, seed),
        CliCommand::Path { scenario, from, to } => path(&Scenario::load(&scenario)?, from, to),
    }
}

fn run(scenario: &Scenario, frames: u64, seed: u64) -> Result<()> {
    let mut driver = Driver::new(scenario, seed).context("failed to prepare scenario")?;
    let _ = driver.run(frames);

    let stats = driver.stats();
    println!(
        "frames {} moves {} blocked {} jumps {}",
        stats.frames, stats.moves, stats.blocked, stats.jumps
    );
    for token in query::tokens(driver.world()) {
        println!(
            "{:?} at ({}, {}) facing {} [{}] steps {} mode {:?}",
            token.id,
            token.position.x(),
            token.position.y(),
            token.direction.label(),
            token.direction.numpad(),
            token.steps,
            token.mode,
        );
    }
    Ok(())
}

fn path(scenario: &Scenario, from: TilePos, to: TilePos) -> Result<()> {
    let mut world = scenario.build_world()?;
    world::apply(
        &mut world,
        Command::Locate {
            token: TokenId::Player,
            position: from,
        },
        &mut Vec::new(),
    );

    let map = query::passability(&world, TokenId::Player)
        .context("scenario world has no player")?;
    let mode = query::mode_for(&world, TokenId::Player);
    let limit = query::settings(&world).search_limit;
    let outcome = search(&map, neighborhood(mode), from, to, limit);
    println!(
        "first step {} toward ({}, {}) after {} nodes{}",
        outcome.direction.map_or("none", |direction| direction.compass()),
        outcome.target.x(),
        outcome.target.y(),
        outcome.expanded,
        if outcome.reached_goal { "" } else { " (goal out of reach)" },
    );

    let max_steps = usize::try_from(limit.saturating_mul(4)).unwrap_or(usize::MAX);
    let route = driver::trace_path(&mut world, to, max_steps);
    let tiles: Vec<String> = route
        .iter()
        .map(|tile| format!("({}, {})", tile.x(), tile.y()))
        .collect();
    println!("route {}", tiles.join(" -> "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tile_arguments() {
        assert_eq!(parse_tile("3,4"), Ok(TilePos::new(3, 4)));
        assert_eq!(parse_tile(" -1 , 2"), Ok(TilePos::new(-1, 2)));
        assert!(parse_tile("3").is_err());
        assert!(parse_tile("a,2").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives a headless River Chase session.
//!
//! The binary selects a role, runs the simulation for a bounded number of
//! ticks, and prints periodic frames plus a transcript of notable events.
//! The controlled agent receives no input, so it holds position while the
//! autonomous agents play out the round.

mod frame;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use river_chase_core::{AgentKind, Command, Event, WELCOME_BANNER};
use river_chase_world::{apply, Session};

/// Player-selectable roles. The ambusher is deliberately absent.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Role {
    /// Control the hunter; the prey plays autonomously.
    Hunter,
    /// Control the prey; the hunter plays autonomously.
    Prey,
}

impl From<Role> for AgentKind {
    fn from(role: Role) -> Self {
        match role {
            Role::Hunter => AgentKind::Hunter,
            Role::Prey => AgentKind::Prey,
        }
    }
}

/// Headless River Chase session driver.
#[derive(Debug, Parser)]
#[command(name = "river-chase")]
struct Args {
    /// Seed for the session's random source.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Agent to control for the round.
    #[arg(long, value_enum, default_value_t = Role::Prey)]
    role: Role,

    /// Maximum number of ticks to simulate.
    #[arg(long, default_value_t = 500)]
    ticks: u32,

    /// Print a frame every this many ticks.
    #[arg(long, default_value_t = 25)]
    every: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.every == 0 {
        bail!("--every must be at least 1");
    }

    println!("{WELCOME_BANNER}");

    let mut session = Session::new(args.seed);
    let mut events = Vec::new();
    apply(
        &mut session,
        Command::SelectAgent {
            kind: args.role.into(),
        },
        &mut events,
    );
    report(&events);
    println!("{}", frame::render(&session));

    for tick_index in 1..=args.ticks {
        events.clear();
        apply(&mut session, Command::Tick, &mut events);
        report(&events);

        let ended = events
            .iter()
            .any(|event| matches!(event, Event::GameEnded { .. }));
        if ended || tick_index % args.every == 0 {
            println!("{}", frame::render(&session));
        }
        if ended {
            break;
        }
    }

    Ok(())
}

fn report(events: &[Event]) {
    for event in events {
        if let Some(line) = frame::describe(event) {
            println!("{line}");
        }
    }
}

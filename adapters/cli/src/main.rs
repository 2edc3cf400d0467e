#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that loads block layouts, prints group outlines and
//! simulates shatter runs.

mod layout;
mod text;

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use passblock_core::{BlockId, Command, Event};
use passblock_rendering::{Color, OutlineRenderer, Scene};
use passblock_world::{self as world, query, World};
use tracing_subscriber::EnvFilter;

use layout::LayoutFile;
use text::TextRenderer;

const BASE_TINT: Color = Color::from_rgb_u8(96, 128, 160);

#[derive(Debug, Parser)]
#[command(name = "passblock", version, about = "Pass-through block tooling")]
struct CliArgs {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Activates every block and prints each group's outline.
    Outline {
        /// Path to the layout TOML file.
        layout: PathBuf,
    },
    /// Shatters the group containing a block and prints the event log.
    Shatter {
        /// Path to the layout TOML file.
        layout: PathBuf,
        /// Identifier of any member of the group to shatter.
        #[arg(long)]
        block: u32,
        /// Simulated milliseconds per step.
        #[arg(
            long,
            default_value_t = 16,
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        step_ms: u64,
        /// Upper bound on simulated steps before giving up.
        #[arg(long, default_value_t = 1000)]
        max_steps: u32,
    },
}

/// Entry point for the pass-through block command-line interface.
fn main() -> Result<()> {
    init_logging();
    let args = CliArgs::parse();

    match args.command {
        CliCommand::Outline { layout } => run_outline(&layout),
        CliCommand::Shatter {
            layout,
            block,
            step_ms,
            max_steps,
        } => run_shatter(
            &layout,
            BlockId::new(block),
            Duration::from_millis(step_ms),
            max_steps,
        ),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Builds a world from the layout file and activates every block.
fn load_world(path: &Path) -> Result<World> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read layout {}", path.display()))?;
    let layout = LayoutFile::parse(&source)
        .with_context(|| format!("failed to parse layout {}", path.display()))?;
    let commands = layout
        .commands()
        .with_context(|| format!("invalid shatter settings in {}", path.display()))?;

    let mut world = World::new();
    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    for event in &events {
        match event {
            Event::BlockRejected { region, reason } => {
                log::warn!("skipping block at {region:?}: {reason}");
            }
            Event::PlatformRejected { region, reason } => {
                log::warn!("skipping platform at {region:?}: {reason}");
            }
            _ => {}
        }
    }

    events.clear();
    for snapshot in query::blocks(&world) {
        world::apply(
            &mut world,
            Command::ActivateBlock { block: snapshot.id },
            &mut events,
        );
    }
    log::info!(
        "loaded {} blocks into {} groups",
        query::blocks(&world).len(),
        query::groups(&world).len()
    );
    Ok(world)
}

fn run_outline(path: &Path) -> Result<()> {
    let world = load_world(path)?;
    let mut renderer = TextRenderer::new(io::stdout().lock());
    renderer.render(&Scene::capture(&world, BASE_TINT))
}

fn run_shatter(path: &Path, block: BlockId, step: Duration, max_steps: u32) -> Result<()> {
    let mut world = load_world(path)?;
    let Some(group) = query::group_of(&world, block) else {
        bail!("no block {} in {}", block.get(), path.display());
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut events = Vec::new();
    world::apply(&mut world, Command::TriggerShatter { block }, &mut events);
    if let Some(Event::ShatterRejected { reason, .. }) = events.first() {
        bail!("shatter of block {} was rejected: {reason}", block.get());
    }
    write_events(&mut out, 0, &events)?;

    for index in 1..=max_steps {
        events.clear();
        world::apply(&mut world, Command::Tick { dt: step }, &mut events);
        write_events(&mut out, index, &events)?;

        if events.contains(&Event::GroupRetired { group }) {
            writeln!(
                out,
                "group {} retired after {index} steps ({:?} simulated)",
                group.get(),
                step * index
            )?;
            return Ok(());
        }
    }

    bail!(
        "group {} did not retire within {max_steps} steps",
        group.get()
    )
}

fn write_events(out: &mut impl Write, step: u32, events: &[Event]) -> Result<()> {
    for event in events {
        if matches!(event, Event::TimeAdvanced { .. }) {
            continue;
        }
        writeln!(out, "[{step:>4}] {event:?}")?;
    }
    Ok(())
}

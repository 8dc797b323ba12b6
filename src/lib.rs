#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Ore Heatmap
//!
//! A chunk-level density heatmap of tracked ores for a voxel world, with five
//! independently configured tracked-resource slots, a per-world JSON cache and
//! background rescans.
//!
//! ## Key Modules
//!
//! * `heatmap_state` - The heatmap itself: scanning, caching, coloring, overlays and
//!   the slot controller that ties them together
//! * `core` - Shared-ownership primitives used across threads
//! * `voxels` - A procedural voxel world the heatmap can scan without a host game
//! * `application_state` - The headless application loop behind the binary
//!
//! ## Architecture
//!
//! The heatmap never talks to a game directly. It reads the world through
//! `WorldView`, the host through `HostEnvironment`, and hands overlays to an
//! `OverlayRenderer`. The binary wires those to the demo world in `voxels`.
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     ore_heatmap::run();
//! }
//! ```

use log::info;

use application_state::ApplicationState;
use heatmap_state::config::HeatmapConfig;

pub mod application_state;
pub mod core;
pub mod heatmap_state;
pub mod voxels;

/// Ticks the binary runs when no count is given: one minute of game time.
pub const DEFAULT_DEMO_TICKS: u64 = 1200;
/// World seed used when none is given.
pub const DEFAULT_SEED: u64 = 20_240_601;

/// Initializes logging and runs the headless heatmap demo.
///
/// Optional positional arguments: tick count, then world seed. The heatmap
/// configuration is read from the file named by `ORE_HEATMAP_CONFIG`.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let mut args = std::env::args().skip(1);
    let ticks = parse_arg(args.next(), "tick count", DEFAULT_DEMO_TICKS);
    let seed = parse_arg(args.next(), "seed", DEFAULT_SEED);

    let config = HeatmapConfig::load_from_env();
    let mut state = ApplicationState::new(config, seed);
    info!("Running {} ticks on world seed {}", ticks, seed);
    state.run_for(ticks);
}

fn parse_arg(arg: Option<String>, what: &str, default: u64) -> u64 {
    match arg.map(|arg| arg.parse::<u64>()) {
        None => default,
        Some(Ok(value)) => value,
        Some(Err(error)) => {
            log::warn!("Ignoring invalid {}: {}", what, error);
            default
        }
    }
}

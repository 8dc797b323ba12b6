//! # Ore Heatmap Entry Point
//!
//! Runs the headless heatmap demo. It simply calls into the library's `run()`.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [ticks] [seed]
//! ```

fn main() {
    ore_heatmap::run();
}

//! # Observer
//!
//! A wandering stand-in for the player: walks on the horizontal plane and turns by a
//! random angle every so often, dragging the set of resident chunks along with it.

use cgmath::{Angle, Point3, Rad};

/// Blocks walked per tick.
pub const WALK_SPEED: f64 = 0.5;
/// Chance per tick that the observer picks a new heading.
const TURN_CHANCE: f64 = 0.01;
/// Largest single turn, in radians.
const MAX_TURN: f64 = std::f64::consts::FRAC_PI_2;

/// The moving point the heatmap is centred on.
#[derive(Debug)]
pub struct Observer {
    /// Position in block coordinates.
    pub position: Point3<f64>,
    /// Walking direction, measured from +X towards +Z.
    pub heading: Rad<f64>,
    rng: fastrand::Rng,
}

impl Observer {
    /// Creates an observer standing at `position` facing +X.
    ///
    /// # Arguments
    /// * `position` - Starting block position
    /// * `seed` - Seed for the wandering pattern
    pub fn new(position: Point3<f64>, seed: u64) -> Self {
        Self {
            position,
            heading: Rad(0.0),
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Moves the observer by one tick.
    pub fn advance(&mut self) {
        if self.rng.f64() < TURN_CHANCE {
            let turn = (self.rng.f64() * 2.0 - 1.0) * MAX_TURN;
            self.heading = (self.heading + Rad(turn)).normalize();
        }
        self.position.x += self.heading.cos() * WALK_SPEED;
        self.position.z += self.heading.sin() * WALK_SPEED;
    }
}

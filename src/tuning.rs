//! Data-driven game balance
//!
//! Every value here is a knob a designer may want to turn without touching
//! the simulation. Overrides come in as JSON; missing fields keep defaults.

use serde::{Deserialize, Serialize};

/// Balance values consumed by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Floor scroll speed before boosts and difficulty
    pub base_speed: f32,
    /// Absolute minimum scroll speed
    pub min_speed: f32,
    /// Difficulty multiplier cap
    pub max_speed_factor: f32,
    /// Difficulty growth per unit of distance
    pub speed_factor_rate: f32,

    /// speedBoost range
    pub max_boost: f32,
    pub min_boost: f32,
    /// Fixed boost granted per fruit
    pub fruit_boost: f32,
    /// Fixed reduction per mushroom
    pub mushroom_reduction: f32,
    /// Per-frame decay of a positive boost
    pub boost_decay: f32,
    /// Per-frame recovery of a negative boost (slower than decay)
    pub boost_recovery: f32,
    /// Per-frame speed decay once boosts are gone
    pub natural_decay: f32,
    /// Speed multiplier applied once when a wall block starts
    pub wall_penalty: f32,

    /// Drowning: time before the world stops, total sink time, sink depth
    pub drown_block_delay_ms: u32,
    pub drown_duration_ms: u32,
    pub drown_sink_distance: f32,

    /// Chance of drawing from the terrain table each spawn cycle
    pub terrain_chance: f32,
    /// Spacing between spawn cycles at speed factor 1 and at the cap
    pub min_spacing: f32,
    pub max_spacing: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_speed: 5.0,
            min_speed: 2.0,
            max_speed_factor: 2.0,
            speed_factor_rate: 0.000_05,

            max_boost: 5.0,
            min_boost: -3.0,
            fruit_boost: 1.5,
            mushroom_reduction: 2.0,
            boost_decay: 0.02,
            boost_recovery: 0.01,
            natural_decay: 0.05,
            wall_penalty: 0.7,

            drown_block_delay_ms: 320,
            drown_duration_ms: 1600,
            drown_sink_distance: 60.0,

            terrain_chance: 0.75,
            min_spacing: 300.0,
            max_spacing: 600.0,
        }
    }
}

impl Tuning {
    /// Parse an override, falling back to defaults if it is malformed
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Tuning>(json) {
            Ok(tuning) => {
                log::info!("Loaded tuning override");
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring malformed tuning override: {}", e);
                Self::default()
            }
        }
    }

    /// Spacing between spawn cycles for the current difficulty
    pub fn spawn_spacing(&self, speed_factor: f32) -> f32 {
        let spread = (self.max_spacing - self.min_spacing) / 2.0;
        (self.min_spacing + (speed_factor - 1.0) * spread).min(self.max_spacing)
    }
}

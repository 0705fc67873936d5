//! Horse Run - A side-scrolling horse runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, game state)
//! - `renderer`: WebGPU rendering pipeline
//! - `particles`: Visual effect side-channel
//! - `platform`: Browser/native platform abstraction
//! - `persistence`: Versioned save/load
//! - `tuning`: Data-driven game balance

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod highscores;
pub mod particles;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
///
/// Screen space: x grows to the right, y grows downward, positions are top-left corners.
pub mod consts {
    /// Nominal duration of one animation frame (ms)
    pub const FRAME_MS: u32 = 16;

    /// Visible play field
    pub const VISIBLE_WIDTH: f32 = 800.0;
    pub const VISIBLE_HEIGHT: f32 = 400.0;
    /// Ground surface (top of the ground strip)
    pub const GROUND_Y: f32 = 350.0;

    /// Horse geometry - x is fixed on screen
    pub const HORSE_X: f32 = 100.0;
    pub const HORSE_WIDTH: f32 = 60.0;
    pub const HORSE_STAND_HEIGHT: f32 = 50.0;
    pub const HORSE_DUCK_HEIGHT: f32 = 30.0;

    /// Vertical physics (per frame)
    pub const GRAVITY: f32 = 0.6;
    pub const JUMP_VELOCITY: f32 = -13.0;
    /// Keeps a single frame's fall inside the landing band
    pub const TERMINAL_VELOCITY: f32 = 15.0;
    /// How close to its resting surface the horse must be to jump
    pub const JUMP_TOLERANCE: f32 = 5.0;

    /// Surface height of each platform level (0 = ground)
    pub const LEVEL_SURFACES: [f32; 4] = [GROUND_Y, GROUND_Y - 40.0, GROUND_Y - 80.0, GROUND_Y - 120.0];

    /// Platform landing band around the top surface
    pub const LANDING_ABOVE: f32 = 15.0;
    pub const LANDING_BELOW: f32 = 5.0;
    /// Horizontal band at a platform's leading edge that counts as a wall hit
    pub const WALL_FRONT_BAND: f32 = 20.0;
    /// Bottom must be this far below the top surface to hit the wall
    pub const WALL_BUFFER: f32 = 5.0;
    /// Floating platforms only block when the horse's bottom is within this of the top
    pub const FLOATING_GATE: f32 = 20.0;

    /// Spawn frontier handling
    pub const FRONTIER_FALLBACK: f32 = VISIBLE_WIDTH - 500.0;
    pub const SPAWN_TRIGGER: f32 = VISIBLE_WIDTH + 100.0;
    pub const MIN_SPAWN_X: f32 = VISIBLE_WIDTH + 50.0;
    /// Entities left of this are dropped
    pub const DESPAWN_X: f32 = -100.0;
}

/// Surface height for a platform level, clamped to the highest tier
#[inline]
pub fn surface_for_level(level: u32) -> f32 {
    let idx = (level as usize).min(consts::LEVEL_SURFACES.len() - 1);
    consts::LEVEL_SURFACES[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_for_level() {
        assert_eq!(surface_for_level(0), consts::GROUND_Y);
        assert!(surface_for_level(3) < surface_for_level(2));
        assert_eq!(surface_for_level(99), surface_for_level(3));
    }
}

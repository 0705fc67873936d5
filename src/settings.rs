//! Player settings and preferences
//!
//! Persisted separately from high scores, through the same versioned envelope.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, PersistError, Storage};

/// Particle cap when effects are enabled
const FULL_PARTICLES: usize = 256;
/// Particle cap with reduced motion
const REDUCED_PARTICLES: usize = 48;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,
    /// Pause and silence when the page loses focus
    pub mute_on_blur: bool,

    // === Visual ===
    /// Particle effects (sparkles, splashes, dust)
    pub particles: bool,
    /// Fewer and calmer particles
    pub reduced_motion: bool,
    /// Show FPS counter
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.5,
            muted: false,
            mute_on_blur: true,

            particles: true,
            reduced_motion: false,
            show_fps: false,
        }
    }
}

impl Settings {
    const STORAGE_KEY: &'static str = "horse_run_settings";
    pub const VERSION: u32 = 1;

    /// Sound effect gain after master volume and mute
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        match (self.particles, self.reduced_motion) {
            (false, _) => 0,
            (true, true) => REDUCED_PARTICLES,
            (true, false) => FULL_PARTICLES,
        }
    }

    /// Step particle effects full -> reduced -> off -> full
    pub fn cycle_particles(&mut self) {
        (self.particles, self.reduced_motion) = match (self.particles, self.reduced_motion) {
            (true, false) => (true, true),
            (true, true) => (false, false),
            (false, _) => (true, false),
        };
    }

    /// Load settings; falls back to defaults on any failure
    pub fn load(storage: &dyn Storage) -> Self {
        match persistence::load_versioned::<Self>(storage, Self::STORAGE_KEY, Self::VERSION) {
            Ok(settings) => {
                log::info!("Loaded settings");
                settings
            }
            Err(PersistError::Missing) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Using default settings: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self, storage: &mut dyn Storage) -> Result<(), PersistError> {
        persistence::save_versioned(storage, Self::STORAGE_KEY, Self::VERSION, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_effective_sfx_volume() {
        let mut s = Settings::default();
        assert!((s.effective_sfx_volume() - 0.8).abs() < 1e-6);
        s.muted = true;
        assert_eq!(s.effective_sfx_volume(), 0.0);
    }

    #[test]
    fn test_max_particles() {
        let mut s = Settings::default();
        assert_eq!(s.max_particles(), FULL_PARTICLES);
        s.reduced_motion = true;
        assert_eq!(s.max_particles(), REDUCED_PARTICLES);
        s.particles = false;
        assert_eq!(s.max_particles(), 0);
    }

    #[test]
    fn test_cycle_particles() {
        let mut s = Settings::default();
        let mut caps = Vec::new();
        for _ in 0..4 {
            s.cycle_particles();
            caps.push(s.max_particles());
        }
        assert_eq!(caps, vec![REDUCED_PARTICLES, 0, FULL_PARTICLES, REDUCED_PARTICLES]);
    }

    #[test]
    fn test_round_trip_through_storage() {
        let mut storage = MemoryStorage::new();
        let s = Settings {
            muted: true,
            show_fps: true,
            ..Default::default()
        };
        s.save(&mut storage).unwrap();
        assert_eq!(Settings::load(&storage), s);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let mut storage = MemoryStorage::new();
        storage
            .set(
                Settings::STORAGE_KEY,
                r#"{"version":1,"data":{"muted":true}}"#,
            )
            .unwrap();
        let s = Settings::load(&storage);
        assert!(s.muted);
        assert_eq!(s.master_volume, Settings::default().master_volume);
    }

    #[test]
    fn test_bad_version_uses_defaults() {
        let mut storage = MemoryStorage::new();
        storage
            .set(Settings::STORAGE_KEY, r#"{"version":9,"data":{"muted":true}}"#)
            .unwrap();
        assert_eq!(Settings::load(&storage), Settings::default());
    }
}

//! Side-channels out of the simulation
//!
//! Audio and visual effects are fire-and-forget: the simulation pushes
//! events into injected sinks and never reads anything back.

use glam::Vec2;

/// Sound effect ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    Jump,
    Land,
    Fruit,
    Star,
    Key,
    Mushroom,
    Splash,
    WallHit,
    Crash,
    GameOver,
    HighScore,
}

impl Sound {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sound::Jump => "jump",
            Sound::Land => "land",
            Sound::Fruit => "fruit",
            Sound::Star => "star",
            Sound::Key => "key",
            Sound::Mushroom => "mushroom",
            Sound::Splash => "splash",
            Sound::WallHit => "wall_hit",
            Sound::Crash => "crash",
            Sound::GameOver => "game_over",
            Sound::HighScore => "high_score",
        }
    }
}

/// Particle effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Fruit and star pickups
    Sparkle,
    KeyGlint,
    /// Mushroom pickup
    Puff,
    Splash,
    /// Landing on a surface
    Dust,
    /// Hitting a platform wall
    Impact,
    Crash,
}

/// Receives sound events
pub trait AudioSink {
    /// Play a one-shot sound at `volume` (0..1)
    fn play(&mut self, sound: Sound, volume: f32);
    fn start_music(&mut self);
    fn stop_music(&mut self);
}

/// Receives particle emissions
pub trait EffectSink {
    fn spawn_effect(&mut self, kind: EffectKind, pos: Vec2);
}

/// Discards everything (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self, _sound: Sound, _volume: f32) {}
    fn start_music(&mut self) {}
    fn stop_music(&mut self) {}
}

impl EffectSink for NullSink {
    fn spawn_effect(&mut self, _kind: EffectKind, _pos: Vec2) {}
}

/// Both side-channels, borrowed for one frame
pub struct Sinks<'a> {
    pub audio: &'a mut dyn AudioSink,
    pub effects: &'a mut dyn EffectSink,
}

impl<'a> Sinks<'a> {
    pub fn new(audio: &'a mut dyn AudioSink, effects: &'a mut dyn EffectSink) -> Self {
        Self { audio, effects }
    }

    pub fn play(&mut self, sound: Sound, volume: f32) {
        self.audio.play(sound, volume);
    }

    pub fn effect(&mut self, kind: EffectKind, pos: Vec2) {
        self.effects.spawn_effect(kind, pos);
    }
}

/// Records everything it receives
#[cfg(test)]
#[derive(Debug, Default)]
pub struct Recorder {
    pub sounds: Vec<Sound>,
    pub effects: Vec<EffectKind>,
    pub music_on: bool,
}

#[cfg(test)]
impl AudioSink for Recorder {
    fn play(&mut self, sound: Sound, _volume: f32) {
        self.sounds.push(sound);
    }
    fn start_music(&mut self) {
        self.music_on = true;
    }
    fn stop_music(&mut self) {
        self.music_on = false;
    }
}

#[cfg(test)]
impl EffectSink for Recorder {
    fn spawn_effect(&mut self, kind: EffectKind, _pos: Vec2) {
        self.effects.push(kind);
    }
}

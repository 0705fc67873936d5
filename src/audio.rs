//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects and a background drone - no external files needed!

use web_sys::OscillatorType::{Sawtooth, Sine, Square, Triangle};
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::settings::Settings;
use crate::sim::{AudioSink, Sound};

/// One oscillator voice with a decaying gain envelope
#[derive(Debug, Clone, Copy)]
struct Tone {
    freq: f32,
    /// Exponential glide target, if any
    glide_to: Option<f32>,
    wave: OscillatorType,
    gain: f32,
    /// Seconds until the envelope has decayed
    decay: f64,
    /// Seconds after the trigger
    delay: f64,
}

impl Tone {
    const fn new(freq: f32, wave: OscillatorType, gain: f32, decay: f64) -> Self {
        Self {
            freq,
            glide_to: None,
            wave,
            gain,
            decay,
            delay: 0.0,
        }
    }

    const fn glide(mut self, to: f32) -> Self {
        self.glide_to = Some(to);
        self
    }

    const fn after(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }
}

/// Voices for each sound
fn recipe(sound: Sound) -> &'static [Tone] {
    const JUMP: &[Tone] = &[Tone::new(220.0, Triangle, 0.3, 0.18).glide(520.0)];
    const LAND: &[Tone] = &[Tone::new(140.0, Sine, 0.5, 0.1).glide(60.0)];
    const FRUIT: &[Tone] = &[
        Tone::new(660.0, Sine, 0.25, 0.12),
        Tone::new(880.0, Sine, 0.25, 0.12).after(0.06),
    ];
    const STAR: &[Tone] = &[
        Tone::new(1200.0, Sine, 0.2, 0.3),
        Tone::new(1800.0, Sine, 0.2, 0.3).after(0.02),
        Tone::new(2400.0, Sine, 0.2, 0.3).after(0.04),
    ];
    const KEY: &[Tone] = &[
        Tone::new(600.0, Triangle, 0.25, 0.15),
        Tone::new(800.0, Triangle, 0.25, 0.15).after(0.08),
        Tone::new(1000.0, Triangle, 0.25, 0.15).after(0.16),
    ];
    const MUSHROOM: &[Tone] = &[Tone::new(400.0, Sine, 0.35, 0.3).glide(150.0)];
    const SPLASH: &[Tone] = &[
        Tone::new(900.0, Sawtooth, 0.15, 0.25).glide(120.0),
        Tone::new(300.0, Sine, 0.4, 0.8).glide(20.0).after(0.05),
    ];
    const WALL_HIT: &[Tone] = &[
        Tone::new(80.0, Sine, 0.5, 0.25).glide(40.0),
        Tone::new(400.0, Square, 0.2, 0.15),
    ];
    const CRASH: &[Tone] = &[
        Tone::new(100.0, Sawtooth, 0.5, 0.4).glide(30.0),
        Tone::new(1500.0, Square, 0.2, 0.1),
    ];
    const GAME_OVER: &[Tone] = &[
        Tone::new(400.0, Sine, 0.3, 0.3),
        Tone::new(350.0, Sine, 0.3, 0.3).after(0.2),
        Tone::new(300.0, Sine, 0.3, 0.3).after(0.4),
        Tone::new(200.0, Sine, 0.3, 0.3).after(0.6),
    ];
    const HIGH_SCORE: &[Tone] = &[
        Tone::new(500.0, Triangle, 0.25, 0.25),
        Tone::new(600.0, Triangle, 0.25, 0.25).after(0.08),
        Tone::new(700.0, Triangle, 0.25, 0.25).after(0.16),
        Tone::new(800.0, Triangle, 0.25, 0.25).after(0.24),
        Tone::new(1000.0, Triangle, 0.25, 0.25).after(0.32),
    ];

    match sound {
        Sound::Jump => JUMP,
        Sound::Land => LAND,
        Sound::Fruit => FRUIT,
        Sound::Star => STAR,
        Sound::Key => KEY,
        Sound::Mushroom => MUSHROOM,
        Sound::Splash => SPLASH,
        Sound::WallHit => WALL_HIT,
        Sound::Crash => CRASH,
        Sound::GameOver => GAME_OVER,
        Sound::HighScore => HIGH_SCORE,
    }
}

/// Background drone voices (root and fifth)
const MUSIC_VOICES: [(f32, OscillatorType); 2] = [(110.0, Triangle), (165.0, Sine)];

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
    music: Option<(Vec<OscillatorNode>, GainNode)>,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            master_volume: settings.master_volume,
            sfx_volume: settings.sfx_volume,
            music_volume: settings.music_volume,
            muted: settings.muted,
            music: None,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if let Some((_, gain)) = &self.music {
            gain.gain().set_value(self.music_gain());
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    fn sfx_gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    fn music_gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.music_volume * 0.15
        }
    }

    /// Oscillator routed through its own gain node to the output
    fn voice(
        ctx: &AudioContext,
        freq: f32,
        wave: OscillatorType,
        out: Option<&GainNode>,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(wave);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        match out {
            Some(bus) => gain.connect_with_audio_node(bus).ok()?,
            None => gain.connect_with_audio_node(&ctx.destination()).ok()?,
        };

        Some((osc, gain))
    }

    fn play_tone(ctx: &AudioContext, tone: &Tone, vol: f32) {
        let Some((osc, gain)) = Self::voice(ctx, tone.freq, tone.wave, None) else {
            return;
        };
        let t = ctx.current_time() + tone.delay;

        gain.gain().set_value_at_time(vol * tone.gain, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + tone.decay)
            .ok();
        if let Some(to) = tone.glide_to {
            osc.frequency().set_value_at_time(tone.freq, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(to, t + tone.decay)
                .ok();
        }

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + tone.decay + 0.05).ok();
    }
}

impl AudioSink for AudioManager {
    fn play(&mut self, sound: Sound, volume: f32) {
        let vol = self.sfx_gain() * volume.clamp(0.0, 1.0);
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        for tone in recipe(sound) {
            Self::play_tone(ctx, tone, vol);
        }
    }

    fn start_music(&mut self) {
        if self.music.is_some() {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        let Ok(bus) = ctx.create_gain() else { return };
        if bus.connect_with_audio_node(&ctx.destination()).is_err() {
            return;
        }
        bus.gain().set_value(self.music_gain());

        let oscillators: Vec<OscillatorNode> = MUSIC_VOICES
            .iter()
            .filter_map(|&(freq, wave)| {
                let (osc, _) = Self::voice(ctx, freq, wave, Some(&bus))?;
                osc.start().ok()?;
                Some(osc)
            })
            .collect();

        log::debug!("Music started ({} voices)", oscillators.len());
        self.music = Some((oscillators, bus));
    }

    fn stop_music(&mut self) {
        if let Some((oscillators, bus)) = self.music.take() {
            for osc in oscillators {
                osc.stop().ok();
            }
            let _ = bus.disconnect();
        }
    }
}

//! Visual particle effects
//!
//! Purely cosmetic: owns its own RNG so emitting particles never perturbs
//! the simulation's random stream.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::{EffectKind, EffectSink};

/// Hard cap on live particles
pub const MAX_PARTICLES: usize = 256;

/// A particle for visual effects
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    /// World units per frame
    pub vel: Vec2,
    pub color: [f32; 4],
    /// 1 at birth, removed at 0
    pub life: f32,
    pub size: f32,
    /// Added to `vel.y` each frame
    pub gravity: f32,
    /// Life lost per frame
    pub fade: f32,
}

/// Emission parameters for one effect kind
struct Burst {
    count: usize,
    color: [f32; 4],
    /// Speed range in units per frame
    speed: (f32, f32),
    /// Direction cone (radians, screen space with y down)
    angle: (f32, f32),
    gravity: f32,
    /// Life lost per frame
    fade: f32,
    size: (f32, f32),
}

fn burst(kind: EffectKind) -> Burst {
    match kind {
        EffectKind::Sparkle => Burst {
            count: 10,
            color: [1.0, 0.9, 0.3, 1.0],
            speed: (1.0, 3.0),
            angle: (0.0, TAU),
            gravity: 0.02,
            fade: 0.04,
            size: (2.0, 4.0),
        },
        EffectKind::KeyGlint => Burst {
            count: 14,
            color: [1.0, 0.84, 0.0, 1.0],
            speed: (1.5, 3.5),
            angle: (0.0, TAU),
            gravity: 0.0,
            fade: 0.03,
            size: (2.0, 5.0),
        },
        EffectKind::Puff => Burst {
            count: 12,
            color: [0.7, 0.4, 0.8, 0.9],
            speed: (0.3, 1.2),
            angle: (0.0, TAU),
            gravity: -0.02,
            fade: 0.025,
            size: (4.0, 8.0),
        },
        EffectKind::Splash => Burst {
            count: 20,
            color: [0.3, 0.6, 1.0, 1.0],
            speed: (2.0, 5.0),
            angle: (PI + 0.3, TAU - 0.3),
            gravity: 0.25,
            fade: 0.025,
            size: (2.0, 4.0),
        },
        EffectKind::Dust => Burst {
            count: 6,
            color: [0.6, 0.5, 0.35, 0.8],
            speed: (0.5, 1.5),
            angle: (PI, PI + 0.6),
            gravity: 0.0,
            fade: 0.05,
            size: (3.0, 5.0),
        },
        EffectKind::Impact => Burst {
            count: 8,
            color: [0.9, 0.9, 0.9, 1.0],
            speed: (1.0, 2.5),
            angle: (PI - 0.8, PI + 0.8),
            gravity: 0.1,
            fade: 0.06,
            size: (2.0, 3.0),
        },
        EffectKind::Crash => Burst {
            count: 24,
            color: [1.0, 0.35, 0.2, 1.0],
            speed: (2.0, 6.0),
            angle: (0.0, TAU),
            gravity: 0.2,
            fade: 0.02,
            size: (3.0, 6.0),
        },
    }
}

/// Live particles plus their generator
pub struct ParticleSystem {
    particles: Vec<Particle>,
    rng: Pcg32,
    max: usize,
}

impl ParticleSystem {
    pub fn new(seed: u64, max: usize) -> Self {
        Self {
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            max: max.min(MAX_PARTICLES),
        }
    }

    /// Change the cap (settings toggle); excess particles are dropped
    pub fn set_max(&mut self, max: usize) {
        self.max = max.min(MAX_PARTICLES);
        self.particles.truncate(self.max);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Advance one frame
    pub fn update(&mut self) {
        for particle in self.particles.iter_mut() {
            particle.pos += particle.vel;
            // Drag, then gravity
            particle.vel *= 0.97;
            particle.vel.y += particle.gravity;
            particle.life -= particle.fade;
            particle.size *= 0.99;
        }
        self.particles.retain(|p| p.life > 0.0);
    }
}

impl EffectSink for ParticleSystem {
    fn spawn_effect(&mut self, kind: EffectKind, pos: Vec2) {
        let room = self.max.saturating_sub(self.particles.len());
        let b = burst(kind);
        for _ in 0..b.count.min(room) {
            let angle = self.rng.random_range(b.angle.0..=b.angle.1);
            let speed = self.rng.random_range(b.speed.0..=b.speed.1);
            self.particles.push(Particle {
                pos,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                color: b.color,
                life: 1.0,
                size: self.rng.random_range(b.size.0..=b.size.1),
                gravity: b.gravity,
                fade: b.fade,
            });
        }
    }
}

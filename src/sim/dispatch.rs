//! Collision effect dispatch
//!
//! Detection is a read-only pass that maps each touched entity to an
//! `EffectDelta`; application then folds the deltas into the state by
//! entity id. Nothing is mutated while the entity list is being scanned.

use glam::Vec2;

use super::collision::touches;
use super::events::{EffectKind, Sinks, Sound};
use super::state::{Entity, EntityKind, GameState};

/// Partial state change produced by one contact
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EffectDelta {
    pub score: u64,
    pub keys: u32,
    /// Added to speedBoost, then clamped to the tuning range
    pub boost: f32,
    pub end_run: bool,
    pub start_drowning: bool,
    pub mark_collected: bool,
}

impl EffectDelta {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// A contact found by the detection pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub delta: EffectDelta,
}

/// Effect of touching `entity` in the current state
pub fn effect_for(state: &GameState, entity: &Entity) -> EffectDelta {
    let tuning = &state.tuning;
    let collect = EffectDelta {
        mark_collected: true,
        ..Default::default()
    };

    match entity.kind {
        EntityKind::Fruit => EffectDelta {
            score: 10,
            boost: tuning.fruit_boost,
            ..collect
        },
        EntityKind::Star => EffectDelta { score: 50, ..collect },
        EntityKind::Key => EffectDelta {
            score: 25,
            keys: 1,
            ..collect
        },
        EntityKind::Mushroom => EffectDelta {
            boost: -tuning.mushroom_reduction,
            ..collect
        },
        EntityKind::Obstacle | EntityKind::HighBarrier => EffectDelta {
            end_run: true,
            ..collect
        },
        EntityKind::LowBarrier if state.horse.ducking => EffectDelta::default(),
        EntityKind::LowBarrier => EffectDelta {
            end_run: true,
            ..collect
        },
        EntityKind::WaterHole if state.horse.drowning => EffectDelta::default(),
        EntityKind::WaterHole => EffectDelta {
            start_drowning: true,
            ..Default::default()
        },
        EntityKind::Platform | EntityKind::FloatingPlatform => EffectDelta::default(),
    }
}

/// Every visible entity the horse is touching, with its effect
pub fn detect_collisions(state: &GameState) -> Vec<Hit> {
    state
        .entities
        .iter()
        .filter(|e| e.is_visible() && touches(&state.horse, e))
        .filter_map(|e| {
            let delta = effect_for(state, e);
            (!delta.is_noop()).then_some(Hit {
                id: e.id,
                kind: e.kind,
                pos: e.pos + e.size / 2.0,
                delta,
            })
        })
        .collect()
}

/// Fold hits into the state in detection order; stops at a terminal hit
pub fn apply_effects(state: &mut GameState, hits: &[Hit], sinks: &mut Sinks) {
    for hit in hits {
        let delta = hit.delta;
        state.score += delta.score;
        state.keys += delta.keys;
        if delta.boost != 0.0 {
            state.speed_boost = (state.speed_boost + delta.boost)
                .clamp(state.tuning.min_boost, state.tuning.max_boost);
        }

        if delta.mark_collected {
            if let Some(entity) = state.entities.iter_mut().find(|e| e.id == hit.id) {
                entity.collected = true;
            }
        }

        if delta.start_drowning && !state.horse.drowning {
            state.horse.drowning = true;
            state.horse.drowning_timer_ms = 0;
            state.horse.velocity_y = 0.0;
            state.horse.jumping = false;
            log::info!("Fell into water at distance {}", state.distance);
        }

        feedback(hit, sinks);

        if delta.end_run {
            state.running = false;
            log::info!("Crashed into {:?} at distance {}", hit.kind, state.distance);
            break;
        }
    }
}

fn feedback(hit: &Hit, sinks: &mut Sinks) {
    let (sound, volume, effect) = match hit.kind {
        EntityKind::Fruit => (Sound::Fruit, 0.6, EffectKind::Sparkle),
        EntityKind::Star => (Sound::Star, 0.7, EffectKind::Sparkle),
        EntityKind::Key => (Sound::Key, 0.8, EffectKind::KeyGlint),
        EntityKind::Mushroom => (Sound::Mushroom, 0.6, EffectKind::Puff),
        EntityKind::WaterHole => (Sound::Splash, 0.9, EffectKind::Splash),
        EntityKind::Obstacle | EntityKind::LowBarrier | EntityKind::HighBarrier => {
            (Sound::Crash, 1.0, EffectKind::Crash)
        }
        EntityKind::Platform | EntityKind::FloatingPlatform => return,
    };
    sinks.play(sound, volume);
    sinks.effect(effect, hit.pos);
}

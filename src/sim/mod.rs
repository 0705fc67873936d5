//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One fixed step per animation frame
//! - Seeded RNG passed in explicitly
//! - Stable iteration order (spawn order)
//! - No rendering, audio or platform dependencies (side-channels are injected)

pub mod autopilot;
pub mod collision;
pub mod dispatch;
pub mod events;
pub mod physics;
pub mod spawn;
pub mod state;
pub mod tick;

pub use autopilot::autopilot;
pub use collision::{aabb_overlap, platform_landing, platform_wall_collision};
pub use dispatch::{EffectDelta, Hit, apply_effects, detect_collisions, effect_for};
pub use events::{AudioSink, EffectKind, EffectSink, NullSink, Sinks, Sound};
pub use spawn::{COLLECTIBLE_TABLE, TERRAIN_TABLE, despawn, maybe_spawn};
pub use state::{DrawLayer, Entity, EntityKind, GameState, Horse};
pub use tick::{LoopControl, TickInput, step, tick};

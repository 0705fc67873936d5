//! Procedural spawning of collectibles and terrain
//!
//! Each cycle draws at most one collectible and one terrain piece from
//! weighted tables. Weights in a table sum to at most 1.0; the remainder is
//! the chance that the table yields nothing.

use glam::Vec2;
use rand::Rng;

use super::state::{Entity, EntityKind, GameState};
use crate::consts::*;
use crate::surface_for_level;

/// A fixed, ordered table of weighted outcomes
#[derive(Debug, Clone, Copy)]
pub struct WeightedTable<T: 'static> {
    entries: &'static [(T, f32)],
}

impl<T: Copy> WeightedTable<T> {
    pub const fn new(entries: &'static [(T, f32)]) -> Self {
        assert!(
            total_weight(entries) <= 1.0,
            "spawn table weights exceed 1.0"
        );
        Self { entries }
    }

    pub const fn total(&self) -> f32 {
        total_weight(self.entries)
    }

    /// First entry whose running weight reaches `roll`; None past the total
    pub fn pick(&self, roll: f32) -> Option<T> {
        let mut sum = 0.0;
        for &(outcome, weight) in self.entries {
            sum += weight;
            if sum >= roll {
                return Some(outcome);
            }
        }
        None
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<T> {
        self.pick(rng.random::<f32>())
    }
}

const fn total_weight<T>(entries: &[(T, f32)]) -> f32 {
    let mut sum = 0.0;
    let mut i = 0;
    while i < entries.len() {
        sum += entries[i].1;
        i += 1;
    }
    sum
}

/// Collectible outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectibleDraw {
    Fruit,
    Mushroom,
    Key,
    Star,
}

/// Terrain and obstacle outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerrainDraw {
    WaterHole,
    LowBarrier,
    HighBarrier,
    Obstacle,
    Platform { level: u32 },
    FloatingPlatform,
}

pub const COLLECTIBLE_TABLE: WeightedTable<CollectibleDraw> = WeightedTable::new(&[
    (CollectibleDraw::Fruit, 0.50),
    (CollectibleDraw::Mushroom, 0.08),
    (CollectibleDraw::Key, 0.02),
    (CollectibleDraw::Star, 0.10),
]);

pub const TERRAIN_TABLE: WeightedTable<TerrainDraw> = WeightedTable::new(&[
    (TerrainDraw::WaterHole, 0.15),
    (TerrainDraw::LowBarrier, 0.15),
    (TerrainDraw::HighBarrier, 0.12),
    (TerrainDraw::Obstacle, 0.12),
    (TerrainDraw::Platform { level: 1 }, 0.12),
    (TerrainDraw::Platform { level: 2 }, 0.10),
    (TerrainDraw::Platform { level: 3 }, 0.07),
    (TerrainDraw::FloatingPlatform, 0.12),
]);

/// Height of a collectible above the surface beneath it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightBand {
    /// Reachable while ducking
    Low,
    /// Small hop
    Mid,
    /// Full jump
    High,
}

impl HeightBand {
    /// Gap between the surface and the collectible's bottom edge
    pub fn clearance(self) -> f32 {
        match self {
            HeightBand::Low => 5.0,
            HeightBand::Mid => 60.0,
            HeightBand::High => 120.0,
        }
    }

    fn pick<R: Rng + ?Sized>(rng: &mut R, allowed: &[HeightBand]) -> HeightBand {
        allowed[rng.random_range(0..allowed.len())]
    }
}

const FRUIT_SIZE: f32 = 25.0;
const STAR_SIZE: f32 = 30.0;
const KEY_SIZE: f32 = 25.0;
const MUSHROOM_SIZE: f32 = 25.0;
const PLATFORM_WIDTHS: [f32; 3] = [300.0, 250.0, 200.0];
const FLOATING_SIZE: Vec2 = Vec2::new(180.0, 20.0);
const FLOATING_LEVEL: u32 = 3;

/// Spawn a cycle if the frontier has come close to the right edge.
///
/// Returns the number of entities appended.
pub fn maybe_spawn<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> usize {
    let rightmost = state.frontier(FRONTIER_FALLBACK);
    if rightmost >= SPAWN_TRIGGER {
        return 0;
    }

    let spacing = state.tuning.spawn_spacing(state.speed_factor);
    let spawn_x = (rightmost + spacing).max(MIN_SPAWN_X);

    let collectible = COLLECTIBLE_TABLE.draw(rng);
    let terrain = if rng.random::<f32>() < state.tuning.terrain_chance {
        TERRAIN_TABLE.draw(rng)
    } else {
        None
    };

    let mut spawned = Vec::new();
    if let Some(draw) = terrain {
        spawned.extend(generate_terrain(state, rng, draw, spawn_x));
    }
    // Collectibles sit above whatever terrain came with them
    let surface = spawned.iter().map(Entity::top).fold(GROUND_Y, f32::min);
    if let Some(draw) = collectible {
        spawned.push(generate_collectible(state, rng, draw, spawn_x, surface));
    }

    log::debug!(
        "Spawn at x={:.0}: {:?} / {:?} ({} entities)",
        spawn_x,
        collectible,
        terrain,
        spawned.len()
    );

    let count = spawned.len();
    state.entities.extend(spawned);
    count
}

/// Drop entities that have fully scrolled off the left edge
pub fn despawn(state: &mut GameState) {
    state.entities.retain(|e| e.right() >= DESPAWN_X);
}

fn generate_collectible<R: Rng + ?Sized>(
    state: &mut GameState,
    rng: &mut R,
    draw: CollectibleDraw,
    x: f32,
    surface: f32,
) -> Entity {
    use HeightBand::*;

    let (kind, size, band) = match draw {
        CollectibleDraw::Fruit => (
            EntityKind::Fruit,
            FRUIT_SIZE,
            HeightBand::pick(rng, &[Low, Mid, High]),
        ),
        CollectibleDraw::Mushroom => (
            EntityKind::Mushroom,
            MUSHROOM_SIZE,
            HeightBand::pick(rng, &[Low, Mid]),
        ),
        CollectibleDraw::Key => (EntityKind::Key, KEY_SIZE, HeightBand::pick(rng, &[Mid, High])),
        CollectibleDraw::Star => (
            EntityKind::Star,
            STAR_SIZE,
            HeightBand::pick(rng, &[Mid, High]),
        ),
    };

    let y = surface - band.clearance() - size;
    let id = state.next_entity_id();
    Entity::new(id, kind, Vec2::new(x, y), Vec2::splat(size))
}

fn generate_terrain<R: Rng + ?Sized>(
    state: &mut GameState,
    rng: &mut R,
    draw: TerrainDraw,
    x: f32,
) -> Vec<Entity> {
    match draw {
        TerrainDraw::WaterHole => {
            let id = state.next_entity_id();
            vec![Entity::new(
                id,
                EntityKind::WaterHole,
                Vec2::new(x, GROUND_Y),
                Vec2::new(80.0, VISIBLE_HEIGHT - GROUND_Y - 10.0),
            )]
        }
        TerrainDraw::LowBarrier => {
            // Bar hanging between duck height and standing height
            let id = state.next_entity_id();
            let bottom = GROUND_Y - HORSE_DUCK_HEIGHT - 10.0;
            vec![Entity::new(
                id,
                EntityKind::LowBarrier,
                Vec2::new(x, bottom - 35.0),
                Vec2::new(40.0, 35.0),
            )]
        }
        TerrainDraw::HighBarrier => {
            let id = state.next_entity_id();
            vec![Entity::new(
                id,
                EntityKind::HighBarrier,
                Vec2::new(x, GROUND_Y - 70.0),
                Vec2::new(25.0, 70.0),
            )]
        }
        TerrainDraw::Obstacle => {
            let id = state.next_entity_id();
            vec![Entity::new(
                id,
                EntityKind::Obstacle,
                Vec2::new(x, GROUND_Y - 45.0),
                Vec2::new(30.0, 45.0),
            )]
        }
        TerrainDraw::Platform { level } => {
            let tier = (level.clamp(1, 3) - 1) as usize;
            let top = surface_for_level(level);
            let id = state.next_entity_id();
            vec![Entity::platform(
                id,
                EntityKind::Platform,
                Vec2::new(x, top),
                Vec2::new(PLATFORM_WIDTHS[tier], GROUND_Y - top),
                level,
            )]
        }
        TerrainDraw::FloatingPlatform => {
            let top = surface_for_level(FLOATING_LEVEL);
            let id = state.next_entity_id();
            let mut group = vec![Entity::platform(
                id,
                EntityKind::FloatingPlatform,
                Vec2::new(x, top),
                FLOATING_SIZE,
                FLOATING_LEVEL,
            )];

            if rng.random_bool(0.5) {
                let count = rng.random_range(1..=3);
                let slot = FLOATING_SIZE.x / count as f32;
                for i in 0..count {
                    let fx = x + slot * (i as f32 + 0.5) - FRUIT_SIZE / 2.0;
                    let id = state.next_entity_id();
                    group.push(Entity::new(
                        id,
                        EntityKind::Fruit,
                        Vec2::new(fx, top - FRUIT_SIZE),
                        Vec2::splat(FRUIT_SIZE),
                    ));
                }
            }
            group
        }
    }
}

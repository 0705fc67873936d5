//! Game state and core simulation types
//!
//! All state needed to resume or replay a run lives here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::surface_for_level;
use crate::tuning::Tuning;

/// The player-controlled horse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Horse {
    /// Top-left corner (x stays at HORSE_X)
    pub pos: Vec2,
    /// Vertical velocity (positive = falling)
    pub velocity_y: f32,
    pub ducking: bool,
    pub jumping: bool,
    /// World scroll is halted
    pub blocked: bool,
    pub drowning: bool,
    /// Milliseconds spent drowning
    pub drowning_timer_ms: u32,
    /// Tier the horse rests on (0 = ground)
    pub platform_level: u32,
}

impl Default for Horse {
    fn default() -> Self {
        Self {
            pos: Vec2::new(HORSE_X, GROUND_Y - HORSE_STAND_HEIGHT),
            velocity_y: 0.0,
            ducking: false,
            jumping: false,
            blocked: false,
            drowning: false,
            drowning_timer_ms: 0,
            platform_level: 0,
        }
    }
}

impl Horse {
    /// Current height (ducking shrinks the box)
    pub fn height(&self) -> f32 {
        if self.ducking {
            HORSE_DUCK_HEIGHT
        } else {
            HORSE_STAND_HEIGHT
        }
    }

    pub fn width(&self) -> f32 {
        HORSE_WIDTH
    }

    pub fn left(&self) -> f32 {
        self.pos.x
    }

    /// Leading edge
    pub fn right(&self) -> f32 {
        self.pos.x + HORSE_WIDTH
    }

    pub fn top(&self) -> f32 {
        self.pos.y
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.height()
    }

    /// Resting on the surface of its current platform level (within tolerance)
    pub fn is_on_surface(&self) -> bool {
        (self.bottom() - surface_for_level(self.platform_level)).abs() <= JUMP_TOLERANCE
    }

    /// Change duck state while keeping the bottom edge where it is
    pub fn set_ducking(&mut self, ducking: bool) {
        if self.ducking == ducking {
            return;
        }
        let bottom = self.bottom();
        self.ducking = ducking;
        self.pos.y = bottom - self.height();
    }
}

/// Entity type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Fruit,
    Star,
    Key,
    Mushroom,
    /// Lethal wall on the ground
    Obstacle,
    /// Hanging bar - duck under
    LowBarrier,
    /// Tall barrier - jump over
    HighBarrier,
    /// Pit - sink then end the run
    WaterHole,
    /// Rideable block standing on the ground
    Platform,
    /// Rideable slab that can be walked under
    FloatingPlatform,
}

/// Which side of the horse an entity is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawLayer {
    Background,
    Foreground,
}

impl EntityKind {
    pub fn is_collectible(self) -> bool {
        matches!(
            self,
            EntityKind::Fruit | EntityKind::Star | EntityKind::Key | EntityKind::Mushroom
        )
    }

    /// Terrain is never marked collected; it stays until it scrolls away
    pub fn is_terrain(self) -> bool {
        matches!(
            self,
            EntityKind::Platform | EntityKind::FloatingPlatform | EntityKind::WaterHole
        )
    }

    pub fn draw_layer(self) -> DrawLayer {
        if self.is_collectible() {
            DrawLayer::Foreground
        } else {
            DrawLayer::Background
        }
    }
}

/// A spawned obstacle, terrain piece or collectible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable id (spawn order)
    pub id: u32,
    pub kind: EntityKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    #[serde(default)]
    pub collected: bool,
    /// Present exactly on rideable terrain
    #[serde(default)]
    platform_level: Option<u32>,
}

impl Entity {
    /// A non-rideable entity
    pub fn new(id: u32, kind: EntityKind, pos: Vec2, size: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            size,
            collected: false,
            platform_level: None,
        }
    }

    /// A rideable platform resting at `level`
    pub fn platform(id: u32, kind: EntityKind, pos: Vec2, size: Vec2, level: u32) -> Self {
        debug_assert!(!kind.is_collectible(), "collectibles are never rideable");
        Self {
            platform_level: Some(level),
            ..Self::new(id, kind, pos, size)
        }
    }

    pub fn is_rideable(&self) -> bool {
        self.platform_level.is_some()
    }

    pub fn platform_level(&self) -> Option<u32> {
        self.platform_level
    }

    pub fn is_floating(&self) -> bool {
        self.kind == EntityKind::FloatingPlatform
    }

    pub fn left(&self) -> f32 {
        self.pos.x
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    pub fn top(&self) -> f32 {
        self.pos.y
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// On screen and still eligible for collision effects
    pub fn is_visible(&self) -> bool {
        !self.collected && self.left() < VISIBLE_WIDTH && self.right() > 0.0
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub horse: Horse,
    /// Active entities in spawn order
    pub entities: Vec<Entity>,
    /// Current scroll speed (units per frame)
    pub speed: f32,
    pub base_speed: f32,
    /// Signed transient modifier from fruit (+) and mushrooms (-)
    pub speed_boost: f32,
    /// Distance-derived difficulty multiplier
    pub speed_factor: f32,
    pub score: u64,
    pub distance: u64,
    pub keys: u32,
    pub started: bool,
    pub running: bool,
    pub paused: bool,
    /// Simulated frames
    pub frames: u64,
    #[serde(default)]
    pub tuning: Tuning,
    /// Next entity ID
    next_id: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}

impl GameState {
    /// Fresh run waiting for `start`
    pub fn new(tuning: Tuning) -> Self {
        Self {
            horse: Horse::default(),
            entities: Vec::new(),
            speed: tuning.base_speed,
            base_speed: tuning.base_speed,
            speed_boost: 0.0,
            speed_factor: 1.0,
            score: 0,
            distance: 0,
            keys: 0,
            started: false,
            running: false,
            paused: false,
            frames: 0,
            tuning,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Rightmost entity x, or `fallback` when nothing is active
    pub fn frontier(&self, fallback: f32) -> f32 {
        self.entities
            .iter()
            .map(|e| e.pos.x)
            .fold(fallback, f32::max)
    }

    /// Whether the simulation advances this frame
    pub fn is_live(&self) -> bool {
        self.started && self.running && !self.paused
    }

    pub fn entity(&self, id: u32) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horse_spawns_on_ground() {
        let horse = Horse::default();
        assert_eq!(horse.bottom(), GROUND_Y);
        assert!(horse.is_on_surface());
        assert_eq!(horse.platform_level, 0);
    }

    #[test]
    fn test_ducking_keeps_bottom_edge() {
        let mut horse = Horse::default();
        horse.set_ducking(true);
        assert_eq!(horse.height(), HORSE_DUCK_HEIGHT);
        assert_eq!(horse.bottom(), GROUND_Y);
        horse.set_ducking(false);
        assert_eq!(horse.pos.y, GROUND_Y - HORSE_STAND_HEIGHT);
    }

    #[test]
    fn test_rideable_carries_level() {
        let p = Entity::platform(1, EntityKind::Platform, Vec2::ZERO, Vec2::ONE, 2);
        assert!(p.is_rideable());
        assert_eq!(p.platform_level(), Some(2));

        let fruit = Entity::new(2, EntityKind::Fruit, Vec2::ZERO, Vec2::ONE);
        assert!(!fruit.is_rideable());
        assert_eq!(fruit.kind.draw_layer(), DrawLayer::Foreground);
        assert_eq!(p.kind.draw_layer(), DrawLayer::Background);
    }

    #[test]
    fn test_frontier() {
        let mut state = GameState::default();
        assert_eq!(state.frontier(300.0), 300.0);
        let id = state.next_entity_id();
        state
            .entities
            .push(Entity::new(id, EntityKind::Star, Vec2::new(900.0, 0.0), Vec2::ONE));
        assert_eq!(state.frontier(300.0), 900.0);
    }

    #[test]
    fn test_new_state_is_idle() {
        let state = GameState::default();
        assert!(!state.started);
        assert!(!state.running);
        assert!(!state.is_live());
        assert_eq!(state.speed, state.base_speed);
    }
}

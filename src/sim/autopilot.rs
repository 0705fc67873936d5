//! Idle/demo mode controller
//!
//! Looks at the nearest hazard ahead and produces the intents a player
//! would: jump pits, walls and barriers, duck hanging bars, and jump again
//! when stuck against a platform.

use super::state::{Entity, EntityKind, GameState};
use super::tick::TickInput;
use crate::consts::*;

/// Frames of warning per speed unit before a hazard reaches the horse
const LOOK_AHEAD_FRAMES: f32 = 12.0;

/// Intents for the current frame
pub fn autopilot(state: &GameState) -> TickInput {
    let horse = &state.horse;
    let mut input = TickInput::default();

    if horse.blocked && !horse.drowning {
        input.jump = true;
        return input;
    }

    let reach = 40.0 + state.speed * LOOK_AHEAD_FRAMES;
    let hazard = state
        .entities
        .iter()
        .filter(|e| !e.collected && is_hazard(state, e))
        .filter(|e| e.right() > horse.left() && e.left() - horse.right() < reach)
        .min_by(|a, b| a.left().total_cmp(&b.left()));

    let Some(hazard) = hazard else {
        input.stop_duck = horse.ducking;
        return input;
    };

    let gap = hazard.left() - horse.right();
    match hazard.kind {
        EntityKind::LowBarrier => input.start_duck = !horse.ducking,
        EntityKind::Platform | EntityKind::FloatingPlatform => {
            let level = hazard.platform_level().unwrap_or(1) as f32;
            input.stop_duck = horse.ducking;
            input.jump = gap <= state.speed * (6.0 + 3.0 * level);
        }
        _ => {
            input.stop_duck = horse.ducking;
            input.jump = gap <= state.speed * 6.0 + 10.0;
        }
    }
    input
}

/// Things that need an action to get past
fn is_hazard(state: &GameState, entity: &Entity) -> bool {
    match entity.kind {
        EntityKind::Obstacle
        | EntityKind::LowBarrier
        | EntityKind::HighBarrier
        | EntityKind::WaterHole => true,
        // Only platforms whose top is above the horse's feet get in the way
        EntityKind::Platform => entity.top() + WALL_BUFFER < state.horse.bottom(),
        EntityKind::FloatingPlatform => {
            let bottom = state.horse.bottom();
            entity.top() + WALL_BUFFER < bottom && bottom <= entity.top() + FLOATING_GATE
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn with_entity(kind: EntityKind, x: f32, y: f32, size: Vec2) -> GameState {
        let mut state = GameState::default();
        state.started = true;
        state.running = true;
        let id = state.next_entity_id();
        state.entities.push(Entity::new(id, kind, Vec2::new(x, y), size));
        state
    }

    #[test]
    fn test_jumps_close_obstacle() {
        let state = with_entity(
            EntityKind::Obstacle,
            HORSE_X + HORSE_WIDTH + 20.0,
            GROUND_Y - 45.0,
            Vec2::new(30.0, 45.0),
        );
        assert!(autopilot(&state).jump);
    }

    #[test]
    fn test_waits_for_distant_obstacle() {
        let state = with_entity(
            EntityKind::Obstacle,
            HORSE_X + HORSE_WIDTH + 55.0,
            GROUND_Y - 45.0,
            Vec2::new(30.0, 45.0),
        );
        assert!(!autopilot(&state).jump);
    }

    #[test]
    fn test_ducks_low_barrier() {
        let state = with_entity(
            EntityKind::LowBarrier,
            HORSE_X + HORSE_WIDTH + 20.0,
            GROUND_Y - 75.0,
            Vec2::new(40.0, 35.0),
        );
        let input = autopilot(&state);
        assert!(input.start_duck);
        assert!(!input.jump);
    }

    #[test]
    fn test_stands_up_when_clear() {
        let mut state = GameState::default();
        state.horse.set_ducking(true);
        assert!(autopilot(&state).stop_duck);
    }

    #[test]
    fn test_jumps_when_blocked() {
        let mut state = GameState::default();
        state.horse.blocked = true;
        assert!(autopilot(&state).jump);
    }

    #[test]
    fn test_ignores_collectibles() {
        let state = with_entity(
            EntityKind::Fruit,
            HORSE_X + HORSE_WIDTH + 5.0,
            GROUND_Y - 30.0,
            Vec2::splat(25.0),
        );
        assert_eq!(autopilot(&state), TickInput::default());
    }
}

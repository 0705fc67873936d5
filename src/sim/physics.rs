//! Per-frame physics and state resolution
//!
//! Steps run in a fixed order and later steps may override earlier ones:
//! gravity, platforms, block clearing, drowning, ground, difficulty,
//! speed decay, world shift, distance.

use glam::Vec2;

use super::collision::{platform_landing, platform_wall_collision};
use super::events::{EffectKind, Sinks, Sound};
use super::state::GameState;
use crate::consts::*;

/// Run every resolver step for one frame
pub fn resolve(state: &mut GameState, sinks: &mut Sinks) {
    let was_blocked = state.horse.blocked;

    integrate_gravity(state);
    let (landed, wall_hit) = resolve_platforms(state, was_blocked, sinks);
    if was_blocked && !wall_hit && !state.horse.drowning {
        state.horse.blocked = false;
        log::debug!("Wall block cleared");
    }
    advance_drowning(state);
    if !landed && !state.horse.drowning {
        resolve_ground(state, sinks);
    }
    update_speed_factor(state);
    if !state.horse.blocked {
        decay_speed(state);
        shift_world(state);
        state.distance += (state.speed / 2.0).floor() as u64;
    }
}

/// Step 1: velocity and position (skipped while drowning)
fn integrate_gravity(state: &mut GameState) {
    let horse = &mut state.horse;
    if horse.drowning {
        return;
    }
    horse.velocity_y = (horse.velocity_y + GRAVITY).min(TERMINAL_VELOCITY);
    horse.pos.y += horse.velocity_y;
}

/// Step 2: landings and wall hits against rideable terrain.
///
/// Returns (landed, wall_hit).
fn resolve_platforms(state: &mut GameState, was_blocked: bool, sinks: &mut Sinks) -> (bool, bool) {
    let mut landed = false;
    let mut wall_hit = false;

    for platform in state.entities.iter().filter(|e| e.is_rideable()) {
        let Some(level) = platform.platform_level() else {
            continue;
        };
        let horse = &mut state.horse;

        if !horse.drowning && platform_landing(horse, platform) {
            horse.pos.y = platform.top() - horse.height();
            horse.velocity_y = 0.0;
            horse.jumping = false;
            if horse.platform_level != level {
                horse.platform_level = level;
                sinks.play(Sound::Land, 0.5);
                sinks.effect(EffectKind::Dust, horse.pos + Vec2::new(horse.width() / 2.0, horse.height()));
            }
            landed = true;
        }

        if platform_wall_collision(horse, platform) {
            wall_hit = true;
        }
    }

    if wall_hit {
        if !was_blocked {
            let tuning = state.tuning;
            state.speed = (state.speed * tuning.wall_penalty).max(tuning.min_speed);
            sinks.play(Sound::WallHit, 0.8);
            sinks.effect(EffectKind::Impact, state.horse.pos + Vec2::new(state.horse.width(), 0.0));
            log::debug!("Blocked by platform wall, speed now {:.2}", state.speed);
        }
        state.horse.blocked = true;
    }

    (landed, wall_hit)
}

/// Step 4: timed sink into a water hole, ending the run when it completes
fn advance_drowning(state: &mut GameState) {
    if !state.horse.drowning {
        return;
    }
    let tuning = state.tuning;
    let horse = &mut state.horse;

    horse.drowning_timer_ms += FRAME_MS;
    if horse.drowning_timer_ms > tuning.drown_block_delay_ms {
        horse.blocked = true;
    }

    let duration = tuning.drown_duration_ms.max(1);
    let progress = (horse.drowning_timer_ms as f32 / duration as f32).min(1.0);
    horse.pos.y = GROUND_Y - horse.height() + tuning.drown_sink_distance * progress;

    if horse.drowning_timer_ms >= duration {
        state.running = false;
        log::info!("Drowned after {} ms", horse.drowning_timer_ms);
    }
}

/// Step 5: clamp to the ground surface
fn resolve_ground(state: &mut GameState, sinks: &mut Sinks) {
    let horse = &mut state.horse;
    let ground = GROUND_Y - horse.height();
    if horse.pos.y < ground {
        return;
    }
    let touched_down = horse.jumping || horse.platform_level != 0;
    horse.pos.y = ground;
    horse.velocity_y = 0.0;
    horse.jumping = false;
    horse.platform_level = 0;
    if touched_down {
        sinks.play(Sound::Land, 0.4);
        sinks.effect(EffectKind::Dust, horse.pos + Vec2::new(horse.width() / 2.0, horse.height()));
    }
}

/// Step 6: distance-driven difficulty, saturating
fn update_speed_factor(state: &mut GameState) {
    let tuning = state.tuning;
    let factor = 1.0 + state.distance as f32 * tuning.speed_factor_rate;
    state.speed_factor = factor.min(tuning.max_speed_factor).max(state.speed_factor);
}

/// Step 7: boosts decay toward zero and speed follows
fn decay_speed(state: &mut GameState) {
    let tuning = state.tuning;
    let base = state.base_speed;
    let factor = state.speed_factor;

    if state.speed_boost > 0.0 {
        state.speed_boost = (state.speed_boost - tuning.boost_decay).max(0.0);
        state.speed = (base + state.speed_boost * 0.8) * factor;
    } else if state.speed_boost < 0.0 {
        state.speed_boost = (state.speed_boost + tuning.boost_recovery).min(0.0);
        state.speed = ((base + state.speed_boost) * factor).max(base * 0.6);
    } else {
        state.speed = (state.speed - tuning.natural_decay).max(base * 0.8);
        if state.speed <= base {
            state.speed = base * factor;
        }
    }

    state.speed = state.speed.max(tuning.min_speed);
}

/// Step 8: scroll the world left
fn shift_world(state: &mut GameState) {
    let speed = state.speed;
    for entity in &mut state.entities {
        entity.pos.x -= speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::Recorder;
    use crate::sim::state::{Entity, EntityKind};
    use crate::surface_for_level;

    fn run(state: &mut GameState) -> (Recorder, Recorder) {
        let mut audio = Recorder::default();
        let mut fx = Recorder::default();
        resolve(state, &mut Sinks::new(&mut audio, &mut fx));
        (audio, fx)
    }

    fn live_state() -> GameState {
        let mut state = GameState::default();
        state.started = true;
        state.running = true;
        state
    }

    fn add_platform(state: &mut GameState, x: f32, level: u32, width: f32) -> u32 {
        let top = surface_for_level(level);
        let id = state.next_entity_id();
        state.entities.push(Entity::platform(
            id,
            EntityKind::Platform,
            Vec2::new(x, top),
            Vec2::new(width, GROUND_Y - top),
            level,
        ));
        id
    }

    #[test]
    fn test_resting_on_ground_is_stable() {
        let mut state = live_state();
        for _ in 0..10 {
            run(&mut state);
        }
        assert_eq!(state.horse.bottom(), GROUND_Y);
        assert_eq!(state.horse.velocity_y, 0.0);
        assert!(!state.horse.jumping);
    }

    #[test]
    fn test_jump_arc_returns_to_ground() {
        let mut state = live_state();
        state.horse.velocity_y = JUMP_VELOCITY;
        state.horse.jumping = true;
        let mut peak = GROUND_Y;
        let mut landed_sound = false;
        for _ in 0..100 {
            let (audio, _) = run(&mut state);
            peak = peak.min(state.horse.bottom());
            landed_sound |= audio.sounds.contains(&Sound::Land);
        }
        assert!(peak < GROUND_Y - 120.0);
        assert_eq!(state.horse.bottom(), GROUND_Y);
        assert!(!state.horse.jumping);
        assert!(landed_sound);
    }

    #[test]
    fn test_falling_lands_on_platform() {
        let mut state = live_state();
        add_platform(&mut state, HORSE_X - 50.0, 1, 300.0);
        let top = surface_for_level(1);
        state.horse.pos.y = top - 10.0 - state.horse.height();
        state.horse.velocity_y = 4.0;
        state.horse.jumping = true;

        let (audio, fx) = run(&mut state);
        assert_eq!(state.horse.platform_level, 1);
        assert_eq!(state.horse.velocity_y, 0.0);
        assert_eq!(state.horse.bottom(), top);
        assert!(!state.horse.jumping);
        assert_eq!(audio.sounds, vec![Sound::Land]);
        assert_eq!(fx.effects, vec![EffectKind::Dust]);

        // Resting there does not re-fire the landing event
        let (audio, _) = run(&mut state);
        assert!(audio.sounds.is_empty());
        assert_eq!(state.horse.bottom(), top);
    }

    #[test]
    fn test_ascending_passes_through_platform_top() {
        let mut state = live_state();
        add_platform(&mut state, HORSE_X - 50.0, 1, 300.0);
        let top = surface_for_level(1);
        state.horse.pos.y = top + 3.0 - state.horse.height();
        state.horse.velocity_y = -8.0;
        state.horse.jumping = true;

        run(&mut state);
        assert_eq!(state.horse.platform_level, 0);
        assert!(state.horse.velocity_y < 0.0);
    }

    #[test]
    fn test_wall_block_penalty_and_recovery() {
        let mut state = live_state();
        state.speed = 6.0;
        let id = add_platform(&mut state, HORSE_X + HORSE_WIDTH - 5.0, 2, 250.0);

        let (audio, fx) = run(&mut state);
        assert!(state.horse.blocked);
        assert!((state.speed - 6.0 * 0.7).abs() < 1e-4);
        assert_eq!(audio.sounds, vec![Sound::WallHit]);
        assert_eq!(fx.effects, vec![EffectKind::Impact]);

        // Staying blocked: no further penalty, world frozen
        let x_before = state.entity(id).map(|e| e.pos.x);
        let distance_before = state.distance;
        run(&mut state);
        assert!(state.horse.blocked);
        assert!((state.speed - 6.0 * 0.7).abs() < 1e-4);
        assert_eq!(state.entity(id).map(|e| e.pos.x), x_before);
        assert_eq!(state.distance, distance_before);

        // Platform gone: block clears next frame
        state.entities.clear();
        run(&mut state);
        assert!(!state.horse.blocked);
    }

    #[test]
    fn test_wall_penalty_floored_at_min_speed() {
        let mut state = live_state();
        state.speed = 2.5;
        add_platform(&mut state, HORSE_X + HORSE_WIDTH - 5.0, 1, 300.0);
        run(&mut state);
        assert_eq!(state.speed, state.tuning.min_speed);
    }

    #[test]
    fn test_drowning_sinks_then_ends_run() {
        let mut state = live_state();
        state.horse.drowning = true;
        let tuning = state.tuning;
        let frames = tuning.drown_duration_ms / FRAME_MS;

        for frame in 1..frames {
            run(&mut state);
            assert!(state.running, "ended early at frame {}", frame);
            if frame * FRAME_MS > tuning.drown_block_delay_ms {
                assert!(state.horse.blocked);
            }
        }
        run(&mut state);
        assert!(!state.running);
        let sunk = state.horse.pos.y - (GROUND_Y - HORSE_STAND_HEIGHT);
        assert!((sunk - tuning.drown_sink_distance).abs() < 1e-3);
    }

    #[test]
    fn test_positive_boost_decays() {
        let mut state = live_state();
        state.speed_boost = 1.0;
        run(&mut state);
        let expected_boost = 1.0 - state.tuning.boost_decay;
        assert!((state.speed_boost - expected_boost).abs() < 1e-5);
        let expected_speed = state.base_speed + expected_boost * 0.8;
        assert!((state.speed - expected_speed).abs() < 1e-4);
    }

    #[test]
    fn test_negative_boost_recovers_with_floor() {
        let mut state = live_state();
        state.speed_boost = state.tuning.min_boost;
        run(&mut state);
        assert!(state.speed_boost > state.tuning.min_boost);
        assert!(state.speed >= state.base_speed * 0.6);
    }

    #[test]
    fn test_natural_decay_above_base() {
        let mut state = live_state();
        state.distance = 10_000;
        state.speed_factor = 1.5;
        state.speed = 7.5;
        run(&mut state);
        let expected = 7.5 - state.tuning.natural_decay;
        assert!((state.speed - expected).abs() < 1e-5, "speed {}", state.speed);
    }

    #[test]
    fn test_natural_decay_snaps_to_cruise_at_base() {
        let mut state = live_state();
        state.distance = 10_000;
        run(&mut state);
        // Started at base speed, so it snaps straight onto the curve
        assert!(state.speed_factor > 1.0);
        let cruise = state.base_speed * state.speed_factor;
        assert!((state.speed - cruise).abs() < 1e-5);

        // Then decays from there without snapping again
        let before = state.speed;
        run(&mut state);
        assert!((state.speed - (before - state.tuning.natural_decay)).abs() < 1e-5);
    }

    #[test]
    fn test_natural_decay_floor_at_factor_one() {
        let mut state = live_state();
        state.speed = state.base_speed + 0.02;
        run(&mut state);
        assert_eq!(state.speed_factor, 1.0);
        assert_eq!(state.speed, state.base_speed);
    }

    #[test]
    fn test_speed_factor_caps() {
        let mut state = live_state();
        state.distance = u32::MAX as u64;
        run(&mut state);
        assert_eq!(state.speed_factor, state.tuning.max_speed_factor);
    }

    #[test]
    fn test_world_shift_and_distance() {
        let mut state = live_state();
        let id = state.next_entity_id();
        state.entities.push(Entity::new(
            id,
            EntityKind::Star,
            Vec2::new(500.0, 100.0),
            Vec2::splat(30.0),
        ));
        run(&mut state);
        let speed = state.speed;
        assert_eq!(state.entities[0].pos.x, 500.0 - speed);
        assert_eq!(state.distance, (speed / 2.0).floor() as u64);
    }
}

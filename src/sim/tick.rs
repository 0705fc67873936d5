//! Per-frame simulation step
//!
//! Sequences intents, physics, spawning, collision detection and effect
//! application once per animation frame, and tells the caller whether to
//! schedule another frame.

use rand::Rng;

use super::autopilot::autopilot;
use super::dispatch::{apply_effects, detect_collisions};
use super::events::{Sinks, Sound};
use super::physics::resolve;
use super::spawn::{despawn, maybe_spawn};
use super::state::GameState;
use crate::consts::*;

/// Intents for a single frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    pub jump: bool,
    pub start_duck: bool,
    pub stop_duck: bool,
    /// Pause toggle
    pub toggle_pause: bool,
    /// Begin the run (ignored once started)
    pub start: bool,
    /// Idle/demo mode - autopilot plays the game
    pub idle_mode: bool,
}

impl TickInput {
    /// Combine two intent sets (either side requesting counts)
    pub fn merge(&self, other: &TickInput) -> TickInput {
        TickInput {
            jump: self.jump || other.jump,
            start_duck: self.start_duck || other.start_duck,
            stop_duck: self.stop_duck || other.stop_duck,
            toggle_pause: self.toggle_pause || other.toggle_pause,
            start: self.start || other.start,
            idle_mode: self.idle_mode || other.idle_mode,
        }
    }
}

/// Whether the caller should schedule another frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Halt,
}

/// Advance the game state by one animation frame
pub fn tick<R: Rng + ?Sized>(
    state: &mut GameState,
    input: &TickInput,
    rng: &mut R,
    sinks: &mut Sinks,
) -> LoopControl {
    let input = if input.idle_mode && state.is_live() {
        input.merge(&autopilot(state))
    } else {
        input.clone()
    };

    apply_intents(state, &input, sinks);

    if !state.is_live() {
        return loop_control(state);
    }

    state.frames += 1;
    resolve(state, sinks);

    if state.running {
        maybe_spawn(state, rng);
        despawn(state);
        let hits = detect_collisions(state);
        apply_effects(state, &hits, sinks);
    }

    if !state.running {
        sinks.audio.stop_music();
        sinks.play(Sound::GameOver, 0.8);
        log::info!(
            "Game over: score {}, distance {}, keys {} ({} frames)",
            state.score,
            state.distance,
            state.keys,
            state.frames
        );
    }

    loop_control(state)
}

/// Pure form of `tick`: returns the next state and leaves `state` untouched
pub fn step<R: Rng + ?Sized>(
    state: &GameState,
    input: &TickInput,
    rng: &mut R,
    sinks: &mut Sinks,
) -> (GameState, LoopControl) {
    let mut next = state.clone();
    let control = tick(&mut next, input, rng, sinks);
    (next, control)
}

fn loop_control(state: &GameState) -> LoopControl {
    if state.running && !state.paused {
        LoopControl::Continue
    } else {
        LoopControl::Halt
    }
}

/// Apply intents whose preconditions hold; everything else is ignored
fn apply_intents(state: &mut GameState, input: &TickInput, sinks: &mut Sinks) {
    if input.start && !state.started {
        state.started = true;
        state.running = true;
        state.paused = false;
        sinks.audio.start_music();
        log::info!("Run started");
    }

    if input.toggle_pause && state.started && state.running {
        state.paused = !state.paused;
        if state.paused {
            sinks.audio.stop_music();
            log::info!("Paused at distance {}", state.distance);
        } else {
            sinks.audio.start_music();
            log::info!("Resumed");
        }
    }

    if !state.is_live() {
        return;
    }

    let horse = &mut state.horse;
    if input.stop_duck {
        horse.set_ducking(false);
    }
    if input.start_duck && !horse.jumping && !horse.drowning {
        horse.set_ducking(true);
    }
    if input.jump && !horse.jumping && !horse.drowning && horse.is_on_surface() {
        horse.set_ducking(false);
        horse.velocity_y = JUMP_VELOCITY;
        horse.jumping = true;
        sinks.play(Sound::Jump, 0.6);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::{NullSink, Recorder};
    use crate::sim::state::{Entity, EntityKind};
    use glam::Vec2;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn run_frame(state: &mut GameState, input: &TickInput, rng: &mut Pcg32) -> LoopControl {
        let mut audio = NullSink;
        let mut fx = NullSink;
        tick(state, input, rng, &mut Sinks::new(&mut audio, &mut fx))
    }

    fn started(rng: &mut Pcg32) -> GameState {
        let mut state = GameState::default();
        let start = TickInput {
            start: true,
            ..Default::default()
        };
        run_frame(&mut state, &start, rng);
        state
    }

    #[test]
    fn test_idle_until_started() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = GameState::default();
        let control = run_frame(&mut state, &TickInput::default(), &mut rng);
        assert_eq!(control, LoopControl::Halt);
        assert_eq!(state.frames, 0);
        assert!(state.entities.is_empty());

        let mut audio = Recorder::default();
        let mut fx = Recorder::default();
        let start = TickInput {
            start: true,
            ..Default::default()
        };
        let control = tick(&mut state, &start, &mut rng, &mut Sinks::new(&mut audio, &mut fx));
        assert_eq!(control, LoopControl::Continue);
        assert!(state.started && state.running);
        assert!(audio.music_on);
        assert_eq!(state.frames, 1);
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut state = started(&mut rng);
        for _ in 0..30 {
            run_frame(&mut state, &TickInput::default(), &mut rng);
        }

        let pause = TickInput {
            toggle_pause: true,
            ..Default::default()
        };
        assert_eq!(run_frame(&mut state, &pause, &mut rng), LoopControl::Halt);
        assert!(state.paused);

        let frozen = state.clone();
        let jump = TickInput {
            jump: true,
            start_duck: true,
            ..Default::default()
        };
        for _ in 0..10 {
            run_frame(&mut state, &jump, &mut rng);
        }
        assert_eq!(state, frozen);

        assert_eq!(run_frame(&mut state, &pause, &mut rng), LoopControl::Continue);
        assert!(!state.paused);
        assert_eq!(state.frames, frozen.frames + 1);
    }

    #[test]
    fn test_jump_only_from_surface() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut state = started(&mut rng);
        state.entities.clear();
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };

        run_frame(&mut state, &jump, &mut rng);
        assert!(state.horse.jumping);
        let velocity = state.horse.velocity_y;

        // Mid-air jump is ignored
        run_frame(&mut state, &jump, &mut rng);
        assert!((state.horse.velocity_y - (velocity + GRAVITY)).abs() < 1e-5);
    }

    #[test]
    fn test_jump_clears_duck_and_duck_ignored_midair() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut state = started(&mut rng);
        let duck = TickInput {
            start_duck: true,
            ..Default::default()
        };
        run_frame(&mut state, &duck, &mut rng);
        assert!(state.horse.ducking);
        assert_eq!(state.horse.bottom(), GROUND_Y);

        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        run_frame(&mut state, &jump, &mut rng);
        assert!(state.horse.jumping);
        assert!(!state.horse.ducking);

        run_frame(&mut state, &duck, &mut rng);
        assert!(!state.horse.ducking);
    }

    #[test]
    fn test_crash_halts_and_stays_terminal() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut state = started(&mut rng);
        let id = state.next_entity_id();
        state.entities.push(Entity::new(
            id,
            EntityKind::Obstacle,
            Vec2::new(HORSE_X + 20.0, GROUND_Y - 45.0),
            Vec2::new(30.0, 45.0),
        ));

        let mut audio = Recorder::default();
        let mut fx = Recorder::default();
        let control = tick(
            &mut state,
            &TickInput::default(),
            &mut rng,
            &mut Sinks::new(&mut audio, &mut fx),
        );
        assert_eq!(control, LoopControl::Halt);
        assert!(!state.running);
        assert!(audio.sounds.contains(&Sound::GameOver));

        // Terminal: nothing advances, start does not revive it
        let ended = state.clone();
        let start = TickInput {
            start: true,
            toggle_pause: true,
            ..Default::default()
        };
        run_frame(&mut state, &start, &mut rng);
        assert_eq!(state, ended);
    }

    #[test]
    fn test_drowning_timeline_from_contact() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut state = started(&mut rng);
        state.entities.clear();
        let id = state.next_entity_id();
        state.entities.push(Entity::new(
            id,
            EntityKind::WaterHole,
            Vec2::new(HORSE_X + 10.0, GROUND_Y),
            Vec2::new(80.0, 40.0),
        ));

        // Contact frame
        while !state.horse.drowning {
            run_frame(&mut state, &TickInput::default(), &mut rng);
            assert!(state.running);
        }

        let frames = state.tuning.drown_duration_ms / FRAME_MS;
        for _ in 1..frames {
            run_frame(&mut state, &TickInput::default(), &mut rng);
            assert!(state.running);
        }
        assert_eq!(run_frame(&mut state, &TickInput::default(), &mut rng), LoopControl::Halt);
        assert!(!state.running);
    }

    #[test]
    fn test_step_is_pure_and_deterministic() {
        let mut rng1 = Pcg32::seed_from_u64(99);
        let mut rng2 = Pcg32::seed_from_u64(99);
        let state = started(&mut Pcg32::seed_from_u64(0));
        let mut audio = NullSink;
        let mut fx = NullSink;

        let mut a = state.clone();
        let mut b = state.clone();
        for _ in 0..300 {
            let (next, _) = step(&a, &TickInput::default(), &mut rng1, &mut Sinks::new(&mut audio, &mut fx));
            a = next;
            let (next, _) = step(&b, &TickInput::default(), &mut rng2, &mut Sinks::new(&mut audio, &mut fx));
            b = next;
        }
        assert_eq!(a, b);
        assert_eq!(state.frames, 1);
    }

    fn arb_input() -> impl Strategy<Value = TickInput> {
        (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(jump, start_duck, stop_duck)| {
            TickInput {
                jump,
                start_duck,
                stop_duck,
                ..Default::default()
            }
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_run_invariants(seed in any::<u64>(), inputs in prop::collection::vec(arb_input(), 1..400)) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut state = started(&mut rng);

            for input in &inputs {
                let before = state.clone();
                run_frame(&mut state, input, &mut rng);

                prop_assert!(state.score >= before.score);
                prop_assert!(state.distance >= before.distance);
                prop_assert!(state.speed_factor >= before.speed_factor);
                prop_assert!(state.speed_factor <= state.tuning.max_speed_factor);
                prop_assert!(state.speed_boost >= state.tuning.min_boost);
                prop_assert!(state.speed_boost <= state.tuning.max_boost);
                prop_assert!(state.speed >= state.tuning.min_speed);
                prop_assert!(!(state.horse.ducking && state.horse.jumping));

                if state.horse.blocked {
                    prop_assert_eq!(state.distance, before.distance);
                    for e in &state.entities {
                        if let Some(old) = before.entity(e.id) {
                            prop_assert_eq!(e.pos.x, old.pos.x);
                        }
                    }
                }

                // Collected entities never uncollect
                for old in before.entities.iter().filter(|e| e.collected) {
                    if let Some(e) = state.entity(old.id) {
                        prop_assert!(e.collected);
                    }
                }

                if !state.running {
                    break;
                }
            }
        }
    }
}

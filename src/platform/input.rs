//! Keyboard and touch mapping
//!
//! Browser events are translated into `Intent`s and buffered until the next
//! frame, where they are drained into a `TickInput`. Nothing here touches
//! the DOM so the mapping can be tested natively.

use crate::sim::TickInput;

/// A player request decoded from one input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Jump, or start the run if it hasn't begun
    Jump,
    DuckDown,
    DuckUp,
    Pause,
    /// New run after game over
    Restart,
    ToggleIdle,
    ToggleMute,
    /// Particle effects full, reduced, off
    CycleParticles,
}

/// Intent for a `KeyboardEvent.code` being pressed
pub fn key_down(code: &str, repeat: bool) -> Option<Intent> {
    let intent = match code {
        "Space" | "ArrowUp" | "KeyW" => Intent::Jump,
        "ArrowDown" | "KeyS" => Intent::DuckDown,
        "KeyP" | "Escape" => Intent::Pause,
        "KeyR" | "Enter" => Intent::Restart,
        "KeyI" => Intent::ToggleIdle,
        "KeyM" => Intent::ToggleMute,
        "KeyV" => Intent::CycleParticles,
        _ => return None,
    };
    // Held keys repeat; only ducking tolerates that
    (!repeat || intent == Intent::DuckDown).then_some(intent)
}

/// Intent for a `KeyboardEvent.code` being released
pub fn key_up(code: &str) -> Option<Intent> {
    match code {
        "ArrowDown" | "KeyS" => Some(Intent::DuckUp),
        _ => None,
    }
}

/// Touch on the lower third ducks, anywhere else jumps
pub fn touch_start(y: f32, height: f32) -> Intent {
    if height > 0.0 && y > height * 2.0 / 3.0 {
        Intent::DuckDown
    } else {
        Intent::Jump
    }
}

/// Intents collected between frames
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pending: TickInput,
    idle_mode: bool,
    restart: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer an intent; settings toggles are handled by the caller
    pub fn push(&mut self, intent: Intent) {
        match intent {
            Intent::Jump => self.pending.jump = true,
            Intent::DuckDown => self.pending.start_duck = true,
            Intent::DuckUp => self.pending.stop_duck = true,
            Intent::Pause => self.pending.toggle_pause = true,
            Intent::Restart => self.restart = true,
            Intent::ToggleIdle => self.idle_mode = !self.idle_mode,
            Intent::ToggleMute | Intent::CycleParticles => {}
        }
    }

    pub fn idle_mode(&self) -> bool {
        self.idle_mode
    }

    /// Whether a restart was requested since the last call
    pub fn take_restart(&mut self) -> bool {
        std::mem::take(&mut self.restart)
    }

    /// Drain buffered intents into this frame's input
    pub fn take(&mut self, started: bool) -> TickInput {
        let mut input = std::mem::take(&mut self.pending);
        // First jump press (or idle mode) starts the run instead
        if !started && (input.jump || self.idle_mode) {
            input.jump = false;
            input.start = true;
        }
        // Duck then release within one frame nets out to standing
        if input.start_duck && input.stop_duck {
            input.start_duck = false;
        }
        input.idle_mode = self.idle_mode;
        input
    }
}

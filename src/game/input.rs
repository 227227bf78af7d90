//! Input Buffering and Edge Detection
//!
//! Raw key/touch state arrives as an [`InputFrame`] each tick; [`InputState`]
//! turns it into the signals the player state machine consumes: instant
//! level-triggered directions, press edges, and two independent countdown
//! buffers that keep a jump/dash press alive for a short window. A press
//! registered one tick before becoming eligible (e.g. just before landing)
//! is therefore not lost.

use serde::{Deserialize, Serialize};

/// How long a jump/dash press stays buffered (ms).
pub const BUFFER_WINDOW_MS: f32 = 8.0;

/// Raw held-key state for a single frame.
///
/// The keyboard/touch-region mapping happens in the platform layer; by the
/// time input reaches the core it is already merged into these booleans.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Move left held
    pub left: bool,
    /// Move right held
    pub right: bool,
    /// Down held (ground pound modifier)
    pub down: bool,
    /// Jump held
    pub jump: bool,
    /// Dash held
    pub dash: bool,
}

impl InputFrame {
    /// Create an empty (idle) frame.
    pub const fn new() -> Self {
        Self {
            left: false,
            right: false,
            down: false,
            jump: false,
            dash: false,
        }
    }

    /// Frame with only `left` held.
    pub const fn held_left() -> Self {
        Self {
            left: true,
            ..Self::new()
        }
    }

    /// Frame with only `right` held.
    pub const fn held_right() -> Self {
        Self {
            right: true,
            ..Self::new()
        }
    }

    /// Copy with `jump` held.
    pub const fn with_jump(mut self) -> Self {
        self.jump = true;
        self
    }

    /// Copy with `dash` held.
    pub const fn with_dash(mut self) -> Self {
        self.dash = true;
        self
    }

    /// Copy with `down` held.
    pub const fn with_down(mut self) -> Self {
        self.down = true;
        self
    }

    /// Check if this is an idle frame (nothing held).
    pub fn is_idle(&self) -> bool {
        *self == Self::new()
    }
}

/// Countdown buffer for one action.
///
/// Reset to [`BUFFER_WINDOW_MS`] on a fresh press edge, decremented by the
/// frame's elapsed time, floored at 0. The buffer counts as active until it
/// has been decremented *below* zero, so a press exactly at the window
/// boundary still registers on the following tick.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
struct ActionBuffer {
    remaining_ms: f32,
    active: bool,
}

impl ActionBuffer {
    fn press(&mut self) {
        self.remaining_ms = BUFFER_WINDOW_MS;
        self.active = true;
    }

    fn tick(&mut self, delta_ms: f32) {
        if self.active {
            self.remaining_ms -= delta_ms;
            if self.remaining_ms < 0.0 {
                self.remaining_ms = 0.0;
                self.active = false;
            }
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn consume(&mut self) {
        self.remaining_ms = 0.0;
        self.active = false;
    }
}

/// Buffered, edge-detected input state.
///
/// Created once per session, mutated every tick, never shared across levels.
/// Pure per-tick function of the raw frames it is fed.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InputState {
    keys: InputFrame,
    prev_keys: InputFrame,
    jump_buffer: ActionBuffer,
    dash_buffer: ActionBuffer,
}

impl InputState {
    /// Create a fresh input state with nothing held or buffered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one tick: snapshot the previous frame, age the buffers, and
    /// arm them on fresh press edges.
    pub fn update(&mut self, delta_ms: f32, frame: InputFrame) {
        self.prev_keys = self.keys;
        self.keys = frame;

        self.jump_buffer.tick(delta_ms);
        self.dash_buffer.tick(delta_ms);

        if self.keys.jump && !self.prev_keys.jump {
            self.jump_buffer.press();
        }
        if self.keys.dash && !self.prev_keys.dash {
            self.dash_buffer.press();
        }
    }

    /// Left held right now.
    pub fn left(&self) -> bool {
        self.keys.left
    }

    /// Right held right now.
    pub fn right(&self) -> bool {
        self.keys.right
    }

    /// Down held right now.
    pub fn down(&self) -> bool {
        self.keys.down
    }

    /// Jump held right now, or still buffered.
    pub fn jump(&self) -> bool {
        self.keys.jump || self.jump_buffer.is_active()
    }

    /// Dash held right now, or still buffered.
    pub fn dash(&self) -> bool {
        self.keys.dash || self.dash_buffer.is_active()
    }

    /// Jump press edge: pressed this tick, or pressed within the buffer
    /// window and not yet consumed.
    pub fn jump_just_pressed(&self) -> bool {
        (self.keys.jump && !self.prev_keys.jump) || self.jump_buffer.is_active()
    }

    /// Dash press edge, buffered like [`jump_just_pressed`](Self::jump_just_pressed).
    pub fn dash_just_pressed(&self) -> bool {
        (self.keys.dash && !self.prev_keys.dash) || self.dash_buffer.is_active()
    }

    /// Consume the jump buffer after an accepted jump, so one press cannot
    /// fire a second action on a later tick.
    pub fn consume_jump(&mut self) {
        self.jump_buffer.consume();
    }

    /// Consume the dash buffer after an accepted dash.
    pub fn consume_dash(&mut self) {
        self.dash_buffer.consume();
    }
}

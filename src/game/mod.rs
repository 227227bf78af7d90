//! Game Logic Module
//!
//! Frame-driven platformer simulation. Single-threaded: one synchronous
//! `update` per rendered frame, no shared mutable state.
//!
//! ## Module Structure
//!
//! - `input`: raw key frames, 8 ms action buffering, edge detection
//! - `player`: the kinematic state machine (movement, jumps, dash, wall-slide)
//! - `collision`: the `CollisionSurface` query interface
//! - `level`: biome geometry, collectibles, enemy patrols
//! - `events`: events emitted towards rendering/audio collaborators
//! - `session`: per-frame orchestration and level switching
//! - `save`: checkpoint autosave and manual save slots

pub mod collision;
pub mod events;
pub mod input;
pub mod level;
pub mod player;
pub mod save;
pub mod session;

// Re-export key types
pub use collision::{CollisionSurface, GroundContact, WallSide};
pub use events::GameEvent;
pub use input::{InputFrame, InputState};
pub use level::{Biome, Level};
pub use player::{AnimationState, Player};
pub use save::{SaveData, SaveStore};
pub use session::GameSession;

//! # Lumina Platformer Runtime Core
//!
//! Deterministic movement and collision core for Lumina, a 2D side-scrolling
//! platformer. Rendering, audio and the outer game loop are external
//! collaborators; this crate owns the player kinematic state machine, level
//! collision geometry, input buffering and progress persistence.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      LUMINA CORE                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Math primitives                           │
//! │  ├── vec2.rs     - 2D float vector                           │
//! │  └── rect.rs     - Axis-aligned rectangles                   │
//! │                                                              │
//! │  game/           - Game logic (frame-driven, single thread)  │
//! │  ├── input.rs    - Buffered, edge-detected action signals    │
//! │  ├── player.rs   - Kinematic state machine                   │
//! │  ├── collision.rs- CollisionSurface query interface          │
//! │  ├── level.rs    - Biome geometry, patrols, interactions     │
//! │  ├── events.rs   - Events emitted to collaborators           │
//! │  ├── session.rs  - Per-frame orchestration, level switching  │
//! │  └── save.rs     - Checkpoint autosave and manual slots      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! One `update(delta_ms)` per rendered frame, all work synchronous, no
//! shared mutable state. Integration is frame-normalized: every per-frame
//! tuning constant is scaled by `delta_ms * TICK_RATE / 1000`, so the same
//! sequence of frame deltas and inputs always replays to the same state.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use crate::core::rect::Rect;
pub use crate::core::vec2::Vec2;
pub use game::collision::CollisionSurface;
pub use game::events::GameEvent;
pub use game::input::{InputFrame, InputState};
pub use game::level::{Biome, Level};
pub use game::player::Player;
pub use game::session::GameSession;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reference simulation rate (Hz). Per-frame tuning constants are defined
/// relative to this rate and scaled by the actual frame delta.
pub const TICK_RATE: f32 = 60.0;

/// Number of hand-authored biomes.
pub const BIOME_COUNT: u32 = 5;

/// Total shards across all biomes; collecting them all unlocks the secret level.
pub const TOTAL_SHARDS: u32 = 75;

//! Core math primitives.
//!
//! Small float-based geometry types shared by the player kinematics and the
//! level collision surface. World units are pixels, +Y points down.

pub mod rect;
pub mod vec2;

// Re-export core types
pub use rect::Rect;
pub use vec2::Vec2;

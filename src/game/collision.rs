//! Collision Surface Interface
//!
//! The player never touches level internals; it queries an abstract
//! [`CollisionSurface`] each tick and receives position corrections and
//! collection results. Every query returns a definite answer — missing
//! geometry means a negative result, never an error.

use serde::{Deserialize, Serialize};

use crate::core::rect::Rect;
use crate::core::vec2::Vec2;
use crate::game::level::EnemyKind;

/// Side of the player probed for wall contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallSide {
    /// Probe to the player's left
    Left,
    /// Probe to the player's right
    Right,
}

/// Result of a successful ground query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundContact {
    /// Y coordinate of the platform surface the player should snap to.
    pub platform_top: f32,
}

/// A checkpoint freshly activated by a proximity query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CheckpointHit {
    /// Checkpoint id within its level
    pub id: u32,
    /// Checkpoint world position (respawn anchor)
    pub position: Vec2,
}

/// An enemy overlapping the player this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyHit {
    /// Enemy id within its level
    pub id: u32,
    /// Enemy archetype
    pub kind: EnemyKind,
}

/// Level geometry and entity queries consumed by the player.
///
/// Pickup and checkpoint state is mutated by the surface's owner (the
/// level), inside the query: each entity flips its flag exactly once and a
/// repeated query at the same position returns nothing.
pub trait CollisionSurface {
    /// Find a platform surface the descending player is crossing.
    ///
    /// A platform counts when the player's horizontal span overlaps it and
    /// the player's bottom edge has passed the platform top while the top
    /// edge is still above it. Returns the highest such surface.
    fn query_ground_contact(&self, player_rect: Rect) -> Option<GroundContact>;

    /// Whether a solid wall is flush against the given side of the player.
    fn query_wall_contact(&self, player_rect: Rect, side: WallSide) -> bool;

    /// Collect all uncollected pickups within `radius` of `point`.
    ///
    /// Returned ids are marked collected by this call; querying again at the
    /// same position yields an empty list.
    fn query_pickups_near(&mut self, point: Vec2, radius: f32) -> Vec<u32>;

    /// Activate all inactive checkpoints within `radius` of `point`.
    ///
    /// Activation is one-shot and irreversible within a session.
    fn query_checkpoints_near(&mut self, point: Vec2, radius: f32) -> Vec<CheckpointHit>;

    /// Enemies overlapping the player rect. Reported, never resolved here.
    fn query_enemy_overlap(&self, player_rect: Rect) -> Vec<EnemyHit>;

    /// Whether the player rect overlaps any hazard region.
    fn query_hazard_overlap(&self, player_rect: Rect) -> bool;
}

/// Check whether two points are within `radius` of each other.
#[inline]
pub fn within_radius(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance_squared(b) < radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_radius() {
        let origin = Vec2::ZERO;
        assert!(within_radius(origin, Vec2::new(3.0, 4.0), 5.1));
        assert!(!within_radius(origin, Vec2::new(3.0, 4.0), 5.0)); // strict
        assert!(!within_radius(origin, Vec2::new(20.0, 0.0), 5.0));
    }
}

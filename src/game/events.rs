//! Game Events
//!
//! Events generated during simulation and consumed by collaborators
//! (effects, audio, save). The core never reacts to its own events; they are
//! a one-way report of what happened this frame.

use serde::{Deserialize, Serialize};

use crate::core::vec2::Vec2;
use crate::game::level::EnemyKind;

/// An observable event produced by one simulation frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A light shard was collected.
    ShardCollected {
        /// Id of the shard within its level
        shard_id: u32,
        /// Cumulative shards collected this session
        total_collected: u32,
        /// Whether this collection restored an energy orb
        orb_restored: bool,
    },

    /// A checkpoint was activated (triggers an autosave in the session).
    CheckpointActivated {
        /// Id of the checkpoint within its level
        checkpoint_id: u32,
        /// World position of the checkpoint
        position: Vec2,
    },

    /// The player overlapped an enemy. Damage policy is the consumer's
    /// concern; the core only reports the contact.
    EnemyContact {
        /// Id of the enemy within its level
        enemy_id: u32,
        /// Enemy archetype
        kind: EnemyKind,
    },

    /// The player overlapped a hazard region.
    HazardTouched,

    /// A dash was accepted (screen-shake hook).
    DashTriggered {
        /// Screen shake intensity in pixels
        intensity: f32,
    },

    /// The player landed on a platform.
    Landed {
        /// Downward speed at impact, for landing-effect scaling
        force: f32,
    },

    /// The player jumped from the ground (`double: false`) or performed the
    /// air jump (`double: true`).
    Jumped {
        /// Whether this was the mid-air second jump
        double: bool,
    },

    /// The player kicked off a wall.
    WallJumped {
        /// Direction of travel after the kick
        towards_right: bool,
    },

    /// A wall-slide engagement began.
    WallSlideStarted,

    /// A ground pound was triggered mid-air.
    GroundPound,
}

impl GameEvent {
    /// Create a shard collection event.
    pub fn shard_collected(shard_id: u32, total_collected: u32, orb_restored: bool) -> Self {
        Self::ShardCollected {
            shard_id,
            total_collected,
            orb_restored,
        }
    }

    /// Create a checkpoint activation event.
    pub fn checkpoint_activated(checkpoint_id: u32, position: Vec2) -> Self {
        Self::CheckpointActivated {
            checkpoint_id,
            position,
        }
    }

    /// Create an enemy contact event.
    pub fn enemy_contact(enemy_id: u32, kind: EnemyKind) -> Self {
        Self::EnemyContact { enemy_id, kind }
    }

    /// Create a dash trigger event.
    pub fn dash_triggered(intensity: f32) -> Self {
        Self::DashTriggered { intensity }
    }

    /// Create a landing event.
    pub fn landed(force: f32) -> Self {
        Self::Landed { force }
    }
}

//! Player Kinematic State Machine
//!
//! Kairo's movement core: acceleration/friction, double jump, wall-slide and
//! wall-jump, cooldown-gated dash, ground pound, and collision resolution
//! against an abstract [`CollisionSurface`]. All transition rules are
//! evaluated in a fixed order every tick; later rules override earlier ones.
//!
//! ## Integration
//!
//! Tuning constants are expressed per 60 Hz reference frame. Each tick the
//! elapsed time is normalized to `frames = delta_ms * TICK_RATE / 1000`;
//! additive terms scale linearly with `frames`, multiplicative damping uses
//! `factor.powf(frames)`. At exactly 60 Hz this reproduces per-frame
//! arithmetic; at other rates movement stays frame-independent.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::rect::Rect;
use crate::core::vec2::Vec2;
use crate::game::collision::{CollisionSurface, WallSide};
use crate::game::events::GameEvent;
use crate::game::input::InputState;
use crate::TICK_RATE;

/// Player AABB width (pixels).
pub const PLAYER_WIDTH: f32 = 30.0;
/// Player AABB height (pixels).
pub const PLAYER_HEIGHT: f32 = 30.0;

/// Maximum jumps before ground contact is required again.
pub const MAX_JUMPS: u8 = 2;
/// Energy orb cap.
pub const MAX_ENERGY_ORBS: u8 = 3;
/// Every Nth cumulative shard restores one energy orb.
const SHARDS_PER_ORB: u32 = 5;

// Movement tuning (per reference frame unless noted).
const MAX_SPEED: f32 = 5.0;
const ACCELERATION: f32 = 0.5;
const FRICTION: f32 = 0.8;
const AIR_RESISTANCE: f32 = 0.98;
const GRAVITY: f32 = 0.5;

const FIRST_JUMP_IMPULSE: f32 = -4.5;
const SECOND_JUMP_IMPULSE: f32 = -3.2;
const WALL_JUMP_FORCE_X: f32 = 5.0;
const WALL_JUMP_FORCE_Y: f32 = -3.5;
const GROUND_POUND_VELOCITY: f32 = 8.0;

const WALL_SLIDE_MAX_DESCENT: f32 = 1.0;
const WALL_SLIDE_DURATION_S: f32 = 1.8;
/// Minimum vertical speed for wall-slide engagement.
const WALL_SLIDE_MIN_SPEED: f32 = 0.1;

const DASH_SPEED: f32 = 8.0;
const DASH_DURATION_S: f32 = 0.2;
const DASH_COOLDOWN_S: f32 = 0.4;
const SCREEN_SHAKE_INTENSITY: f32 = 0.8;

/// Shard collection radius around the player position.
const PICKUP_RADIUS: f32 = 20.0;
/// Checkpoint activation radius around the player position.
const CHECKPOINT_RADIUS: f32 = 30.0;

/// Run/idle threshold on horizontal speed.
const RUN_THRESHOLD: f32 = 0.1;
/// Animation frame advance interval (12 fps).
const ANIMATION_FRAME_S: f32 = 1.0 / 12.0;

/// Derived animation state. Purely observable; never drives physics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationState {
    /// Standing still on ground
    #[default]
    Idle,
    /// Moving on ground
    Run,
    /// Airborne, ascending
    Jump,
    /// Airborne, descending
    Fall,
    /// Dashing
    Dash,
}

/// The player-controlled character.
///
/// Exclusively owned by the session; mutated by exactly one `update` per
/// frame. Holds no reference to level internals.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    /// World position of the AABB top-left corner
    pub position: Vec2,
    /// Velocity in pixels per reference frame
    pub velocity: Vec2,
    /// Confirmed ground contact from the last collision pass
    pub on_ground: bool,
    /// Facing direction (affects dash and wall-jump sign)
    pub facing_right: bool,
    /// Dash window currently active
    pub is_dashing: bool,
    /// Wall-slide currently engaged
    pub wall_sliding: bool,
    /// Jumps left before requiring ground contact (0..=2)
    pub jumps_remaining: u8,
    /// Dash resource (0..=3)
    pub energy_orbs: u8,
    /// Cumulative shards collected this session (monotonic)
    pub collected_shards: u32,
    /// Seconds until another dash may start (clamped at 0)
    pub dash_cooldown: f32,
    /// Seconds left in the active dash window (clamped at 0)
    pub dash_duration: f32,
    /// Seconds left of wall-slide engagement (clamped at 0)
    pub wall_slide_timer: f32,
    /// Derived animation state
    pub animation_state: AnimationState,
    /// Animation frame counter (advances at 12 fps)
    pub animation_frame: u32,
    animation_timer: f32,
    /// Set when the slide timer ran out while still pressed into the wall;
    /// blocks re-engagement until contact breaks or the player lands.
    wall_slide_spent: bool,
}

impl Player {
    /// Create a player at a spawn position (AABB top-left).
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
            on_ground: false,
            facing_right: true,
            is_dashing: false,
            wall_sliding: false,
            jumps_remaining: MAX_JUMPS,
            energy_orbs: MAX_ENERGY_ORBS,
            collected_shards: 0,
            dash_cooldown: 0.0,
            dash_duration: 0.0,
            wall_slide_timer: 0.0,
            animation_state: AnimationState::Idle,
            animation_frame: 0,
            animation_timer: 0.0,
            wall_slide_spent: false,
        }
    }

    /// Player AABB at the current position.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, PLAYER_WIDTH, PLAYER_HEIGHT)
    }

    /// Center of the player AABB (camera anchor).
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }

    /// Teleport to a position and clear all motion state. Resources and
    /// shard progress are kept; used on level load and respawn.
    pub fn move_to(&mut self, position: Vec2) {
        self.position = position;
        self.velocity = Vec2::ZERO;
        self.on_ground = false;
        self.is_dashing = false;
        self.wall_sliding = false;
        self.wall_slide_spent = false;
        self.dash_duration = 0.0;
        self.wall_slide_timer = 0.0;
    }

    /// Advance one tick.
    ///
    /// Evaluation order: timer decay, input-driven transitions (horizontal →
    /// jump → dash → wall-slide → ground pound), gravity and air resistance,
    /// position integration, collision resolution, animation derivation.
    /// Events for collaborators are pushed onto `events`.
    pub fn update(
        &mut self,
        delta_ms: f32,
        input: &mut InputState,
        surface: &mut dyn CollisionSurface,
        events: &mut Vec<GameEvent>,
    ) {
        let dt = delta_ms / 1000.0;
        let frames = delta_ms * TICK_RATE / 1000.0;

        self.decay_timers(dt);

        let pounded = self.handle_input(frames, input, surface, events);

        if !self.on_ground && !self.is_dashing {
            if !pounded {
                self.velocity.y += GRAVITY * frames;
            }
            self.velocity.x *= AIR_RESISTANCE.powf(frames);
        }

        // Wall-slide keeps descent controlled even after gravity
        if self.wall_sliding {
            self.velocity.y = self.velocity.y.min(WALL_SLIDE_MAX_DESCENT);
        }

        if self.is_dashing {
            self.position.x += self.facing_sign() * DASH_SPEED * frames;
        } else {
            self.position += self.velocity * frames;
        }

        self.resolve_collisions(input, surface, events);
        self.update_animation(dt);
    }

    fn facing_sign(&self) -> f32 {
        if self.facing_right {
            1.0
        } else {
            -1.0
        }
    }

    /// Count down dash and wall-slide timers, clamped at zero.
    fn decay_timers(&mut self, dt: f32) {
        if self.dash_cooldown > 0.0 {
            self.dash_cooldown = (self.dash_cooldown - dt).max(0.0);
        }
        if self.dash_duration > 0.0 {
            self.dash_duration = (self.dash_duration - dt).max(0.0);
            if self.dash_duration <= 0.0 {
                self.is_dashing = false;
            }
        }
        if self.wall_slide_timer > 0.0 {
            self.wall_slide_timer = (self.wall_slide_timer - dt).max(0.0);
            if self.wall_slide_timer <= 0.0 && self.wall_sliding {
                self.wall_sliding = false;
                self.wall_slide_spent = true;
            }
        }
    }

    /// Apply input-driven transitions. Returns true if a ground pound fired
    /// (which overrides gravity for this tick).
    fn handle_input(
        &mut self,
        frames: f32,
        input: &mut InputState,
        surface: &dyn CollisionSurface,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        let jump_pressed = input.jump_just_pressed();
        let dash_pressed = input.dash_just_pressed();

        // 1. Horizontal movement
        if input.left() {
            self.velocity.x = (self.velocity.x - ACCELERATION * frames).max(-MAX_SPEED);
            self.facing_right = false;
        } else if input.right() {
            self.velocity.x = (self.velocity.x + ACCELERATION * frames).min(MAX_SPEED);
            self.facing_right = true;
        } else {
            // Uniform damping whether grounded or not
            self.velocity.x *= FRICTION.powf(frames);
        }

        // 2. Jump / double jump / wall jump
        if jump_pressed {
            if self.on_ground || (self.jumps_remaining == 1 && !self.is_dashing) {
                if self.on_ground {
                    self.velocity.y = FIRST_JUMP_IMPULSE;
                    self.jumps_remaining = 1;
                    events.push(GameEvent::Jumped { double: false });
                } else {
                    self.velocity.y = SECOND_JUMP_IMPULSE;
                    self.jumps_remaining = 0;
                    events.push(GameEvent::Jumped { double: true });
                }
                self.on_ground = false;
                input.consume_jump();
            } else if self.wall_sliding {
                self.velocity.x = -self.facing_sign() * WALL_JUMP_FORCE_X;
                self.velocity.y = WALL_JUMP_FORCE_Y;
                self.wall_sliding = false;
                self.wall_slide_timer = 0.0;
                events.push(GameEvent::WallJumped {
                    towards_right: self.velocity.x > 0.0,
                });
                input.consume_jump();
            }
        }

        // 3. Dash (consumes one energy orb, precondition-checked)
        if dash_pressed && self.energy_orbs > 0 && self.dash_cooldown <= 0.0 {
            self.energy_orbs -= 1;
            self.is_dashing = true;
            self.dash_duration = DASH_DURATION_S;
            self.dash_cooldown = DASH_COOLDOWN_S;
            events.push(GameEvent::dash_triggered(SCREEN_SHAKE_INTENSITY));
            input.consume_dash();
            debug!(orbs = self.energy_orbs, "dash accepted");
        }

        // 4. Wall-slide detection
        if !self.on_ground && !input.jump() && self.velocity.y.abs() > WALL_SLIDE_MIN_SPEED {
            let engaged = (input.left() && surface.query_wall_contact(self.rect(), WallSide::Left))
                || (input.right() && surface.query_wall_contact(self.rect(), WallSide::Right));

            if engaged {
                if !self.wall_sliding && !self.wall_slide_spent {
                    self.wall_sliding = true;
                    self.wall_slide_timer = WALL_SLIDE_DURATION_S;
                    self.velocity.y = self.velocity.y.min(WALL_SLIDE_MAX_DESCENT);
                    events.push(GameEvent::WallSlideStarted);
                }
            } else {
                self.wall_sliding = false;
                self.wall_slide_spent = false;
            }
        }

        // 5. Ground pound (overrides everything above)
        if !self.on_ground && input.down() && jump_pressed {
            self.velocity.y = GROUND_POUND_VELOCITY;
            input.consume_jump();
            events.push(GameEvent::GroundPound);
            return true;
        }

        false
    }

    /// Resolve level contact after integration: ground snap, enemy/hazard
    /// reports, pickup and checkpoint proximity.
    fn resolve_collisions(
        &mut self,
        input: &mut InputState,
        surface: &mut dyn CollisionSurface,
        events: &mut Vec<GameEvent>,
    ) {
        let was_airborne = !self.on_ground;
        self.on_ground = false;

        // Ground contact only applies while descending (or at rest)
        if self.velocity.y >= 0.0 {
            if let Some(contact) = surface.query_ground_contact(self.rect()) {
                let impact = self.velocity.y;
                self.position.y = contact.platform_top - PLAYER_HEIGHT;
                self.velocity.y = 0.0;
                self.on_ground = true;
                self.jumps_remaining = MAX_JUMPS;
                self.wall_sliding = false;
                self.wall_slide_timer = 0.0;
                self.wall_slide_spent = false;

                if was_airborne {
                    events.push(GameEvent::landed(impact));

                    // A jump buffered just before touchdown fires immediately
                    if input.jump_just_pressed() {
                        self.velocity.y = FIRST_JUMP_IMPULSE;
                        self.jumps_remaining = 1;
                        self.on_ground = false;
                        input.consume_jump();
                        events.push(GameEvent::Jumped { double: false });
                    }
                }
            }
        }

        let rect = self.rect();
        for hit in surface.query_enemy_overlap(rect) {
            events.push(GameEvent::enemy_contact(hit.id, hit.kind));
        }
        if surface.query_hazard_overlap(rect) {
            events.push(GameEvent::HazardTouched);
        }

        // Proximity is anchored at the AABB origin; the authored shard and
        // checkpoint positions assume it.
        let anchor = self.position;
        for shard_id in surface.query_pickups_near(anchor, PICKUP_RADIUS) {
            let orb_restored = self.collect_shard();
            events.push(GameEvent::shard_collected(
                shard_id,
                self.collected_shards,
                orb_restored,
            ));
        }
        for hit in surface.query_checkpoints_near(anchor, CHECKPOINT_RADIUS) {
            events.push(GameEvent::checkpoint_activated(hit.id, hit.position));
        }
    }

    /// Record a collected shard. Every fifth cumulative shard restores one
    /// energy orb, capped at [`MAX_ENERGY_ORBS`]. Returns whether an orb was
    /// restored.
    pub fn collect_shard(&mut self) -> bool {
        self.collected_shards += 1;
        if self.collected_shards % SHARDS_PER_ORB == 0 && self.energy_orbs < MAX_ENERGY_ORBS {
            self.energy_orbs += 1;
            return true;
        }
        false
    }

    /// Derive the animation state and advance the 12 fps frame counter.
    fn update_animation(&mut self, dt: f32) {
        self.animation_timer += dt;
        if self.animation_timer > ANIMATION_FRAME_S {
            self.animation_frame = self.animation_frame.wrapping_add(1);
            self.animation_timer = 0.0;
        }

        self.animation_state = if self.is_dashing {
            AnimationState::Dash
        } else if !self.on_ground {
            if self.velocity.y < 0.0 {
                AnimationState::Jump
            } else {
                AnimationState::Fall
            }
        } else if self.velocity.x.abs() > RUN_THRESHOLD {
            AnimationState::Run
        } else {
            AnimationState::Idle
        };
    }
}

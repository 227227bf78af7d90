//! Biomes and Level State
//!
//! The five biomes are a data table, not a type hierarchy: each [`Biome`]
//! descriptor carries the counts, enemy archetype, palette and layout tag
//! that distinguish it, and [`Level::load`] expands the descriptor into
//! concrete platforms, shards, patrolling enemies and checkpoints. The level
//! owns all of that state and answers the player's [`CollisionSurface`]
//! queries, flipping pickup/checkpoint flags itself.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::rect::Rect;
use crate::core::vec2::Vec2;
use crate::game::collision::{
    within_radius, CheckpointHit, CollisionSurface, EnemyHit, GroundContact, WallSide,
};
use crate::TICK_RATE;

/// World width of every biome (pixels).
pub const LEVEL_WIDTH: f32 = 4500.0;
/// World height of every biome (pixels).
pub const LEVEL_HEIGHT: f32 = 720.0;

/// Enemy bounding-box size.
const ENEMY_SIZE: f32 = 30.0;
/// Patrol speed in pixels per reference frame.
const PATROL_SPEED: f32 = 1.0;
/// Patrol span to the right of the spawn point.
const PATROL_RANGE: f32 = 200.0;

/// Default spawn position (AABB top-left) shared by all biomes.
const SPAWN: Vec2 = Vec2::new(100.0, 600.0);

/// Enemy archetype. Behavior is uniform (horizontal patrol); the kind feeds
/// rendering and damage policy downstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Biome 1 patroller
    Glimmerbeetle,
    /// Biome 2 patroller
    ShardSprite,
    /// Biome 3 patroller
    BogHopper,
    /// Biome 4 patroller
    WindPhantom,
    /// Biome 5 boss
    HollowMaw,
}

impl EnemyKind {
    /// Display name as shown to the player.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Glimmerbeetle => "Glimmerbeetle",
            Self::ShardSprite => "Shard Sprite",
            Self::BogHopper => "Bog Hopper",
            Self::WindPhantom => "Wind Phantom",
            Self::HollowMaw => "The Hollow Maw",
        }
    }

    /// Whether this archetype is the final boss.
    pub fn is_boss(&self) -> bool {
        matches!(self, Self::HollowMaw)
    }
}

impl std::fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Atmospheric overlay rendered on top of a biome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Overlay {
    /// Translucent gray wash (marshlands)
    Fog,
    /// Streaking rain (storm peaks)
    Rain,
}

/// Platform arrangement used when expanding a biome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlatformLayout {
    /// Thick ground plus a run of staggered ledges
    Canopy,
    /// Thin ground plus hidden crystal platforms
    Caverns,
}

/// Static descriptor for one biome. The table in [`Biome::all`] is the
/// single source of truth for level content.
#[derive(Clone, Copy, Debug)]
pub struct Biome {
    /// Level number (1..=5)
    pub number: u8,
    /// Display name
    pub name: &'static str,
    /// Shards placed in this biome
    pub shard_count: u32,
    /// Patrolling enemies
    pub enemy_count: u32,
    /// Checkpoints along the route
    pub checkpoint_count: u32,
    /// Enemy archetype
    pub enemy_kind: EnemyKind,
    /// Background fill color (CSS hex)
    pub background_color: &'static str,
    /// Atmospheric overlay, if any
    pub overlay: Option<Overlay>,
    /// Platform arrangement
    pub layout: PlatformLayout,
}

const BIOMES: [Biome; 5] = [
    Biome {
        number: 1,
        name: "Sun-Dappled Canopy",
        shard_count: 15,
        enemy_count: 2,
        checkpoint_count: 3,
        enemy_kind: EnemyKind::Glimmerbeetle,
        background_color: "#88C9A1",
        overlay: None,
        layout: PlatformLayout::Canopy,
    },
    Biome {
        number: 2,
        name: "Crystal Caverns",
        shard_count: 20,
        enemy_count: 4,
        checkpoint_count: 4,
        enemy_kind: EnemyKind::ShardSprite,
        background_color: "#6B5CA5",
        overlay: None,
        layout: PlatformLayout::Caverns,
    },
    Biome {
        number: 3,
        name: "Misty Marshlands",
        shard_count: 20,
        enemy_count: 3,
        checkpoint_count: 3,
        enemy_kind: EnemyKind::BogHopper,
        background_color: "#3A5F3A",
        overlay: Some(Overlay::Fog),
        layout: PlatformLayout::Canopy,
    },
    Biome {
        number: 4,
        name: "Storm-Touched Peaks",
        shard_count: 15,
        enemy_count: 2,
        checkpoint_count: 2,
        enemy_kind: EnemyKind::WindPhantom,
        background_color: "#708090",
        overlay: Some(Overlay::Rain),
        layout: PlatformLayout::Canopy,
    },
    Biome {
        number: 5,
        name: "Heart of the Corruption",
        shard_count: 5,
        enemy_count: 1,
        checkpoint_count: 1,
        enemy_kind: EnemyKind::HollowMaw,
        background_color: "#4A2525",
        overlay: None,
        layout: PlatformLayout::Canopy,
    },
];

impl Biome {
    /// Look up a biome by level number.
    pub fn get(number: u8) -> Option<&'static Biome> {
        BIOMES.iter().find(|b| b.number == number)
    }

    /// The full biome table, in level order.
    pub fn all() -> &'static [Biome] {
        &BIOMES
    }
}

/// Platform role, affecting solidity rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    /// Level-spanning floor
    Ground,
    /// Fixed ledge
    Ledge,
    /// Hidden until revealed by a nearby shard collection
    Crystal,
}

/// A static platform. Geometry never changes; crystal platforms toggle
/// `visible` once, from hidden to shown.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Platform {
    /// Bounding box
    pub rect: Rect,
    /// Role
    pub kind: PlatformKind,
    /// Whether the platform is currently shown and solid
    pub visible: bool,
}

impl Platform {
    /// Hidden platforms are intangible.
    #[inline]
    pub fn is_solid(&self) -> bool {
        self.visible
    }
}

/// A collectible light shard.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Shard {
    /// Id within the level
    pub id: u32,
    /// World position
    pub position: Vec2,
    /// Collected flag, flips true exactly once
    pub collected: bool,
}

/// A respawn checkpoint.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Id within the level
    pub id: u32,
    /// World position (respawn anchor)
    pub position: Vec2,
    /// Activated flag, flips true exactly once
    pub activated: bool,
}

/// A horizontally patrolling enemy.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Enemy {
    /// Id within the level
    pub id: u32,
    /// Bounding box (x advances with the patrol)
    pub rect: Rect,
    /// Archetype
    pub kind: EnemyKind,
    /// Left patrol bound
    pub patrol_start: f32,
    /// Right patrol bound
    pub patrol_end: f32,
    /// +1.0 moving right, -1.0 moving left
    pub direction: f32,
}

/// A static damage region.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Hazard {
    /// Bounding box
    pub rect: Rect,
}

/// A loaded, mutable level instance. Not persisted wholesale; saves record
/// the level number and progress, and loading reconstructs from the table.
#[derive(Clone, Debug)]
pub struct Level {
    /// Level number (1..=5)
    pub number: u8,
    /// Biome display name
    pub name: &'static str,
    /// World width
    pub width: f32,
    /// World height
    pub height: f32,
    /// Static platforms (geometry immutable, crystal visibility mutable)
    pub platforms: Vec<Platform>,
    /// Collectible shards
    pub shards: Vec<Shard>,
    /// Patrolling enemies
    pub enemies: Vec<Enemy>,
    /// Respawn checkpoints
    pub checkpoints: Vec<Checkpoint>,
    /// Damage regions
    pub hazards: Vec<Hazard>,
}

impl Level {
    /// Expand a biome descriptor into a fresh level instance.
    pub fn load(number: u8) -> Option<Level> {
        let biome = Biome::get(number)?;
        info!(level = biome.number, name = biome.name, "loading level");

        Some(Level {
            number: biome.number,
            name: biome.name,
            width: LEVEL_WIDTH,
            height: LEVEL_HEIGHT,
            platforms: build_platforms(biome.layout),
            shards: build_shards(biome.shard_count),
            enemies: build_enemies(biome.enemy_count, biome.enemy_kind),
            checkpoints: build_checkpoints(biome.checkpoint_count),
            hazards: Vec::new(),
        })
    }

    /// Biome descriptor for this level.
    pub fn biome(&self) -> &'static Biome {
        // Levels are only constructed from table entries
        Biome::get(self.number).unwrap_or(&BIOMES[0])
    }

    /// Default spawn position (AABB top-left).
    pub fn spawn_point(&self) -> Vec2 {
        SPAWN
    }

    /// Shards collected so far in this level.
    pub fn collected_shard_count(&self) -> u32 {
        self.shards.iter().filter(|s| s.collected).count() as u32
    }

    /// Whether every shard in this level has been collected.
    pub fn is_cleared(&self) -> bool {
        self.shards.iter().all(|s| s.collected)
    }

    /// Position of the most recently activated checkpoint, if any.
    pub fn last_activated_checkpoint(&self) -> Option<Vec2> {
        self.checkpoints
            .iter()
            .rev()
            .find(|c| c.activated)
            .map(|c| c.position)
    }

    /// Advance enemy patrols one tick. Enemies walk their span at a fixed
    /// speed and turn around at either bound.
    pub fn update(&mut self, delta_ms: f32) {
        let frames = delta_ms * TICK_RATE / 1000.0;
        for enemy in &mut self.enemies {
            enemy.rect.x += enemy.direction * PATROL_SPEED * frames;
            if enemy.rect.x >= enemy.patrol_end || enemy.rect.x <= enemy.patrol_start {
                enemy.rect.x = enemy.rect.x.clamp(enemy.patrol_start, enemy.patrol_end);
                enemy.direction = -enemy.direction;
            }
        }
    }

    /// Reveal the hidden crystal platform nearest to `point`, if any remain.
    fn reveal_nearest_crystal(&mut self, point: Vec2) {
        let nearest = self
            .platforms
            .iter_mut()
            .filter(|p| p.kind == PlatformKind::Crystal && !p.visible)
            .min_by(|a, b| {
                let da = point.distance_squared(a.rect.center());
                let db = point.distance_squared(b.rect.center());
                da.total_cmp(&db)
            });
        if let Some(platform) = nearest {
            platform.visible = true;
            debug!(x = platform.rect.x, y = platform.rect.y, "crystal platform revealed");
        }
    }
}

impl CollisionSurface for Level {
    fn query_ground_contact(&self, player_rect: Rect) -> Option<GroundContact> {
        self.platforms
            .iter()
            .filter(|p| p.is_solid())
            .filter(|p| {
                player_rect.right() > p.rect.x
                    && player_rect.x < p.rect.right()
                    && player_rect.bottom() >= p.rect.y
                    && player_rect.y < p.rect.y
            })
            .map(|p| p.rect.y)
            .min_by(f32::total_cmp)
            .map(|platform_top| GroundContact { platform_top })
    }

    fn query_wall_contact(&self, player_rect: Rect, side: WallSide) -> bool {
        // One-pixel strip flush against the queried side, inset vertically so
        // a floor the player stands on does not read as a wall.
        let probe = match side {
            WallSide::Left => Rect::new(
                player_rect.x - 1.0,
                player_rect.y + 1.0,
                1.0,
                player_rect.h - 2.0,
            ),
            WallSide::Right => Rect::new(
                player_rect.right(),
                player_rect.y + 1.0,
                1.0,
                player_rect.h - 2.0,
            ),
        };
        self.platforms
            .iter()
            .filter(|p| p.is_solid())
            .any(|p| probe.overlaps(&p.rect))
    }

    fn query_pickups_near(&mut self, point: Vec2, radius: f32) -> Vec<u32> {
        let mut collected = Vec::new();
        let mut reveal_at = Vec::new();
        for shard in &mut self.shards {
            if !shard.collected && within_radius(point, shard.position, radius) {
                shard.collected = true;
                collected.push(shard.id);
                reveal_at.push(shard.position);
            }
        }
        for position in reveal_at {
            self.reveal_nearest_crystal(position);
        }
        collected
    }

    fn query_checkpoints_near(&mut self, point: Vec2, radius: f32) -> Vec<CheckpointHit> {
        let mut hits = Vec::new();
        for checkpoint in &mut self.checkpoints {
            if !checkpoint.activated && within_radius(point, checkpoint.position, radius) {
                checkpoint.activated = true;
                hits.push(CheckpointHit {
                    id: checkpoint.id,
                    position: checkpoint.position,
                });
            }
        }
        hits
    }

    fn query_enemy_overlap(&self, player_rect: Rect) -> Vec<EnemyHit> {
        self.enemies
            .iter()
            .filter(|e| player_rect.overlaps(&e.rect))
            .map(|e| EnemyHit {
                id: e.id,
                kind: e.kind,
            })
            .collect()
    }

    fn query_hazard_overlap(&self, player_rect: Rect) -> bool {
        self.hazards.iter().any(|h| player_rect.overlaps(&h.rect))
    }
}

fn build_platforms(layout: PlatformLayout) -> Vec<Platform> {
    let mut platforms = Vec::new();
    match layout {
        PlatformLayout::Canopy => {
            platforms.push(Platform {
                rect: Rect::new(0.0, 650.0, LEVEL_WIDTH, 50.0),
                kind: PlatformKind::Ground,
                visible: true,
            });
            for i in 0..10 {
                platforms.push(Platform {
                    rect: Rect::new(
                        300.0 + i as f32 * 300.0,
                        550.0 - (i % 3) as f32 * 100.0,
                        100.0,
                        20.0,
                    ),
                    kind: PlatformKind::Ledge,
                    visible: true,
                });
            }
        }
        PlatformLayout::Caverns => {
            platforms.push(Platform {
                rect: Rect::new(0.0, 680.0, LEVEL_WIDTH, 20.0),
                kind: PlatformKind::Ground,
                visible: true,
            });
            for i in 0..8 {
                platforms.push(Platform {
                    rect: Rect::new(
                        500.0 + i as f32 * 400.0,
                        500.0 - (i % 3) as f32 * 80.0,
                        80.0,
                        10.0,
                    ),
                    kind: PlatformKind::Crystal,
                    visible: false,
                });
            }
        }
    }
    platforms
}

fn build_shards(count: u32) -> Vec<Shard> {
    (0..count)
        .map(|i| Shard {
            id: i,
            position: Vec2::new(400.0 + i as f32 * 200.0, 400.0 - (i % 4) as f32 * 80.0),
            collected: false,
        })
        .collect()
}

fn build_enemies(count: u32, kind: EnemyKind) -> Vec<Enemy> {
    (0..count)
        .map(|i| {
            let x = 500.0 + i as f32 * 400.0;
            Enemy {
                id: i,
                rect: Rect::new(x, 600.0, ENEMY_SIZE, ENEMY_SIZE),
                kind,
                patrol_start: x,
                patrol_end: x + PATROL_RANGE,
                direction: 1.0,
            }
        })
        .collect()
}

fn build_checkpoints(count: u32) -> Vec<Checkpoint> {
    (0..count)
        .map(|i| Checkpoint {
            id: i,
            position: Vec2::new(1000.0 + i as f32 * 1000.0, 600.0),
            activated: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_biome_table() {
        assert_eq!(Biome::all().len(), 5);
        let total: u32 = Biome::all().iter().map(|b| b.shard_count).sum();
        assert_eq!(total, crate::TOTAL_SHARDS);

        let caverns = Biome::get(2).unwrap();
        assert_eq!(caverns.name, "Crystal Caverns");
        assert_eq!(caverns.enemy_kind, EnemyKind::ShardSprite);
        assert_eq!(caverns.layout, PlatformLayout::Caverns);

        assert!(Biome::get(5).unwrap().enemy_kind.is_boss());
        assert!(Biome::get(0).is_none());
        assert!(Biome::get(6).is_none());
    }

    #[test]
    fn test_load_expands_descriptor() {
        let level = Level::load(1).unwrap();
        assert_eq!(level.name, "Sun-Dappled Canopy");
        assert_eq!(level.shards.len(), 15);
        assert_eq!(level.enemies.len(), 2);
        assert_eq!(level.checkpoints.len(), 3);
        // Ground plus ten ledges
        assert_eq!(level.platforms.len(), 11);
        assert!(level.platforms.iter().all(|p| p.is_solid()));

        assert!(Level::load(6).is_none());
    }

    #[test]
    fn test_caverns_crystals_start_hidden() {
        let level = Level::load(2).unwrap();
        let crystals: Vec<_> = level
            .platforms
            .iter()
            .filter(|p| p.kind == PlatformKind::Crystal)
            .collect();
        assert_eq!(crystals.len(), 8);
        assert!(crystals.iter().all(|p| !p.is_solid()));
    }

    #[test]
    fn test_ground_contact_picks_highest_surface() {
        let level = Level::load(1).unwrap();
        // Straddling the ground plane at y=650
        let rect = Rect::new(100.0, 625.0, 30.0, 30.0);
        let contact = level.query_ground_contact(rect).unwrap();
        assert_eq!(contact.platform_top, 650.0);

        // Above everything: no contact
        assert!(level
            .query_ground_contact(Rect::new(100.0, 100.0, 30.0, 30.0))
            .is_none());

        // Crossing the first ledge (x=300, y=550) rather than the ground
        let rect = Rect::new(310.0, 525.0, 30.0, 30.0);
        let contact = level.query_ground_contact(rect).unwrap();
        assert_eq!(contact.platform_top, 550.0);
    }

    #[test]
    fn test_hidden_crystal_is_not_ground() {
        let mut level = Level::load(2).unwrap();
        // First crystal platform spans x 500..580 at y=500
        let rect = Rect::new(510.0, 480.0, 30.0, 30.0);
        assert!(level.query_ground_contact(rect).is_none());

        level.platforms[1].visible = true;
        let contact = level.query_ground_contact(rect).unwrap();
        assert_eq!(contact.platform_top, 500.0);
    }

    #[test]
    fn test_wall_probe() {
        let level = Level::load(1).unwrap();
        // First ledge spans x 300..400, y 550..570. Player flush against its
        // left face, vertically aligned.
        let rect = Rect::new(270.0, 545.0, 30.0, 30.0);
        assert!(level.query_wall_contact(rect, WallSide::Right));
        assert!(!level.query_wall_contact(rect, WallSide::Left));

        // Standing on the ground: the floor is not a wall
        let rect = Rect::new(100.0, 620.0, 30.0, 30.0);
        assert!(!level.query_wall_contact(rect, WallSide::Left));
        assert!(!level.query_wall_contact(rect, WallSide::Right));
    }

    #[test]
    fn test_shard_collection_is_one_shot() {
        let mut level = Level::load(1).unwrap();
        let shard_pos = level.shards[0].position;

        let collected = level.query_pickups_near(shard_pos, 20.0);
        assert_eq!(collected, vec![0]);
        assert_eq!(level.collected_shard_count(), 1);

        // Same position again: nothing left to collect
        assert!(level.query_pickups_near(shard_pos, 20.0).is_empty());
        assert_eq!(level.collected_shard_count(), 1);
    }

    #[test]
    fn test_shard_collection_reveals_nearest_crystal() {
        let mut level = Level::load(2).unwrap();
        let shard_pos = level.shards[0].position;

        let before = level.platforms.iter().filter(|p| p.is_solid()).count();
        level.query_pickups_near(shard_pos, 20.0);
        let after = level.platforms.iter().filter(|p| p.is_solid()).count();
        assert_eq!(after, before + 1);

        // The revealed platform is the closest crystal to the shard
        let revealed = level
            .platforms
            .iter()
            .find(|p| p.kind == PlatformKind::Crystal && p.visible)
            .unwrap();
        let d = shard_pos.distance_squared(revealed.rect.center());
        for p in level
            .platforms
            .iter()
            .filter(|p| p.kind == PlatformKind::Crystal && !p.visible)
        {
            assert!(d <= shard_pos.distance_squared(p.rect.center()));
        }
    }

    #[test]
    fn test_checkpoint_activation_is_one_shot() {
        let mut level = Level::load(1).unwrap();
        let pos = level.checkpoints[0].position;

        let hits = level.query_checkpoints_near(pos, 30.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 0);
        assert_eq!(level.last_activated_checkpoint(), Some(pos));

        assert!(level.query_checkpoints_near(pos, 30.0).is_empty());
    }

    #[test]
    fn test_enemy_patrol_turns_at_bounds() {
        let mut level = Level::load(1).unwrap();
        let start = level.enemies[0].rect.x;

        // Walk right to the far bound (200 px at 1 px/frame)
        for _ in 0..205 {
            level.update(1000.0 / 60.0);
        }
        let enemy = &level.enemies[0];
        assert_eq!(enemy.direction, -1.0);
        assert!(enemy.rect.x <= enemy.patrol_end);
        assert!(enemy.rect.x > start);

        // And back again
        for _ in 0..410 {
            level.update(1000.0 / 60.0);
        }
        let enemy = &level.enemies[0];
        assert!(enemy.rect.x >= enemy.patrol_start);
        assert!(enemy.rect.x <= enemy.patrol_end);
    }

    #[test]
    fn test_enemy_overlap_report() {
        let level = Level::load(1).unwrap();
        let enemy_rect = level.enemies[0].rect;

        let hits = level.query_enemy_overlap(enemy_rect);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind, EnemyKind::Glimmerbeetle);

        assert!(level
            .query_enemy_overlap(Rect::new(0.0, 0.0, 30.0, 30.0))
            .is_empty());
    }

    #[test]
    fn test_is_cleared() {
        let mut level = Level::load(5).unwrap();
        assert!(!level.is_cleared());
        for shard in &mut level.shards {
            shard.collected = true;
        }
        assert!(level.is_cleared());
    }
}

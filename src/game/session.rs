//! Game Session Orchestration
//!
//! One [`GameSession`] owns the player, the active level, the input state
//! and the save store, and advances them together once per rendered frame.
//! It is also where cross-cutting reactions live: checkpoint activations
//! trigger autosaves, a cleared level is marked complete and the next one
//! loads. Enemy and hazard contacts are passed through untouched; the
//! damage policy belongs to the embedding game, which can call
//! [`respawn`](GameSession::respawn) when it decides the player is hit.

use thiserror::Error;
use tracing::info;

use crate::game::events::GameEvent;
use crate::game::input::{InputFrame, InputState};
use crate::game::level::Level;
use crate::game::player::Player;
use crate::game::save::{SaveError, SaveStore};

/// Errors surfaced by the session layer.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Level number outside the biome table.
    #[error("unknown level {0}")]
    UnknownLevel(u8),

    /// Persistence failure.
    #[error(transparent)]
    Save(#[from] SaveError),
}

/// A running game: player, active level, input, and persistence.
#[derive(Debug)]
pub struct GameSession {
    /// The player character
    pub player: Player,
    /// The active level
    pub level: Level,
    input: InputState,
    store: SaveStore,
    elapsed_ms: f64,
    run_complete: bool,
}

impl GameSession {
    /// Resume a session from the store's current save: the recorded level is
    /// loaded and the player placed at the recorded position with their
    /// saved resources.
    pub fn resume(store: SaveStore) -> Result<Self, SessionError> {
        let progress = store.data().player.clone();
        let level =
            Level::load(progress.level).ok_or(SessionError::UnknownLevel(progress.level))?;

        let mut player = Player::new(progress.position.x, progress.position.y);
        player.collected_shards = progress.collected_shards;
        player.energy_orbs = progress.energy_orbs;

        info!(
            level = level.number,
            shards = player.collected_shards,
            "session resumed"
        );
        Ok(Self {
            player,
            level,
            input: InputState::new(),
            store,
            elapsed_ms: progress.completion_time_s * 1000.0,
            run_complete: false,
        })
    }

    /// Advance one frame: feed input, update the player against the level,
    /// move enemy patrols, then apply session-level reactions to the frame's
    /// events. Returns the events for rendering/audio collaborators.
    pub fn update(
        &mut self,
        delta_ms: f32,
        frame: InputFrame,
    ) -> Result<Vec<GameEvent>, SessionError> {
        self.elapsed_ms += f64::from(delta_ms);
        self.input.update(delta_ms, frame);

        let mut events = Vec::new();
        self.player
            .update(delta_ms, &mut self.input, &mut self.level, &mut events);
        self.level.update(delta_ms);

        for event in &events {
            if let GameEvent::CheckpointActivated { position, .. } = event {
                self.snapshot_progress();
                self.store
                    .autosave_at_checkpoint(self.level.number, *position)?;
            }
        }

        if self.level.is_cleared() && !self.run_complete {
            self.complete_level()?;
        }

        Ok(events)
    }

    /// Seconds of play on this run.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_ms / 1000.0
    }

    /// Whether the final level has been cleared.
    pub fn is_run_complete(&self) -> bool {
        self.run_complete
    }

    /// The save store, for menus (slots, settings).
    pub fn store(&self) -> &SaveStore {
        &self.store
    }

    /// Mutable save store access.
    pub fn store_mut(&mut self) -> &mut SaveStore {
        &mut self.store
    }

    /// Load a specific level and place the player at its spawn. Motion state
    /// is cleared; shards and orbs carry over.
    pub fn load_level(&mut self, number: u8) -> Result<(), SessionError> {
        let level = Level::load(number).ok_or(SessionError::UnknownLevel(number))?;
        self.level = level;
        self.player.move_to(self.level.spawn_point());
        self.input = InputState::new();
        self.store.data_mut().current_level = number;
        self.snapshot_progress();
        self.store.flush()?;
        Ok(())
    }

    /// Put the player back at the last activated checkpoint, or the level
    /// spawn if none has been reached yet.
    pub fn respawn(&mut self) {
        let target = self
            .level
            .last_activated_checkpoint()
            .unwrap_or_else(|| self.level.spawn_point());
        self.player.move_to(target);
        info!(x = target.x, y = target.y, "player respawned");
    }

    /// Mark the current level complete and advance. Clearing the final level
    /// finishes the run instead.
    fn complete_level(&mut self) -> Result<(), SessionError> {
        let number = self.level.number;
        let shards = self.level.collected_shard_count();
        info!(level = number, shards, "level cleared");

        self.store
            .mark_level_completed(number, shards, self.elapsed_seconds())?;

        match Level::load(number + 1) {
            Some(next) => {
                self.level = next;
                self.player.move_to(self.level.spawn_point());
                self.store.data_mut().current_level = self.level.number;
            }
            None => {
                self.run_complete = true;
                info!("run complete");
            }
        }
        // The live player is the source of truth for cumulative shards
        self.snapshot_progress();
        self.store.flush()?;
        Ok(())
    }

    /// Copy the live player state into the save data (not yet persisted).
    fn snapshot_progress(&mut self) {
        let progress = &mut self.store.data_mut().player;
        progress.level = self.level.number;
        progress.position = self.player.position;
        progress.collected_shards = self.player.collected_shards;
        progress.energy_orbs = self.player.energy_orbs;
        progress.completion_time_s = self.elapsed_ms / 1000.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::Vec2;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};

    const DT: f32 = 1000.0 / 60.0;

    fn temp_dir() -> PathBuf {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("lumina-session-test-{}-{n}", std::process::id()))
    }

    fn session(dir: &PathBuf) -> GameSession {
        let store = SaveStore::open(dir).unwrap();
        GameSession::resume(store).unwrap()
    }

    fn settle(session: &mut GameSession) {
        for _ in 0..60 {
            session.update(DT, InputFrame::new()).unwrap();
        }
    }

    #[test]
    fn test_resume_places_player_from_save() {
        let dir = temp_dir();
        let session = session(&dir);
        assert_eq!(session.level.number, 1);
        assert_eq!(session.player.position, Vec2::new(100.0, 600.0));
        assert_eq!(session.player.energy_orbs, 3);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_update_runs_player_and_enemies() {
        let dir = temp_dir();
        let mut session = session(&dir);
        let enemy_x = session.level.enemies[0].rect.x;

        settle(&mut session);
        assert!(session.player.on_ground, "player settles onto the ground");
        assert!(session.level.enemies[0].rect.x != enemy_x, "patrol moved");
        assert!(session.elapsed_seconds() > 0.9);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_checkpoint_triggers_autosave() {
        let dir = temp_dir();
        let mut session = session(&dir);

        // Drop the player onto the first checkpoint at (1000, 600)
        session.player.move_to(Vec2::new(1000.0, 595.0));
        let events = session.update(DT, InputFrame::new()).unwrap();

        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::CheckpointActivated { .. })));
        assert_eq!(session.store().data().checkpoints.len(), 1);
        assert_eq!(session.store().data().player.level, 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_respawn_prefers_checkpoint() {
        let dir = temp_dir();
        let mut session = session(&dir);

        // No checkpoint yet: respawn at the level spawn
        session.player.move_to(Vec2::new(3000.0, 100.0));
        session.respawn();
        assert_eq!(session.player.position, session.level.spawn_point());

        session.player.move_to(Vec2::new(1000.0, 595.0));
        session.update(DT, InputFrame::new()).unwrap();
        session.player.move_to(Vec2::new(3000.0, 100.0));
        session.respawn();
        assert_eq!(session.player.position, Vec2::new(1000.0, 600.0));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_clearing_level_advances() {
        let dir = temp_dir();
        let mut session = session(&dir);

        // Sweep up all fifteen canopy shards
        let positions: Vec<Vec2> = session.level.shards.iter().map(|s| s.position).collect();
        for pos in positions {
            session.player.move_to(pos);
            session.update(DT, InputFrame::new()).unwrap();
        }

        assert_eq!(session.level.number, 2, "advanced to the caverns");
        assert_eq!(session.player.position, session.level.spawn_point());
        assert_eq!(session.player.collected_shards, 15);

        let progress = &session.store().data().level_progress[&1];
        assert!(progress.completed);
        assert_eq!(progress.shards, 15);
        assert!(session.store().data().level_progress[&2].unlocked);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_clearing_final_level_completes_run() {
        let dir = temp_dir();
        let mut session = session(&dir);
        session.load_level(5).unwrap();

        let positions: Vec<Vec2> = session.level.shards.iter().map(|s| s.position).collect();
        for pos in positions {
            session.player.move_to(pos);
            session.update(DT, InputFrame::new()).unwrap();
        }

        assert!(session.is_run_complete());
        assert_eq!(session.level.number, 5, "no level beyond the corruption");
        assert!(session.store().data().level_progress[&5].completed);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_level_rejects_unknown() {
        let dir = temp_dir();
        let mut session = session(&dir);
        assert!(matches!(
            session.load_level(9),
            Err(SessionError::UnknownLevel(9))
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }
}

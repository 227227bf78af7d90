//! Save Persistence
//!
//! Checkpoint autosaves and three manual save slots, stored as pretty JSON
//! under a save directory. The main file tracks the running game; each slot
//! is a full copy of the data at the moment it was saved. Corrupted or
//! missing slot files are reported through [`SlotStatus`], never panics.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::vec2::Vec2;
use crate::TOTAL_SHARDS;

/// Number of manual save slots.
pub const SAVE_SLOTS: usize = 3;

/// File name of the running autosave.
const MAIN_FILE: &str = "save.json";

/// Errors surfaced by the save store.
#[derive(Debug, Error)]
pub enum SaveError {
    /// Slot index outside `0..SAVE_SLOTS`.
    #[error("invalid save slot {0}, valid slots are 0..{SAVE_SLOTS}")]
    InvalidSlot(usize),

    /// Requested slot has never been written.
    #[error("save slot {0} is empty")]
    EmptySlot(usize),

    /// Filesystem failure.
    #[error("save file i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// Stored JSON did not parse or serialize.
    #[error("save data corrupted: {0}")]
    Corrupted(#[from] serde_json::Error),
}

/// Player-centric progress captured in a save.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerProgress {
    /// Level the player is in
    pub level: u8,
    /// Position snapshot (AABB top-left)
    pub position: Vec2,
    /// Cumulative shards across the whole game
    pub collected_shards: u32,
    /// Energy orbs held
    pub energy_orbs: u8,
    /// Seconds of play on the current run
    pub completion_time_s: f64,
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self {
            level: 1,
            position: Vec2::new(100.0, 600.0),
            collected_shards: 0,
            energy_orbs: 3,
            completion_time_s: 0.0,
        }
    }
}

/// Per-level completion record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    /// Reachable from the level select
    pub unlocked: bool,
    /// All shards collected at least once
    pub completed: bool,
    /// Best shard count for the level
    pub shards: u32,
    /// Fastest completion, seconds
    pub best_time_s: Option<f64>,
}

/// Player-facing settings, persisted with the save.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Master volume (0..=1)
    pub volume: f32,
    /// Music volume (0..=1)
    pub music_volume: f32,
    /// Sound-effect volume (0..=1)
    pub sfx_volume: f32,
    /// Colorblind-friendly palette
    pub colorblind_mode: bool,
    /// Widened input-timing windows
    pub timing_assist: bool,
    /// Reduced screen shake and parallax
    pub motion_reduction: bool,
    /// On-screen touch controls
    pub touch_controls: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            volume: 0.7,
            music_volume: 0.7,
            sfx_volume: 0.8,
            colorblind_mode: false,
            timing_assist: false,
            motion_reduction: false,
            touch_controls: true,
        }
    }
}

/// One checkpoint autosave entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    /// Level the checkpoint belongs to
    pub level: u8,
    /// Checkpoint position (respawn anchor)
    pub position: Vec2,
    /// When it was reached
    pub timestamp: DateTime<Utc>,
}

/// Session timing bookkeeping.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Timestamps {
    /// First launch of this save
    pub first_played: Option<DateTime<Utc>>,
    /// Most recent write
    pub last_played: Option<DateTime<Utc>>,
    /// Accumulated play time, seconds
    pub total_time_played_s: f64,
}

/// The complete persisted game state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    /// Level the run is currently in
    pub current_level: u8,
    /// Shard total across all biomes (fixed at 75)
    pub total_shards: u32,
    /// Player snapshot
    pub player: PlayerProgress,
    /// Per-level records, keyed by level number
    pub level_progress: BTreeMap<u8, LevelProgress>,
    /// Persisted settings
    pub settings: Settings,
    /// Checkpoint history for the run
    pub checkpoints: Vec<CheckpointRecord>,
    /// Timing bookkeeping
    pub timestamps: Timestamps,
}

impl Default for SaveData {
    fn default() -> Self {
        let mut level_progress = BTreeMap::new();
        for number in 1..=5u8 {
            level_progress.insert(
                number,
                LevelProgress {
                    unlocked: number == 1,
                    ..LevelProgress::default()
                },
            );
        }
        Self {
            current_level: 1,
            total_shards: TOTAL_SHARDS,
            player: PlayerProgress::default(),
            level_progress,
            settings: Settings::default(),
            checkpoints: Vec::new(),
            timestamps: Timestamps::default(),
        }
    }
}

impl SaveData {
    /// The secret level opens once every shard in the game is collected.
    pub fn is_secret_level_unlocked(&self) -> bool {
        self.player.collected_shards >= TOTAL_SHARDS
    }
}

/// A manual save slot on disk.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct SlotFile {
    name: String,
    saved_at: DateTime<Utc>,
    data: SaveData,
}

/// Condition of a save slot, for menu display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotStatus {
    /// Never written
    Empty,
    /// Present and readable
    Occupied,
    /// Present but unreadable
    Corrupted,
}

/// Summary of one save slot for the load menu.
#[derive(Clone, Debug)]
pub struct SlotInfo {
    /// Slot index (0-based)
    pub slot: usize,
    /// Condition
    pub status: SlotStatus,
    /// Display name
    pub name: String,
    /// When the slot was written
    pub saved_at: Option<DateTime<Utc>>,
    /// Level recorded in the slot
    pub level: u8,
    /// Shards recorded in the slot
    pub shards: u32,
}

/// Disk-backed save store.
///
/// Opening reads (or initializes) the main autosave file; every mutating
/// operation writes it back immediately.
#[derive(Debug)]
pub struct SaveStore {
    dir: PathBuf,
    data: SaveData,
    /// Checkpoint autosaves can be disabled (e.g. for practice runs).
    pub autosave_enabled: bool,
}

impl SaveStore {
    /// Open the store under `dir`, creating the directory and a fresh save
    /// file on first launch. An unreadable main file is replaced with
    /// defaults rather than failing the launch.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, SaveError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let main = dir.join(MAIN_FILE);
        let data = if main.exists() {
            match fs::read_to_string(&main)
                .map_err(SaveError::from)
                .and_then(|text| serde_json::from_str(&text).map_err(SaveError::from))
            {
                Ok(data) => {
                    info!(path = %main.display(), "save data loaded");
                    data
                }
                Err(err) => {
                    warn!(%err, "save data unreadable, starting fresh");
                    Self::fresh_data()
                }
            }
        } else {
            info!("no save data found, new game initialized");
            Self::fresh_data()
        };

        let mut store = Self {
            dir,
            data,
            autosave_enabled: true,
        };
        store.write_main()?;
        Ok(store)
    }

    fn fresh_data() -> SaveData {
        let now = Utc::now();
        let mut data = SaveData::default();
        data.timestamps.first_played = Some(now);
        data.timestamps.last_played = Some(now);
        data
    }

    /// Current save data.
    pub fn data(&self) -> &SaveData {
        &self.data
    }

    /// Mutable access for the session layer. Callers persist via
    /// [`flush`](Self::flush) when done.
    pub fn data_mut(&mut self) -> &mut SaveData {
        &mut self.data
    }

    /// Write the current data to the main save file.
    pub fn flush(&mut self) -> Result<(), SaveError> {
        self.data.timestamps.last_played = Some(Utc::now());
        self.write_main()
    }

    /// Record a checkpoint and persist, unless autosaving is disabled.
    pub fn autosave_at_checkpoint(
        &mut self,
        level: u8,
        position: Vec2,
    ) -> Result<(), SaveError> {
        if !self.autosave_enabled {
            return Ok(());
        }

        self.data.current_level = level;
        self.data.checkpoints.push(CheckpointRecord {
            level,
            position,
            timestamp: Utc::now(),
        });
        if let Some(progress) = self.data.level_progress.get_mut(&level) {
            progress.unlocked = true;
        }
        self.flush()?;
        info!(level, "autosaved at checkpoint");
        Ok(())
    }

    /// Copy the current data into a manual slot.
    pub fn save_slot(&mut self, slot: usize, name: Option<&str>) -> Result<(), SaveError> {
        let path = self.slot_path(slot)?;
        let file = SlotFile {
            name: name
                .map(str::to_owned)
                .unwrap_or_else(|| format!("Slot {}", slot + 1)),
            saved_at: Utc::now(),
            data: self.data.clone(),
        };
        fs::write(&path, serde_json::to_string_pretty(&file)?)?;
        info!(slot, "game saved to slot");
        Ok(())
    }

    /// Replace the current data with a slot's contents.
    pub fn load_slot(&mut self, slot: usize) -> Result<(), SaveError> {
        let path = self.slot_path(slot)?;
        if !path.exists() {
            return Err(SaveError::EmptySlot(slot));
        }
        let file: SlotFile = serde_json::from_str(&fs::read_to_string(&path)?)?;
        self.data = file.data;
        self.write_main()?;
        info!(slot, "game loaded from slot");
        Ok(())
    }

    /// Describe every slot for the load menu. Unreadable slots come back as
    /// [`SlotStatus::Corrupted`] instead of erroring.
    pub fn slot_info(&self) -> Vec<SlotInfo> {
        (0..SAVE_SLOTS)
            .map(|slot| {
                let path = self.dir.join(format!("slot_{slot}.json"));
                if !path.exists() {
                    return SlotInfo {
                        slot,
                        status: SlotStatus::Empty,
                        name: "Empty Slot".to_owned(),
                        saved_at: None,
                        level: 0,
                        shards: 0,
                    };
                }
                match fs::read_to_string(&path)
                    .map_err(SaveError::from)
                    .and_then(|text| {
                        serde_json::from_str::<SlotFile>(&text).map_err(SaveError::from)
                    }) {
                    Ok(file) => SlotInfo {
                        slot,
                        status: SlotStatus::Occupied,
                        name: file.name,
                        saved_at: Some(file.saved_at),
                        level: file.data.player.level,
                        shards: file.data.player.collected_shards,
                    },
                    Err(err) => {
                        warn!(slot, %err, "slot unreadable");
                        SlotInfo {
                            slot,
                            status: SlotStatus::Corrupted,
                            name: format!("Slot {} (Corrupted)", slot + 1),
                            saved_at: None,
                            level: 0,
                            shards: 0,
                        }
                    }
                }
            })
            .collect()
    }

    /// Mark a level completed, update its best time, add its shards to the
    /// overall total, and unlock the next level.
    pub fn mark_level_completed(
        &mut self,
        level: u8,
        shards: u32,
        completion_time_s: f64,
    ) -> Result<(), SaveError> {
        let Some(progress) = self.data.level_progress.get_mut(&level) else {
            return Ok(());
        };
        progress.completed = true;
        progress.shards = progress.shards.max(shards);
        if progress
            .best_time_s
            .map_or(true, |best| completion_time_s < best)
        {
            progress.best_time_s = Some(completion_time_s);
        }

        if let Some(next) = self.data.level_progress.get_mut(&(level + 1)) {
            next.unlocked = true;
        }
        self.data.player.collected_shards += shards;
        self.flush()
    }

    /// Merge new settings and persist.
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), SaveError> {
        self.data.settings = settings;
        self.flush()
    }

    /// Discard all progress and start over.
    pub fn reset(&mut self) -> Result<(), SaveError> {
        self.data = Self::fresh_data();
        self.write_main()
    }

    fn slot_path(&self, slot: usize) -> Result<PathBuf, SaveError> {
        if slot >= SAVE_SLOTS {
            return Err(SaveError::InvalidSlot(slot));
        }
        Ok(self.dir.join(format!("slot_{slot}.json")))
    }

    fn write_main(&mut self) -> Result<(), SaveError> {
        let path = self.dir.join(MAIN_FILE);
        fs::write(&path, serde_json::to_string_pretty(&self.data)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn temp_dir() -> PathBuf {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("lumina-save-test-{}-{n}", std::process::id()))
    }

    #[test]
    fn test_fresh_store_defaults() {
        let dir = temp_dir();
        let store = SaveStore::open(&dir).unwrap();

        let data = store.data();
        assert_eq!(data.current_level, 1);
        assert_eq!(data.total_shards, 75);
        assert_eq!(data.player.energy_orbs, 3);
        assert!(data.level_progress[&1].unlocked);
        assert!(!data.level_progress[&2].unlocked);
        assert!(data.timestamps.first_played.is_some());
        assert!(dir.join("save.json").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_reopen_preserves_progress() {
        let dir = temp_dir();
        {
            let mut store = SaveStore::open(&dir).unwrap();
            store.data_mut().player.collected_shards = 12;
            store.data_mut().current_level = 2;
            store.flush().unwrap();
        }
        let store = SaveStore::open(&dir).unwrap();
        assert_eq!(store.data().player.collected_shards, 12);
        assert_eq!(store.data().current_level, 2);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_autosave_records_checkpoint() {
        let dir = temp_dir();
        let mut store = SaveStore::open(&dir).unwrap();

        store
            .autosave_at_checkpoint(3, Vec2::new(1000.0, 600.0))
            .unwrap();
        assert_eq!(store.data().current_level, 3);
        assert_eq!(store.data().checkpoints.len(), 1);
        assert!(store.data().level_progress[&3].unlocked);

        store.autosave_enabled = false;
        store
            .autosave_at_checkpoint(4, Vec2::new(2000.0, 600.0))
            .unwrap();
        assert_eq!(store.data().checkpoints.len(), 1, "autosave disabled");
        assert_eq!(store.data().current_level, 3);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_slot_roundtrip() {
        let dir = temp_dir();
        let mut store = SaveStore::open(&dir).unwrap();

        store.data_mut().player.collected_shards = 30;
        store.data_mut().player.level = 2;
        store.save_slot(0, Some("before the peaks")).unwrap();

        store.data_mut().player.collected_shards = 50;
        store.load_slot(0).unwrap();
        assert_eq!(store.data().player.collected_shards, 30);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_invalid_and_empty_slots() {
        let dir = temp_dir();
        let mut store = SaveStore::open(&dir).unwrap();

        assert!(matches!(
            store.save_slot(SAVE_SLOTS, None),
            Err(SaveError::InvalidSlot(_))
        ));
        assert!(matches!(store.load_slot(1), Err(SaveError::EmptySlot(1))));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_slot_info_statuses() {
        let dir = temp_dir();
        let mut store = SaveStore::open(&dir).unwrap();

        store.save_slot(0, Some("canopy run")).unwrap();
        fs::write(dir.join("slot_1.json"), "{ not json").unwrap();

        let info = store.slot_info();
        assert_eq!(info.len(), SAVE_SLOTS);
        assert_eq!(info[0].status, SlotStatus::Occupied);
        assert_eq!(info[0].name, "canopy run");
        assert_eq!(info[1].status, SlotStatus::Corrupted);
        assert_eq!(info[2].status, SlotStatus::Empty);
        assert_eq!(info[2].name, "Empty Slot");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_mark_level_completed() {
        let dir = temp_dir();
        let mut store = SaveStore::open(&dir).unwrap();

        store.mark_level_completed(1, 15, 120.0).unwrap();
        let progress = &store.data().level_progress[&1];
        assert!(progress.completed);
        assert_eq!(progress.shards, 15);
        assert_eq!(progress.best_time_s, Some(120.0));
        assert!(store.data().level_progress[&2].unlocked);
        assert_eq!(store.data().player.collected_shards, 15);

        // Slower rerun keeps the best time
        store.mark_level_completed(1, 15, 300.0).unwrap();
        assert_eq!(store.data().level_progress[&1].best_time_s, Some(120.0));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_secret_level_unlock() {
        let mut data = SaveData::default();
        assert!(!data.is_secret_level_unlocked());
        data.player.collected_shards = 75;
        assert!(data.is_secret_level_unlocked());
    }

    #[test]
    fn test_corrupted_main_file_starts_fresh() {
        let dir = temp_dir();
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("save.json"), "garbage").unwrap();

        let store = SaveStore::open(&dir).unwrap();
        assert_eq!(store.data().current_level, 1);

        let _ = fs::remove_dir_all(&dir);
    }
}

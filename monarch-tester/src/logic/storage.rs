//! Snapshot persistence as pretty-printed JSON files, one per slot.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use monarch_game::{GameState, GameStorage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid save slot name {0:?}")]
    InvalidSlot(String),
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed snapshot {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Stores each save as `<dir>/<slot>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File backing `slot`. Slot names must be plain file stems.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidSlot`] for empty names or names that
    /// would escape the save directory.
    pub fn slot_path(&self, slot: &str) -> Result<PathBuf, StorageError> {
        let valid = !slot.is_empty()
            && slot
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !slot.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidSlot(slot.to_string()));
        }
        Ok(self.dir.join(format!("{slot}.json")))
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl GameStorage for JsonFileStorage {
    type Error = StorageError;

    fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), Self::Error> {
        let path = self.slot_path(save_name)?;
        fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;
        let json = serde_json::to_string_pretty(game_state).map_err(|source| StorageError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(io_error(&path))?;
        debug!("saved day {} to {}", game_state.calendar.day, path.display());
        Ok(())
    }

    fn load_game(&self, save_name: &str) -> Result<Option<GameState>, Self::Error> {
        let path = self.slot_path(save_name)?;
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_error(&path)(err)),
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| StorageError::Json { path, source })
    }

    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error> {
        let path = self.slot_path(save_name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&path)(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monarch_game::{DifficultyLevel, GameEngine, GameSettings, MapDifficulty, MapSize};

    fn scratch_dir(tag: &str) -> PathBuf {
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%f");
        std::env::temp_dir().join(format!("monarch-{tag}-{}-{stamp}", std::process::id()))
    }

    #[test]
    fn slots_round_trip_through_the_engine() {
        let dir = scratch_dir("roundtrip");
        let engine = GameEngine::new(JsonFileStorage::new(&dir));
        let mut game = engine.create_game(
            GameSettings::new(DifficultyLevel::Normal, MapDifficulty::Moderate, MapSize::Small)
                .with_seed(21),
        );
        assert!(game.advance(0.4).is_ok());

        engine.save_game("slot-1", &game).expect("save");
        assert!(dir.join("slot-1.json").is_file());
        let loaded = engine.load_game("slot-1").expect("load").expect("present");
        assert_eq!(loaded.state(), game.state());

        engine.delete_game("slot-1").expect("delete");
        assert!(engine.load_game("slot-1").expect("load").is_none());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_slots_and_repeat_deletes_are_not_errors() {
        let storage = JsonFileStorage::new(scratch_dir("missing"));
        assert!(matches!(storage.load_game("nobody"), Ok(None)));
        assert!(storage.delete_save("nobody").is_ok());
    }

    #[test]
    fn slot_names_cannot_escape_the_directory() {
        let storage = JsonFileStorage::new(scratch_dir("escape"));
        for bad in ["", "../etc", "a/b", ".hidden"] {
            assert!(matches!(storage.slot_path(bad), Err(StorageError::InvalidSlot(_))), "{bad}");
        }
        assert!(storage.slot_path("day-3_final").is_ok());
    }

    #[test]
    fn corrupt_files_surface_as_json_errors() {
        let dir = scratch_dir("corrupt");
        fs::create_dir_all(&dir).expect("dir");
        fs::write(dir.join("broken.json"), "{ not json").expect("write");
        let storage = JsonFileStorage::new(&dir);
        assert!(matches!(storage.load_game("broken"), Err(StorageError::Json { .. })));
        let _ = fs::remove_dir_all(&dir);
    }
}

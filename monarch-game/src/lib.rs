//! Monarch Game Engine
//!
//! Platform-agnostic simulation core for a territory-expansion strategy game:
//! a procedurally generated tree of roads, settlements that grow and produce
//! gold, walls, a population ledger, nightly frontier attacks and daytime
//! sorties against enemy strongholds. Rendering, input and persistence
//! backends live outside this crate.

pub mod combat;
pub mod constants;
pub mod construction;
pub mod error;
pub mod housing;
pub mod instance;
pub mod map;
pub mod mapgen;
pub mod numbers;
pub mod population;
pub mod settings;
pub mod settlement;
pub mod state;
pub mod wall;

// Re-export commonly used types
pub use combat::{FrontierAttack, Sortie, SortieOutcome, Stronghold};
pub use construction::{Construction, ConstructionEvent, ConstructionPhase};
pub use error::{CommandError, GameOver, MapGenConfigError};
pub use housing::{GrowthModifier, HousingTracker};
pub use instance::GameInstance;
pub use map::{Direction, GridPos, Heading, Map, MapEdge, MapNode, NodeId, Point};
pub use mapgen::{MapDifficulty, MapGenConfig, MapSize, generate};
pub use population::{Population, SubjectType};
pub use settings::{DifficultyLevel, GameSettings};
pub use settlement::{Settlement, SettlementEvent, SettlementKind, SettlementType};
pub use state::{Calendar, DayPhase, GameState, Ruler, RulerPosition, SpecialRetinue};
pub use wall::Wall;

/// Trait for abstracting save/load operations.
/// Platform-specific implementations should provide this.
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a snapshot under `save_name`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), Self::Error>;

    /// Load the snapshot stored under `save_name`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot exists but cannot be read.
    fn load_game(&self, save_name: &str) -> Result<Option<GameState>, Self::Error>;

    /// Delete a saved game.
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error>;
}

/// Main game engine for creating, saving and resuming game instances.
pub struct GameEngine<S>
where
    S: GameStorage,
{
    storage: S,
}

impl<S> GameEngine<S>
where
    S: GameStorage,
{
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Generate a fresh world.
    #[must_use]
    pub fn create_game(&self, settings: GameSettings) -> GameInstance {
        GameInstance::new(settings)
    }

    /// Save a game's state.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn save_game(&self, save_name: &str, game: &GameInstance) -> Result<(), S::Error> {
        self.storage.save_game(save_name, game.state())
    }

    /// Resume a saved game. The RNG is not part of the snapshot, so a
    /// resumed game draws fresh randomness.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails or the snapshot is
    /// malformed.
    pub fn load_game(&self, save_name: &str) -> Result<Option<GameInstance>, anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        let Some(state) = self.storage.load_game(save_name).map_err(Into::into)? else {
            return Ok(None);
        };
        if !state.is_consistent() {
            anyhow::bail!("save {save_name} holds an inconsistent game state");
        }
        Ok(Some(GameInstance::from_state(state)))
    }

    /// Delete a saved game.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn delete_game(&self, save_name: &str) -> Result<(), S::Error> {
        self.storage.delete_save(save_name)
    }
}

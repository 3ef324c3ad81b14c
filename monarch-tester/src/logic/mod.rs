pub mod pacing;
pub mod policy;
pub mod reports;
pub mod seeds;
pub mod simulation;
pub mod storage;

pub use pacing::Pacing;
pub use policy::GameplayStrategy;
pub use seeds::resolve_seed_inputs;
pub use simulation::{RunConfig, RunSummary, run_seeds};
pub use storage::JsonFileStorage;

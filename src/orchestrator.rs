//! The search façade: sequences every stage of a search call and owns the
//! shared cache and analytics.

pub mod config;
pub mod engine;
pub mod events;
pub mod state;

pub use config::EngineConfig;
pub use engine::SearchOrchestrator;
pub use events::SearchEvent;
pub use state::SearchState;

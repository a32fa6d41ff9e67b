//! Bundled [`ContentSource`](crate::federation::ContentSource)
//! implementations.

pub mod loader;
pub mod memory;

pub use loader::{load_items, load_source};
pub use memory::MemorySource;

//! Shared utility modules used across fedsearch components.

pub mod clock;
pub mod serde_millis;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};

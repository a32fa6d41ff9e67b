//! Result items returned by content sources.
//!
//! A [`ResultItem`] is the unit every content source produces and every later
//! pipeline stage (filtering, ranking, pagination, caching) operates on. The
//! closed vocabularies used for filtering live in [`fields`].

pub mod fields;
pub mod item;

pub use fields::{Category, ContentType, Language};
pub use item::ResultItem;

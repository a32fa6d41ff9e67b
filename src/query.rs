//! Query text handling.

pub mod normalizer;

pub use self::normalizer::{QueryNormalizer, normalize, tokenize};

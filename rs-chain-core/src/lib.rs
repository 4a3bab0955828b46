//! Multi-order Markov chains for procedural generation.
//!
//! This crate provides:
//! - A generic chain over any `Eq + Hash + Clone` state (letters, words, custom types)
//! - Training on sequences with every context order up to `max_order`
//! - Katz back-off retrieval of the most specific known context
//! - Weighted and uniform sampling with an injectable random source
//! - Prior injection and weak-link pruning for smoothing
//! - Compact binary persistence of trained chains

/// Chain, link distributions, configuration and errors.
pub mod model;

/// Saving and loading chains (postcard encoding).
pub mod io;

pub use model::chain::MarkovChain;
pub use model::config::{ChainConfig, DEFAULT_MAX_ORDER, DEFAULT_PRIOR, DEFAULT_WEAK_LINK_THRESHOLD};
pub use model::error::{ChainError, PersistError};
pub use model::snapshot::ChainSnapshot;
pub use model::transitions::Transitions;

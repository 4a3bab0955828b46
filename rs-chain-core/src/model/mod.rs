//! Top-level module for the multi-order Markov chain.
//!
//! This module provides:
//! - The chain itself, with training, back-off and sampling (`MarkovChain`)
//! - Per-context link distributions (`Transitions`)
//! - Chain configuration and defaults (`ChainConfig`)
//! - A serializable picture of a chain (`ChainSnapshot`)
//! - Error types (`ChainError`, `PersistError`)

/// Multi-order Markov chain over arbitrary hashable states.
///
/// Trains on sequences, resolves contexts with Katz back-off, draws the
/// next state and manages priors.
pub mod chain;

/// Configuration (`max_order`) and default prior and pruning weights.
pub mod config;

/// Error types returned by the chain and the persistence layer.
pub mod error;

/// Serializable snapshot of a chain, without its random source.
pub mod snapshot;

/// Outgoing links of a single context.
///
/// Accumulates weights and supports weighted and uniform sampling.
pub mod transitions;

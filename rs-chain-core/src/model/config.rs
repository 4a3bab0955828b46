use serde::{Deserialize, Serialize};

use super::error::ChainError;

/// Longest context length learned and queried when none is configured.
pub const DEFAULT_MAX_ORDER: usize = 3;

/// Weight given to unobserved links by `add_default_priors`.
pub const DEFAULT_PRIOR: f64 = 0.005;

/// Threshold used by `remove_default_weak_links`.
///
/// Real training increments are always 1.0, so anything below it was
/// injected as a prior (or specified by hand).
pub const DEFAULT_WEAK_LINK_THRESHOLD: f64 = 1.0;

/// Configuration of a `MarkovChain`.
///
/// # Invariants
/// - `max_order` is always >= 1
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainConfig {
	/// Longest context the chain will learn or query.
	max_order: usize,
}

impl ChainConfig {
	/// Creates a configuration with the given `max_order`.
	///
	/// # Errors
	/// Returns `ChainError::InvalidOrder` if `max_order` is 0.
	pub fn new(max_order: usize) -> Result<Self, ChainError> {
		let mut config = Self::default();
		config.set_max_order(max_order)?;
		Ok(config)
	}

	/// Returns the longest context length.
	pub fn max_order(&self) -> usize {
		self.max_order
	}

	/// Sets the longest context length.
	///
	/// Contexts learned under a previous value are kept as they are.
	///
	/// # Errors
	/// Returns `ChainError::InvalidOrder` if `max_order` is 0.
	pub fn set_max_order(&mut self, max_order: usize) -> Result<(), ChainError> {
		if max_order == 0 {
			return Err(ChainError::InvalidOrder(max_order));
		}
		self.max_order = max_order;
		Ok(())
	}
}

impl Default for ChainConfig {
	fn default() -> Self {
		Self { max_order: DEFAULT_MAX_ORDER }
	}
}

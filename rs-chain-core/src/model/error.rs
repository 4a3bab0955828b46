/// Errors returned by `MarkovChain` operations.
///
/// Every failure is reported synchronously; nothing is retried internally.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChainError {
	/// A training sequence was too short, or a query context was empty
	/// or contained a state the chain has never seen.
	#[error("invalid input: {0}")]
	InvalidInput(String),

	/// The last state of the query context is terminal: it was only ever
	/// observed at the end of a sequence.
	#[error("there are no known links possible from this state")]
	NoTransitionsAvailable,

	/// `max_order` must be at least 1.
	#[error("max order must be >= 1, got {0}")]
	InvalidOrder(usize),

	/// Link weights must be finite and non-negative.
	#[error("weight must be finite and >= 0.0, got {0}")]
	InvalidWeight(f64),

	/// Two chains can only be merged when they share the same `max_order`.
	#[error("max order mismatch: self={expected}, other={actual}")]
	OrderMismatch { expected: usize, actual: usize },
}

/// Errors returned while saving or restoring a chain.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
	#[error("i/o error: {0}")]
	Io(#[from] std::io::Error),

	#[error("encoding error: {0}")]
	Encoding(#[from] postcard::Error),

	/// The decoded snapshot describes a chain that cannot exist.
	#[error("invalid snapshot: {0}")]
	Chain(#[from] ChainError),
}

/// Validates a weight passed to `specify_link` or `add_priors`.
pub(crate) fn check_weight(weight: f64) -> Result<(), ChainError> {
	if !weight.is_finite() || weight < 0.0 {
		return Err(ChainError::InvalidWeight(weight));
	}
	Ok(())
}

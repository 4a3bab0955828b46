use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use super::transitions::Transitions;

/// Serializable picture of a `MarkovChain`.
///
/// Holds everything that takes part in chain equality: the model, the known
/// states, `max_order` and the trained-sequence counter. The random source is
/// not part of it; a restored chain gets a fresh one.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChainSnapshot<T: Eq + Hash> {
	pub(crate) model: HashMap<Vec<T>, Transitions<T>>,
	pub(crate) known_states: HashSet<T>,
	pub(crate) max_order: usize,
	pub(crate) num_trained_sequences: usize,
}

impl<T: Eq + Hash> ChainSnapshot<T> {
	pub fn max_order(&self) -> usize {
		self.max_order
	}

	pub fn num_trained_sequences(&self) -> usize {
		self.num_trained_sequences
	}
}

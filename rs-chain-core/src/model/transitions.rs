use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use rand::Rng;
use rand::seq::IteratorRandom;

use serde::{Deserialize, Serialize};


/// Outgoing links of a single context.
///
/// A `Transitions` is the distribution stored under one context key: every
/// state observed (or specified) after that context, with its accumulated
/// weight. Weights are unnormalized frequencies, not probabilities.
///
/// ## Responsibilities:
/// - Accumulate link weights during learning
/// - Draw the next state, weighted or uniformly
/// - Fill in and prune prior weights
/// - Merge with the distribution of the same context from another chain
///
/// ## Invariants
/// - Every weight is finite and >= 0.0 (sums saturate at `f64::MAX`)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Transitions<T: Eq + Hash> {
	/// Outgoing links indexed by the next state.
	/// Example: { 'e' => 42.0, 'a' => 3.0, 'z' => 0.005 }
	weights: HashMap<T, f64>,
}

impl<T: Eq + Hash> Transitions<T> {
	/// Creates an empty distribution.
	pub fn new() -> Self {
		Self { weights: HashMap::new() }
	}

	/// Creates a distribution holding a single link.
	pub fn single(next: T, weight: f64) -> Self {
		let mut transitions = Self::new();
		transitions.weights.insert(next, weight);
		transitions
	}

	/// Records one observed occurrence of a link toward `next`.
	pub fn add_transition(&mut self, next: T) {
		self.add_weight(next, 1.0);
	}

	/// Adds `weight` to the link toward `next`, creating it if absent.
	///
	/// The sum saturates at `f64::MAX`.
	pub fn add_weight(&mut self, next: T, weight: f64) {
		let entry = self.weights.entry(next).or_insert(0.0);
		*entry = (*entry + weight).min(f64::MAX);
	}

	/// Returns the weight of the link toward `next`, if any.
	pub fn weight(&self, next: &T) -> Option<f64> {
		self.weights.get(next).copied()
	}

	/// Returns `true` if a link toward `next` exists.
	pub fn contains(&self, next: &T) -> bool {
		self.weights.contains_key(next)
	}

	pub fn len(&self) -> usize {
		self.weights.len()
	}

	pub fn is_empty(&self) -> bool {
		self.weights.is_empty()
	}

	/// Sum of all link weights.
	pub fn total_weight(&self) -> f64 {
		self.weights.values().sum()
	}

	/// Iterates over the reachable states.
	pub fn states(&self) -> impl Iterator<Item = &T> {
		self.weights.keys()
	}

	/// Iterates over `(state, weight)` pairs.
	pub fn iter(&self) -> impl Iterator<Item = (&T, f64)> {
		self.weights.iter().map(|(state, weight)| (state, *weight))
	}

	/// Draws the next state with probability proportional to its weight.
	///
	/// A roll is drawn in `[0, total)` and the links are walked in map order,
	/// subtracting each weight until the roll fits. Zero-weight links are never
	/// picked. If rounding lets the roll slip past every link, the last walked
	/// link is returned.
	///
	/// When the sum overflows, weights are walked relative to the largest one.
	/// If every weight is zero there is nothing to be proportional to, and the
	/// draw falls back to `predict_uniform`.
	///
	/// Returns `None` only if there are no links.
	pub fn predict<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
		if self.weights.is_empty() {
			return None;
		}

		let mut scale = 1.0;
		let mut total = self.total_weight();
		if !total.is_finite() {
			scale = self.weights.values().fold(0.0, |max: f64, weight| max.max(*weight));
			total = self.weights.values().map(|weight| weight / scale).sum();
		}
		if total <= 0.0 {
			return self.predict_uniform(rng);
		}

		let mut roll = rng.random_range(0.0..total);

		let mut fallback: Option<&T> = None;
		for (next, weight) in &self.weights {
			let weight = weight / scale;
			if weight <= 0.0 {
				continue;
			}
			if roll <= weight {
				return Some(next);
			}
			roll -= weight;
			fallback = Some(next);
		}

		fallback
	}

	/// Draws one of the reachable states uniformly, ignoring weights.
	pub fn predict_uniform<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
		self.weights.keys().choose(rng)
	}

	/// Removes every link whose weight is strictly below `threshold`.
	///
	/// Returns the number of links removed.
	pub fn retain_at_least(&mut self, threshold: f64) -> usize {
		let before = self.weights.len();
		self.weights.retain(|_, weight| *weight >= threshold);
		before - self.weights.len()
	}

	/// Merges another distribution into this one, summing weights.
	pub fn merge(&mut self, other: &Self)
	where
		T: Clone,
	{
		for (next, weight) in &other.weights {
			self.add_weight(next.clone(), *weight);
		}
	}
}

impl<T: Eq + Hash + Clone> Transitions<T> {
	/// Gives `weight` to every state of `alphabet` that has no link yet.
	///
	/// Existing links are never overwritten. Returns the number of links added.
	pub fn fill_missing(&mut self, alphabet: &HashSet<T>, weight: f64) -> usize {
		let mut added = 0;
		for state in alphabet {
			if !self.weights.contains_key(state) {
				self.weights.insert(state.clone(), weight);
				added += 1;
			}
		}
		added
	}
}

impl<T: Eq + Hash> Default for Transitions<T> {
	fn default() -> Self {
		Self::new()
	}
}

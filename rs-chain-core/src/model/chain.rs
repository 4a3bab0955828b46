use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::{ChainConfig, DEFAULT_PRIOR, DEFAULT_WEAK_LINK_THRESHOLD};
use super::error::{ChainError, check_weight};
use super::snapshot::ChainSnapshot;
use super::transitions::Transitions;

/// Context (1..=max_order preceding states) mapped to its outgoing links.
pub type Model<T> = HashMap<Vec<T>, Transitions<T>>;

/// Multi-order Markov chain over arbitrary hashable states.
///
/// The chain learns, for every context of 1 to `max_order` consecutive
/// states, how often each state followed it. Queries use Katz back-off: the
/// longest trailing context that was ever observed wins, shorter ones are
/// used when the longer ones are unknown.
///
/// # Responsibilities
/// - Train on sequences, accumulating link weights for every order
/// - Resolve the most specific distribution for a query context
/// - Draw the next state (weighted or uniform) with an owned random source
/// - Add priors for unobserved links and prune weak links
/// - Accept directly specified links
///
/// # Invariants
/// - Every state appearing in the model is in `known_states`
/// - `known_states` never shrinks
/// - No context key maps to an empty distribution
///
/// The chain is not synchronized. Share it behind a `Mutex` if needed.
#[derive(Debug, Clone)]
pub struct MarkovChain<T: Eq + Hash, R = StdRng> {
	/// Learned links, keyed by context.
	model: Model<T>,
	/// Every state ever seen, the "alphabet" of the chain.
	known_states: HashSet<T>,
	config: ChainConfig,
	/// Number of sequences successfully trained.
	num_trained_sequences: usize,
	/// Random source used by the samplers.
	rng: R,
}

impl<T: Eq + Hash + Clone> MarkovChain<T> {
	/// Creates an empty chain with the default configuration and an
	/// OS-seeded random source.
	pub fn new() -> Self {
		Self::with_config(ChainConfig::default())
	}

	/// Creates an empty chain with the given configuration.
	pub fn with_config(config: ChainConfig) -> Self {
		Self::from_parts(config, StdRng::from_os_rng())
	}

	/// Creates an empty chain whose random source is seeded with `seed`.
	pub fn seeded(seed: u64) -> Self {
		Self::from_parts(ChainConfig::default(), StdRng::seed_from_u64(seed))
	}

	/// Rebuilds a chain from a snapshot, with a fresh random source.
	///
	/// # Errors
	/// Returns `ChainError::InvalidOrder` if the snapshot carries a zero
	/// `max_order`.
	pub fn from_snapshot(snapshot: ChainSnapshot<T>) -> Result<Self, ChainError> {
		let config = ChainConfig::new(snapshot.max_order)?;
		Ok(Self {
			model: snapshot.model,
			known_states: snapshot.known_states,
			config,
			num_trained_sequences: snapshot.num_trained_sequences,
			rng: StdRng::from_os_rng(),
		})
	}
}

impl<T: Eq + Hash + Clone> Default for MarkovChain<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Eq + Hash + Clone, R: Rng> MarkovChain<T, R> {
	/// Creates an empty chain from a configuration and a random source.
	pub fn from_parts(config: ChainConfig, rng: R) -> Self {
		Self {
			model: HashMap::new(),
			known_states: HashSet::new(),
			config,
			num_trained_sequences: 0,
			rng,
		}
	}

	/// Builder-style setter for `max_order`.
	///
	/// # Errors
	/// Returns `ChainError::InvalidOrder` if `max_order` is 0.
	pub fn with_max_order(mut self, max_order: usize) -> Result<Self, ChainError> {
		self.set_max_order(max_order)?;
		Ok(self)
	}

	/// Swaps the random source, possibly for one of another type.
	pub fn with_rng<R2: Rng>(self, rng: R2) -> MarkovChain<T, R2> {
		MarkovChain {
			model: self.model,
			known_states: self.known_states,
			config: self.config,
			num_trained_sequences: self.num_trained_sequences,
			rng,
		}
	}

	/// Replaces the random source.
	pub fn set_rng(&mut self, rng: R) {
		self.rng = rng;
	}

	pub fn max_order(&self) -> usize {
		self.config.max_order()
	}

	/// Changes the longest context used by later training and queries.
	///
	/// Already learned contexts are left untouched.
	///
	/// # Errors
	/// Returns `ChainError::InvalidOrder` if `max_order` is 0.
	pub fn set_max_order(&mut self, max_order: usize) -> Result<(), ChainError> {
		self.config.set_max_order(max_order)?;
		debug!("max order set to {}", max_order);
		Ok(())
	}

	pub fn config(&self) -> &ChainConfig {
		&self.config
	}

	pub fn num_trained_sequences(&self) -> usize {
		self.num_trained_sequences
	}

	/// Returns `true` once at least one link is known.
	pub fn has_model(&self) -> bool {
		!self.model.is_empty()
	}

	/// All states the chain has seen.
	pub fn all_known_states(&self) -> &HashSet<T> {
		&self.known_states
	}

	/// Read-only view of the learned links.
	pub fn model(&self) -> &Model<T> {
		&self.model
	}

	/// Weight of the link `context -> next`, if it exists.
	pub fn weight(&self, context: &[T], next: &T) -> Option<f64> {
		self.model.get(context)?.weight(next)
	}

	/// Trains the chain on one sequence.
	///
	/// For every position `p` after the first and every order `o` from 1 to
	/// `min(max_order, p)`, the link from the `o` states before `p` to the
	/// state at `p` gains 1.0.
	///
	/// The sequence is validated before anything is modified: a failed call
	/// leaves the chain, including its known states, untouched.
	///
	/// # Errors
	/// Returns `ChainError::InvalidInput` if the sequence has fewer than two
	/// states.
	pub fn add_sequence(&mut self, sequence: &[T]) -> Result<(), ChainError> {
		if sequence.len() < 2 {
			return Err(ChainError::InvalidInput(format!(
				"input sequence must include at least two states, got {}",
				sequence.len()
			)));
		}

		self.known_states.extend(sequence.iter().cloned());

		let max_order = self.config.max_order();
		let mut links = 0;
		for position in 1..sequence.len() {
			let target = &sequence[position];
			for order in 1..=max_order.min(position) {
				self.implement_link(&sequence[position - order..position], target.clone());
				links += 1;
			}
		}

		self.num_trained_sequences += 1;
		debug!("trained sequence of {} states ({} links)", sequence.len(), links);
		Ok(())
	}

	/// Trains the chain on many sequences.
	///
	/// Sequences shorter than two states are skipped instead of failing the
	/// whole batch. Returns the number of sequences actually trained.
	pub fn train<I, S>(&mut self, sequences: I) -> usize
	where
		I: IntoIterator<Item = S>,
		S: AsRef<[T]>,
	{
		let mut trained = 0;
		for sequence in sequences {
			match self.add_sequence(sequence.as_ref()) {
				Ok(()) => trained += 1,
				Err(e) => debug!("skipping training sequence: {}", e),
			}
		}
		trained
	}

	fn implement_link(&mut self, context: &[T], target: T) {
		match self.model.get_mut(context) {
			Some(transitions) => transitions.add_transition(target),
			None => {
				let mut transitions = Transitions::new();
				transitions.add_transition(target);
				self.model.insert(context.to_vec(), transitions);
			}
		}
	}

	/// Sets the links of `context` to exactly `{target: weight}`.
	///
	/// Unlike training this is an overwrite: any other link previously known
	/// from that exact context is discarded.
	///
	/// # Errors
	/// - `ChainError::InvalidInput` if `context` is empty or longer than `max_order`
	/// - `ChainError::InvalidWeight` if `weight` is negative or not finite
	pub fn specify_link(&mut self, context: &[T], target: T, weight: f64) -> Result<(), ChainError> {
		if context.is_empty() {
			return Err(ChainError::InvalidInput("context must include at least one state".to_owned()));
		}
		if context.len() > self.config.max_order() {
			return Err(ChainError::InvalidInput(format!(
				"context of {} states exceeds max order {}",
				context.len(),
				self.config.max_order()
			)));
		}
		check_weight(weight)?;

		self.known_states.extend(context.iter().cloned());
		self.known_states.insert(target.clone());
		self.model.insert(context.to_vec(), Transitions::single(target, weight));
		Ok(())
	}

	/// Returns the most specific distribution known for `context`.
	///
	/// # Errors
	/// - `ChainError::InvalidInput` if `context` is empty or holds an unknown state
	/// - `ChainError::NoTransitionsAvailable` if the last state is terminal
	pub fn best_model(&self, context: &[T]) -> Result<&Transitions<T>, ChainError> {
		resolve(&self.model, &self.known_states, self.config.max_order(), context)
	}

	/// Every state that may follow `context`.
	///
	/// A terminal last state yields an empty set rather than an error.
	///
	/// # Errors
	/// Returns `ChainError::InvalidInput` if `context` is empty or holds an
	/// unknown state.
	pub fn all_possible_next(&self, context: &[T]) -> Result<HashSet<T>, ChainError> {
		match self.best_model(context) {
			Ok(transitions) => Ok(transitions.states().cloned().collect()),
			Err(ChainError::NoTransitionsAvailable) => Ok(HashSet::new()),
			Err(e) => Err(e),
		}
	}

	/// Draws the next state with probability proportional to link weights.
	///
	/// # Errors
	/// Same as `best_model`.
	pub fn weighted_random_next(&mut self, context: &[T]) -> Result<T, ChainError> {
		let transitions = resolve(&self.model, &self.known_states, self.config.max_order(), context)?;
		transitions.predict(&mut self.rng).cloned().ok_or(ChainError::NoTransitionsAvailable)
	}

	/// Draws the next state uniformly among the possible ones.
	///
	/// # Errors
	/// Same as `best_model`.
	pub fn unweighted_random_next(&mut self, context: &[T]) -> Result<T, ChainError> {
		let transitions = resolve(&self.model, &self.known_states, self.config.max_order(), context)?;
		transitions.predict_uniform(&mut self.rng).cloned().ok_or(ChainError::NoTransitionsAvailable)
	}

	/// Gives `weight` to every unobserved link from every known context.
	///
	/// Existing links keep their weight and no context is created, so terminal
	/// states stay terminal. Calling it again only adds links toward states
	/// learned in between.
	///
	/// # Errors
	/// Returns `ChainError::InvalidWeight` if `weight` is negative or not finite.
	pub fn add_priors(&mut self, weight: f64) -> Result<(), ChainError> {
		check_weight(weight)?;
		self.fill_priors(weight);
		Ok(())
	}

	/// `add_priors` with `DEFAULT_PRIOR`.
	pub fn add_default_priors(&mut self) {
		self.fill_priors(DEFAULT_PRIOR);
	}

	fn fill_priors(&mut self, weight: f64) {
		let mut added = 0;
		for transitions in self.model.values_mut() {
			added += transitions.fill_missing(&self.known_states, weight);
		}
		debug!("added {} priors of weight {}", added, weight);
	}

	/// Removes every link whose weight is strictly below `threshold`.
	///
	/// With a threshold of 1.0 this undoes `add_priors` for any prior weight
	/// below 1.0. Contexts left without links are dropped.
	///
	/// # Errors
	/// Returns `ChainError::InvalidWeight` if `threshold` is not finite.
	pub fn remove_weak_links(&mut self, threshold: f64) -> Result<(), ChainError> {
		if !threshold.is_finite() {
			return Err(ChainError::InvalidWeight(threshold));
		}
		self.prune_below(threshold);
		Ok(())
	}

	fn prune_below(&mut self, threshold: f64) {
		let mut removed = 0;
		for transitions in self.model.values_mut() {
			removed += transitions.retain_at_least(threshold);
		}

		let contexts = self.model.len();
		self.model.retain(|_, transitions| !transitions.is_empty());

		debug!(
			"removed {} links below {} ({} emptied contexts dropped)",
			removed,
			threshold,
			contexts - self.model.len()
		);
	}

	/// `remove_weak_links` with `DEFAULT_WEAK_LINK_THRESHOLD`.
	pub fn remove_default_weak_links(&mut self) {
		self.prune_below(DEFAULT_WEAK_LINK_THRESHOLD);
	}

	/// Merges another chain into this one.
	///
	/// Link weights are summed, known states are joined and trained sequence
	/// counts are added. Useful to combine chains trained separately.
	///
	/// # Errors
	/// Returns `ChainError::OrderMismatch` if the chains have a different
	/// `max_order`.
	pub fn merge<R2>(&mut self, other: &MarkovChain<T, R2>) -> Result<(), ChainError> {
		if self.config.max_order() != other.config.max_order() {
			return Err(ChainError::OrderMismatch {
				expected: self.config.max_order(),
				actual: other.config.max_order(),
			});
		}

		for (context, transitions) in &other.model {
			if let Some(existing) = self.model.get_mut(context) {
				existing.merge(transitions);
			} else {
				self.model.insert(context.clone(), transitions.clone());
			}
		}

		self.known_states.extend(other.known_states.iter().cloned());
		self.num_trained_sequences += other.num_trained_sequences;

		Ok(())
	}

	/// Copies everything that takes part in equality into a snapshot.
	pub fn snapshot(&self) -> ChainSnapshot<T> {
		ChainSnapshot {
			model: self.model.clone(),
			known_states: self.known_states.clone(),
			max_order: self.config.max_order(),
			num_trained_sequences: self.num_trained_sequences,
		}
	}
}

impl<T: Eq + Hash + Clone, R: SeedableRng> MarkovChain<T, R> {
	/// Re-seeds the random source, making the following draws reproducible.
	pub fn reseed(&mut self, seed: u64) {
		self.rng = R::seed_from_u64(seed);
	}
}

/// Two chains are equal when their model, known states, `max_order` and
/// trained sequence count are equal. The random source is ignored.
impl<T: Eq + Hash, R, R2> PartialEq<MarkovChain<T, R2>> for MarkovChain<T, R> {
	fn eq(&self, other: &MarkovChain<T, R2>) -> bool {
		self.config == other.config
			&& self.num_trained_sequences == other.num_trained_sequences
			&& self.known_states == other.known_states
			&& self.model == other.model
	}
}

/// Katz back-off over `model`.
///
/// Checks that every state of `context` is known and that its last state has
/// outgoing links, then returns the distribution of the longest trailing
/// sub-context (at most `max_order` states) present in the model.
fn resolve<'a, T: Eq + Hash>(
	model: &'a Model<T>,
	known_states: &HashSet<T>,
	max_order: usize,
	context: &[T],
) -> Result<&'a Transitions<T>, ChainError> {
	if context.is_empty() {
		return Err(ChainError::InvalidInput("context must include at least one state".to_owned()));
	}
	if let Some(position) = context.iter().position(|state| !known_states.contains(state)) {
		return Err(ChainError::InvalidInput(format!(
			"the state at position {} is unknown to this model",
			position
		)));
	}

	let len = context.len();
	let shortest = model
		.get(&context[len - 1..])
		.filter(|transitions| !transitions.is_empty())
		.ok_or(ChainError::NoTransitionsAvailable)?;

	for order in (2..=max_order.min(len)).rev() {
		if let Some(transitions) = model.get(&context[len - order..]).filter(|t| !t.is_empty()) {
			trace!("resolved context at order {}", order);
			return Ok(transitions);
		}
	}

	trace!("resolved context at order 1");
	Ok(shortest)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::rngs::SmallRng;

	const FIRST: [&str; 5] = ["one", "small", "step", "for", "man"];
	const SECOND: [&str; 5] = ["one", "giant", "leap", "for", "mankind"];

	fn moon_chain() -> MarkovChain<&'static str> {
		let mut chain = MarkovChain::seeded(42);
		chain.add_sequence(&FIRST).unwrap();
		chain.add_sequence(&SECOND).unwrap();
		chain
	}

	fn letters_chain() -> MarkovChain<char> {
		let mut chain = MarkovChain::seeded(1);
		chain.add_sequence(&['A', 'B', 'C', 'D', 'E']).unwrap();
		chain
	}

	fn set<T: Eq + Hash>(items: impl IntoIterator<Item = T>) -> HashSet<T> {
		items.into_iter().collect()
	}

	#[test]
	fn untrained_chain_is_empty() {
		let chain: MarkovChain<char> = MarkovChain::new();
		assert!(!chain.has_model());
		assert!(chain.all_known_states().is_empty());
		assert_eq!(chain.max_order(), 3);
		assert_eq!(chain.num_trained_sequences(), 0);
	}

	#[test]
	fn training_extracts_every_order() {
		let chain = letters_chain();
		let model = chain.model();

		assert_eq!(model.len(), 9);
		assert_eq!(chain.weight(&['A'], &'B'), Some(1.0));
		assert_eq!(chain.weight(&['A', 'B'], &'C'), Some(1.0));
		assert_eq!(chain.weight(&['A', 'B', 'C'], &'D'), Some(1.0));
		assert_eq!(chain.weight(&['B', 'C', 'D'], &'E'), Some(1.0));
		assert_eq!(chain.weight(&['C', 'D'], &'E'), Some(1.0));
		assert!(!model.contains_key(&['A', 'B', 'C', 'D'][..]));
		assert!(!model.contains_key(&['E'][..]));

		assert_eq!(chain.all_known_states(), &set(['A', 'B', 'C', 'D', 'E']));
		assert_eq!(chain.num_trained_sequences(), 1);
		assert!(chain.has_model());
	}

	#[test]
	fn terminal_state_has_no_next() {
		let mut chain = letters_chain();
		assert_eq!(chain.all_possible_next(&['E']), Ok(HashSet::new()));
		assert_eq!(chain.best_model(&['E']), Err(ChainError::NoTransitionsAvailable));
		assert_eq!(chain.weighted_random_next(&['D', 'E']), Err(ChainError::NoTransitionsAvailable));
		assert_eq!(chain.unweighted_random_next(&['E']), Err(ChainError::NoTransitionsAvailable));
	}

	#[test]
	fn short_sequence_fails_without_side_effects() {
		let mut chain: MarkovChain<&str> = MarkovChain::new();
		let result = chain.add_sequence(&["lonely"]);

		assert!(matches!(result, Err(ChainError::InvalidInput(_))));
		assert!(chain.all_known_states().is_empty());
		assert_eq!(chain.num_trained_sequences(), 0);
		assert!(!chain.has_model());

		assert!(chain.add_sequence(&[]).is_err());
	}

	#[test]
	fn batch_training_skips_short_sequences() {
		let mut chain: MarkovChain<char> = MarkovChain::new();
		let words = ["hello", "x", "world"];
		let trained = chain.train(words.iter().map(|w| w.chars().collect::<Vec<_>>()));

		assert_eq!(trained, 2);
		assert_eq!(chain.num_trained_sequences(), 2);
		assert!(chain.all_known_states().contains(&'h'));
		assert!(chain.all_known_states().contains(&'d'));
		assert!(!chain.all_known_states().contains(&'x'));
		assert_eq!(chain.all_possible_next(&['l']).unwrap(), set(['l', 'o', 'd']));
	}

	#[test]
	fn retraining_doubles_touched_weights() {
		let mut chain = letters_chain();
		chain.add_sequence(&['X', 'Y']).unwrap();
		chain.add_sequence(&['A', 'B', 'C', 'D', 'E']).unwrap();

		assert_eq!(chain.weight(&['A'], &'B'), Some(2.0));
		assert_eq!(chain.weight(&['B', 'C', 'D'], &'E'), Some(2.0));
		assert_eq!(chain.weight(&['X'], &'Y'), Some(1.0));
		assert_eq!(chain.num_trained_sequences(), 3);
	}

	#[test]
	fn best_model_merges_both_sentences() {
		let chain = moon_chain();
		let best = chain.best_model(&["one"]).unwrap();
		assert_eq!(best.len(), 2);
		assert_eq!(best.weight(&"small"), Some(1.0));
		assert_eq!(best.weight(&"giant"), Some(1.0));
	}

	#[test]
	fn back_off_prefers_longest_context() {
		let mut chain = letters_chain();
		chain.add_sequence(&['X', 'B', 'Y']).unwrap();

		assert_eq!(chain.all_possible_next(&['A', 'B']).unwrap(), set(['C']));
		assert_eq!(chain.all_possible_next(&['X', 'B']).unwrap(), set(['Y']));
		// [C, B] was never observed, so only [B] is left
		assert_eq!(chain.all_possible_next(&['C', 'B']).unwrap(), set(['C', 'Y']));
		// Only the last max_order states are looked at
		assert_eq!(chain.all_possible_next(&['X', 'A', 'B', 'C']).unwrap(), set(['D']));
	}

	#[test]
	fn lowering_max_order_keeps_learned_contexts() {
		let mut chain = letters_chain();
		chain.add_sequence(&['X', 'B', 'Y']).unwrap();
		let before = chain.model().clone();

		chain.set_max_order(1).unwrap();
		assert_eq!(chain.model(), &before);
		assert_eq!(chain.all_possible_next(&['A', 'B']).unwrap(), set(['C', 'Y']));

		chain.add_sequence(&['P', 'Q', 'R']).unwrap();
		assert!(!chain.model().contains_key(&['P', 'Q'][..]));
	}

	#[test]
	fn unknown_states_are_invalid_input() {
		let mut chain = moon_chain();
		assert!(matches!(chain.all_possible_next(&["moon"]), Err(ChainError::InvalidInput(_))));
		assert!(matches!(chain.all_possible_next(&["moon", "one"]), Err(ChainError::InvalidInput(_))));
		assert!(matches!(chain.weighted_random_next(&["moon"]), Err(ChainError::InvalidInput(_))));
		assert!(matches!(chain.unweighted_random_next(&["moon"]), Err(ChainError::InvalidInput(_))));
		assert!(matches!(chain.best_model(&[]), Err(ChainError::InvalidInput(_))));
	}

	#[test]
	fn terminal_sentence_end_is_empty() {
		let mut chain = moon_chain();
		assert!(chain.all_possible_next(&["mankind"]).unwrap().is_empty());
		assert_eq!(chain.unweighted_random_next(&["mankind"]), Err(ChainError::NoTransitionsAvailable));
	}

	#[test]
	fn random_next_is_a_trained_link() {
		let mut chain = moon_chain();
		for _ in 0..50 {
			let weighted = chain.weighted_random_next(&["one"]).unwrap();
			assert!(weighted == "small" || weighted == "giant");
			let unweighted = chain.unweighted_random_next(&["one"]).unwrap();
			assert!(unweighted == "small" || unweighted == "giant");
		}
	}

	#[test]
	fn equal_weights_draw_evenly() {
		let mut chain = moon_chain();
		let draws = 10_000;
		let small = (0..draws)
			.filter(|_| chain.weighted_random_next(&["one"]).unwrap() == "small")
			.count();
		let ratio = small as f64 / draws as f64;
		assert!((ratio - 0.5).abs() < 0.05, "ratio was {ratio}");
	}

	#[test]
	fn weighted_and_unweighted_draws_differ() {
		let mut chain = MarkovChain::seeded(9);
		for _ in 0..9 {
			chain.add_sequence(&['x', 'a']).unwrap();
		}
		chain.add_sequence(&['x', 'b']).unwrap();

		let draws = 10_000;
		let weighted = (0..draws).filter(|_| chain.weighted_random_next(&['x']).unwrap() == 'a').count();
		let unweighted = (0..draws).filter(|_| chain.unweighted_random_next(&['x']).unwrap() == 'a').count();

		assert!((weighted as f64 / draws as f64 - 0.9).abs() < 0.03);
		assert!((unweighted as f64 / draws as f64 - 0.5).abs() < 0.03);
	}

	#[test]
	fn reseeding_replays_draws() {
		let mut chain = moon_chain();
		chain.add_default_priors();

		chain.reseed(5);
		let first: Vec<_> = (0..20).map(|_| chain.weighted_random_next(&["one"]).unwrap()).collect();
		chain.reseed(5);
		let second: Vec<_> = (0..20).map(|_| chain.weighted_random_next(&["one"]).unwrap()).collect();

		assert_eq!(first, second);
	}

	#[test]
	fn rng_can_be_swapped() {
		let chain = moon_chain();
		let mut swapped: MarkovChain<&str, SmallRng> = chain.clone().with_rng(SmallRng::seed_from_u64(3));

		assert!(swapped == chain);
		let next = swapped.weighted_random_next(&["one"]).unwrap();
		assert!(next == "small" || next == "giant");
	}

	#[test]
	fn priors_fill_unobserved_links() {
		let mut chain = moon_chain();
		chain.add_priors(0.005).unwrap();

		assert_eq!(chain.weight(&["one"], &"small"), Some(1.0));
		assert_eq!(chain.weight(&["one"], &"step"), Some(0.005));
		assert_eq!(chain.weight(&["one"], &"mankind"), Some(0.005));
		assert!(!chain.model().contains_key(&["mankind"][..]));
		assert!(chain.all_possible_next(&["mankind"]).unwrap().is_empty());

		let before = chain.model().clone();
		chain.add_priors(0.005).unwrap();
		assert_eq!(chain.model(), &before);
	}

	#[test]
	fn priors_extend_to_new_states() {
		let mut chain = moon_chain();
		chain.add_default_priors();
		chain.add_sequence(&["to", "the", "moon"]).unwrap();
		chain.add_default_priors();

		assert_eq!(chain.weight(&["one"], &"moon"), Some(DEFAULT_PRIOR));
		assert_eq!(chain.weight(&["the"], &"one"), Some(DEFAULT_PRIOR));
		assert_eq!(chain.weight(&["the"], &"moon"), Some(1.0));
	}

	#[test]
	fn priors_can_be_removed_and_changed() {
		let mut chain = moon_chain();
		let trained = chain.model().clone();

		chain.add_default_priors();
		assert_eq!(chain.weight(&["one"], &"step"), Some(DEFAULT_PRIOR));

		chain.remove_default_weak_links();
		assert_eq!(chain.weight(&["one"], &"step"), None);
		assert_eq!(chain.weight(&["one"], &"small"), Some(1.0));
		assert_eq!(chain.weight(&["one"], &"giant"), Some(1.0));
		assert_eq!(chain.model(), &trained);

		chain.add_priors(0.001).unwrap();
		assert_eq!(chain.weight(&["one"], &"step"), Some(0.001));
	}

	#[test]
	fn invalid_prior_weights_are_rejected() {
		let mut chain = moon_chain();
		assert_eq!(chain.add_priors(-1.0), Err(ChainError::InvalidWeight(-1.0)));
		assert!(chain.add_priors(f64::NAN).is_err());
	}

	#[test]
	fn huge_priors_still_sample() {
		let mut chain = moon_chain();
		chain.add_priors(f64::MAX).unwrap();

		for _ in 0..100 {
			let next = chain.weighted_random_next(&["one"]).unwrap();
			assert!(chain.all_possible_next(&["one"]).unwrap().contains(&next));
		}
	}

	#[test]
	fn merging_huge_weights_still_samples() {
		let mut left: MarkovChain<u32> = MarkovChain::seeded(4);
		left.specify_link(&[1], 2, f64::MAX).unwrap();
		let right = left.clone();

		left.merge(&right).unwrap();
		assert_eq!(left.weight(&[1], &2), Some(f64::MAX));
		assert_eq!(left.weighted_random_next(&[1]), Ok(2));
	}

	#[test]
	fn non_finite_threshold_is_rejected() {
		let mut chain = moon_chain();
		let before = chain.model().clone();

		assert!(matches!(chain.remove_weak_links(f64::NAN), Err(ChainError::InvalidWeight(_))));
		assert!(chain.remove_weak_links(f64::INFINITY).is_err());
		assert_eq!(chain.model(), &before);
	}

	#[test]
	fn pruning_drops_emptied_contexts() {
		let mut chain = letters_chain();
		chain.specify_link(&['Z'], 'A', 0.5).unwrap();
		chain.remove_weak_links(1.0).unwrap();

		assert!(!chain.model().contains_key(&['Z'][..]));
		assert!(chain.all_known_states().contains(&'Z'));
		assert_eq!(chain.best_model(&['Z']), Err(ChainError::NoTransitionsAvailable));
	}

	#[test]
	fn specify_link_overwrites_context() {
		let mut chain = letters_chain();
		chain.specify_link(&['B'], 'C', 1.75).unwrap();
		chain.specify_link(&['A'], 'B', 0.5).unwrap();
		chain.specify_link(&['A'], 'Q', 1.25).unwrap();

		let a = chain.best_model(&['A']).unwrap();
		assert_eq!(a.len(), 1);
		assert_eq!(a.weight(&'Q'), Some(1.25));
		assert_eq!(chain.weight(&['B'], &'C'), Some(1.75));
		assert!(chain.all_known_states().contains(&'Q'));
		assert_eq!(chain.num_trained_sequences(), 1);
	}

	#[test]
	fn specify_link_builds_a_model_without_training() {
		let mut chain: MarkovChain<u32> = MarkovChain::seeded(0);
		chain.specify_link(&[1, 2], 3, 2.0).unwrap();

		assert!(chain.has_model());
		assert_eq!(chain.all_known_states(), &set([1, 2, 3]));
		// [2] alone has no links yet, so [1, 2] cannot be resolved
		assert_eq!(chain.weighted_random_next(&[1, 2]), Err(ChainError::NoTransitionsAvailable));

		chain.specify_link(&[2], 4, 1.0).unwrap();
		assert_eq!(chain.weighted_random_next(&[1, 2]), Ok(3));
		assert_eq!(chain.weighted_random_next(&[2]), Ok(4));
		assert_eq!(chain.weighted_random_next(&[1]), Err(ChainError::NoTransitionsAvailable));
	}

	#[test]
	fn specify_link_validates_input() {
		let mut chain: MarkovChain<u32> = MarkovChain::new().with_max_order(2).unwrap();
		assert!(matches!(chain.specify_link(&[], 1, 1.0), Err(ChainError::InvalidInput(_))));
		assert!(matches!(chain.specify_link(&[1, 2, 3], 4, 1.0), Err(ChainError::InvalidInput(_))));
		assert_eq!(chain.specify_link(&[1], 2, -0.5), Err(ChainError::InvalidWeight(-0.5)));
		assert!(chain.all_known_states().is_empty());
	}

	#[test]
	fn max_order_builder() {
		let chain: MarkovChain<i32> = MarkovChain::new().with_max_order(2).unwrap();
		assert_eq!(chain.max_order(), 2);
		assert!(MarkovChain::<i32>::new().with_max_order(0).is_err());

		let mut chain = chain;
		chain.add_sequence(&[1, 3, 1, 4, 2]).unwrap();
		assert!(chain.model().keys().all(|context| context.len() <= 2));
	}

	#[test]
	fn equality_ignores_rng() {
		let left = moon_chain();
		let mut right = MarkovChain::seeded(1234);
		right.add_sequence(&FIRST).unwrap();
		right.add_sequence(&SECOND).unwrap();
		assert!(left == right);

		right.set_max_order(2).unwrap();
		assert!(left != right);
	}

	#[test]
	fn merge_matches_joint_training() {
		let mut left: MarkovChain<&str> = MarkovChain::seeded(1);
		left.add_sequence(&FIRST).unwrap();
		let mut right: MarkovChain<&str> = MarkovChain::seeded(2);
		right.add_sequence(&SECOND).unwrap();

		left.merge(&right).unwrap();
		assert!(left == moon_chain());

		let other: MarkovChain<&str> = MarkovChain::new().with_max_order(2).unwrap();
		assert_eq!(left.merge(&other), Err(ChainError::OrderMismatch { expected: 3, actual: 2 }));
	}

	#[test]
	fn snapshot_restores_an_equal_chain() {
		let mut chain = moon_chain();
		chain.set_max_order(2).unwrap();
		chain.add_default_priors();

		let restored = MarkovChain::from_snapshot(chain.snapshot()).unwrap();
		assert!(restored == chain);
	}

	#[derive(Debug, Clone, PartialEq, Eq, Hash)]
	struct WeatherPattern {
		condition: &'static str,
		temperature: i32,
		wind_direction: char,
	}

	#[test]
	fn custom_state_types_behave_the_same() {
		let sunny = WeatherPattern { condition: "sunny", temperature: 75, wind_direction: 'W' };
		let cloudy = WeatherPattern { condition: "cloudy", temperature: 55, wind_direction: 'N' };
		let partly = WeatherPattern { condition: "partly cloudy", temperature: 65, wind_direction: 'S' };
		let stormy = WeatherPattern { condition: "stormy", temperature: 50, wind_direction: 'E' };

		let mut chain = MarkovChain::seeded(11);
		chain
			.add_sequence(&[
				sunny.clone(),
				partly.clone(),
				cloudy.clone(),
				stormy.clone(),
				partly.clone(),
				sunny.clone(),
			])
			.unwrap();

		let next = chain.weighted_random_next(&[partly.clone()]).unwrap();
		assert!(next == cloudy || next == sunny);
		assert_eq!(chain.weighted_random_next(&[sunny, partly]).unwrap(), cloudy);
	}
}

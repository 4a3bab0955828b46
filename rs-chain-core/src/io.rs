use std::fs;
use std::hash::Hash;
use std::path::Path;

use log::debug;
use rand::Rng;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::model::chain::MarkovChain;
use crate::model::error::PersistError;
use crate::model::snapshot::ChainSnapshot;

/// Encodes a chain with `postcard`.
///
/// The random source is not encoded.
pub fn to_bytes<T, R>(chain: &MarkovChain<T, R>) -> Result<Vec<u8>, PersistError>
where
	T: Eq + Hash + Clone + Serialize,
	R: Rng,
{
	Ok(postcard::to_stdvec(&chain.snapshot())?)
}

/// Decodes a chain encoded by `to_bytes`.
///
/// The restored chain gets a fresh OS-seeded random source.
///
/// # Errors
/// Returns an error if the bytes are not a valid chain.
pub fn from_bytes<T>(bytes: &[u8]) -> Result<MarkovChain<T>, PersistError>
where
	T: Eq + Hash + Clone + DeserializeOwned,
{
	let snapshot: ChainSnapshot<T> = postcard::from_bytes(bytes)?;
	Ok(MarkovChain::from_snapshot(snapshot)?)
}

/// Writes a chain to `path`, replacing any existing file.
pub fn save<T, R, P>(chain: &MarkovChain<T, R>, path: P) -> Result<(), PersistError>
where
	T: Eq + Hash + Clone + Serialize,
	R: Rng,
	P: AsRef<Path>,
{
	let bytes = to_bytes(chain)?;
	fs::write(&path, &bytes)?;
	debug!("saved chain to {} ({} bytes)", path.as_ref().display(), bytes.len());
	Ok(())
}

/// Reads a chain written by `save`.
pub fn load<T, P>(path: P) -> Result<MarkovChain<T>, PersistError>
where
	T: Eq + Hash + Clone + DeserializeOwned,
	P: AsRef<Path>,
{
	let bytes = fs::read(&path)?;
	debug!("loading chain from {} ({} bytes)", path.as_ref().display(), bytes.len());
	from_bytes(&bytes)
}

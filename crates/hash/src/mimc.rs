// Copyright 2025 Irreducible Inc.

//! MiMC over prime scalar fields.
//!
//! The round function is `x -> (x + k + c_i)^5` followed by a final key addition. Round
//! constants are derived from a seed string by iterated SHA3-256, each digest reduced modulo the
//! field order.

use std::sync::Arc;

use rankone_field::{CurveField, Field, Zero};
use tiny_keccak::{Hasher as _, Sha3};

use crate::hasher::{HashError, Hasher};

/// Number of rounds of the permutation.
pub const MIMC_ROUNDS: usize = 91;

/// Seed used for the round constants of the builtin hints.
pub const MIMC_SEED: &str = "seed";

fn sha3_256(data: &[u8]) -> [u8; 32] {
	let mut sha3 = Sha3::v256();
	sha3.update(data);
	let mut digest = [0u8; 32];
	sha3.finalize(&mut digest);
	digest
}

/// Round constants of a MiMC instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimcParams<F> {
	round_constants: Vec<F>,
}

impl<F: CurveField> MimcParams<F> {
	pub fn new(seed: &str) -> Self {
		Self::with_rounds(seed, MIMC_ROUNDS)
	}

	pub fn with_rounds(seed: &str, rounds: usize) -> Self {
		let mut digest = sha3_256(seed.as_bytes());
		let round_constants = (0..rounds)
			.map(|_| {
				// The digest is re-hashed as a minimal big-endian integer.
				let first_nonzero = digest
					.iter()
					.position(|&b| b != 0)
					.unwrap_or(digest.len());
				digest = sha3_256(&digest[first_nonzero..]);
				F::from_be_bytes_mod_order(&digest)
			})
			.collect();
		Self { round_constants }
	}

	pub fn round_constants(&self) -> &[F] {
		&self.round_constants
	}

	/// Encrypts `message` under `key`.
	pub fn encrypt(&self, message: F, key: F) -> F {
		let mut state = message;
		for constant in &self.round_constants {
			let tmp = state + key + constant;
			state = tmp.square().square() * tmp;
		}
		state + key
	}

	/// Applies the keyed permutation to `block`, using and replacing `state` as the key.
	pub fn permute_in_place(&self, state: &mut F, block: F) {
		*state = self.encrypt(block, *state);
	}

	/// Absorbs `inputs[1..]` into a state initialized with `inputs[0]`.
	///
	/// Each step feeds the difference between the next input and the current state through the
	/// permutation. This is the compression used by the builtin hashing hints.
	pub fn compress_chain(&self, inputs: &[F]) -> Result<F, HashError> {
		let (&first, rest) = inputs.split_first().ok_or(HashError::EmptyInput)?;
		let mut state = first;
		for &input in rest {
			let block = input - state;
			self.permute_in_place(&mut state, block);
		}
		Ok(state)
	}
}

/// Miyaguchi-Preneel hashing of field elements.
#[derive(Debug, Clone)]
pub struct MimcHasher<F> {
	params: Arc<MimcParams<F>>,
	state: F,
}

impl<F: CurveField> MimcHasher<F> {
	pub fn new(params: Arc<MimcParams<F>>) -> Self {
		Self {
			params,
			state: F::zero(),
		}
	}
}

impl<F: CurveField> Hasher<F> for MimcHasher<F> {
	type Digest = F;

	fn update(&mut self, data: impl AsRef<[F]>) {
		for &element in data.as_ref() {
			self.state = self.params.encrypt(element, self.state) + element;
		}
	}

	fn finalize(self) -> F {
		self.state
	}

	fn reset(&mut self) {
		self.state = F::zero();
	}
}

#[cfg(test)]
mod tests {
	use rand::{rngs::StdRng, Rng, SeedableRng};
	use rankone_field::PrimeField;

	use super::*;

	type Fr = ark_bn254::Fr;

	fn random_elements(rng: &mut StdRng, n: usize) -> Vec<Fr> {
		(0..n).map(|_| Fr::from(rng.gen::<u64>())).collect()
	}

	#[test]
	fn test_round_constants_derivation() {
		let params = MimcParams::<Fr>::new(MIMC_SEED);
		assert_eq!(params.round_constants().len(), MIMC_ROUNDS);

		let first = sha3_256(&sha3_256(MIMC_SEED.as_bytes()));
		assert_eq!(params.round_constants()[0], Fr::from_be_bytes_mod_order(&first));
		assert_ne!(params.round_constants()[0], params.round_constants()[1]);

		let other = MimcParams::<Fr>::new("another seed");
		assert_ne!(params, other);
	}

	#[test]
	fn test_encrypt_depends_on_key() {
		let params = MimcParams::<Fr>::new(MIMC_SEED);
		let message = Fr::from(42u64);
		assert_ne!(
			params.encrypt(message, Fr::from(1u64)),
			params.encrypt(message, Fr::from(2u64))
		);
		assert_eq!(
			params.encrypt(message, Fr::from(1u64)),
			params.encrypt(message, Fr::from(1u64))
		);
	}

	#[test]
	fn test_compress_chain_of_two_is_single_permutation() {
		let params = MimcParams::<Fr>::new(MIMC_SEED);
		let mut rng = StdRng::seed_from_u64(0);
		let inputs = random_elements(&mut rng, 2);

		let mut state = inputs[0];
		params.permute_in_place(&mut state, inputs[1] - inputs[0]);
		assert_eq!(params.compress_chain(&inputs), Ok(state));
	}

	#[test]
	fn test_compress_chain_is_sequential() {
		let params = MimcParams::<Fr>::new(MIMC_SEED);
		let mut rng = StdRng::seed_from_u64(1);
		let inputs = random_elements(&mut rng, 5);

		let head = params.compress_chain(&inputs[..3]).unwrap();
		let mut resumed = vec![head];
		resumed.extend_from_slice(&inputs[3..]);
		assert_eq!(params.compress_chain(&inputs), params.compress_chain(&resumed));
		assert_eq!(params.compress_chain(&[]), Err(HashError::EmptyInput));
	}

	#[test]
	fn test_hasher_update_is_incremental() {
		type Fq = ark_bls12_381::Fr;

		let params = Arc::new(MimcParams::<Fq>::new(MIMC_SEED));
		let data = (1..=4u64).map(Fq::from).collect::<Vec<_>>();

		let one_shot = MimcHasher::new(params.clone())
			.chain_update(&data)
			.finalize();
		let mut incremental = MimcHasher::new(params.clone());
		incremental.update(&data[..1]);
		incremental.update(&data[1..]);
		assert_eq!(incremental.finalize(), one_shot);

		let mut reset = MimcHasher::new(params);
		reset.update(&data);
		reset.reset();
		assert_eq!(reset.finalize(), Fq::zero());
	}
}

// Copyright 2025 Irreducible Inc.

//! Serde adapters for field elements.
//!
//! Elements are carried as their fixed-width byte encoding so that the structured format stays
//! independent of the arkworks in-memory representation. Use with `#[serde(with = "...")]`.

use serde::{de::Error as _, ser::Error as _, Deserialize, Deserializer, Serializer};

use crate::{CurveField, DeserializeBytes, SerializeBytes};

fn encode<F: CurveField>(value: &F) -> Result<Vec<u8>, crate::SerializationError> {
	let mut bytes = Vec::new();
	SerializeBytes::serialize(value, &mut bytes)?;
	Ok(bytes)
}

fn decode<F: CurveField>(bytes: &[u8]) -> Result<F, crate::SerializationError> {
	let mut read_buf = bytes;
	let value = <F as DeserializeBytes>::deserialize(&mut read_buf)?;
	if !read_buf.is_empty() {
		return Err(crate::SerializationError::InvalidFieldElement);
	}
	Ok(value)
}

pub fn serialize<F: CurveField, S: Serializer>(value: &F, serializer: S) -> Result<S::Ok, S::Error> {
	let bytes = encode(value).map_err(S::Error::custom)?;
	serializer.serialize_bytes(&bytes)
}

pub fn deserialize<'de, F: CurveField, D: Deserializer<'de>>(deserializer: D) -> Result<F, D::Error> {
	let bytes = <Vec<u8> as Deserialize>::deserialize(deserializer)?;
	decode(&bytes).map_err(D::Error::custom)
}

/// Adapter for sequences of field elements.
pub mod vec {
	use serde::ser::SerializeSeq;

	use super::*;

	pub fn serialize<F: CurveField, S: Serializer>(
		values: &[F],
		serializer: S,
	) -> Result<S::Ok, S::Error> {
		let mut seq = serializer.serialize_seq(Some(values.len()))?;
		for value in values {
			let bytes = encode(value).map_err(S::Error::custom)?;
			seq.serialize_element(&bytes)?;
		}
		seq.end()
	}

	pub fn deserialize<'de, F: CurveField, D: Deserializer<'de>>(
		deserializer: D,
	) -> Result<Vec<F>, D::Error> {
		let raw = <Vec<Vec<u8>> as Deserialize>::deserialize(deserializer)?;
		raw.iter()
			.map(|bytes| decode(bytes).map_err(D::Error::custom))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use ark_ff::UniformRand;
	use rand::{rngs::StdRng, SeedableRng};
	use serde::{Deserialize, Serialize};

	use super::*;

	type Fr = ark_bls12_377::Fr;

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct Holder {
		#[serde(with = "crate::serde_canonical")]
		single: Fr,
		#[serde(with = "crate::serde_canonical::vec")]
		many: Vec<Fr>,
	}

	#[test]
	fn test_bincode_round_trip() {
		let mut rng = StdRng::seed_from_u64(3);
		let holder = Holder {
			single: Fr::rand(&mut rng),
			many: (0..5).map(|_| Fr::rand(&mut rng)).collect(),
		};

		let bytes = bincode::serialize(&holder).unwrap();
		let decoded: Holder = bincode::deserialize(&bytes).unwrap();
		assert_eq!(decoded, holder);
	}

	#[test]
	fn test_trailing_bytes_rejected() {
		let mut bytes = encode(&Fr::from(5u64)).unwrap();
		bytes.push(0);
		assert!(decode::<Fr>(&bytes).is_err());
	}
}

// Copyright 2025 Irreducible Inc.

use std::collections::HashMap;

use rankone_field::{serde_canonical, CurveField, One, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{
	error::Error,
	term::{Coeff, MAX_INDEX},
};
use crate::error::InternalError;

/// De-duplicated table of the coefficients referenced by terms.
///
/// Entries `0..=3` always hold `0`, `1`, `2` and `-1`.
#[derive(Debug, Clone)]
pub struct CoeffTable<F> {
	values: Vec<F>,
	index: HashMap<F, u32>,
}

impl<F: CurveField> Default for CoeffTable<F> {
	fn default() -> Self {
		Self::new()
	}
}

impl<F: CurveField> CoeffTable<F> {
	pub fn new() -> Self {
		let values = Self::specials().to_vec();
		let index = values
			.iter()
			.enumerate()
			.map(|(id, value)| (*value, id as u32))
			.collect();
		Self { values, index }
	}

	fn specials() -> [F; 4] {
		[F::zero(), F::one(), F::one().double(), -F::one()]
	}

	/// Rebuilds a table from its persisted values.
	pub fn from_values(values: Vec<F>) -> Result<Self, Error> {
		if values.len() < 4 || values[..4] != Self::specials() {
			return Err(Error::MalformedCoefficientTable);
		}
		if values.len() > MAX_INDEX + 1 {
			return Err(Error::MalformedCoefficientTable);
		}

		let mut index = HashMap::with_capacity(values.len());
		for (id, value) in values.iter().enumerate() {
			index.entry(*value).or_insert(id as u32);
		}
		Ok(Self { values, index })
	}

	/// Returns the coefficient for `value`, inserting it into the table when needed.
	pub fn make_coeff(&mut self, value: &F) -> Result<Coeff, InternalError> {
		if value.is_zero() {
			return Ok(Coeff::Zero);
		}
		if value.is_one() {
			return Ok(Coeff::One);
		}
		match self.index.get(value) {
			Some(&Coeff::TWO_ID) => Ok(Coeff::Two),
			Some(&Coeff::MINUS_ONE_ID) => Ok(Coeff::MinusOne),
			Some(&id) => Ok(Coeff::Table(id)),
			None => {
				let id = self.values.len();
				if id > MAX_INDEX {
					return Err(InternalError::TermOverflow {
						what: "coefficient",
						value: id,
					});
				}
				self.values.push(*value);
				self.index.insert(*value, id as u32);
				Ok(Coeff::Table(id as u32))
			}
		}
	}

	#[inline]
	pub fn get(&self, id: u32) -> &F {
		&self.values[id as usize]
	}

	pub fn value(&self, coeff: Coeff) -> F {
		*self.get(coeff.table_id())
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn values(&self) -> &[F] {
		&self.values
	}
}

impl<F: CurveField> PartialEq for CoeffTable<F> {
	fn eq(&self, other: &Self) -> bool {
		self.values == other.values
	}
}

impl<F: CurveField> Eq for CoeffTable<F> {}

impl<F: CurveField> Serialize for CoeffTable<F> {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serde_canonical::vec::serialize(&self.values, serializer)
	}
}

impl<'de, F: CurveField> Deserialize<'de> for CoeffTable<F> {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let values = serde_canonical::vec::deserialize(deserializer)?;
		Self::from_values(values).map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;

	use super::*;

	type Fr = ark_bls12_381::Fr;

	#[test]
	fn test_specials_are_not_stored() {
		let mut table = CoeffTable::<Fr>::new();
		assert_eq!(table.make_coeff(&Fr::zero()), Ok(Coeff::Zero));
		assert_eq!(table.make_coeff(&Fr::one()), Ok(Coeff::One));
		assert_eq!(table.make_coeff(&Fr::from(2u64)), Ok(Coeff::Two));
		assert_eq!(table.make_coeff(&-Fr::one()), Ok(Coeff::MinusOne));
		assert_eq!(table.len(), 4);
	}

	#[test]
	fn test_deduplication() {
		let mut table = CoeffTable::<Fr>::new();
		let a = table.make_coeff(&Fr::from(5u64)).unwrap();
		let b = table.make_coeff(&Fr::from(6u64)).unwrap();
		let c = table.make_coeff(&Fr::from(5u64)).unwrap();

		assert_eq!(a, Coeff::Table(4));
		assert_eq!(b, Coeff::Table(5));
		assert_eq!(a, c);
		assert_eq!(table.value(b), Fr::from(6u64));
	}

	#[test]
	fn test_from_values() {
		let mut table = CoeffTable::<Fr>::new();
		table.make_coeff(&Fr::from(17u64)).unwrap();

		let mut rebuilt = CoeffTable::from_values(table.values().to_vec()).unwrap();
		assert_eq!(rebuilt, table);
		assert_eq!(rebuilt.make_coeff(&Fr::from(17u64)), Ok(Coeff::Table(4)));

		assert_matches!(
			CoeffTable::from_values(vec![Fr::one(), Fr::zero()]),
			Err(Error::MalformedCoefficientTable)
		);
	}
}

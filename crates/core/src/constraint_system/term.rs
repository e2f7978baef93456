// Copyright 2025 Irreducible Inc.

use rankone_field::{CurveField, Field, SerializationError, Zero};
use serde::{Deserialize, Serialize};

use super::coeff_table::CoeffTable;
use crate::error::InternalError;

/// Index of a wire in the assignment vector. Wire 0 is the constant one.
pub type WireId = usize;

/// Number of bits available to a wire index or a coefficient index.
pub const INDEX_BITS: u32 = 30;

/// Largest wire or coefficient index a [`Term`] can hold.
pub const MAX_INDEX: usize = (1 << INDEX_BITS) - 1;

const INDEX_MASK: u64 = MAX_INDEX as u64;
const COEFF_SHIFT: u32 = INDEX_BITS;
const FLAG_SHIFT: u32 = 2 * INDEX_BITS;

const FLAG_TABLE: u64 = 0b0000;
const FLAG_MINUS_ONE: u64 = 0b0001;
const FLAG_ZERO: u64 = 0b0010;
const FLAG_ONE: u64 = 0b0100;
const FLAG_TWO: u64 = 0b1000;

/// The coefficient of a [`Term`].
///
/// The coefficients `0`, `1`, `2` and `-1` make up nearly every term of a compiled circuit and
/// are applied with an addition, a doubling or a negation instead of a field multiplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coeff {
	Zero,
	One,
	Two,
	MinusOne,
	/// Index into the coefficient table of the constraint system.
	Table(u32),
}

impl Coeff {
	pub const ZERO_ID: u32 = 0;
	pub const ONE_ID: u32 = 1;
	pub const TWO_ID: u32 = 2;
	pub const MINUS_ONE_ID: u32 = 3;

	/// Index of this coefficient in the coefficient table.
	///
	/// The special coefficients are pre-populated in every table, so this is defined for all
	/// variants.
	pub const fn table_id(self) -> u32 {
		match self {
			Self::Zero => Self::ZERO_ID,
			Self::One => Self::ONE_ID,
			Self::Two => Self::TWO_ID,
			Self::MinusOne => Self::MINUS_ONE_ID,
			Self::Table(id) => id,
		}
	}

	/// Accumulates `self * value` into `acc`.
	#[inline]
	pub fn mul_add<F: CurveField>(self, value: &F, acc: &mut F, table: &CoeffTable<F>) {
		match self {
			Self::Zero => {}
			Self::One => *acc += value,
			Self::Two => *acc += value.double(),
			Self::MinusOne => *acc -= value,
			Self::Table(id) => *acc += *table.get(id) * value,
		}
	}

	/// Replaces `value` with `value / self`.
	#[inline]
	pub fn div_into<F: CurveField>(
		self,
		value: &mut F,
		table: &CoeffTable<F>,
		wire: WireId,
	) -> Result<(), InternalError> {
		match self {
			Self::One => {}
			Self::MinusOne => *value = -*value,
			Self::Zero => return Err(InternalError::ZeroCoefficient { wire }),
			Self::Two | Self::Table(_) => {
				let coeff = table.get(self.table_id());
				let inverse = coeff
					.inverse()
					.ok_or(InternalError::ZeroCoefficient { wire })?;
				*value *= inverse;
			}
		}
		Ok(())
	}
}

/// A single `coefficient * wire` summand of a linear expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u64", try_from = "u64")]
pub struct Term {
	wire: u32,
	coeff: Coeff,
}

impl Term {
	/// Creates a term, failing when either index does not fit in [`INDEX_BITS`] bits.
	pub fn new(wire: WireId, coeff: Coeff) -> Result<Self, InternalError> {
		if wire > MAX_INDEX {
			return Err(InternalError::TermOverflow {
				what: "wire",
				value: wire,
			});
		}
		if coeff.table_id() as usize > MAX_INDEX {
			return Err(InternalError::TermOverflow {
				what: "coefficient",
				value: coeff.table_id() as usize,
			});
		}
		Ok(Self {
			wire: wire as u32,
			coeff,
		})
	}

	#[inline]
	pub const fn wire(self) -> WireId {
		self.wire as WireId
	}

	#[inline]
	pub const fn coeff(self) -> Coeff {
		self.coeff
	}

	/// Moves the term to another instance of a repeated sub-circuit.
	///
	/// Wires at or above `first_local` belong to the sub-circuit and are moved by `shift`, the
	/// others are shared by every instance and stay in place. The result stays below the wire
	/// count of the system the instance was recorded in, which already fits the term layout.
	#[inline]
	pub(crate) const fn shifted(self, shift: usize, first_local: WireId) -> Self {
		if self.wire() >= first_local {
			Self {
				wire: (self.wire() + shift) as u32,
				coeff: self.coeff,
			}
		} else {
			self
		}
	}

	/// Packs the term into its 64-bit persisted layout.
	///
	/// Bits 0..30 hold the wire, bits 30..60 the coefficient table index and the top four bits
	/// flag the special coefficients.
	pub const fn pack(self) -> u64 {
		let flag = match self.coeff {
			Coeff::Table(_) => FLAG_TABLE,
			Coeff::MinusOne => FLAG_MINUS_ONE,
			Coeff::Zero => FLAG_ZERO,
			Coeff::One => FLAG_ONE,
			Coeff::Two => FLAG_TWO,
		};
		(flag << FLAG_SHIFT) | ((self.coeff.table_id() as u64) << COEFF_SHIFT) | self.wire as u64
	}

	pub fn unpack(packed: u64) -> Result<Self, SerializationError> {
		let wire = (packed & INDEX_MASK) as u32;
		let coeff_id = ((packed >> COEFF_SHIFT) & INDEX_MASK) as u32;
		let coeff = match packed >> FLAG_SHIFT {
			FLAG_TABLE => Coeff::Table(coeff_id),
			FLAG_MINUS_ONE => Coeff::MinusOne,
			FLAG_ZERO => Coeff::Zero,
			FLAG_ONE => Coeff::One,
			FLAG_TWO => Coeff::Two,
			flag => {
				return Err(SerializationError::UnknownEnumVariant {
					name: "Coeff",
					index: flag as u8,
				})
			}
		};
		Ok(Self { wire, coeff })
	}

	/// Evaluates `coeff * value` for this term.
	pub fn evaluate<F: CurveField>(self, value: &F, table: &CoeffTable<F>) -> F {
		let mut acc = F::zero();
		self.coeff.mul_add(value, &mut acc, table);
		acc
	}
}

impl From<Term> for u64 {
	fn from(term: Term) -> Self {
		term.pack()
	}
}

impl TryFrom<u64> for Term {
	type Error = SerializationError;

	fn try_from(packed: u64) -> Result<Self, Self::Error> {
		Self::unpack(packed)
	}
}

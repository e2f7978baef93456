// Copyright 2025 Irreducible Inc.

use std::fmt;

use ark_ff::PrimeField;
use serde::{Deserialize, Serialize};

use crate::serialization::{DeserializeBytes, SerializeBytes};

/// Identifies the elliptic curve whose scalar field a constraint system is defined over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CurveId {
	Bn254 = 1,
	Bls12_381 = 2,
	Bls12_377 = 3,
}

impl CurveId {
	pub const fn from_u8(value: u8) -> Option<Self> {
		match value {
			1 => Some(Self::Bn254),
			2 => Some(Self::Bls12_381),
			3 => Some(Self::Bls12_377),
			_ => None,
		}
	}

	pub const fn name(self) -> &'static str {
		match self {
			Self::Bn254 => "bn254",
			Self::Bls12_381 => "bls12-381",
			Self::Bls12_377 => "bls12-377",
		}
	}
}

impl fmt::Display for CurveId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// A prime scalar field the solver can run over.
pub trait CurveField: PrimeField + SerializeBytes + DeserializeBytes {
	const CURVE: CurveId;
}

impl CurveField for ark_bn254::Fr {
	const CURVE: CurveId = CurveId::Bn254;
}

impl CurveField for ark_bls12_381::Fr {
	const CURVE: CurveId = CurveId::Bls12_381;
}

impl CurveField for ark_bls12_377::Fr {
	const CURVE: CurveId = CurveId::Bls12_377;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_curve_id_u8_round_trip() {
		for curve in [CurveId::Bn254, CurveId::Bls12_381, CurveId::Bls12_377] {
			assert_eq!(CurveId::from_u8(curve as u8), Some(curve));
		}
		assert_eq!(CurveId::from_u8(0), None);
		assert_eq!(CurveId::from_u8(4), None);
	}

	#[test]
	fn test_field_curves() {
		assert_eq!(<ark_bn254::Fr as CurveField>::CURVE.to_string(), "bn254");
		assert_eq!(<ark_bls12_381::Fr as CurveField>::CURVE, CurveId::Bls12_381);
		assert_eq!(<ark_bls12_377::Fr as CurveField>::CURVE, CurveId::Bls12_377);
	}
}

// Copyright 2025 Irreducible Inc.

use std::fmt;

use serde::{Deserialize, Serialize};
use tiny_keccak::{Hasher, Keccak};

use super::{r1c::LinearExpression, term::WireId};

/// Identifier of a hint function, stable across processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HintId(pub u32);

impl HintId {
	/// Derives the identifier from the hint's name: the first four bytes of its keccak-256
	/// digest, big-endian.
	pub fn from_name(name: &str) -> Self {
		let mut keccak = Keccak::v256();
		keccak.update(name.as_bytes());
		let mut digest = [0u8; 32];
		keccak.finalize(&mut digest);
		Self(u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]))
	}
}

impl fmt::Display for HintId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "hint#{:08x}", self.0)
	}
}

/// A call to a hint function in the compiled circuit.
///
/// The output wires are assigned by the function instead of by a constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
	pub id: HintId,
	pub inputs: Vec<LinearExpression>,
	pub wires: Vec<WireId>,
}

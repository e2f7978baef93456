// Copyright 2024-2025 Irreducible Inc.

use super::term::WireId;
use crate::error::InternalError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("constraints can no longer be added once the system is compacted or loaded")]
	Frozen,

	#[error("wire {wire} is out of range of the {nb_wires} wires of the system")]
	UnknownWire { wire: WireId, nb_wires: usize },

	#[error("coefficient {id} is out of range of the {nb_coefficients} coefficients")]
	UnknownCoefficient { id: u32, nb_coefficients: usize },

	#[error("the coefficient table must start with 0, 1, 2 and -1 and fit in 30 bits")]
	MalformedCoefficientTable,

	#[error("static constraints {key:?} were finished without being started")]
	StaticKeyNotStarted { key: String },

	#[error("static constraints {key:?} cover an invalid range ending at constraint {constraint_pos}")]
	InvalidStaticRange { key: String, constraint_pos: usize },

	#[error("level table is inconsistent at constraint {constraint}: {reason}")]
	InvalidLevels {
		constraint: usize,
		reason: &'static str,
	},

	#[error("hint {hint} does not exist")]
	UnknownHint { hint: usize },

	#[error("debug info {index} does not exist")]
	UnknownDebugInfo { index: usize },

	#[error("lazy record {record} is inconsistent: {reason}")]
	InvalidLazyRecord {
		record: usize,
		reason: &'static str,
	},

	#[error("hint {hint} cannot feed GKR: {reason}")]
	InvalidGkrHint {
		hint: usize,
		reason: &'static str,
	},

	#[error("GKR must be configured before reserving wires or finalizing")]
	GkrNotConfigured,

	#[error("GKR {what} table holds {actual} entries, {expected} are required")]
	GkrTableSize {
		what: &'static str,
		expected: usize,
		actual: usize,
	},

	#[error("{nb_hints} GKR hints exceed the batch capacity 2^{b_n}")]
	GkrCapacity { nb_hints: usize, b_n: usize },

	#[error("internal error: {0}")]
	Internal(#[from] InternalError),
}

// Copyright 2025 Irreducible Inc.

use crate::constraint_system::WireId;

/// A broken invariant of a compiled constraint system or of the solver itself.
///
/// Internal errors never result from a bad witness: they mean that the producer of the
/// constraint system emitted inconsistent tables, or that the engine has a defect. Continuing
/// past one would produce an incorrect assignment. They are returned as ordinary errors so that
/// tests can observe them, and the `abort_on_internal` feature turns them into panics at the
/// point they are raised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InternalError {
	#[error("constraint {constraint} references more than one unsolved wire")]
	MultipleUnsolvedWires { constraint: usize },
	#[error("wire {wire} is out of range of the {nb_wires} wires")]
	WireOutOfRange { wire: WireId, nb_wires: usize },
	#[error("wire {wire} was assigned twice")]
	WireAssignedTwice { wire: WireId },
	#[error("{count} wires remain unsolved, the first one is wire {first}")]
	UnsolvedWires { count: usize, first: WireId },
	#[error("input wire {wire} of hint {hint} is not solved when the hint runs")]
	UnsolvedHintInput { hint: usize, wire: WireId },
	#[error("constraint {constraint} is out of range of the {nb_constraints} constraints")]
	ConstraintOutOfRange {
		constraint: usize,
		nb_constraints: usize,
	},
	#[error("division by a zero coefficient while solving wire {wire}")]
	ZeroCoefficient { wire: WireId },
	#[error("GKR assignment for wires [{start}, {end}) carries {len} values")]
	GkrAssignmentLength { start: usize, end: usize, len: usize },
	#[error("GKR assignment for wires [{start}, {end}) exceeds the {nb_wires} wires of the system")]
	GkrAssignmentOutOfRange {
		start: usize,
		end: usize,
		nb_wires: usize,
	},
	#[error("level {level} references constraint {constraint}, which has no index after compaction")]
	MissingRemapIndex { level: usize, constraint: usize },
	#[error("{what} index {value} does not fit in 30 bits")]
	TermOverflow { what: &'static str, value: usize },
	#[error("lazy record {record} starts at {start}, before the previous record ends at {previous_end}")]
	OverlappingLazyRecords {
		record: usize,
		start: usize,
		previous_end: usize,
	},
	#[error("lazy record {record} ends at {end}, past the {nb_constraints} stored constraints")]
	LazyRecordOutOfBounds {
		record: usize,
		end: usize,
		nb_constraints: usize,
	},
	#[error("lazy record {record} refers to template {template}, which was never frozen")]
	LazyTemplateNotFrozen { record: usize, template: usize },
}

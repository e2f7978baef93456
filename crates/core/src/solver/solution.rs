// Copyright 2025 Irreducible Inc.

use std::sync::{
	atomic::{AtomicUsize, Ordering},
	OnceLock,
};

use rankone_field::{CurveField, Zero};
use rankone_utils::{bail_internal, sparse_index::SparseIndex};

use super::{error::SolverError, hints::HintRegistry};
use crate::{
	constraint_system::{CoeffTable, ConstraintSystem, Hint, LinearExpression, WireId},
	error::InternalError,
};

/// The assignment being built by one solve.
///
/// Every wire is set at most once. Workers of a level share the solution by reference; the
/// level structure guarantees they set disjoint wires.
pub struct Solution<'a, F> {
	values: Vec<OnceLock<F>>,
	nb_solved: AtomicUsize,
	coefficients: &'a CoeffTable<F>,
	hints: &'a [Hint],
	hint_of_wire: &'a SparseIndex<usize>,
	registry: &'a HintRegistry<F>,
	gkr_slot: SparseIndex<usize>,
	gkr_operands: Vec<OnceLock<[F; 2]>>,
}

impl<'a, F: CurveField> Solution<'a, F> {
	pub fn new(cs: &'a ConstraintSystem<F>, registry: &'a HintRegistry<F>) -> Self {
		let tables = cs.tables();
		let mut gkr_slot = SparseIndex::new(tables.hints.len());
		for (slot, &hint) in tables.gkr.hints.iter().enumerate() {
			gkr_slot.set(hint, slot);
		}

		Self {
			values: (0..cs.nb_wires()).map(|_| OnceLock::new()).collect(),
			nb_solved: AtomicUsize::new(0),
			coefficients: &tables.coefficients,
			hints: &tables.hints,
			hint_of_wire: &tables.hint_of_wire,
			registry,
			gkr_slot,
			gkr_operands: tables.gkr.hints.iter().map(|_| OnceLock::new()).collect(),
		}
	}

	pub fn coefficients(&self) -> &CoeffTable<F> {
		self.coefficients
	}

	#[inline]
	pub fn get(&self, wire: WireId) -> Option<F> {
		self.values.get(wire)?.get().copied()
	}

	pub fn is_solved(&self, wire: WireId) -> bool {
		self.get(wire).is_some()
	}

	pub fn nb_solved(&self) -> usize {
		self.nb_solved.load(Ordering::Relaxed)
	}

	pub fn set(&self, wire: WireId, value: F) -> Result<(), SolverError> {
		let Some(slot) = self.values.get(wire) else {
			bail_internal!(InternalError::WireOutOfRange {
				wire,
				nb_wires: self.values.len(),
			});
		};
		if slot.set(value).is_err() {
			bail_internal!(InternalError::WireAssignedTwice { wire });
		}
		self.nb_solved.fetch_add(1, Ordering::Relaxed);
		Ok(())
	}

	/// Index of the hint assigning `wire`, if the wire is a hint output.
	#[inline]
	pub fn hint_of(&self, wire: WireId) -> Option<usize> {
		self.hint_of_wire.get(wire).copied()
	}

	/// Evaluates `expression`, running the hints whose outputs it reads.
	pub fn evaluate(
		&self,
		expression: &LinearExpression,
		hint: usize,
		constraint: usize,
	) -> Result<F, SolverError> {
		let mut acc = F::zero();
		for term in expression.iter() {
			let wire = term.wire();
			let value = match self.get(wire) {
				Some(value) => value,
				None => match self.hint_of(wire) {
					Some(nested) => {
						self.solve_with_hint(nested, constraint)?;
						self.get(wire)
							.ok_or(InternalError::UnsolvedHintInput { hint, wire })?
					}
					None => {
						bail_internal!(InternalError::UnsolvedHintInput { hint, wire });
					}
				},
			};
			term.coeff().mul_add(&value, &mut acc, self.coefficients);
		}
		Ok(acc)
	}

	/// Runs hint `index` and assigns its output wires.
	///
	/// Unsolved inputs that are themselves hint outputs are computed first. The operands of
	/// GKR-eligible hints are recorded for the GKR bridge.
	pub fn solve_with_hint(&self, index: usize, constraint: usize) -> Result<(), SolverError> {
		let hint = &self.hints[index];
		let inputs = hint
			.inputs
			.iter()
			.map(|input| self.evaluate(input, index, constraint))
			.collect::<Result<Vec<_>, _>>()?;

		let function = self
			.registry
			.get(hint.id)
			.ok_or(SolverError::MissingHint { id: hint.id })?;
		let mut outputs = vec![F::zero(); hint.wires.len()];
		function(F::CURVE, &inputs, &mut outputs).map_err(|source| SolverError::HintFailed {
			hint: hint.id,
			constraint,
			source,
		})?;

		if let (Some(&slot), [left, right, ..]) = (self.gkr_slot.get(index), inputs.as_slice()) {
			// A slot is only recorded by the first run of its hint.
			let _ = self.gkr_operands[slot].set([*left, *right]);
		}
		for (&wire, value) in hint.wires.iter().zip(outputs) {
			self.set(wire, value)?;
		}
		Ok(())
	}

	/// Operands recorded so far, by GKR slot.
	pub fn gkr_operands(&self) -> Vec<Option<[F; 2]>> {
		self.gkr_operands
			.iter()
			.map(|operands| operands.get().copied())
			.collect()
	}

	pub fn nb_gkr_calls(&self) -> usize {
		self.gkr_operands
			.iter()
			.filter(|operands| operands.get().is_some())
			.count()
	}

	/// Returns the full assignment, failing if some wire was never set.
	pub fn finalize(self) -> Result<Vec<F>, SolverError> {
		let nb_wires = self.values.len();
		let nb_solved = self.nb_solved();
		let values = self
			.values
			.into_iter()
			.map(OnceLock::into_inner)
			.collect::<Vec<_>>();
		if nb_solved != nb_wires || values.iter().any(Option::is_none) {
			let first = values.iter().position(Option::is_none).unwrap_or(nb_wires);
			bail_internal!(InternalError::UnsolvedWires {
				count: values.iter().filter(|value| value.is_none()).count(),
				first,
			});
		}
		Ok(values.into_iter().flatten().collect())
	}
}

#[cfg(all(test, not(feature = "abort_on_internal")))]
mod tests {
	use assert_matches::assert_matches;

	use super::*;
	use crate::test_utils::multiply_circuit;

	type Fr = ark_bn254::Fr;

	#[test]
	fn test_set_rejects_bad_wires() {
		let cs = multiply_circuit::<Fr>().unwrap();
		let registry = HintRegistry::new();
		let solution = Solution::new(&cs, &registry);

		solution.set(1, Fr::from(3u64)).unwrap();
		assert_eq!(solution.get(1), Some(Fr::from(3u64)));
		assert_eq!(solution.nb_solved(), 1);
		assert_matches!(
			solution.set(1, Fr::from(4u64)),
			Err(SolverError::Internal(InternalError::WireAssignedTwice { wire: 1 }))
		);

		let nb_wires = cs.nb_wires();
		assert_matches!(
			solution.set(nb_wires, Fr::from(5u64)),
			Err(SolverError::Internal(InternalError::WireOutOfRange { wire, nb_wires: n }))
				if wire == nb_wires && n == nb_wires
		);
	}
}

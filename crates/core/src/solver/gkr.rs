// Copyright 2025 Irreducible Inc.

use std::ops::Range;

use auto_impl::auto_impl;
use rankone_field::{CurveField, CurveId, Zero};
use rankone_utils::bail_internal;
use tracing::instrument;

use super::{error::SolverError, solution::Solution, SolverOptions};
use crate::{constraint_system::ConstraintSystem, error::InternalError};

/// Wire values computed by the GKR witness generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GkrAssignment<F> {
	pub values: Vec<F>,
	/// First wire assigned.
	pub start: usize,
	/// One past the last wire assigned.
	pub end: usize,
}

impl<F> GkrAssignment<F> {
	pub fn wires(&self) -> Range<usize> {
		self.start..self.end
	}
}

/// Computes the wires of the GKR sub-circuit from the batched hash operands.
#[auto_impl(Arc, &, Box)]
pub trait GkrWitnessGenerator<F>: Send + Sync {
	/// `inputs[0]` holds the left operands at `[0, 2^b_n)` and the right operands at
	/// `[2^b_n, 2^(b_n + 1))`. `initial_length` is the number of public and secret wires.
	fn generate(
		&self,
		curve: CurveId,
		inputs: &[Vec<F>],
		b_n: usize,
		batch_size: usize,
		initial_length: usize,
	) -> anyhow::Result<GkrAssignment<F>>;
}

impl<F: CurveField> ConstraintSystem<F> {
	/// Hands the accumulated operands of the GKR hints to the generator and splices its
	/// output into the solution.
	#[instrument("ConstraintSystem::assign_gkr", skip_all, level = "debug")]
	pub(super) fn assign_gkr(
		&self,
		solution: &Solution<'_, F>,
		opts: &SolverOptions<F>,
	) -> Result<(), SolverError> {
		let operands = solution.gkr_operands();
		if operands.iter().all(Option::is_none) {
			return Ok(());
		}

		let gkr = self.gkr();
		let capacity = gkr
			.capacity()
			.filter(|&capacity| gkr.hints.len() <= capacity && capacity.checked_mul(2).is_some())
			.ok_or(SolverError::GkrCapacityExceeded {
				nb_hints: gkr.hints.len(),
				capacity: gkr.capacity().unwrap_or(usize::MAX),
			})?;
		let generator = opts.gkr.as_ref().ok_or(SolverError::MissingGkrGenerator)?;

		let mut table = vec![F::zero(); 2 * capacity];
		for (slot, pair) in operands.into_iter().enumerate() {
			if let Some([left, right]) = pair {
				table[slot] = left;
				table[slot + capacity] = right;
			}
		}
		tracing::debug!(
			calls = solution.nb_gkr_calls(),
			capacity,
			"running GKR witness generator"
		);

		let assignment = generator
			.generate(F::CURVE, &[table], gkr.b_n, gkr.batch_size, self.witness_len() + 1)
			.map_err(SolverError::GkrFailed)?;
		let GkrAssignment { values, start, end } = assignment;
		if end < start || values.len() != end - start {
			bail_internal!(InternalError::GkrAssignmentLength {
				start,
				end,
				len: values.len(),
			});
		}
		if end > self.nb_wires() {
			bail_internal!(InternalError::GkrAssignmentOutOfRange {
				start,
				end,
				nb_wires: self.nb_wires(),
			});
		}
		for (wire, value) in (start..end).zip(values) {
			solution.set(wire, value)?;
		}
		Ok(())
	}
}

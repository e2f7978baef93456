// Copyright 2025 Irreducible Inc.

//! Metadata for hint calls whose outputs are also proven by an external GKR batch proof.

use std::ops::Range;

use rankone_field::{CurveField, One};
use rankone_utils::{bail, checked_arithmetics::checked_pow2, ensure};
use serde::{Deserialize, Serialize};

use super::{error::Error, r1c::LinearExpression, ConstraintSystem, R1C};

/// Number of permutation rounds chained through the GKR tables.
pub const GKR_ROUNDS: usize = 7;

/// Batch size handed to the witness generator when none is configured.
pub const DEFAULT_GKR_BATCH_SIZE: usize = 13;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GkrMeta {
	/// Level at the start of which the GKR assignment is spliced in.
	pub constraints_level: Option<usize>,
	/// Base-2 logarithm of the batch capacity.
	pub b_n: usize,
	pub batch_size: usize,
	/// Indices of the GKR-eligible hints, in slot order.
	pub hints: Vec<usize>,
	pub input_tables: Vec<LinearExpression>,
	pub output_tables: Vec<LinearExpression>,
}

impl GkrMeta {
	pub fn is_configured(&self) -> bool {
		self.constraints_level.is_some()
	}

	/// Number of operand pairs a single batch holds, `None` if `b_n` overflows.
	pub fn capacity(&self) -> Option<usize> {
		checked_pow2(self.b_n)
	}
}

impl<F: CurveField> ConstraintSystem<F> {
	/// Enables GKR batching with a capacity of `2^b_n` hint calls.
	pub fn configure_gkr(
		&mut self,
		constraints_level: usize,
		b_n: usize,
		batch_size: usize,
	) -> Result<(), Error> {
		self.level_builder()?;
		let capacity = checked_pow2(b_n).ok_or(Error::GkrCapacity {
			nb_hints: self.tables.gkr.hints.len(),
			b_n,
		})?;
		ensure!(
			self.tables.gkr.hints.len() <= capacity,
			Error::GkrCapacity {
				nb_hints: self.tables.gkr.hints.len(),
				b_n
			}
		);

		let gkr = &mut self.tables.gkr;
		gkr.constraints_level = Some(constraints_level);
		gkr.b_n = b_n;
		gkr.batch_size = batch_size;
		Ok(())
	}

	/// Marks hint `hint` as GKR-eligible and returns its slot in the batch.
	pub fn add_gkr_hint(&mut self, hint: usize) -> Result<usize, Error> {
		self.level_builder()?;
		let Some(call) = self.tables.hints.get(hint) else {
			bail!(Error::UnknownHint { hint });
		};
		ensure!(
			call.inputs.len() >= 2 && !call.wires.is_empty(),
			Error::InvalidGkrHint {
				hint,
				reason: "needs two inputs and an output"
			}
		);

		let gkr = &mut self.tables.gkr;
		ensure!(gkr.is_configured(), Error::GkrNotConfigured);
		ensure!(
			!gkr.hints.contains(&hint),
			Error::InvalidGkrHint {
				hint,
				reason: "already registered"
			}
		);
		ensure!(
			gkr.capacity().is_some_and(|capacity| gkr.hints.len() < capacity),
			Error::GkrCapacity {
				nb_hints: gkr.hints.len() + 1,
				b_n: gkr.b_n
			}
		);

		gkr.hints.push(hint);
		Ok(gkr.hints.len() - 1)
	}

	/// Allocates `count` wires assigned by the GKR witness generator.
	///
	/// The wires count as known from the configured GKR level on.
	pub fn reserve_gkr_wires(&mut self, count: usize) -> Result<Range<usize>, Error> {
		let level = self
			.tables
			.gkr
			.constraints_level
			.ok_or(Error::GkrNotConfigured)?;
		self.level_builder()?;

		let start = self.nb_wires();
		for _ in 0..count {
			let wire = self.add_internal_variable();
			self.level_builder()?.mark_ready(wire, level);
		}
		Ok(start..self.nb_wires())
	}

	/// Sets the expressions over the GKR wires that hold each round's inputs and outputs.
	///
	/// Entry `i` of round `r` lives at `i + 2 * r * 2^b_n` for the left input, `2^b_n` further
	/// for the right input, and at `i + r * 2^b_n` in the output table.
	pub fn set_gkr_tables(
		&mut self,
		input_tables: Vec<LinearExpression>,
		output_tables: Vec<LinearExpression>,
	) -> Result<(), Error> {
		self.level_builder()?;
		ensure!(self.tables.gkr.is_configured(), Error::GkrNotConfigured);
		for term in input_tables.iter().chain(&output_tables).flat_map(|e| e.iter()) {
			self.check_wire(term.wire())?;
		}

		let gkr = &mut self.tables.gkr;
		gkr.input_tables = input_tables;
		gkr.output_tables = output_tables;
		Ok(())
	}

	/// Binds the inputs and outputs of every GKR hint to the GKR tables.
	///
	/// For each slot the hint's two inputs are copied into the first round's input tables, each
	/// round's output feeds the next round's left input while the right input carries the key,
	/// and the last round's output is tied to the hint's output wire.
	pub fn finalize_gkr(&mut self) -> Result<(), Error> {
		self.level_builder()?;
		ensure!(self.tables.gkr.is_configured(), Error::GkrNotConfigured);
		let shift = self.tables.gkr.capacity().ok_or(Error::GkrCapacity {
			nb_hints: self.tables.gkr.hints.len(),
			b_n: self.tables.gkr.b_n,
		})?;
		let expected_inputs = 2 * GKR_ROUNDS * shift;
		let expected_outputs = GKR_ROUNDS * shift;
		ensure!(
			self.tables.gkr.input_tables.len() >= expected_inputs,
			Error::GkrTableSize {
				what: "input",
				expected: expected_inputs,
				actual: self.tables.gkr.input_tables.len()
			}
		);
		ensure!(
			self.tables.gkr.output_tables.len() >= expected_outputs,
			Error::GkrTableSize {
				what: "output",
				expected: expected_outputs,
				actual: self.tables.gkr.output_tables.len()
			}
		);

		let one = LinearExpression::new(vec![self.make_term(&F::one(), 0)?]);
		let slots = self.tables.gkr.hints.clone();
		for (i, hint) in slots.into_iter().enumerate() {
			let call = self.tables.hints[hint].clone();
			let output = LinearExpression::new(vec![self.make_term(&F::one(), call.wires[0])?]);
			let inputs = &self.tables.gkr.input_tables;
			let outputs = &self.tables.gkr.output_tables;

			let left = inputs[i].clone();
			let right = inputs[i + shift].clone();
			let mut wiring = vec![
				R1C::new(one.clone(), call.inputs[0].clone(), left),
				R1C::new(one.clone(), call.inputs[1].clone(), right.clone()),
			];
			for round in 1..GKR_ROUNDS {
				let left = inputs[i + 2 * round * shift].clone();
				let previous = outputs[i + (round - 1) * shift].clone();
				wiring.push(R1C::new(one.clone(), previous, left));

				let key = inputs[i + 2 * round * shift + shift].clone();
				wiring.push(R1C::new(one.clone(), right.clone(), key));
			}
			let last = outputs[i + (GKR_ROUNDS - 1) * shift].clone();
			wiring.push(R1C::new(one.clone(), output, last));

			for r1c in wiring {
				self.add_constraint(r1c, None)?;
			}
		}
		Ok(())
	}
}

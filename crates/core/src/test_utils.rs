// Copyright 2024-2025 Irreducible Inc.

//! Small circuits shared by the tests, the benchmarks and the demo binary.

use std::{ops::Range, sync::Arc};

use anyhow::{ensure, Context};
use rankone_field::{CurveField, CurveId, Field, One, Zero};
use rankone_hash::{MimcParams, MIMC_SEED};
use rankone_utils::checked_arithmetics::checked_pow2;

use crate::{
	constraint_system::{
		gkr::{DEFAULT_GKR_BATCH_SIZE, GKR_ROUNDS},
		ConstraintSystem, Error, HintId, LinearExpression, WireId, R1C,
	},
	solver::{hints::MIMC2, GkrAssignment, GkrWitnessGenerator},
};

fn single<F: CurveField>(
	cs: &mut ConstraintSystem<F>,
	coeff: F,
	wire: WireId,
) -> Result<LinearExpression, Error> {
	Ok(LinearExpression::new(vec![cs.make_term(&coeff, wire)?]))
}

fn sum<F: CurveField>(
	cs: &mut ConstraintSystem<F>,
	terms: &[(F, WireId)],
) -> Result<LinearExpression, Error> {
	terms
		.iter()
		.map(|(coeff, wire)| cs.make_term(coeff, *wire))
		.collect()
}

/// `a * b = c` with `a` and `b` secret and `c` solved for.
pub fn multiply_circuit<F: CurveField>() -> Result<ConstraintSystem<F>, Error> {
	let mut cs = ConstraintSystem::new(0, 2);
	let c = cs.add_internal_variable();
	let r1c = R1C::new(
		single(&mut cs, F::one(), 1)?,
		single(&mut cs, F::one(), 2)?,
		single(&mut cs, F::one(), c)?,
	);
	cs.add_constraint(r1c, None)?;
	Ok(cs)
}

/// `a * b = c` with all three wires secret, so the constraint is only checked.
pub fn multiply_assertion_circuit<F: CurveField>() -> Result<ConstraintSystem<F>, Error> {
	let mut cs = ConstraintSystem::new(0, 3);
	let r1c = R1C::new(
		single(&mut cs, F::one(), 1)?,
		single(&mut cs, F::one(), 2)?,
		single(&mut cs, F::one(), 3)?,
	);
	cs.add_constraint(r1c, None)?;
	Ok(cs)
}

/// A chain of MiMC encryptions of a secret message under a secret key.
#[derive(Debug)]
pub struct MimcChain<F: CurveField> {
	pub cs: ConstraintSystem<F>,
	/// Wire holding the last ciphertext.
	pub output: WireId,
	params: MimcParams<F>,
	nb_blocks: usize,
}

impl<F: CurveField> MimcChain<F> {
	/// The witness for encrypting `message` under `key`.
	pub fn witness(&self, message: F, key: F) -> Vec<F> {
		vec![message, key]
	}

	/// The value the solver must assign to [`Self::output`].
	pub fn expected_output(&self, message: F, key: F) -> F {
		(0..self.nb_blocks).fold(message, |state, _| self.params.encrypt(state, key))
	}
}

const MIMC_BLOCK: &str = "mimc-block";

/// Builds `nb_blocks` chained encryptions of `rounds` rounds each.
///
/// Wire 1 is the message and wire 2 the key. Each block first copies its inputs into local wires
/// and then computes every round `x -> (x + k + c)^5` with three constraints. With
/// `record_static` the blocks are recorded as instances of one static template and the system
/// is compacted before it is returned.
pub fn mimc_chain_circuit<F: CurveField>(
	nb_blocks: usize,
	rounds: usize,
	record_static: bool,
) -> Result<MimcChain<F>, Error> {
	let params = MimcParams::<F>::with_rounds(MIMC_SEED, rounds);
	let mut cs = ConstraintSystem::new(0, 2);
	let key = 2;
	let mut state = 1;

	for _ in 0..nb_blocks {
		let inputs = vec![single(&mut cs, F::one(), state)?, single(&mut cs, F::one(), key)?];
		if record_static {
			cs.add_static_constraints(MIMC_BLOCK, cs.nb_constraints(), false, inputs.clone())?;
		}

		let one = single(&mut cs, F::one(), 0)?;
		let x = cs.add_internal_variable();
		let k = cs.add_internal_variable();
		for (input, local) in inputs.iter().zip([x, k]) {
			let r1c = R1C::new(input.clone(), one.clone(), single(&mut cs, F::one(), local)?);
			cs.add_constraint(r1c, None)?;
		}

		let mut x = x;
		for &constant in params.round_constants() {
			let t2 = cs.add_internal_variable();
			let t4 = cs.add_internal_variable();
			let next = cs.add_internal_variable();
			let t = sum(&mut cs, &[(F::one(), x), (F::one(), k), (constant, 0)])?;
			let r1c = R1C::new(t.clone(), t.clone(), single(&mut cs, F::one(), t2)?);
			cs.add_constraint(r1c, None)?;
			let r1c = R1C::new(
				single(&mut cs, F::one(), t2)?,
				single(&mut cs, F::one(), t2)?,
				single(&mut cs, F::one(), t4)?,
			);
			cs.add_constraint(r1c, None)?;
			let r1c =
				R1C::new(single(&mut cs, F::one(), t4)?, t, single(&mut cs, F::one(), next)?);
			cs.add_constraint(r1c, None)?;
			x = next;
		}

		let out = cs.add_internal_variable();
		let r1c = R1C::new(
			sum(&mut cs, &[(F::one(), x), (F::one(), k)])?,
			one,
			single(&mut cs, F::one(), out)?,
		);
		cs.add_constraint(r1c, None)?;

		if record_static {
			cs.add_static_constraints(MIMC_BLOCK, cs.nb_constraints(), true, inputs)?;
		}
		state = out;
	}

	if record_static {
		cs.lazify()?;
	}
	Ok(MimcChain {
		cs,
		output: state,
		params,
		nb_blocks,
	})
}

/// Stands in for the GKR prover: assigns the table wires of [`gkr_mimc_circuit`].
///
/// Slot `i` of round `r` receives the running MiMC state after `(r + 1) * batch_size` rounds,
/// the last round adding the key as the builtin `mimc2` hint does.
#[derive(Debug, Clone)]
pub struct ReferenceGkrGenerator<F: CurveField> {
	wires: Range<usize>,
	params: Arc<MimcParams<F>>,
}

impl<F: CurveField> GkrWitnessGenerator<F> for ReferenceGkrGenerator<F> {
	fn generate(
		&self,
		_curve: CurveId,
		inputs: &[Vec<F>],
		b_n: usize,
		batch_size: usize,
		initial_length: usize,
	) -> anyhow::Result<GkrAssignment<F>> {
		let shift = checked_pow2(b_n).context("batch capacity overflows")?;
		let table = inputs.first().context("missing operand table")?;
		ensure!(table.len() == 2 * shift, "operand table has {} entries", table.len());
		ensure!(
			batch_size * GKR_ROUNDS == self.params.round_constants().len(),
			"{GKR_ROUNDS} batches of {batch_size} rounds do not cover the permutation"
		);
		ensure!(self.wires.start >= initial_length, "table wires overlap the witness");
		ensure!(self.wires.len() == 3 * GKR_ROUNDS * shift, "table wires do not match b_n");

		let outputs_at = 2 * GKR_ROUNDS * shift;
		let mut values = vec![F::zero(); self.wires.len()];
		for i in 0..shift {
			let (left, right) = (table[i], table[i + shift]);
			let key = left;
			let mut state = right - left;
			let mut previous = left;
			for (round, constants) in self.params.round_constants().chunks(batch_size).enumerate() {
				values[2 * round * shift + i] = previous;
				values[2 * round * shift + shift + i] = right;
				for constant in constants {
					let t = state + key + constant;
					state = t.square().square() * t;
				}
				previous = if round + 1 == GKR_ROUNDS {
					state + key
				} else {
					state
				};
				values[outputs_at + round * shift + i] = previous;
			}
		}

		Ok(GkrAssignment {
			values,
			start: self.wires.start,
			end: self.wires.end,
		})
	}
}

/// A circuit hashing `nb_calls` pairs of secrets with `mimc2` hints batched through GKR.
#[derive(Debug)]
pub struct GkrCircuit<F: CurveField> {
	pub cs: ConstraintSystem<F>,
	pub generator: ReferenceGkrGenerator<F>,
	/// Wires holding a copy of each hash.
	pub outputs: Vec<WireId>,
}

impl<F: CurveField> GkrCircuit<F> {
	/// The hashes the solver must assign to [`Self::outputs`] for a witness of operand pairs.
	pub fn expected_outputs(&self, witness: &[F]) -> anyhow::Result<Vec<F>> {
		witness
			.chunks(2)
			.map(|pair| Ok(self.generator.params.compress_chain(pair)?))
			.collect()
	}
}

/// Builds a circuit whose secrets `2i + 1` and `2i + 2` feed the `i`-th `mimc2` hint.
///
/// The hints are solved at level 0, the GKR tables are assigned at level 1 and the wiring
/// constraints check them against the hints from level 1 on.
pub fn gkr_mimc_circuit<F: CurveField>(
	nb_calls: usize,
	b_n: usize,
) -> Result<GkrCircuit<F>, Error> {
	let mut cs = ConstraintSystem::new(0, 2 * nb_calls);
	cs.configure_gkr(1, b_n, DEFAULT_GKR_BATCH_SIZE)?;
	let shift = cs.gkr().capacity().unwrap_or_default();

	let wires = cs.reserve_gkr_wires(3 * GKR_ROUNDS * shift)?;
	let outputs_at = wires.start + 2 * GKR_ROUNDS * shift;
	let input_tables = (wires.start..outputs_at)
		.map(|wire| single(&mut cs, F::one(), wire))
		.collect::<Result<Vec<_>, _>>()?;
	let output_tables = (outputs_at..wires.end)
		.map(|wire| single(&mut cs, F::one(), wire))
		.collect::<Result<Vec<_>, _>>()?;
	cs.set_gkr_tables(input_tables, output_tables)?;

	let one = single(&mut cs, F::one(), 0)?;
	let mut outputs = Vec::with_capacity(nb_calls);
	for i in 0..nb_calls {
		let inputs = vec![
			single(&mut cs, F::one(), 2 * i + 1)?,
			single(&mut cs, F::one(), 2 * i + 2)?,
		];
		let hash = cs.add_hint(HintId::from_name(MIMC2), inputs, 1)?[0];
		let hint = cs.hints().len() - 1;
		cs.add_gkr_hint(hint)?;

		let copy = cs.add_internal_variable();
		let r1c = R1C::new(
			single(&mut cs, F::one(), hash)?,
			one.clone(),
			single(&mut cs, F::one(), copy)?,
		);
		cs.add_constraint(r1c, None)?;
		outputs.push(copy);
	}
	cs.finalize_gkr()?;

	Ok(GkrCircuit {
		cs,
		generator: ReferenceGkrGenerator {
			wires,
			params: Arc::new(MimcParams::new(MIMC_SEED)),
		},
		outputs,
	})
}

// Copyright 2025 Irreducible Inc.

use std::sync::Arc;

use assert_matches::assert_matches;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rankone_core::{
	constraint_system::{DebugInfo, HintId, LinearExpression, WireId, R1C},
	solver::{hints, GkrAssignment, GkrWitnessGenerator, HintRegistry},
	test_utils::{
		gkr_mimc_circuit, mimc_chain_circuit, multiply_assertion_circuit, multiply_circuit,
		ReferenceGkrGenerator,
	},
	ConstraintSystem, InternalError, SolverError, SolverOptions,
};
use rankone_field::{CurveId, One, Zero};

type F = ark_bn254::Fr;

fn expr(cs: &mut ConstraintSystem<F>, wire: WireId) -> LinearExpression {
	LinearExpression::new(vec![cs.make_term(&F::one(), wire).unwrap()])
}

fn outputs(cs: &ConstraintSystem<F>) -> [Vec<F>; 3] {
	let a = vec![F::zero(); cs.nb_constraints()];
	[a.clone(), a.clone(), a]
}

fn solve(
	cs: &ConstraintSystem<F>,
	witness: &[F],
	opts: &SolverOptions<F>,
) -> Result<(Vec<F>, [Vec<F>; 3]), SolverError> {
	let [mut a, mut b, mut c] = outputs(cs);
	let wires = cs.solve(witness, &mut a, &mut b, &mut c, opts)?;
	Ok((wires, [a, b, c]))
}

fn random_elements(rng: &mut StdRng, n: usize) -> Vec<F> {
	(0..n).map(|_| F::from(rng.gen::<u64>())).collect()
}

// `width` independent chains of `depth` squarings, so every level holds `width` constraints.
fn wide_circuit(width: usize, depth: usize) -> ConstraintSystem<F> {
	let mut cs = ConstraintSystem::new(0, width);
	for chain in 0..width {
		let mut wire = chain + 1;
		for _ in 0..depth {
			let next = cs.add_internal_variable();
			let r1c = R1C::new(expr(&mut cs, wire), expr(&mut cs, wire), expr(&mut cs, next));
			cs.add_constraint(r1c, None).unwrap();
			wire = next;
		}
	}
	cs
}

#[test]
fn test_multiply() {
	let cs = multiply_circuit::<F>().unwrap();
	let (wires, [a, b, c]) =
		solve(&cs, &[F::from(3u64), F::from(4u64)], &SolverOptions::default()).unwrap();

	assert_eq!(wires, vec![F::one(), F::from(3u64), F::from(4u64), F::from(12u64)]);
	assert_eq!(a, vec![F::from(3u64)]);
	assert_eq!(b, vec![F::from(4u64)]);
	assert_eq!(c, vec![F::from(12u64)]);
}

#[test]
fn test_unsatisfied_constraint() {
	let cs = multiply_assertion_circuit::<F>().unwrap();
	let witness = [F::from(3u64), F::from(4u64), F::from(13u64)];
	assert_matches!(
		solve(&cs, &witness, &SolverOptions::default()),
		Err(SolverError::Unsatisfied { index: 0, debug: None, .. })
	);

	let witness = [F::from(3u64), F::from(4u64), F::from(12u64)];
	cs.is_solved(&witness, &SolverOptions::default()).unwrap();
}

#[test]
fn test_unsatisfied_constraint_carries_debug_info() {
	let mut cs = ConstraintSystem::<F>::new(0, 3);
	let r1c = R1C::new(expr(&mut cs, 1), expr(&mut cs, 2), expr(&mut cs, 3));
	let debug = DebugInfo::new("multiply.rs:12")
		.text("product of ")
		.expression(expr(&mut cs, 1));
	cs.add_constraint(r1c, Some(debug)).unwrap();

	let witness = [F::from(2u64), F::from(2u64), F::from(5u64)];
	let err = cs
		.is_solved(&witness, &SolverOptions::default())
		.unwrap_err();
	assert_matches!(
		&err,
		SolverError::Unsatisfied { index: 0, debug: Some(debug), .. } if debug.contains("product of")
	);
	assert!(err.to_string().contains("constraint #0"));
}

#[test]
fn test_invalid_sizes() {
	let cs = multiply_circuit::<F>().unwrap();
	let opts = SolverOptions::default();
	assert_matches!(
		cs.is_solved(&[F::one()], &opts),
		Err(SolverError::InvalidWitnessSize {
			got: 1,
			expected: 2
		})
	);

	let mut a = vec![F::zero(); 2];
	let mut b = vec![F::zero(); 1];
	let mut c = vec![F::zero(); 1];
	assert_matches!(
		cs.solve(&[F::one(), F::one()], &mut a, &mut b, &mut c, &opts),
		Err(SolverError::InvalidOutputSize {
			got: 2,
			expected: 1
		})
	);
}

#[test]
fn test_zero_divisor_falls_back_to_check() {
	// `x * b = c` with `x` unknown and `b = 0` cannot be inverted.
	let mut cs = ConstraintSystem::<F>::new(0, 2);
	let x = cs.add_internal_variable();
	let r1c = R1C::new(expr(&mut cs, x), expr(&mut cs, 1), expr(&mut cs, 2));
	cs.add_constraint(r1c, None).unwrap();

	let opts = SolverOptions::default();
	let (wires, _) = solve(&cs, &[F::zero(), F::zero()], &opts).unwrap();
	assert_eq!(wires[x], F::zero());

	assert_matches!(
		solve(&cs, &[F::zero(), F::one()], &opts),
		Err(SolverError::Unsatisfied { index: 0, .. })
	);
}

#[test]
fn test_coefficients_are_divided_out() {
	// `(a + 2x) * 1 = 7 * b` solves `x = (7b - a) / 2`.
	let mut cs = ConstraintSystem::<F>::new(0, 2);
	let x = cs.add_internal_variable();
	let l = LinearExpression::new(vec![
		cs.make_term(&F::one(), 1).unwrap(),
		cs.make_term(&F::from(2u64), x).unwrap(),
	]);
	let one = expr(&mut cs, 0);
	let o = LinearExpression::new(vec![cs.make_term(&F::from(7u64), 2).unwrap()]);
	cs.add_constraint(R1C::new(l, one, o), None).unwrap();

	let (wires, _) =
		solve(&cs, &[F::from(1u64), F::from(3u64)], &SolverOptions::default()).unwrap();
	assert_eq!(wires[x], F::from(10u64));
}

#[test]
fn test_products_hold_for_random_witnesses() {
	let mut rng = StdRng::seed_from_u64(0);
	let cs = wide_circuit(8, 5);
	for _ in 0..4 {
		let witness = random_elements(&mut rng, cs.witness_len());
		let (wires, [a, b, c]) = solve(&cs, &witness, &SolverOptions::default()).unwrap();
		assert_eq!(wires.len(), cs.nb_wires());
		for i in 0..cs.nb_constraints() {
			assert_eq!(a[i] * b[i], c[i]);
		}
	}
}

#[test]
fn test_parallel_matches_sequential() {
	let mut rng = StdRng::seed_from_u64(1);
	let cs = wide_circuit(64, 4);
	let witness = random_elements(&mut rng, cs.witness_len());

	let sequential = SolverOptions::default().with_num_threads(1);
	let parallel = SolverOptions::default()
		.with_num_threads(4)
		.with_min_work_per_cpu(8);
	assert_eq!(
		solve(&cs, &witness, &sequential).unwrap(),
		solve(&cs, &witness, &parallel).unwrap()
	);
}

#[test]
fn test_parallel_reports_first_failing_constraint() {
	let mut cs = ConstraintSystem::<F>::new(0, 64);
	let zero = LinearExpression::default();
	for wire in 1..=64 {
		let r1c = R1C::new(expr(&mut cs, wire), expr(&mut cs, 0), zero.clone());
		cs.add_constraint(r1c, None).unwrap();
	}

	let mut witness = vec![F::zero(); 64];
	witness[20] = F::one();
	witness[50] = F::one();
	let opts = SolverOptions::default()
		.with_num_threads(4)
		.with_min_work_per_cpu(4);
	assert_matches!(
		solve(&cs, &witness, &opts),
		Err(SolverError::Unsatisfied { index: 20, .. })
	);
}

#[test]
fn test_mimc_chain() {
	let chain = mimc_chain_circuit::<F>(3, 11, false).unwrap();
	let (message, key) = (F::from(5u64), F::from(42u64));
	let (wires, _) =
		solve(&chain.cs, &chain.witness(message, key), &SolverOptions::default()).unwrap();
	assert_eq!(wires[chain.output], chain.expected_output(message, key));
}

#[test]
fn test_hints() {
	let mut cs = ConstraintSystem::<F>::new(0, 1);
	let inputs = vec![expr(&mut cs, 1)];
	let is_zero = cs
		.add_hint(HintId::from_name(hints::IS_ZERO), inputs, 1)
		.unwrap()[0];
	// is_zero(x) * x = 0
	let r1c = R1C::new(expr(&mut cs, is_zero), expr(&mut cs, 1), LinearExpression::default());
	cs.add_constraint(r1c, None).unwrap();

	let opts = SolverOptions::default();
	let (wires, _) = solve(&cs, &[F::zero()], &opts).unwrap();
	assert_eq!(wires[is_zero], F::one());
	let (wires, _) = solve(&cs, &[F::from(9u64)], &opts).unwrap();
	assert_eq!(wires[is_zero], F::zero());

	assert_matches!(
		solve(&cs, &[F::zero()], &SolverOptions::default().with_hints(HintRegistry::new())),
		Err(SolverError::MissingHint { id }) if id == HintId::from_name(hints::IS_ZERO)
	);

	let mut failing = HintRegistry::new();
	failing.register(hints::IS_ZERO, |_, _, _| anyhow::bail!("refusing"));
	assert_matches!(
		solve(&cs, &[F::zero()], &SolverOptions::default().with_hints(failing)),
		Err(SolverError::HintFailed { constraint: 0, source, .. }) if source.to_string() == "refusing"
	);
}

#[test]
fn test_custom_hint() {
	let mut cs = ConstraintSystem::<F>::new(0, 1);
	let inputs = vec![expr(&mut cs, 1)];
	let root = cs.add_hint(HintId::from_name("sqrt"), inputs, 1).unwrap()[0];
	let r1c = R1C::new(expr(&mut cs, root), expr(&mut cs, root), expr(&mut cs, 1));
	cs.add_constraint(r1c, None).unwrap();

	let mut registry = HintRegistry::with_builtins();
	registry.register("sqrt", |_, inputs: &[F], outputs: &mut [F]| {
		use rankone_field::Field;
		outputs[0] = inputs[0]
			.sqrt()
			.ok_or_else(|| anyhow::anyhow!("not a square"))?;
		Ok(())
	});
	let opts = SolverOptions::default().with_hints(registry);
	let (wires, _) = solve(&cs, &[F::from(49u64)], &opts).unwrap();
	assert_eq!(wires[root] * wires[root], F::from(49u64));
}

#[test]
fn test_gkr_bridge() {
	let circuit = gkr_mimc_circuit::<F>(3, 2).unwrap();
	let mut rng = StdRng::seed_from_u64(2);
	let witness = random_elements(&mut rng, circuit.cs.witness_len());

	let opts = SolverOptions::default().with_gkr(Arc::new(circuit.generator.clone()));
	let (wires, _) = solve(&circuit.cs, &witness, &opts).unwrap();
	let hashes = circuit
		.outputs
		.iter()
		.map(|&wire| wires[wire])
		.collect::<Vec<_>>();
	assert_eq!(hashes, circuit.expected_outputs(&witness).unwrap());

	assert_matches!(
		solve(&circuit.cs, &witness, &SolverOptions::default()),
		Err(SolverError::MissingGkrGenerator)
	);
}

#[test]
fn test_gkr_bridge_with_full_batch() {
	let circuit = gkr_mimc_circuit::<F>(4, 2).unwrap();
	let witness = (1..=8).map(|i| F::from(i as u64)).collect::<Vec<_>>();
	let opts = SolverOptions::default()
		.with_gkr(Arc::new(circuit.generator.clone()))
		.with_num_threads(1);
	circuit.cs.is_solved(&witness, &opts).unwrap();
}

#[cfg(not(feature = "abort_on_internal"))]
#[test]
fn test_two_unknown_wires_is_internal() {
	let mut cs = ConstraintSystem::<F>::new(0, 1);
	let x = cs.add_internal_variable();
	let y = cs.add_internal_variable();
	let r1c = R1C::new(expr(&mut cs, x), expr(&mut cs, y), expr(&mut cs, 1));
	cs.add_constraint(r1c, None).unwrap();

	assert_matches!(
		cs.is_solved(&[F::one()], &SolverOptions::default()),
		Err(SolverError::Internal(InternalError::MultipleUnsolvedWires { constraint: 0 }))
	);
}

#[cfg(not(feature = "abort_on_internal"))]
#[test]
fn test_unsolved_wire_is_internal() {
	let mut cs = ConstraintSystem::<F>::new(0, 1);
	let dangling = cs.add_internal_variable();
	let r1c = R1C::new(expr(&mut cs, 1), expr(&mut cs, 0), expr(&mut cs, 1));
	cs.add_constraint(r1c, None).unwrap();

	assert_matches!(
		cs.is_solved(&[F::one()], &SolverOptions::default()),
		Err(SolverError::Internal(InternalError::UnsolvedWires { count: 1, first }))
			if first == dangling
	);
}

/// Runs the reference generator, then damages its assignment.
struct Tampered {
	inner: ReferenceGkrGenerator<F>,
	tamper: fn(&mut GkrAssignment<F>),
}

impl GkrWitnessGenerator<F> for Tampered {
	fn generate(
		&self,
		curve: CurveId,
		inputs: &[Vec<F>],
		b_n: usize,
		batch_size: usize,
		initial_length: usize,
	) -> anyhow::Result<GkrAssignment<F>> {
		let mut assignment = self
			.inner
			.generate(curve, inputs, b_n, batch_size, initial_length)?;
		(self.tamper)(&mut assignment);
		Ok(assignment)
	}
}

fn solve_tampered(tamper: fn(&mut GkrAssignment<F>)) -> (usize, Result<(), SolverError>) {
	let circuit = gkr_mimc_circuit::<F>(2, 1).unwrap();
	let witness = (1..=4).map(|i| F::from(i as u64)).collect::<Vec<_>>();
	let generator = Tampered {
		inner: circuit.generator.clone(),
		tamper,
	};
	let opts = SolverOptions::default().with_gkr(Arc::new(generator));
	(circuit.cs.nb_wires(), circuit.cs.is_solved(&witness, &opts))
}

#[cfg(not(feature = "abort_on_internal"))]
#[test]
fn test_short_gkr_assignment_is_internal() {
	let (_, result) = solve_tampered(|assignment| {
		assignment.values.pop();
	});
	assert_matches!(
		result,
		Err(SolverError::Internal(InternalError::GkrAssignmentLength { start, end, len }))
			if len + 1 == end - start
	);
}

#[cfg(not(feature = "abort_on_internal"))]
#[test]
fn test_gkr_assignment_past_last_wire_is_internal() {
	let (nb_wires, result) = solve_tampered(|assignment| {
		let len = assignment.end - assignment.start;
		assignment.start = assignment.end;
		assignment.end += len;
	});
	assert_matches!(
		result,
		Err(SolverError::Internal(InternalError::GkrAssignmentOutOfRange { end, nb_wires: n, .. }))
			if end > n && n == nb_wires
	);
}

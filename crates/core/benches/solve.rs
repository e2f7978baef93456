// Copyright 2025 Irreducible Inc.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use rankone_core::{
	persistence::Encoding, test_utils::mimc_chain_circuit, ConstraintSystem, SolverOptions,
};
use rankone_field::Zero;

type Fr = ark_bn254::Fr;

const ROUNDS: usize = 91;

fn solve_once(cs: &ConstraintSystem<Fr>, witness: &[Fr], opts: &SolverOptions<Fr>) -> Vec<Fr> {
	let mut a = vec![Fr::zero(); cs.nb_constraints()];
	let mut b = a.clone();
	let mut c = a.clone();
	cs.solve(witness, &mut a, &mut b, &mut c, opts)
		.expect("benchmark circuit is satisfiable")
}

fn bench_solve(c: &mut Criterion) {
	let mut group = c.benchmark_group("solve");
	group.sample_size(10);
	for record_static in [false, true] {
		let chain = mimc_chain_circuit::<Fr>(16, ROUNDS, record_static).unwrap();
		let witness = chain.witness(Fr::from(7u64), Fr::from(11u64));
		let opts = SolverOptions::default();
		let name = if record_static { "mimc_lazy" } else { "mimc" };

		group.throughput(Throughput::Elements(chain.cs.nb_constraints() as u64));
		group.bench_with_input(BenchmarkId::new(name, chain.cs.nb_constraints()), &witness, |b, w| {
			b.iter(|| solve_once(&chain.cs, w, &opts))
		});
	}
	group.finish();
}

fn bench_persistence(c: &mut Criterion) {
	let chain = mimc_chain_circuit::<Fr>(16, ROUNDS, false).unwrap();
	let mut group = c.benchmark_group("persistence");
	group.sample_size(10);
	for encoding in [Encoding::Binary, Encoding::Structured] {
		let mut buf = Vec::new();
		chain.cs.write_to(&mut buf, encoding).unwrap();
		group.throughput(Throughput::Bytes(buf.len() as u64));

		group.bench_function(BenchmarkId::new("write", format!("{encoding:?}")), |b| {
			b.iter_batched(
				Vec::new,
				|mut sink| chain.cs.write_to(&mut sink, encoding).unwrap(),
				BatchSize::SmallInput,
			)
		});
		group.bench_function(BenchmarkId::new("read", format!("{encoding:?}")), |b| {
			b.iter(|| ConstraintSystem::<Fr>::read_from(buf.as_slice(), encoding).unwrap())
		});
	}
	group.finish();
}

criterion_group!(solve, bench_solve, bench_persistence);
criterion_main!(solve);

// Copyright 2025 Irreducible Inc.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rankone_hash::{Hasher, MimcHasher, MimcParams, MIMC_SEED};

fn bench_mimc(c: &mut Criterion) {
	type Fr = ark_bn254::Fr;

	let params = Arc::new(MimcParams::<Fr>::new(MIMC_SEED));
	let mut rng = StdRng::seed_from_u64(0);

	let mut group = c.benchmark_group("mimc");
	for n in [1usize, 16, 256] {
		let data = (0..n).map(|_| Fr::from(rng.gen::<u64>())).collect::<Vec<_>>();
		group.throughput(Throughput::Elements(n as u64));
		group.bench_with_input(BenchmarkId::new("hash", n), &data, |b, data| {
			b.iter(|| MimcHasher::new(params.clone()).chain_update(data).finalize())
		});
		group.bench_with_input(BenchmarkId::new("compress_chain", n), &data, |b, data| {
			b.iter(|| params.compress_chain(data))
		});
	}
	group.finish();
}

criterion_group!(mimc, bench_mimc);
criterion_main!(mimc);

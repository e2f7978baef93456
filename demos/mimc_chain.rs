// Copyright 2025 Irreducible Inc.

//! Solves a chain of MiMC encryptions and round-trips the constraint system through sharded
//! persistence.
//!
//! The circuit encrypts a random message under a random key `--blocks` times. With `--static`
//! every encryption is recorded as an instance of a single template and the constraint list is
//! compacted, so only the template and one small record per instance are stored and persisted.

use std::{path::PathBuf, time::Instant};

use anyhow::{ensure, Result};
use clap::{Parser, ValueEnum};
use rand::{thread_rng, Rng};
use rankone_core::{
	persistence::Encoding, test_utils::mimc_chain_circuit, ConstraintSystem, SolverOptions,
};
use rankone_field::{CurveField, Zero};
use rankone_utils::{rayon::adjust_thread_pool, tracing::init_tracing};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Curve {
	Bn254,
	Bls12_381,
	Bls12_377,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
	Binary,
	Structured,
}

impl From<Format> for Encoding {
	fn from(format: Format) -> Self {
		match format {
			Format::Binary => Self::Binary,
			Format::Structured => Self::Structured,
		}
	}
}

#[derive(Debug, Parser)]
struct Args {
	/// Number of chained encryptions.
	#[arg(long, default_value_t = 64)]
	blocks: usize,
	/// Rounds of each encryption.
	#[arg(long, default_value_t = 91)]
	rounds: usize,
	/// Record the encryptions as instances of one static template.
	#[arg(long = "static")]
	record_static: bool,
	#[arg(long, value_enum, default_value_t = Curve::Bn254)]
	curve: Curve,
	#[arg(long, value_enum, default_value_t = Format::Binary)]
	format: Format,
	/// Constraints per body shard.
	#[arg(long, default_value_t = 1000)]
	shard_size: usize,
	/// Threads loading the shards.
	#[arg(long, default_value_t = 4)]
	workers: usize,
	/// Directory receiving the shards, a temporary directory by default.
	#[arg(long)]
	out_dir: Option<PathBuf>,
}

fn solve<F: CurveField>(cs: &ConstraintSystem<F>, witness: &[F]) -> Result<Vec<F>> {
	let mut a = vec![F::zero(); cs.nb_constraints()];
	let mut b = a.clone();
	let mut c = a.clone();
	Ok(cs.solve(witness, &mut a, &mut b, &mut c, &SolverOptions::from_env())?)
}

fn run<F: CurveField>(args: &Args) -> Result<()> {
	let chain = mimc_chain_circuit::<F>(args.blocks, args.rounds, args.record_static)?;
	let cs = &chain.cs;
	println!(
		"{} constraints ({} stored), {} wires, {} levels",
		cs.nb_constraints(),
		cs.nb_stored_constraints(),
		cs.nb_wires(),
		cs.levels().len()
	);

	let mut rng = thread_rng();
	let (message, key) = (F::from(rng.gen::<u64>()), F::from(rng.gen::<u64>()));
	let witness = chain.witness(message, key);

	let start = Instant::now();
	let wires = solve(cs, &witness)?;
	println!("solved in {:?}", start.elapsed());
	ensure!(
		wires[chain.output] == chain.expected_output(message, key),
		"solver output differs from the reference encryption"
	);

	let tmp = tempfile::tempdir()?;
	let dir = args.out_dir.clone().unwrap_or_else(|| tmp.path().to_path_buf());
	let session = dir.join("mimc_chain");
	let encoding = args.format.into();

	let start = Instant::now();
	let written = cs.split_dump(&session, args.shard_size, encoding)?;
	println!("dumped {written} bytes in {:?}", start.elapsed());

	let start = Instant::now();
	let loaded = ConstraintSystem::<F>::load_from_split(
		&session,
		cs.nb_stored_constraints(),
		args.shard_size,
		args.workers,
		encoding,
	)?;
	println!("loaded with {} workers in {:?}", args.workers, start.elapsed());

	ensure!(solve(&loaded, &witness)? == wires, "reloaded system solves differently");
	tracing::info!(curve = %F::CURVE, "round trip complete");
	Ok(())
}

fn main() -> Result<()> {
	adjust_thread_pool()
		.as_ref()
		.expect("failed to init thread pool");
	init_tracing();

	let args = Args::parse();
	match args.curve {
		Curve::Bn254 => run::<ark_bn254::Fr>(&args),
		Curve::Bls12_381 => run::<ark_bls12_381::Fr>(&args),
		Curve::Bls12_377 => run::<ark_bls12_377::Fr>(&args),
	}
}

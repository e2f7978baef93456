// Copyright 2025 Irreducible Inc.

use std::{collections::HashMap, fmt, sync::Arc};

use anyhow::ensure;
use ark_ff::BigInteger;
use rankone_field::{CurveField, CurveId, Field, One};
use rankone_hash::{MimcParams, MIMC_SEED};

use crate::constraint_system::HintId;

/// A hint function: computes its outputs from the values of its inputs.
pub type HintFn<F> = Arc<dyn Fn(CurveId, &[F], &mut [F]) -> anyhow::Result<()> + Send + Sync>;

pub const IS_ZERO: &str = "is_zero";
pub const SELF: &str = "self";
pub const MIMC2: &str = "mimc2";
pub const MIMC: &str = "mimc";

/// Hint functions available to a solve, keyed by [`HintId`].
#[derive(Clone)]
pub struct HintRegistry<F> {
	functions: HashMap<HintId, HintFn<F>>,
}

impl<F> fmt::Debug for HintRegistry<F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut ids = self.functions.keys().collect::<Vec<_>>();
		ids.sort_unstable();
		f.debug_struct("HintRegistry").field("ids", &ids).finish()
	}
}

impl<F> Default for HintRegistry<F> {
	fn default() -> Self {
		Self {
			functions: HashMap::new(),
		}
	}
}

impl<F: CurveField> HintRegistry<F> {
	pub fn new() -> Self {
		Self::default()
	}

	/// A registry holding `is_zero`, `self`, `mimc2` and `mimc`.
	pub fn with_builtins() -> Self {
		let mut registry = Self::new();
		registry.register(IS_ZERO, is_zero::<F>);
		registry.register(SELF, identity::<F>);

		let params = Arc::new(MimcParams::<F>::new(MIMC_SEED));
		let mimc2 = params.clone();
		registry.register(MIMC2, move |_, inputs: &[F], outputs: &mut [F]| {
			ensure!(
				inputs.len() == 2 && !outputs.is_empty(),
				"{MIMC2} maps two inputs to one output, got {} inputs",
				inputs.len()
			);
			outputs[0] = mimc2.compress_chain(inputs)?;
			Ok(())
		});
		registry.register(MIMC, move |_, inputs: &[F], outputs: &mut [F]| {
			ensure!(!inputs.is_empty() && !outputs.is_empty(), "empty input or output");
			outputs[0] = params.compress_chain(inputs)?;
			Ok(())
		});
		registry
	}

	/// Registers `function` under the identifier derived from `name`, replacing any previous one.
	pub fn register(
		&mut self,
		name: &str,
		function: impl Fn(CurveId, &[F], &mut [F]) -> anyhow::Result<()> + Send + Sync + 'static,
	) -> HintId {
		let id = HintId::from_name(name);
		self.functions.insert(id, Arc::new(function));
		id
	}

	pub fn get(&self, id: HintId) -> Option<&HintFn<F>> {
		self.functions.get(&id)
	}

	pub fn contains(&self, id: HintId) -> bool {
		self.functions.contains_key(&id)
	}
}

/// `1 - a^(q - 1)`: one when `a` is zero, zero otherwise.
fn is_zero<F: CurveField>(_: CurveId, inputs: &[F], outputs: &mut [F]) -> anyhow::Result<()> {
	ensure!(inputs.len() == 1 && outputs.len() == 1, "{IS_ZERO} maps one input to one output");
	let mut exponent = F::MODULUS;
	exponent.sub_with_borrow(&1u64.into());
	outputs[0] = F::one() - inputs[0].pow(exponent);
	Ok(())
}

fn identity<F: CurveField>(_: CurveId, inputs: &[F], outputs: &mut [F]) -> anyhow::Result<()> {
	ensure!(inputs.len() == 1 && outputs.len() == 1, "{SELF} maps one input to one output");
	outputs[0] = inputs[0];
	Ok(())
}

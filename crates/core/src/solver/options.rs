// Copyright 2025 Irreducible Inc.

use std::{fmt, sync::Arc};

use rankone_field::CurveField;
use rankone_utils::env::usize_env_var;

use super::{gkr::GkrWitnessGenerator, hints::HintRegistry};

/// Minimum number of constraints of a level handed to a single worker.
pub const MIN_WORK_PER_CPU: usize = 50;

pub const THREADS_ENV: &str = "RANKONE_SOLVER_THREADS";
pub const MIN_WORK_ENV: &str = "RANKONE_MIN_WORK_PER_CPU";

#[derive(Clone)]
pub struct SolverOptions<F> {
	pub hints: Arc<HintRegistry<F>>,
	pub gkr: Option<Arc<dyn GkrWitnessGenerator<F>>>,
	/// Size of the worker pool, the available parallelism when `None`. One worker solves every
	/// level on the calling thread.
	pub num_threads: Option<usize>,
	pub min_work_per_cpu: usize,
}

impl<F> fmt::Debug for SolverOptions<F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SolverOptions")
			.field("hints", &self.hints)
			.field("gkr", &self.gkr.is_some())
			.field("num_threads", &self.num_threads)
			.field("min_work_per_cpu", &self.min_work_per_cpu)
			.finish()
	}
}

impl<F: CurveField> Default for SolverOptions<F> {
	fn default() -> Self {
		Self {
			hints: Arc::new(HintRegistry::with_builtins()),
			gkr: None,
			num_threads: None,
			min_work_per_cpu: MIN_WORK_PER_CPU,
		}
	}
}

impl<F: CurveField> SolverOptions<F> {
	/// Default options, with the pool size and the work threshold overridden by
	/// `RANKONE_SOLVER_THREADS` and `RANKONE_MIN_WORK_PER_CPU` when set.
	pub fn from_env() -> Self {
		let defaults = Self::default();
		Self {
			num_threads: usize_env_var(THREADS_ENV).filter(|&n| n > 0),
			min_work_per_cpu: usize_env_var(MIN_WORK_ENV)
				.filter(|&n| n > 0)
				.unwrap_or(defaults.min_work_per_cpu),
			..defaults
		}
	}

	pub fn with_hints(mut self, hints: HintRegistry<F>) -> Self {
		self.hints = Arc::new(hints);
		self
	}

	pub fn with_gkr(mut self, generator: Arc<dyn GkrWitnessGenerator<F>>) -> Self {
		self.gkr = Some(generator);
		self
	}

	pub fn with_num_threads(mut self, num_threads: usize) -> Self {
		self.num_threads = Some(num_threads.max(1));
		self
	}

	pub fn with_min_work_per_cpu(mut self, min_work_per_cpu: usize) -> Self {
		self.min_work_per_cpu = min_work_per_cpu.max(1);
		self
	}

	/// Number of workers a level may be split across.
	pub(super) fn nb_workers(&self) -> usize {
		self.num_threads.unwrap_or_else(|| {
			std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
		})
	}
}

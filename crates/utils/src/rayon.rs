// Copyright 2024 Irreducible Inc.

use std::{env, sync::OnceLock};

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

/// In case when number of threads is set to 1, use rayon thread pool with
/// `use_current_thread` set to true. The performance is almost the same as if rayon
/// wasn't used at all, and profiling results are less noisy.
///
/// NOTE: rayon doesn't allow initializing global thread pool several times, so
/// the result of the first call is cached and returned on every subsequent call.
/// The typical usage of the function is to place its call in the beginning of the `main`.
pub fn adjust_thread_pool() -> &'static Result<(), ThreadPoolBuildError> {
	static ONCE_GUARD: OnceLock<Result<(), ThreadPoolBuildError>> = OnceLock::new();

	ONCE_GUARD.get_or_init(|| match env::var("RAYON_NUM_THREADS") {
		Ok(v) if v == "1" => ThreadPoolBuilder::new()
			.num_threads(1)
			.use_current_thread()
			.build_global(),
		_ => Ok(()),
	})
}

/// Builds a dedicated worker pool.
///
/// `None` sizes the pool to the available hardware parallelism. The pool is owned by the
/// caller. Dropping it tells the threads to exit once idle but does not wait for them.
pub fn build_thread_pool(
	num_threads: Option<usize>,
	name: &'static str,
) -> Result<ThreadPool, ThreadPoolBuildError> {
	ThreadPoolBuilder::new()
		.num_threads(num_threads.unwrap_or(0))
		.thread_name(move |index| format!("{name}-{index}"))
		.build()
}

// Copyright 2025 Irreducible Inc.

use std::ops::Range;

/// How the constraints of one level are solved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
	/// On the calling thread, in level order.
	Sequential,
	/// One task per contiguous chunk of the level.
	Parallel(Vec<Range<usize>>),
}

/// Splits a level of `len` constraints across at most `nb_workers` workers, each receiving at
/// least `min_work` constraints.
///
/// Levels that do not fill more than one worker are solved sequentially. Otherwise the chunks
/// have equal sizes, except that the remainder is spread one constraint at a time over the
/// first chunks.
pub fn partition_level(len: usize, nb_workers: usize, min_work: usize) -> Dispatch {
	let min_work = min_work.max(1);
	if len <= min_work || nb_workers <= 1 {
		return Dispatch::Sequential;
	}

	let nb_tasks = nb_workers.min(len.div_ceil(min_work));
	let per_task = len / nb_tasks;
	let mut extra = len - nb_tasks * per_task;

	let mut chunks = Vec::with_capacity(nb_tasks);
	let mut start = 0;
	for _ in 0..nb_tasks {
		let mut end = start + per_task;
		if extra > 0 {
			end += 1;
			extra -= 1;
		}
		chunks.push(start..end);
		start = end;
	}
	Dispatch::Parallel(chunks)
}

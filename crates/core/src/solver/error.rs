// Copyright 2024-2025 Irreducible Inc.

use crate::{constraint_system::HintId, error::InternalError};

#[derive(Debug, thiserror::Error)]
pub enum SolverError {
	#[error("the witness holds {got} values, the system expects {expected}")]
	InvalidWitnessSize { got: usize, expected: usize },

	#[error("output vectors hold {got} entries, the system has {expected} constraints")]
	InvalidOutputSize { got: usize, expected: usize },

	#[error("constraint #{index} is not satisfied: {reason}{}", with_context(.debug))]
	Unsatisfied {
		index: usize,
		reason: String,
		/// Rendered debug context of the constraint, when the circuit attached one.
		debug: Option<String>,
	},

	#[error("{hint} failed while solving constraint #{constraint}: {source}")]
	HintFailed {
		hint: HintId,
		constraint: usize,
		#[source]
		source: anyhow::Error,
	},

	#[error("no function is registered for {id}")]
	MissingHint { id: HintId },

	#[error("{nb_hints} GKR hint calls exceed the batch capacity of {capacity}")]
	GkrCapacityExceeded { nb_hints: usize, capacity: usize },

	#[error("GKR hints were called but no GKR witness generator is configured")]
	MissingGkrGenerator,

	#[error("GKR witness generation failed: {0}")]
	GkrFailed(#[source] anyhow::Error),

	#[error("cannot build the solver thread pool: {0}")]
	ThreadPool(#[from] rayon::ThreadPoolBuildError),

	#[error("internal error: {0}")]
	Internal(#[from] InternalError),
}

fn with_context(debug: &Option<String>) -> String {
	debug
		.as_ref()
		.map(|debug| format!("\n{debug}"))
		.unwrap_or_default()
}

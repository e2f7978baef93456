// Copyright 2024-2025 Irreducible Inc.

use std::path::PathBuf;

use rankone_field::SerializationError;

use crate::constraint_system;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("cannot decode binary constraint system: {0}")]
	Decode(#[from] SerializationError),

	#[error("cannot encode or decode structured constraint system: {0}")]
	Bincode(#[from] bincode::Error),

	#[error("header mismatch: {0}")]
	HeaderMismatch(String),

	#[error("{count} unexpected bytes after the constraint system")]
	TrailingBytes { count: usize },

	#[error("shard {path:?} holds {got} constraints, its name announces {expected}")]
	ShardSizeMismatch {
		path: PathBuf,
		expected: usize,
		got: usize,
	},

	#[error("the shard size must be positive")]
	ZeroBatchSize,

	#[error("cannot build the loader thread pool: {0}")]
	ThreadPool(#[from] rayon::ThreadPoolBuildError),

	#[error("loaded constraint system is inconsistent: {0}")]
	Constraint(#[from] constraint_system::Error),
}

// Copyright 2023-2025 Irreducible Inc.

/// Trait representing cryptographic hash functions which is generic over the input type.
///
/// This interface is largely based on the `digest::Digest` trait, except that instead of
/// requiring byte strings as input and byte arrays as output, this is generic over the input
/// values and has a less constrained output digest type.
pub trait Hasher<T> {
	/// The hash function output type.
	type Digest;

	fn update(&mut self, data: impl AsRef<[T]>);

	fn chain_update(mut self, data: impl AsRef<[T]>) -> Self
	where
		Self: Sized,
	{
		self.update(data);
		self
	}

	fn finalize(self) -> Self::Digest;
	fn reset(&mut self);
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HashError {
	#[error("Empty inputs are not allowed")]
	EmptyInput,
	#[error("Expected {expected} outputs, got room for {actual}")]
	OutputLength { expected: usize, actual: usize },
}

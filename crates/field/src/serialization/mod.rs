// Copyright 2024-2025 Irreducible Inc.

mod error;
mod field;
mod impls;

use auto_impl::auto_impl;
use bytes::{Buf, BufMut};
pub use error::Error;

/// Represents type that can be serialized to a byte buffer.
///
/// Integers are written big-endian and collections carry a `u64` length prefix.
#[auto_impl(Box, &)]
pub trait SerializeBytes {
	fn serialize(&self, write_buf: impl BufMut) -> Result<(), Error>;
}

/// Represents type that can be deserialized from a byte buffer.
pub trait DeserializeBytes {
	fn deserialize(read_buf: impl Buf) -> Result<Self, Error>
	where
		Self: Sized;
}

pub(crate) fn assert_enough_space_for(write_buf: &impl BufMut, size: usize) -> Result<(), Error> {
	if write_buf.remaining_mut() < size {
		return Err(Error::WriteBufferFull);
	}
	Ok(())
}

pub(crate) fn assert_enough_data_for(read_buf: &impl Buf, size: usize) -> Result<(), Error> {
	if read_buf.remaining() < size {
		return Err(Error::NotEnoughBytes);
	}
	Ok(())
}

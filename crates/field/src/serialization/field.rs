// Copyright 2025 Irreducible Inc.

use ark_ff::{Fp, FpConfig, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use bytes::{Buf, BufMut};

use super::{assert_enough_data_for, assert_enough_space_for, DeserializeBytes, Error, SerializeBytes};

// Prime field elements use the compressed arkworks encoding: little-endian, fixed width.
impl<P: FpConfig<N>, const N: usize> SerializeBytes for Fp<P, N> {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), Error> {
		let size = self.compressed_size();
		assert_enough_space_for(&write_buf, size)?;

		let mut bytes = Vec::with_capacity(size);
		self.serialize_compressed(&mut bytes)
			.map_err(|_| Error::WriteBufferFull)?;
		write_buf.put_slice(&bytes);
		Ok(())
	}
}

impl<P: FpConfig<N>, const N: usize> DeserializeBytes for Fp<P, N> {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, Error> {
		let size = Self::zero().compressed_size();
		assert_enough_data_for(&read_buf, size)?;

		let mut bytes = vec![0u8; size];
		read_buf.copy_to_slice(&mut bytes);
		Self::deserialize_compressed(bytes.as_slice()).map_err(|_| Error::InvalidFieldElement)
	}
}

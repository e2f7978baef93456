// Copyright 2025 Irreducible Inc.

use bytes::{Buf, BufMut};
use rankone_field::{CurveId, DeserializeBytes, SerializationError, SerializeBytes};

use super::error::Error;

pub const BINARY_MAGIC: [u8; 4] = *b"R1CS";
pub const STRUCTURED_MAGIC: [u8; 8] = *b"RANKONE1";
pub const FORMAT_VERSION: u32 = 1;

/// Which part of a constraint system a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum Part {
	/// Tables and constraints.
	Whole = 0,
	/// Tables only, the head shard of a split system.
	Head = 1,
	/// A range of constraints, a body shard of a split system.
	Body = 2,
}

impl Part {
	fn from_u8(value: u8) -> Option<Self> {
		match value {
			0 => Some(Self::Whole),
			1 => Some(Self::Head),
			2 => Some(Self::Body),
			_ => None,
		}
	}
}

/// The header preceding every persisted constraint system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Header<M> {
	pub magic: M,
	pub version: u32,
	pub curve: CurveId,
	pub part: Part,
}

pub type BinaryHeader = Header<[u8; 4]>;
pub type StructuredHeader = Header<[u8; 8]>;

impl BinaryHeader {
	pub fn binary(curve: CurveId, part: Part) -> Self {
		Self {
			magic: BINARY_MAGIC,
			version: FORMAT_VERSION,
			curve,
			part,
		}
	}
}

impl StructuredHeader {
	pub fn structured(curve: CurveId, part: Part) -> Self {
		Self {
			magic: STRUCTURED_MAGIC,
			version: FORMAT_VERSION,
			curve,
			part,
		}
	}
}

impl<M: PartialEq + std::fmt::Debug> Header<M> {
	/// Fails unless `self`, as read from a file, matches the header `expected`.
	pub fn check(&self, expected: &Self) -> Result<(), Error> {
		if self.magic != expected.magic {
			return Err(Error::HeaderMismatch(format!(
				"bad magic {:?}, expected {:?}",
				self.magic, expected.magic
			)));
		}
		if self.version != expected.version {
			return Err(Error::HeaderMismatch(format!(
				"format version {} is not supported, expected {}",
				self.version, expected.version
			)));
		}
		if self.curve != expected.curve {
			return Err(Error::HeaderMismatch(format!(
				"system is defined over {}, expected {}",
				self.curve, expected.curve
			)));
		}
		if self.part != expected.part {
			return Err(Error::HeaderMismatch(format!(
				"file holds {:?}, expected {:?}",
				self.part, expected.part
			)));
		}
		Ok(())
	}
}

impl SerializeBytes for BinaryHeader {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), SerializationError> {
		self.magic.serialize(&mut write_buf)?;
		self.version.serialize(&mut write_buf)?;
		(self.curve as u8).serialize(&mut write_buf)?;
		(self.part as u8).serialize(write_buf)
	}
}

impl DeserializeBytes for BinaryHeader {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, SerializationError> {
		let magic = <[u8; 4]>::deserialize(&mut read_buf)?;
		let version = u32::deserialize(&mut read_buf)?;
		let curve = u8::deserialize(&mut read_buf)?;
		let curve = CurveId::from_u8(curve).ok_or(SerializationError::UnknownEnumVariant {
			name: "CurveId",
			index: curve,
		})?;
		let part = u8::deserialize(read_buf)?;
		let part = Part::from_u8(part).ok_or(SerializationError::UnknownEnumVariant {
			name: "Part",
			index: part,
		})?;
		Ok(Self {
			magic,
			version,
			curve,
			part,
		})
	}
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;

	use super::*;

	#[test]
	fn test_binary_layout() {
		let mut buf = Vec::new();
		BinaryHeader::binary(CurveId::Bls12_381, Part::Body)
			.serialize(&mut buf)
			.unwrap();
		assert_eq!(buf, [b'R', b'1', b'C', b'S', 0, 0, 0, 1, 2, 2]);
	}

	#[test]
	fn test_mismatch() {
		let expected = BinaryHeader::binary(CurveId::Bn254, Part::Whole);
		let mut read = expected;
		assert!(read.check(&expected).is_ok());

		read.curve = CurveId::Bls12_377;
		assert_matches!(
			read.check(&expected),
			Err(Error::HeaderMismatch(msg)) if msg.contains("bls12-377")
		);

		read = expected;
		read.magic = *b"R1CZ";
		assert_matches!(read.check(&expected), Err(Error::HeaderMismatch(_)));
	}
}

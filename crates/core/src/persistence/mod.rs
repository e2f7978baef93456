// Copyright 2025 Irreducible Inc.

//! Whole and sharded persistence of a [`ConstraintSystem`].
//!
//! Two encodings are supported. [`Encoding::Binary`] is a raw big-endian layout with packed
//! terms, [`Encoding::Structured`] goes through `serde` and `bincode`. Both start with a header
//! naming the format version, the curve and the part of the system the file holds; any mismatch
//! on read is an error.

mod binary;
mod error;
mod header;
mod shard;

use std::io::{Read, Write};

use rankone_field::{CurveField, CurveId, DeserializeBytes, SerializeBytes};

pub use error::Error;
pub use header::{
	BinaryHeader, Header, Part, StructuredHeader, BINARY_MAGIC, FORMAT_VERSION, STRUCTURED_MAGIC,
};
pub use shard::{body_path, head_path};

use crate::constraint_system::{ConstraintSystem, SystemTables, R1C};

/// How a constraint system is laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
	#[default]
	Binary,
	Structured,
}

impl Encoding {
	fn encode_header(self, buf: &mut Vec<u8>, curve: CurveId, part: Part) -> Result<(), Error> {
		match self {
			Self::Binary => BinaryHeader::binary(curve, part).serialize(&mut *buf)?,
			Self::Structured => {
				bincode::serialize_into(&mut *buf, &StructuredHeader::structured(curve, part))?
			}
		}
		Ok(())
	}

	fn encode_tables<F: CurveField>(
		self,
		buf: &mut Vec<u8>,
		tables: &SystemTables<F>,
	) -> Result<(), Error> {
		match self {
			Self::Binary => tables.serialize(&mut *buf)?,
			Self::Structured => bincode::serialize_into(&mut *buf, tables)?,
		}
		Ok(())
	}

	fn encode_constraints(self, buf: &mut Vec<u8>, constraints: &[R1C]) -> Result<(), Error> {
		match self {
			Self::Binary => constraints.serialize(&mut *buf)?,
			Self::Structured => bincode::serialize_into(&mut *buf, constraints)?,
		}
		Ok(())
	}

	fn decode_header(self, bytes: &mut &[u8], curve: CurveId, part: Part) -> Result<(), Error> {
		match self {
			Self::Binary => {
				BinaryHeader::deserialize(&mut *bytes)?.check(&BinaryHeader::binary(curve, part))
			}
			Self::Structured => bincode::deserialize_from::<_, StructuredHeader>(&mut *bytes)?
				.check(&StructuredHeader::structured(curve, part)),
		}
	}

	fn decode_tables<F: CurveField>(self, bytes: &mut &[u8]) -> Result<SystemTables<F>, Error> {
		match self {
			Self::Binary => binary::read_tables(&mut *bytes),
			Self::Structured => Ok(bincode::deserialize_from(&mut *bytes)?),
		}
	}

	fn decode_constraints(self, bytes: &mut &[u8]) -> Result<Vec<R1C>, Error> {
		match self {
			Self::Binary => Ok(Vec::<R1C>::deserialize(&mut *bytes)?),
			Self::Structured => Ok(bincode::deserialize_from(&mut *bytes)?),
		}
	}
}

/// Which sections follow the header of a file.
pub(crate) enum Sections<'a, F: CurveField> {
	Whole(&'a SystemTables<F>, &'a [R1C]),
	Head(&'a SystemTables<F>),
	Body(&'a [R1C]),
}

impl<F: CurveField> Sections<'_, F> {
	fn part(&self) -> Part {
		match self {
			Self::Whole(..) => Part::Whole,
			Self::Head(_) => Part::Head,
			Self::Body(_) => Part::Body,
		}
	}

	/// Encodes the header and the sections into `sink`, returning the number of bytes written.
	pub(crate) fn write(&self, mut sink: impl Write, encoding: Encoding) -> Result<u64, Error> {
		let mut buf = Vec::new();
		encoding.encode_header(&mut buf, F::CURVE, self.part())?;
		match self {
			Self::Whole(tables, constraints) => {
				encoding.encode_tables(&mut buf, tables)?;
				encoding.encode_constraints(&mut buf, constraints)?;
			}
			Self::Head(tables) => encoding.encode_tables(&mut buf, tables)?,
			Self::Body(constraints) => encoding.encode_constraints(&mut buf, constraints)?,
		}
		sink.write_all(&buf)?;
		sink.flush()?;
		Ok(buf.len() as u64)
	}
}

/// Decodes a file of the given part, failing if bytes are left over.
pub(crate) fn read_part<T>(
	mut source: impl Read,
	encoding: Encoding,
	curve: CurveId,
	part: Part,
	decode: impl FnOnce(Encoding, &mut &[u8]) -> Result<T, Error>,
) -> Result<(T, u64), Error> {
	let mut bytes = Vec::new();
	source.read_to_end(&mut bytes)?;
	let mut cursor = bytes.as_slice();
	encoding.decode_header(&mut cursor, curve, part)?;
	let value = decode(encoding, &mut cursor)?;
	if !cursor.is_empty() {
		return Err(Error::TrailingBytes {
			count: cursor.len(),
		});
	}
	Ok((value, bytes.len() as u64))
}

impl<F: CurveField> ConstraintSystem<F> {
	/// Writes the whole system to `sink`, returning the number of bytes written.
	pub fn write_to(&self, sink: impl Write, encoding: Encoding) -> Result<u64, Error> {
		Sections::Whole(&self.tables, &self.constraints).write(sink, encoding)
	}

	/// Reads a system written by [`Self::write_to`], returning it with the number of bytes read.
	///
	/// The loaded system is validated and frozen: it can be solved and persisted again but no
	/// longer extended.
	pub fn read_from(source: impl Read, encoding: Encoding) -> Result<(Self, u64), Error> {
		let ((tables, constraints), read) =
			read_part(source, encoding, F::CURVE, Part::Whole, |encoding, bytes| {
				let tables = encoding.decode_tables::<F>(bytes)?;
				let constraints = encoding.decode_constraints(bytes)?;
				Ok((tables, constraints))
			})?;
		Ok((Self::from_parts(tables, constraints)?, read))
	}
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;

	use super::*;
	use crate::constraint_system::LinearExpression;

	type F = ark_bn254::Fr;

	fn square_system() -> ConstraintSystem<F> {
		let mut cs = ConstraintSystem::<F>::new(1, 1);
		let out = cs.add_internal_variable();
		let x = cs.make_term(&F::from(1u64), 1).unwrap();
		let minus_three = cs.make_term(&-F::from(3u64), out).unwrap();
		cs.add_constraint(
			R1C::new(
				LinearExpression::new(vec![x]),
				LinearExpression::new(vec![x]),
				LinearExpression::new(vec![minus_three]),
			),
			None,
		)
		.unwrap();
		cs
	}

	#[test]
	fn test_round_trip_both_encodings() {
		let cs = square_system();
		for encoding in [Encoding::Binary, Encoding::Structured] {
			let mut buf = Vec::new();
			let written = cs.write_to(&mut buf, encoding).unwrap();
			assert_eq!(written, buf.len() as u64);

			let (loaded, read) = ConstraintSystem::<F>::read_from(buf.as_slice(), encoding).unwrap();
			assert_eq!(read, written);
			assert_eq!(loaded.tables(), cs.tables());
			assert_eq!(loaded.constraints(), cs.constraints());
		}
	}

	#[test]
	fn test_trailing_bytes() {
		let mut buf = Vec::new();
		square_system().write_to(&mut buf, Encoding::Binary).unwrap();
		buf.extend_from_slice(&[0, 0, 0]);
		assert_matches!(
			ConstraintSystem::<F>::read_from(buf.as_slice(), Encoding::Binary),
			Err(Error::TrailingBytes { count: 3 })
		);
	}

	#[test]
	fn test_wrong_curve() {
		let mut buf = Vec::new();
		square_system()
			.write_to(&mut buf, Encoding::Structured)
			.unwrap();
		assert_matches!(
			ConstraintSystem::<ark_bls12_381::Fr>::read_from(buf.as_slice(), Encoding::Structured),
			Err(Error::HeaderMismatch(_))
		);
	}

	#[test]
	fn test_wrong_encoding() {
		let mut buf = Vec::new();
		square_system()
			.write_to(&mut buf, Encoding::Structured)
			.unwrap();
		assert!(ConstraintSystem::<F>::read_from(buf.as_slice(), Encoding::Binary).is_err());
	}
}

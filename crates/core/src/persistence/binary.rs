// Copyright 2025 Irreducible Inc.

//! Raw binary encoding over [`SerializeBytes`] and [`DeserializeBytes`].

use std::collections::BTreeMap;

use bytes::{Buf, BufMut};
use rankone_field::{CurveField, DeserializeBytes, SerializationError, SerializeBytes};

use super::error::Error;
use crate::constraint_system::{
	CoeffTable, GkrMeta, Hint, HintId, LazyIndexedInputs, LazyInputs, LazyRegistry,
	LinearExpression, LogEntry, LogSegment, StaticTemplate, SystemTables, Term, R1C,
};

impl SerializeBytes for Term {
	fn serialize(&self, write_buf: impl BufMut) -> Result<(), SerializationError> {
		SerializeBytes::serialize(&self.pack(), write_buf)
	}
}

impl DeserializeBytes for Term {
	fn deserialize(read_buf: impl Buf) -> Result<Self, SerializationError> {
		Self::unpack(u64::deserialize(read_buf)?)
	}
}

impl SerializeBytes for LinearExpression {
	fn serialize(&self, write_buf: impl BufMut) -> Result<(), SerializationError> {
		SerializeBytes::serialize(self.terms(), write_buf)
	}
}

impl DeserializeBytes for LinearExpression {
	fn deserialize(read_buf: impl Buf) -> Result<Self, SerializationError> {
		Ok(Self::new(Vec::deserialize(read_buf)?))
	}
}

impl SerializeBytes for R1C {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), SerializationError> {
		self.l.serialize(&mut write_buf)?;
		self.r.serialize(&mut write_buf)?;
		self.o.serialize(write_buf)
	}
}

impl DeserializeBytes for R1C {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, SerializationError> {
		Ok(Self {
			l: DeserializeBytes::deserialize(&mut read_buf)?,
			r: DeserializeBytes::deserialize(&mut read_buf)?,
			o: DeserializeBytes::deserialize(read_buf)?,
		})
	}
}

impl SerializeBytes for Hint {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), SerializationError> {
		self.id.0.serialize(&mut write_buf)?;
		self.inputs.serialize(&mut write_buf)?;
		self.wires.serialize(write_buf)
	}
}

impl DeserializeBytes for Hint {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, SerializationError> {
		Ok(Self {
			id: HintId(u32::deserialize(&mut read_buf)?),
			inputs: DeserializeBytes::deserialize(&mut read_buf)?,
			wires: DeserializeBytes::deserialize(read_buf)?,
		})
	}
}

impl SerializeBytes for LogSegment {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), SerializationError> {
		match self {
			Self::Text(text) => {
				0u8.serialize(&mut write_buf)?;
				text.serialize(write_buf)
			}
			Self::Expression(expression) => {
				1u8.serialize(&mut write_buf)?;
				expression.serialize(write_buf)
			}
		}
	}
}

impl DeserializeBytes for LogSegment {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, SerializationError> {
		match u8::deserialize(&mut read_buf)? {
			0 => Ok(Self::Text(DeserializeBytes::deserialize(read_buf)?)),
			1 => Ok(Self::Expression(DeserializeBytes::deserialize(read_buf)?)),
			index => Err(SerializationError::UnknownEnumVariant {
				name: "LogSegment",
				index,
			}),
		}
	}
}

impl SerializeBytes for LogEntry {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), SerializationError> {
		self.caller.serialize(&mut write_buf)?;
		self.segments.serialize(write_buf)
	}
}

impl DeserializeBytes for LogEntry {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, SerializationError> {
		Ok(Self {
			caller: DeserializeBytes::deserialize(&mut read_buf)?,
			segments: DeserializeBytes::deserialize(read_buf)?,
		})
	}
}

impl SerializeBytes for StaticTemplate {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), SerializationError> {
		self.key.serialize(&mut write_buf)?;
		self.constraints.serialize(&mut write_buf)?;
		self.begin.serialize(&mut write_buf)?;
		self.end.serialize(&mut write_buf)?;
		self.input_constraints_threshold.serialize(&mut write_buf)?;
		self.nb_variables.serialize(&mut write_buf)?;
		self.first_local_wire.serialize(&mut write_buf)?;
		self.inputs.serialize(write_buf)
	}
}

impl DeserializeBytes for StaticTemplate {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, SerializationError> {
		Ok(Self {
			key: DeserializeBytes::deserialize(&mut read_buf)?,
			constraints: DeserializeBytes::deserialize(&mut read_buf)?,
			begin: DeserializeBytes::deserialize(&mut read_buf)?,
			end: DeserializeBytes::deserialize(&mut read_buf)?,
			input_constraints_threshold: DeserializeBytes::deserialize(&mut read_buf)?,
			nb_variables: DeserializeBytes::deserialize(&mut read_buf)?,
			first_local_wire: DeserializeBytes::deserialize(&mut read_buf)?,
			inputs: DeserializeBytes::deserialize(read_buf)?,
		})
	}
}

impl SerializeBytes for LazyInputs {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), SerializationError> {
		self.template.serialize(&mut write_buf)?;
		self.input_constraints.serialize(&mut write_buf)?;
		self.location.serialize(&mut write_buf)?;
		self.count.serialize(&mut write_buf)?;
		self.nb_varying_inputs.serialize(&mut write_buf)?;
		self.shift.serialize(write_buf)
	}
}

impl DeserializeBytes for LazyInputs {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, SerializationError> {
		Ok(Self {
			template: DeserializeBytes::deserialize(&mut read_buf)?,
			input_constraints: DeserializeBytes::deserialize(&mut read_buf)?,
			location: DeserializeBytes::deserialize(&mut read_buf)?,
			count: DeserializeBytes::deserialize(&mut read_buf)?,
			nb_varying_inputs: DeserializeBytes::deserialize(&mut read_buf)?,
			shift: DeserializeBytes::deserialize(read_buf)?,
		})
	}
}

impl SerializeBytes for LazyIndexedInputs {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), SerializationError> {
		self.record.serialize(&mut write_buf)?;
		self.offset.serialize(write_buf)
	}
}

impl DeserializeBytes for LazyIndexedInputs {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, SerializationError> {
		Ok(Self {
			record: DeserializeBytes::deserialize(&mut read_buf)?,
			offset: DeserializeBytes::deserialize(read_buf)?,
		})
	}
}

impl SerializeBytes for LazyRegistry {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), SerializationError> {
		self.templates.serialize(&mut write_buf)?;
		self.records.serialize(&mut write_buf)?;
		self.lazy_start.serialize(&mut write_buf)?;
		self.lazy_index.serialize(&mut write_buf)?;
		self.lazified.serialize(write_buf)
	}
}

impl DeserializeBytes for LazyRegistry {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, SerializationError> {
		Ok(Self {
			templates: DeserializeBytes::deserialize(&mut read_buf)?,
			key_index: Default::default(),
			records: DeserializeBytes::deserialize(&mut read_buf)?,
			lazy_start: DeserializeBytes::deserialize(&mut read_buf)?,
			lazy_index: DeserializeBytes::deserialize(&mut read_buf)?,
			lazified: DeserializeBytes::deserialize(read_buf)?,
		})
	}
}

impl SerializeBytes for GkrMeta {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), SerializationError> {
		self.constraints_level.serialize(&mut write_buf)?;
		self.b_n.serialize(&mut write_buf)?;
		self.batch_size.serialize(&mut write_buf)?;
		self.hints.serialize(&mut write_buf)?;
		self.input_tables.serialize(&mut write_buf)?;
		self.output_tables.serialize(write_buf)
	}
}

impl DeserializeBytes for GkrMeta {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, SerializationError> {
		Ok(Self {
			constraints_level: DeserializeBytes::deserialize(&mut read_buf)?,
			b_n: DeserializeBytes::deserialize(&mut read_buf)?,
			batch_size: DeserializeBytes::deserialize(&mut read_buf)?,
			hints: DeserializeBytes::deserialize(&mut read_buf)?,
			input_tables: DeserializeBytes::deserialize(&mut read_buf)?,
			output_tables: DeserializeBytes::deserialize(read_buf)?,
		})
	}
}

impl<F: CurveField> SerializeBytes for SystemTables<F> {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), SerializationError> {
		self.nb_public.serialize(&mut write_buf)?;
		self.nb_secret.serialize(&mut write_buf)?;
		self.nb_internal.serialize(&mut write_buf)?;
		self.coefficients.values().serialize(&mut write_buf)?;
		self.levels.serialize(&mut write_buf)?;
		self.hints.serialize(&mut write_buf)?;
		self.debug_info.serialize(&mut write_buf)?;
		let debug_of_constraint = self
			.debug_of_constraint
			.iter()
			.map(|(&constraint, &index)| (constraint, index))
			.collect::<Vec<_>>();
		debug_of_constraint.serialize(&mut write_buf)?;
		self.logs.serialize(&mut write_buf)?;
		self.lazy.serialize(&mut write_buf)?;
		self.gkr.serialize(write_buf)
	}
}

/// Decodes the tables written by [`SystemTables::serialize`].
///
/// The coefficient table is validated on the way; the remaining cross references are checked
/// once the constraints are attached.
pub(crate) fn read_tables<F: CurveField>(mut read_buf: impl Buf) -> Result<SystemTables<F>, Error> {
	let nb_public = usize::deserialize(&mut read_buf)?;
	let nb_secret = usize::deserialize(&mut read_buf)?;
	let nb_internal = usize::deserialize(&mut read_buf)?;
	let coefficients = CoeffTable::from_values(Vec::<F>::deserialize(&mut read_buf)?)?;
	let levels = DeserializeBytes::deserialize(&mut read_buf)?;
	let hints = DeserializeBytes::deserialize(&mut read_buf)?;
	let debug_info = DeserializeBytes::deserialize(&mut read_buf)?;
	let debug_of_constraint = Vec::<(usize, usize)>::deserialize(&mut read_buf)?
		.into_iter()
		.collect::<BTreeMap<_, _>>();
	let logs = DeserializeBytes::deserialize(&mut read_buf)?;
	let lazy = DeserializeBytes::deserialize(&mut read_buf)?;
	let gkr = DeserializeBytes::deserialize(read_buf)?;

	Ok(SystemTables {
		nb_public,
		nb_secret,
		nb_internal,
		coefficients,
		levels,
		hints,
		hint_of_wire: Default::default(),
		debug_info,
		debug_of_constraint,
		logs,
		lazy,
		gkr,
	})
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;

	use super::*;
	use crate::constraint_system::Coeff;

	#[test]
	fn test_term_is_packed() {
		let term = Term::new(5, Coeff::MinusOne).unwrap();
		let mut buf = Vec::new();
		term.serialize(&mut buf).unwrap();
		assert_eq!(buf.len(), 8);
		assert_eq!(u64::from_be_bytes(buf.clone().try_into().unwrap()), term.pack());
		assert_eq!(Term::deserialize(buf.as_slice()).unwrap(), term);
	}

	#[test]
	fn test_unknown_log_segment() {
		let buf = [7u8];
		assert_matches!(
			LogSegment::deserialize(buf.as_slice()),
			Err(SerializationError::UnknownEnumVariant {
				name: "LogSegment",
				index: 7
			})
		);
	}

	#[test]
	fn test_log_entry() {
		let entry = LogEntry::new("demo.rs:3")
			.text("x = ")
			.expression(LinearExpression::new(vec![Term::new(1, Coeff::Two).unwrap()]));
		let mut buf = Vec::new();
		entry.serialize(&mut buf).unwrap();
		let mut read_buf = buf.as_slice();
		assert_eq!(LogEntry::deserialize(&mut read_buf).unwrap(), entry);
		assert!(read_buf.is_empty());
	}
}

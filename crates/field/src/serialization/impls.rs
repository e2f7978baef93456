// Copyright 2024-2025 Irreducible Inc.

use bytes::{Buf, BufMut};

use super::{assert_enough_data_for, assert_enough_space_for, DeserializeBytes, Error, SerializeBytes};

macro_rules! impl_serialize_int {
	($ty:ty, $put:ident, $get:ident) => {
		impl SerializeBytes for $ty {
			fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), Error> {
				assert_enough_space_for(&write_buf, std::mem::size_of::<Self>())?;
				write_buf.$put(*self);
				Ok(())
			}
		}

		impl DeserializeBytes for $ty {
			fn deserialize(mut read_buf: impl Buf) -> Result<Self, Error> {
				assert_enough_data_for(&read_buf, std::mem::size_of::<Self>())?;
				Ok(read_buf.$get())
			}
		}
	};
}

impl_serialize_int!(u8, put_u8, get_u8);
impl_serialize_int!(u16, put_u16, get_u16);
impl_serialize_int!(u32, put_u32, get_u32);
impl_serialize_int!(u64, put_u64, get_u64);

impl SerializeBytes for usize {
	fn serialize(&self, write_buf: impl BufMut) -> Result<(), Error> {
		SerializeBytes::serialize(&(*self as u64), write_buf)
	}
}

impl DeserializeBytes for usize {
	fn deserialize(read_buf: impl Buf) -> Result<Self, Error> {
		let value = u64::deserialize(read_buf)?;
		Self::try_from(value).map_err(|_| Error::LengthOverflow { len: value })
	}
}

impl SerializeBytes for bool {
	fn serialize(&self, write_buf: impl BufMut) -> Result<(), Error> {
		SerializeBytes::serialize(&(*self as u8), write_buf)
	}
}

impl DeserializeBytes for bool {
	fn deserialize(read_buf: impl Buf) -> Result<Self, Error> {
		match u8::deserialize(read_buf)? {
			0 => Ok(false),
			1 => Ok(true),
			index => Err(Error::UnknownEnumVariant {
				name: "bool",
				index,
			}),
		}
	}
}

impl SerializeBytes for str {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), Error> {
		let bytes = self.as_bytes();
		SerializeBytes::serialize(&bytes.len(), &mut write_buf)?;
		assert_enough_space_for(&write_buf, bytes.len())?;
		write_buf.put_slice(bytes);
		Ok(())
	}
}

impl SerializeBytes for String {
	fn serialize(&self, write_buf: impl BufMut) -> Result<(), Error> {
		SerializeBytes::serialize(self.as_str(), write_buf)
	}
}

impl DeserializeBytes for String {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, Error> {
		let len = usize::deserialize(&mut read_buf)?;
		assert_enough_data_for(&read_buf, len)?;
		Ok(Self::from_utf8(read_buf.copy_to_bytes(len).to_vec())?)
	}
}

impl<T: SerializeBytes> SerializeBytes for [T] {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), Error> {
		SerializeBytes::serialize(&self.len(), &mut write_buf)?;
		self.iter()
			.try_for_each(|item| SerializeBytes::serialize(item, &mut write_buf))
	}
}

impl<T: SerializeBytes> SerializeBytes for Vec<T> {
	fn serialize(&self, write_buf: impl BufMut) -> Result<(), Error> {
		SerializeBytes::serialize(self.as_slice(), write_buf)
	}
}

impl<T: DeserializeBytes> DeserializeBytes for Vec<T> {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, Error> {
		let len = usize::deserialize(&mut read_buf)?;
		// Every element occupies at least one byte, so a length beyond the remaining data is
		// corrupt and must not drive the allocation.
		let mut items = Vec::with_capacity(len.min(read_buf.remaining()));
		for _ in 0..len {
			items.push(T::deserialize(&mut read_buf)?);
		}
		Ok(items)
	}
}

impl<T: SerializeBytes> SerializeBytes for Option<T> {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), Error> {
		match self {
			Some(value) => {
				SerializeBytes::serialize(&true, &mut write_buf)?;
				SerializeBytes::serialize(value, write_buf)
			}
			None => SerializeBytes::serialize(&false, write_buf),
		}
	}
}

impl<T: DeserializeBytes> DeserializeBytes for Option<T> {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, Error> {
		Ok(match bool::deserialize(&mut read_buf)? {
			true => Some(T::deserialize(read_buf)?),
			false => None,
		})
	}
}

impl<U: SerializeBytes, V: SerializeBytes> SerializeBytes for (U, V) {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), Error> {
		U::serialize(&self.0, &mut write_buf)?;
		V::serialize(&self.1, write_buf)
	}
}

impl<U: DeserializeBytes, V: DeserializeBytes> DeserializeBytes for (U, V) {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, Error> {
		Ok((U::deserialize(&mut read_buf)?, V::deserialize(read_buf)?))
	}
}

impl<const N: usize> SerializeBytes for [u8; N] {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), Error> {
		assert_enough_space_for(&write_buf, N)?;
		write_buf.put_slice(self);
		Ok(())
	}
}

impl<const N: usize> DeserializeBytes for [u8; N] {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, Error> {
		assert_enough_data_for(&read_buf, N)?;
		let mut ret = [0u8; N];
		read_buf.copy_to_slice(&mut ret);
		Ok(ret)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_nested_values_round_trip() {
		let value: Vec<(String, Option<u32>)> = vec![
			("alpha".to_string(), Some(7)),
			(String::new(), None),
			("γ".to_string(), Some(u32::MAX)),
		];

		let mut buf = Vec::new();
		SerializeBytes::serialize(&value, &mut buf).unwrap();
		let decoded = Vec::<(String, Option<u32>)>::deserialize(buf.as_slice()).unwrap();
		assert_eq!(decoded, value);
	}

	#[test]
	fn test_integers_are_big_endian() {
		let mut buf = Vec::new();
		SerializeBytes::serialize(&0x0102_0304u32, &mut buf).unwrap();
		assert_eq!(buf, [1, 2, 3, 4]);
	}

	#[test]
	fn test_truncated_vec_fails() {
		let mut buf = Vec::new();
		SerializeBytes::serialize(&vec![1u64, 2, 3], &mut buf).unwrap();
		buf.truncate(buf.len() - 1);
		assert!(matches!(Vec::<u64>::deserialize(buf.as_slice()), Err(Error::NotEnoughBytes)));
	}

	#[test]
	fn test_bad_bool_tag() {
		assert!(matches!(
			bool::deserialize([2u8].as_slice()),
			Err(Error::UnknownEnumVariant { name: "bool", index: 2 })
		));
	}

	#[test]
	fn test_full_write_buffer() {
		let mut storage = [0u8; 3];
		let mut write_buf = storage.as_mut_slice();
		assert!(matches!(
			SerializeBytes::serialize(&7u32, &mut write_buf),
			Err(Error::WriteBufferFull)
		));
	}
}

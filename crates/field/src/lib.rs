// Copyright 2025 Irreducible Inc.

//! Prime field support for rank-one constraint systems.
//!
//! Every scalar field the engine runs over implements [`CurveField`], which ties the field to the
//! [`CurveId`] recorded in persisted constraint systems and to the byte encodings used by both
//! persistence formats.

pub mod curve;
pub mod serde_canonical;
pub mod serialization;

pub use ark_ff::{Field, One, PrimeField, Zero};
pub use curve::{CurveField, CurveId};
pub use serialization::{DeserializeBytes, Error as SerializationError, SerializeBytes};

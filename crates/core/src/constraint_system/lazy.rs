// Copyright 2025 Irreducible Inc.

//! Deduplication of repeated sub-circuits.
//!
//! The first instance of a sub-circuit registered under a key is frozen into a
//! [`StaticTemplate`]. Every instance, the first included, leaves a [`LazyInputs`] record that
//! regenerates its constraints from the template by shifting the wires allocated inside the
//! sub-circuit. Only the leading constraints that read the instance's inputs are stored per
//! instance.

use std::{borrow::Cow, collections::HashMap};

use serde::{Deserialize, Serialize};

use super::{
	r1c::{LinearExpression, R1C},
	term::WireId,
};

/// The recorded body of a repeated sub-circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticTemplate {
	pub key: String,
	/// Constraints of the first instance, `None` while that instance is still being recorded.
	pub constraints: Option<Vec<R1C>>,
	pub begin: usize,
	pub end: usize,
	/// Number of leading constraints that read the varying inputs.
	pub input_constraints_threshold: usize,
	/// Total wire count when the template was frozen.
	pub nb_variables: usize,
	/// Total wire count when the first instance began. Wires from here on are local to the
	/// sub-circuit.
	pub first_local_wire: WireId,
	/// Input expressions of the first instance.
	pub inputs: Vec<LinearExpression>,
}

impl StaticTemplate {
	pub fn is_frozen(&self) -> bool {
		self.constraints.is_some()
	}

	pub fn constraints(&self) -> &[R1C] {
		self.constraints.as_deref().unwrap_or_default()
	}
}

/// One instance of a repeated sub-circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LazyInputs {
	/// Index of the template in the registry.
	pub template: usize,
	/// The instance's own copies of the constraints below the input threshold.
	pub input_constraints: Vec<R1C>,
	/// Index of the first constraint of the instance in the uncompacted constraint list.
	pub location: usize,
	pub count: usize,
	pub nb_varying_inputs: usize,
	/// Offset between the instance's local wires and the template's.
	pub shift: usize,
}

impl LazyInputs {
	pub fn end(&self) -> usize {
		self.location + self.count
	}

	/// Materializes the constraint at `offset` within the instance.
	pub fn constraint<'a>(&'a self, template: &StaticTemplate, offset: usize) -> Cow<'a, R1C> {
		match self.input_constraints.get(offset) {
			Some(r1c) => Cow::Borrowed(r1c),
			None => Cow::Owned(
				template.constraints()[offset].shifted(self.shift, template.first_local_wire),
			),
		}
	}
}

/// Position of a compacted constraint inside the lazy records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LazyIndexedInputs {
	pub record: usize,
	pub offset: usize,
}

/// Templates, instance records and, after compaction, the index of lazily served constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LazyRegistry {
	pub(crate) templates: Vec<StaticTemplate>,
	#[serde(skip)]
	pub(crate) key_index: HashMap<String, usize>,
	pub(crate) records: Vec<LazyInputs>,
	/// Index of the first lazily served constraint after compaction.
	pub(crate) lazy_start: usize,
	pub(crate) lazy_index: Vec<LazyIndexedInputs>,
	pub(crate) lazified: bool,
}

impl LazyRegistry {
	pub(crate) fn rebuild_key_index(&mut self) {
		self.key_index = self
			.templates
			.iter()
			.enumerate()
			.map(|(index, template)| (template.key.clone(), index))
			.collect();
	}

	pub fn templates(&self) -> &[StaticTemplate] {
		&self.templates
	}

	pub fn template(&self, key: &str) -> Option<&StaticTemplate> {
		self.key_index.get(key).map(|&index| &self.templates[index])
	}

	pub fn records(&self) -> &[LazyInputs] {
		&self.records
	}

	pub fn is_lazified(&self) -> bool {
		self.lazified
	}

	/// Total number of constraints covered by instance records.
	pub fn nb_lazy_constraints(&self) -> usize {
		self.records.iter().map(|record| record.count).sum()
	}

	/// Resolves a compacted constraint index that falls into the lazy range.
	pub(crate) fn lazy_constraint(&self, index: usize) -> Option<Cow<'_, R1C>> {
		let entry = self.lazy_index.get(index.checked_sub(self.lazy_start)?)?;
		let record = &self.records[entry.record];
		Some(record.constraint(&self.templates[record.template], entry.offset))
	}
}

/// Returns the number of leading template constraints that must be stored per instance.
///
/// That is one past the last constraint referencing a wire of the input expressions, other
/// than the constant wire, or 0 when no constraint does.
pub fn compute_input_constraints_threshold(
	constraints: &[R1C],
	inputs: &[LinearExpression],
) -> usize {
	let mut input_wires = inputs
		.iter()
		.flat_map(|input| input.iter().map(|term| term.wire()))
		.filter(|&wire| wire != 0)
		.collect::<Vec<_>>();
	input_wires.sort_unstable();
	input_wires.dedup();

	constraints
		.iter()
		.rposition(|r1c| r1c.wires().any(|wire| input_wires.binary_search(&wire).is_ok()))
		.map_or(0, |last| last + 1)
}

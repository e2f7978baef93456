// Copyright 2025 Irreducible Inc.

use rankone_utils::sparse_index::SparseIndex;

use super::{hint::Hint, r1c::R1C, term::WireId};

/// Incrementally assigns constraints to dependency levels as they are added.
///
/// For every wire the builder tracks the first level at which the wire is known. A constraint
/// lands on the maximum of these over the wires it reads, and the wires it defines (its unknown
/// wire and the outputs of the hints it triggers) become known one level later.
#[derive(Debug, Clone, Default)]
pub(crate) struct LevelBuilder {
	ready_at: Vec<Option<u32>>,
}

impl LevelBuilder {
	/// Creates a builder where the first `nb_inputs` wires are known before level 0.
	pub fn new(nb_inputs: usize) -> Self {
		Self {
			ready_at: vec![Some(0); nb_inputs],
		}
	}

	fn ready_at(&self, wire: WireId) -> Option<u32> {
		self.ready_at.get(wire).copied().flatten()
	}

	/// Declares a wire assigned outside of any constraint, known from `level` on.
	pub fn mark_ready(&mut self, wire: WireId, level: usize) {
		if self.ready_at.len() <= wire {
			self.ready_at.resize(wire + 1, None);
		}
		self.ready_at[wire] = Some(level as u32);
	}

	/// Computes the level of `r1c` and records the wires it defines.
	pub fn place(
		&mut self,
		r1c: &R1C,
		hints: &[Hint],
		hint_of_wire: &SparseIndex<usize>,
	) -> usize {
		let mut level = 0u32;
		let mut defined = Vec::new();
		let mut triggered = Vec::new();

		for wire in r1c.wires() {
			if let Some(ready) = self.ready_at(wire) {
				level = level.max(ready);
			} else if let Some(&hint) = hint_of_wire.get(wire) {
				self.visit_hint(hint, hints, hint_of_wire, &mut level, &mut triggered);
			} else {
				defined.push(wire);
			}
		}

		let level = level as usize;
		for wire in defined {
			self.mark_ready(wire, level + 1);
		}
		for hint in triggered {
			for &wire in &hints[hint].wires {
				self.mark_ready(wire, level + 1);
			}
		}
		level
	}

	// Hints run inline in the first constraint that reads one of their outputs, so their inputs
	// are dependencies of that constraint. Nested hints run recursively.
	fn visit_hint(
		&self,
		hint: usize,
		hints: &[Hint],
		hint_of_wire: &SparseIndex<usize>,
		level: &mut u32,
		triggered: &mut Vec<usize>,
	) {
		if triggered.contains(&hint) {
			return;
		}
		triggered.push(hint);

		for term in hints[hint].inputs.iter().flat_map(|input| input.iter()) {
			let wire = term.wire();
			if let Some(ready) = self.ready_at(wire) {
				*level = (*level).max(ready);
			} else if let Some(&nested) = hint_of_wire.get(wire) {
				self.visit_hint(nested, hints, hint_of_wire, level, triggered);
			}
		}
	}
}

// Copyright 2024-2025 Irreducible Inc.

pub mod coeff_table;
pub mod debug;
mod error;
pub mod gkr;
pub mod hint;
pub mod lazy;
mod level;
pub mod r1c;
pub mod term;

use std::{
	borrow::Cow,
	collections::{BTreeMap, HashMap},
};

pub use coeff_table::CoeffTable;
pub use debug::{DebugInfo, LogEntry, LogSegment};
pub use error::Error;
pub use gkr::GkrMeta;
pub use hint::{Hint, HintId};
pub use lazy::{LazyIndexedInputs, LazyInputs, LazyRegistry, StaticTemplate};
use level::LevelBuilder;
pub use r1c::{LinearExpression, R1C};
use rankone_field::{CurveField, CurveId};
use rankone_utils::{bail, ensure, sparse_index::SparseIndex};
use serde::{Deserialize, Serialize};
pub use term::{Coeff, Term, WireId, MAX_INDEX};
use tracing::instrument;

use crate::error::InternalError;

/// Everything in a constraint system except the constraint list itself.
///
/// This is the part shared by all shards of a split system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct SystemTables<F: CurveField> {
	pub(crate) nb_public: usize,
	pub(crate) nb_secret: usize,
	pub(crate) nb_internal: usize,
	pub(crate) coefficients: CoeffTable<F>,
	pub(crate) levels: Vec<Vec<usize>>,
	pub(crate) hints: Vec<Hint>,
	#[serde(skip)]
	pub(crate) hint_of_wire: SparseIndex<usize>,
	pub(crate) debug_info: Vec<DebugInfo>,
	pub(crate) debug_of_constraint: BTreeMap<usize, usize>,
	pub(crate) logs: Vec<LogEntry>,
	pub(crate) lazy: LazyRegistry,
	pub(crate) gkr: GkrMeta,
}

impl<F: CurveField> SystemTables<F> {
	fn nb_wires(&self) -> usize {
		self.nb_public + self.nb_secret + self.nb_internal
	}

	/// Recomputes the lookup structures that are not persisted.
	pub(crate) fn rebuild_indexes(&mut self) {
		let mut hint_of_wire = SparseIndex::new(self.nb_wires());
		for (index, hint) in self.hints.iter().enumerate() {
			for &wire in &hint.wires {
				hint_of_wire.set(wire, index);
			}
		}
		self.hint_of_wire = hint_of_wire;
		self.lazy.rebuild_key_index();
	}
}

/// A compiled rank-one constraint system over the scalar field `F`.
///
/// Wires are numbered public first (wire 0 being the constant one), then secret, then internal.
/// Constraints are grouped into dependency levels as they are added.
#[derive(Debug, Clone)]
pub struct ConstraintSystem<F: CurveField> {
	pub(crate) tables: SystemTables<F>,
	pub(crate) constraints: Vec<R1C>,
	level_builder: Option<LevelBuilder>,
}

impl<F: CurveField> ConstraintSystem<F> {
	/// Creates an empty system with `nb_public` public inputs besides the constant wire and
	/// `nb_secret` secret inputs.
	pub fn new(nb_public: usize, nb_secret: usize) -> Self {
		let nb_public = nb_public + 1;
		Self {
			tables: SystemTables {
				nb_public,
				nb_secret,
				nb_internal: 0,
				coefficients: CoeffTable::new(),
				levels: Vec::new(),
				hints: Vec::new(),
				hint_of_wire: SparseIndex::default(),
				debug_info: Vec::new(),
				debug_of_constraint: BTreeMap::new(),
				logs: Vec::new(),
				lazy: LazyRegistry::default(),
				gkr: GkrMeta::default(),
			},
			constraints: Vec::new(),
			level_builder: Some(LevelBuilder::new(nb_public + nb_secret)),
		}
	}

	/// Reassembles a system from persisted parts and checks that every reference is in range.
	///
	/// The result can be solved and persisted again, but not extended.
	pub(crate) fn from_parts(mut tables: SystemTables<F>, constraints: Vec<R1C>) -> Result<Self, Error> {
		tables.rebuild_indexes();
		let system = Self {
			tables,
			constraints,
			level_builder: None,
		};
		system.validate()?;
		Ok(system)
	}

	pub fn curve_id(&self) -> CurveId {
		F::CURVE
	}

	pub fn nb_wires(&self) -> usize {
		self.tables.nb_wires()
	}

	/// Number of public wires, the constant wire included.
	pub fn nb_public_variables(&self) -> usize {
		self.tables.nb_public
	}

	pub fn nb_secret_variables(&self) -> usize {
		self.tables.nb_secret
	}

	pub fn nb_internal_variables(&self) -> usize {
		self.tables.nb_internal
	}

	/// Length of the witness expected by the solver: every public and secret wire except the
	/// constant one.
	pub fn witness_len(&self) -> usize {
		self.tables.nb_public - 1 + self.tables.nb_secret
	}

	pub fn nb_coefficients(&self) -> usize {
		self.tables.coefficients.len()
	}

	/// Number of constraints to solve, those served lazily included.
	pub fn nb_constraints(&self) -> usize {
		self.constraints.len() + self.tables.lazy.lazy_index.len()
	}

	/// Number of constraints held in the constraint list.
	pub fn nb_stored_constraints(&self) -> usize {
		self.constraints.len()
	}

	pub fn constraints(&self) -> &[R1C] {
		&self.constraints
	}

	pub fn levels(&self) -> &[Vec<usize>] {
		&self.tables.levels
	}

	pub fn coefficients(&self) -> &CoeffTable<F> {
		&self.tables.coefficients
	}

	pub fn hints(&self) -> &[Hint] {
		&self.tables.hints
	}

	pub fn logs(&self) -> &[LogEntry] {
		&self.tables.logs
	}

	pub fn lazy(&self) -> &LazyRegistry {
		&self.tables.lazy
	}

	pub fn gkr(&self) -> &GkrMeta {
		&self.tables.gkr
	}

	pub fn tables(&self) -> &SystemTables<F> {
		&self.tables
	}

	/// Index of the hint assigning `wire`, if any.
	#[inline]
	pub fn hint_of(&self, wire: WireId) -> Option<usize> {
		self.tables.hint_of_wire.get(wire).copied()
	}

	pub fn debug_info(&self, constraint: usize) -> Option<&DebugInfo> {
		let index = *self.tables.debug_of_constraint.get(&constraint)?;
		self.tables.debug_info.get(index)
	}

	fn level_builder(&mut self) -> Result<&mut LevelBuilder, Error> {
		self.level_builder.as_mut().ok_or(Error::Frozen)
	}

	fn check_wire(&self, wire: WireId) -> Result<(), Error> {
		ensure!(
			wire < self.nb_wires(),
			Error::UnknownWire {
				wire,
				nb_wires: self.nb_wires()
			}
		);
		Ok(())
	}

	pub fn add_internal_variable(&mut self) -> WireId {
		let wire = self.nb_wires();
		self.tables.nb_internal += 1;
		wire
	}

	/// Builds the term `coeff * wire`, registering `coeff` in the coefficient table.
	pub fn make_term(&mut self, coeff: &F, wire: WireId) -> Result<Term, Error> {
		self.check_wire(wire)?;
		let coeff = self.tables.coefficients.make_coeff(coeff)?;
		Ok(Term::new(wire, coeff)?)
	}

	/// Appends a constraint and assigns it to a dependency level. Returns its index.
	pub fn add_constraint(&mut self, r1c: R1C, debug: Option<DebugInfo>) -> Result<usize, Error> {
		for wire in r1c.wires() {
			self.check_wire(wire)?;
		}

		let index = self.constraints.len();
		let tables = &mut self.tables;
		let level = self
			.level_builder
			.as_mut()
			.ok_or(Error::Frozen)?
			.place(&r1c, &tables.hints, &tables.hint_of_wire);

		if tables.levels.len() <= level {
			tables.levels.resize_with(level + 1, Vec::new);
		}
		tables.levels[level].push(index);
		if let Some(debug) = debug {
			tables.debug_of_constraint.insert(index, tables.debug_info.len());
			tables.debug_info.push(debug);
		}
		self.constraints.push(r1c);
		Ok(index)
	}

	/// Registers a call to hint `id` and allocates its `nb_outputs` output wires.
	pub fn add_hint(
		&mut self,
		id: HintId,
		inputs: Vec<LinearExpression>,
		nb_outputs: usize,
	) -> Result<Vec<WireId>, Error> {
		self.level_builder()?;
		for term in inputs.iter().flat_map(|input| input.iter()) {
			self.check_wire(term.wire())?;
		}

		let index = self.tables.hints.len();
		let wires = (0..nb_outputs)
			.map(|_| self.add_internal_variable())
			.collect::<Vec<_>>();
		for &wire in &wires {
			self.tables.hint_of_wire.set(wire, index);
		}
		self.tables.hints.push(Hint {
			id,
			inputs,
			wires: wires.clone(),
		});
		Ok(wires)
	}

	/// Adds a statement printed with the solved values after every solve.
	pub fn add_log(&mut self, entry: LogEntry) {
		self.tables.logs.push(entry);
	}

	/// Returns constraint `index`, materializing it from its template when it is served lazily.
	pub fn constraint_to_solve(&self, index: usize) -> Option<Cow<'_, R1C>> {
		match self.constraints.get(index) {
			Some(r1c) => Some(Cow::Borrowed(r1c)),
			None => self.tables.lazy.lazy_constraint(index),
		}
	}

	/// Records the boundaries of a repeated sub-circuit.
	///
	/// The caller invokes this with `finished == false` when an instance of the sub-circuit
	/// registered under `key` begins and with `finished == true` when it ends, `constraint_pos`
	/// being the number of constraints at that point. The first instance is frozen into the
	/// template; every instance is recorded for [`Self::lazify`].
	pub fn add_static_constraints(
		&mut self,
		key: &str,
		constraint_pos: usize,
		finished: bool,
		inputs: Vec<LinearExpression>,
	) -> Result<(), Error> {
		self.level_builder()?;
		let invalid_range = || Error::InvalidStaticRange {
			key: key.to_string(),
			constraint_pos,
		};
		ensure!(constraint_pos <= self.constraints.len(), invalid_range());

		let nb_variables = self.nb_wires();
		let lazy = &mut self.tables.lazy;
		let existing = lazy.key_index.get(key).copied();

		if !existing.is_some_and(|index| lazy.templates[index].is_frozen()) {
			if !finished {
				let template = StaticTemplate {
					key: key.to_string(),
					constraints: None,
					begin: constraint_pos,
					end: constraint_pos,
					input_constraints_threshold: 0,
					nb_variables: 0,
					first_local_wire: nb_variables,
					inputs,
				};
				match existing {
					Some(index) => lazy.templates[index] = template,
					None => {
						lazy.key_index.insert(key.to_string(), lazy.templates.len());
						lazy.templates.push(template);
					}
				}
				return Ok(());
			}

			let Some(index) = existing else {
				bail!(Error::StaticKeyNotStarted {
					key: key.to_string()
				});
			};
			let template = &mut lazy.templates[index];
			ensure!(template.begin <= constraint_pos, invalid_range());

			let body = self.constraints[template.begin..constraint_pos].to_vec();
			template.input_constraints_threshold =
				lazy::compute_input_constraints_threshold(&body, &template.inputs);
			template.constraints = Some(body);
			template.end = constraint_pos;
			template.nb_variables = nb_variables;
		}

		if finished {
			let index = lazy.key_index[key];
			let template = &lazy.templates[index];
			let count = template.constraints().len();
			let location = constraint_pos.checked_sub(count).ok_or_else(invalid_range)?;
			let shift = nb_variables
				.checked_sub(template.nb_variables)
				.ok_or_else(invalid_range)?;
			let input_constraints = self.constraints
				[location..location + template.input_constraints_threshold]
				.to_vec();

			lazy.records.push(LazyInputs {
				template: index,
				input_constraints,
				location,
				count,
				nb_varying_inputs: inputs.len(),
				shift,
			});
		}
		Ok(())
	}

	/// Drops the stored copies of every recorded sub-circuit instance.
	///
	/// Constraints outside of instances keep their relative order and move to the front; the
	/// instance constraints are served lazily from index `nb_stored_constraints()` on. The level
	/// table and the debug info index are remapped accordingly. Returns the translation from
	/// old to new constraint indices, or `None` if the system was already compacted.
	#[instrument("ConstraintSystem::lazify", skip_all, level = "debug")]
	pub fn lazify(&mut self) -> Result<Option<HashMap<usize, usize>>, Error> {
		if self.tables.lazy.lazified {
			return Ok(None);
		}

		let nb_constraints = self.constraints.len();
		let lazy = &self.tables.lazy;
		let mut previous_end = 0;
		for (record, inputs) in lazy.records.iter().enumerate() {
			if inputs.location < previous_end {
				rankone_utils::bail_internal!(InternalError::OverlappingLazyRecords {
					record,
					start: inputs.location,
					previous_end,
				});
			}
			if inputs.end() > nb_constraints {
				rankone_utils::bail_internal!(InternalError::LazyRecordOutOfBounds {
					record,
					end: inputs.end(),
					nb_constraints,
				});
			}
			if !lazy.templates[inputs.template].is_frozen() {
				rankone_utils::bail_internal!(InternalError::LazyTemplateNotFrozen {
					record,
					template: inputs.template,
				});
			}
			previous_end = inputs.end();
		}

		// Non-overlapping in-bounds records guarantee this does not underflow.
		let bar = nb_constraints - lazy.nb_lazy_constraints();
		let mut translation = vec![0; nb_constraints];
		let mut next_kept = 0;
		let mut next_lazy = bar;
		let mut cursor = 0;
		for inputs in &lazy.records {
			for slot in &mut translation[cursor..inputs.location] {
				*slot = next_kept;
				next_kept += 1;
			}
			for slot in &mut translation[inputs.location..inputs.end()] {
				*slot = next_lazy;
				next_lazy += 1;
			}
			cursor = inputs.end();
		}
		for slot in &mut translation[cursor..] {
			*slot = next_kept;
			next_kept += 1;
		}

		let mut levels = Vec::with_capacity(self.tables.levels.len());
		for (level, constraints) in self.tables.levels.iter().enumerate() {
			let remapped = constraints
				.iter()
				.map(|&constraint| {
					translation
						.get(constraint)
						.copied()
						.ok_or(InternalError::MissingRemapIndex { level, constraint })
				})
				.collect::<Result<Vec<_>, _>>();
			match remapped {
				Ok(remapped) => levels.push(remapped),
				Err(err) => rankone_utils::bail_internal!(err),
			}
		}

		let lazy_index = lazy
			.records
			.iter()
			.enumerate()
			.flat_map(|(record, inputs)| {
				(0..inputs.count).map(move |offset| LazyIndexedInputs { record, offset })
			})
			.collect::<Vec<_>>();

		let constraints = std::mem::take(&mut self.constraints);
		self.constraints = constraints
			.into_iter()
			.zip(&translation)
			.filter(|(_, &new_index)| new_index < bar)
			.map(|(r1c, _)| r1c)
			.collect();

		let tables = &mut self.tables;
		tables.levels = levels;
		tables.debug_of_constraint = tables
			.debug_of_constraint
			.iter()
			.filter_map(|(&constraint, &debug)| {
				translation.get(constraint).map(|&index| (index, debug))
			})
			.collect();
		tables.lazy.lazy_start = bar;
		tables.lazy.lazy_index = lazy_index;
		tables.lazy.lazified = true;
		self.level_builder = None;

		tracing::debug!(
			kept = bar,
			lazy = nb_constraints - bar,
			records = tables.lazy.records.len(),
			"compacted constraint list"
		);

		Ok(Some(translation.into_iter().enumerate().collect()))
	}

	/// Checks that every wire, coefficient, hint, constraint and debug reference is in range and
	/// that the level table partitions the constraints.
	pub fn validate(&self) -> Result<(), Error> {
		let nb_coefficients = self.nb_coefficients();
		let check_term = |term: &Term| -> Result<(), Error> {
			self.check_wire(term.wire())?;
			let id = term.coeff().table_id();
			ensure!(
				(id as usize) < nb_coefficients,
				Error::UnknownCoefficient {
					id,
					nb_coefficients
				}
			);
			Ok(())
		};

		let lazy = &self.tables.lazy;
		let stored = self.constraints.iter();
		let templates = lazy
			.templates
			.iter()
			.flat_map(|template| template.constraints().iter());
		let inputs = lazy
			.records
			.iter()
			.flat_map(|record| record.input_constraints.iter());
		for r1c in stored.chain(templates).chain(inputs) {
			r1c.terms().try_for_each(check_term)?;
		}

		let expressions = self
			.tables
			.hints
			.iter()
			.flat_map(|hint| hint.inputs.iter())
			.chain(lazy.templates.iter().flat_map(|template| template.inputs.iter()))
			.chain(self.tables.gkr.input_tables.iter())
			.chain(self.tables.gkr.output_tables.iter());
		for expression in expressions {
			expression.iter().try_for_each(check_term)?;
		}
		for entry in self.tables.debug_info.iter().chain(&self.tables.logs) {
			for wire in entry.wires() {
				self.check_wire(wire)?;
			}
		}
		for hint in &self.tables.hints {
			for &wire in &hint.wires {
				self.check_wire(wire)?;
			}
		}

		let gkr = &self.tables.gkr;
		ensure!(
			gkr.capacity()
				.is_some_and(|capacity| gkr.hints.len() <= capacity),
			Error::GkrCapacity {
				nb_hints: gkr.hints.len(),
				b_n: gkr.b_n
			}
		);
		if let Some(&hint) = gkr.hints.iter().find(|&&hint| hint >= self.tables.hints.len()) {
			bail!(Error::UnknownHint { hint });
		}

		for (record, inputs) in lazy.records.iter().enumerate() {
			let template = lazy
				.templates
				.get(inputs.template)
				.ok_or(Error::InvalidLazyRecord {
					record,
					reason: "unknown template",
				})?;
			ensure!(
				template.is_frozen() && template.constraints().len() == inputs.count,
				Error::InvalidLazyRecord {
					record,
					reason: "constraint count differs from the template"
				}
			);
			ensure!(
				inputs.input_constraints.len() <= inputs.count,
				Error::InvalidLazyRecord {
					record,
					reason: "more input constraints than constraints"
				}
			);
		}
		if lazy.lazified {
			ensure!(
				lazy.lazy_start == self.constraints.len(),
				Error::InvalidLazyRecord {
					record: 0,
					reason: "lazy range does not follow the stored constraints"
				}
			);
			for entry in &lazy.lazy_index {
				let count = lazy.records.get(entry.record).map(|record| record.count);
				ensure!(
					count.is_some_and(|count| entry.offset < count),
					Error::InvalidLazyRecord {
						record: entry.record,
						reason: "lazy index points outside of the record"
					}
				);
			}
		}

		let nb_constraints = self.nb_constraints();
		let mut seen = vec![false; nb_constraints];
		for &constraint in self.tables.levels.iter().flatten() {
			let slot = seen.get_mut(constraint).ok_or(Error::InvalidLevels {
				constraint,
				reason: "out of range",
			})?;
			ensure!(
				!*slot,
				Error::InvalidLevels {
					constraint,
					reason: "listed more than once"
				}
			);
			*slot = true;
		}
		if let Some(constraint) = seen.iter().position(|&seen| !seen) {
			bail!(Error::InvalidLevels {
				constraint,
				reason: "not assigned to any level"
			});
		}

		for (&constraint, &index) in &self.tables.debug_of_constraint {
			ensure!(
				constraint < nb_constraints,
				Error::InvalidLevels {
					constraint,
					reason: "debug info attached to a missing constraint"
				}
			);
			ensure!(index < self.tables.debug_info.len(), Error::UnknownDebugInfo { index });
		}
		for &hint in &self.tables.gkr.hints {
			let call = self.tables.hints.get(hint).ok_or(Error::UnknownHint { hint })?;
			ensure!(
				call.inputs.len() >= 2 && !call.wires.is_empty(),
				Error::InvalidGkrHint {
					hint,
					reason: "needs two inputs and an output"
				}
			);
		}
		Ok(())
	}
}

// Copyright 2025 Irreducible Inc.

use std::ops::Deref;

use rankone_field::{CurveField, Zero};
use serde::{Deserialize, Serialize};

use super::{
	coeff_table::CoeffTable,
	term::{Term, WireId},
};

/// A sum of terms.
///
/// The order of the terms does not change the value, but it is preserved so that replayed
/// sub-circuits are reproduced term for term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinearExpression(Vec<Term>);

impl LinearExpression {
	pub fn new(terms: Vec<Term>) -> Self {
		Self(terms)
	}

	pub fn push(&mut self, term: Term) {
		self.0.push(term);
	}

	pub fn terms(&self) -> &[Term] {
		&self.0
	}

	/// Evaluates the expression, or returns `None` if some wire has no value yet.
	pub fn evaluate<F: CurveField>(
		&self,
		table: &CoeffTable<F>,
		value_of: impl Fn(WireId) -> Option<F>,
	) -> Option<F> {
		let mut acc = F::zero();
		for term in &self.0 {
			let value = value_of(term.wire())?;
			term.coeff().mul_add(&value, &mut acc, table);
		}
		Some(acc)
	}

	pub(crate) fn shifted(&self, shift: usize, first_local: WireId) -> Self {
		self.0
			.iter()
			.map(|term| term.shifted(shift, first_local))
			.collect()
	}
}

impl Deref for LinearExpression {
	type Target = [Term];

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl From<Vec<Term>> for LinearExpression {
	fn from(terms: Vec<Term>) -> Self {
		Self(terms)
	}
}

impl FromIterator<Term> for LinearExpression {
	fn from_iter<I: IntoIterator<Item = Term>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

/// A rank-one constraint `L * R = O`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct R1C {
	pub l: LinearExpression,
	pub r: LinearExpression,
	pub o: LinearExpression,
}

impl R1C {
	pub fn new(l: LinearExpression, r: LinearExpression, o: LinearExpression) -> Self {
		Self { l, r, o }
	}

	/// All terms in solving order: left, right, then output.
	pub fn terms(&self) -> impl Iterator<Item = &Term> + '_ {
		self.l.iter().chain(self.r.iter()).chain(self.o.iter())
	}

	pub fn wires(&self) -> impl Iterator<Item = WireId> + '_ {
		self.terms().map(|term| term.wire())
	}

	pub(crate) fn shifted(&self, shift: usize, first_local: WireId) -> Self {
		Self {
			l: self.l.shifted(shift, first_local),
			r: self.r.shifted(shift, first_local),
			o: self.o.shifted(shift, first_local),
		}
	}
}

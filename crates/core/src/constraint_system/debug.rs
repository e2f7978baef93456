// Copyright 2025 Irreducible Inc.

use std::fmt::Write;

use rankone_field::{CurveField, Zero};
use serde::{Deserialize, Serialize};

use super::{coeff_table::CoeffTable, r1c::LinearExpression, term::WireId};

/// Formats a field element as a decimal integer.
pub(crate) fn format_value<F: CurveField>(value: &F) -> String {
	if value.is_zero() {
		"0".to_string()
	} else {
		value.to_string()
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogSegment {
	Text(String),
	/// Rendered as the value of the expression at the time the entry is printed.
	Expression(LinearExpression),
}

/// A message whose values are filled in from a (partial) assignment.
///
/// Used both for circuit log statements, printed after a solve, and for the debug context
/// attached to constraints, rendered when the constraint is unsatisfied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
	/// Source location of the statement that produced the entry, if known.
	pub caller: String,
	pub segments: Vec<LogSegment>,
}

/// Debug context attached to a constraint.
pub type DebugInfo = LogEntry;

impl LogEntry {
	pub fn new(caller: impl Into<String>) -> Self {
		Self {
			caller: caller.into(),
			segments: Vec::new(),
		}
	}

	pub fn text(mut self, text: impl Into<String>) -> Self {
		self.segments.push(LogSegment::Text(text.into()));
		self
	}

	pub fn expression(mut self, expression: LinearExpression) -> Self {
		self.segments.push(LogSegment::Expression(expression));
		self
	}

	pub fn wires(&self) -> impl Iterator<Item = WireId> + '_ {
		self.segments
			.iter()
			.flat_map(|segment| match segment {
				LogSegment::Text(_) => &[][..],
				LogSegment::Expression(expression) => expression.terms(),
			})
			.map(|term| term.wire())
	}

	pub fn render<F: CurveField>(
		&self,
		table: &CoeffTable<F>,
		value_of: impl Fn(WireId) -> Option<F>,
	) -> String {
		let mut out = String::new();
		for segment in &self.segments {
			match segment {
				LogSegment::Text(text) => out.push_str(text),
				LogSegment::Expression(expression) => match expression.evaluate(table, &value_of) {
					Some(value) => out.push_str(&format_value(&value)),
					None => out.push_str("<unsolved>"),
				},
			}
		}
		if !self.caller.is_empty() {
			let _ = write!(out, " ({})", self.caller);
		}
		out
	}
}

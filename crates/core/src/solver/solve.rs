// Copyright 2025 Irreducible Inc.

use rankone_field::{CurveField, One, Zero};
use rankone_utils::{bail_internal, rayon::build_thread_pool};
use rayon::prelude::*;
use tracing::{debug, error, info, instrument};

use super::{
	error::SolverError,
	schedule::{partition_level, Dispatch},
	solution::Solution,
	SolverOptions,
};
use crate::{
	constraint_system::{debug::format_value, ConstraintSystem, LinearExpression, Term, R1C},
	error::InternalError,
};

/// The evaluations of the three sides of a constraint.
pub type Evaluation<F> = (F, F, F);

#[derive(Clone, Copy)]
enum Side {
	L,
	R,
	O,
}

/// Solves or checks constraint `index`.
///
/// Every wire of the constraint must be known except at most one, which is then computed so
/// that the constraint holds. Hint outputs read by the constraint are computed on the way.
/// Returns the evaluations of the three sides once the constraint holds.
pub fn solve_constraint<F: CurveField>(
	index: usize,
	r1c: &R1C,
	solution: &Solution<'_, F>,
) -> Result<Evaluation<F>, SolverError> {
	let mut unknown: Option<(Term, Side)> = None;
	let mut sides = [F::zero(); 3];

	let expressions: [(&LinearExpression, Side); 3] =
		[(&r1c.l, Side::L), (&r1c.r, Side::R), (&r1c.o, Side::O)];
	for (acc, (expression, side)) in sides.iter_mut().zip(expressions) {
		for &term in expression.iter() {
			let wire = term.wire();
			if !solution.is_solved(wire) {
				match solution.hint_of(wire) {
					Some(hint) => solution.solve_with_hint(hint, index)?,
					None => {
						if unknown.is_some() {
							bail_internal!(InternalError::MultipleUnsolvedWires {
								constraint: index
							});
						}
						unknown = Some((term, side));
						continue;
					}
				}
			}
			match solution.get(wire) {
				Some(value) => term.coeff().mul_add(&value, acc, solution.coefficients()),
				None => {
					bail_internal!(InternalError::UnsolvedHintInput {
						hint: solution.hint_of(wire).unwrap_or_default(),
						wire,
					});
				}
			}
		}
	}

	let [mut a, mut b, mut c] = sides;
	let Some((term, side)) = unknown else {
		check_product(index, &a, &b, &c)?;
		return Ok((a, b, c));
	};

	// The value of the unknown term, coefficient included. When the known factor is zero the
	// term cannot be isolated: the constraint is checked as is and the wire is set to zero.
	let mut value = F::zero();
	match side {
		Side::L => match b.inverse() {
			Some(b_inv) => {
				value = c * b_inv - a;
				a += value;
			}
			None => check_product(index, &a, &b, &c)?,
		},
		Side::R => match a.inverse() {
			Some(a_inv) => {
				value = c * a_inv - b;
				b += value;
			}
			None => check_product(index, &a, &b, &c)?,
		},
		Side::O => {
			value = a * b - c;
			c += value;
		}
	}

	term.coeff()
		.div_into(&mut value, solution.coefficients(), term.wire())?;
	solution.set(term.wire(), value)?;
	Ok((a, b, c))
}

fn check_product<F: CurveField>(index: usize, a: &F, b: &F, c: &F) -> Result<(), SolverError> {
	if *a * b == *c {
		return Ok(());
	}
	Err(SolverError::Unsatisfied {
		index,
		reason: format!("{} ⋅ {} != {}", format_value(a), format_value(b), format_value(c)),
		debug: None,
	})
}

impl<F: CurveField> ConstraintSystem<F> {
	/// Computes every wire from the witness and checks every constraint.
	///
	/// `witness` holds the public inputs, the constant wire excluded, followed by the secret
	/// inputs. On success `a`, `b` and `c` receive the evaluations of the three sides of each
	/// constraint and the full assignment is returned.
	#[instrument("ConstraintSystem::solve", skip_all, level = "debug")]
	pub fn solve(
		&self,
		witness: &[F],
		a: &mut [F],
		b: &mut [F],
		c: &mut [F],
		opts: &SolverOptions<F>,
	) -> Result<Vec<F>, SolverError> {
		if witness.len() != self.witness_len() {
			return Err(SolverError::InvalidWitnessSize {
				got: witness.len(),
				expected: self.witness_len(),
			});
		}
		let nb_constraints = self.nb_constraints();
		if let Some(out) = [&*a, &*b, &*c].into_iter().find(|out| out.len() != nb_constraints) {
			return Err(SolverError::InvalidOutputSize {
				got: out.len(),
				expected: nb_constraints,
			});
		}

		let solution = Solution::new(self, &opts.hints);
		solution.set(0, F::one())?;
		for (wire, &value) in witness.iter().enumerate() {
			solution.set(wire + 1, value)?;
		}

		let result = self.solve_levels(&solution, a, b, c, opts);
		self.print_logs(&solution);
		result?;
		solution.finalize()
	}

	/// Runs [`Self::solve`] with scratch output vectors.
	pub fn is_solved(&self, witness: &[F], opts: &SolverOptions<F>) -> Result<(), SolverError> {
		let mut a = vec![F::zero(); self.nb_constraints()];
		let mut b = a.clone();
		let mut c = a.clone();
		self.solve(witness, &mut a, &mut b, &mut c, opts)
			.map(|_| ())
	}

	fn solve_levels(
		&self,
		solution: &Solution<'_, F>,
		a: &mut [F],
		b: &mut [F],
		c: &mut [F],
		opts: &SolverOptions<F>,
	) -> Result<(), SolverError> {
		let nb_workers = opts.nb_workers();
		let gkr_level = self.gkr().constraints_level;
		let plans = self
			.levels()
			.iter()
			.map(|level| partition_level(level.len(), nb_workers, opts.min_work_per_cpu))
			.collect::<Vec<_>>();
		let pool = if plans.iter().any(|plan| matches!(plan, Dispatch::Parallel(_))) {
			Some(build_thread_pool(Some(nb_workers), "rankone-solver")?)
		} else {
			None
		};

		let mut store = |index: usize, (ai, bi, ci): Evaluation<F>| {
			a[index] = ai;
			b[index] = bi;
			c[index] = ci;
		};

		for (level_index, (level, plan)) in self.levels().iter().zip(plans).enumerate() {
			if gkr_level == Some(level_index) {
				self.assign_gkr(solution, opts)?;
			}

			match plan {
				Dispatch::Sequential => {
					for &index in level {
						store(index, self.solve_at(index, solution)?);
					}
				}
				Dispatch::Parallel(chunks) => {
					debug!(
						level = level_index,
						len = level.len(),
						chunks = chunks.len(),
						"dispatching level"
					);
					let solve_chunks = || {
						chunks
							.into_par_iter()
							.map(|range| {
								level[range]
									.iter()
									.map(|&index| Ok((index, self.solve_at(index, solution)?)))
									.collect::<Result<Vec<_>, SolverError>>()
							})
							.collect::<Vec<_>>()
					};
					let results = match &pool {
						Some(pool) => pool.install(solve_chunks),
						None => solve_chunks(),
					};
					// The first failing chunk in level order is reported.
					for chunk in results {
						for (index, evaluation) in chunk? {
							store(index, evaluation);
						}
					}
				}
			}
		}

		if gkr_level.is_some_and(|level| level >= self.levels().len()) {
			self.assign_gkr(solution, opts)?;
		}
		Ok(())
	}

	fn solve_at(
		&self,
		index: usize,
		solution: &Solution<'_, F>,
	) -> Result<Evaluation<F>, SolverError> {
		let Some(r1c) = self.constraint_to_solve(index) else {
			bail_internal!(InternalError::ConstraintOutOfRange {
				constraint: index,
				nb_constraints: self.nb_constraints(),
			});
		};

		solve_constraint(index, &r1c, solution).map_err(|err| match err {
			SolverError::Unsatisfied { index, reason, .. } => {
				let rendered = self
					.debug_info(index)
					.map(|info| info.render(solution.coefficients(), |wire| solution.get(wire)));
				let context = rendered.as_deref().unwrap_or_default();
				error!(constraint = index, %reason, context, "unsatisfied constraint");
				SolverError::Unsatisfied {
					index,
					reason,
					debug: rendered,
				}
			}
			err => err,
		})
	}

	fn print_logs(&self, solution: &Solution<'_, F>) {
		for entry in self.logs() {
			info!("{}", entry.render(solution.coefficients(), |wire| solution.get(wire)));
		}
	}
}

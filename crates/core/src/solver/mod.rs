// Copyright 2025 Irreducible Inc.

//! Level-by-level solving of a [`ConstraintSystem`](crate::ConstraintSystem).

mod error;
mod gkr;
pub mod hints;
mod options;
pub mod schedule;
mod solution;
mod solve;

pub use error::SolverError;
pub use gkr::{GkrAssignment, GkrWitnessGenerator};
pub use hints::{HintFn, HintRegistry};
pub use options::{SolverOptions, MIN_WORK_ENV, MIN_WORK_PER_CPU, THREADS_ENV};
pub use solution::Solution;
pub use solve::{solve_constraint, Evaluation};

// Copyright 2024-2025 Irreducible Inc.

//! Constraint solving for rank-one constraint systems.
//!
//! A [`ConstraintSystem`] is compiled once (constraints, dependency levels, hints, deduplicated
//! sub-circuit templates and GKR metadata) and can then be solved for any number of witnesses.
//! Solving walks the dependency levels in order, resolving the single unknown wire of each
//! constraint or checking it when every wire is already known, and fans the constraints of a
//! level out over a worker pool when the level is large enough.

pub mod constraint_system;
pub mod error;
pub mod persistence;
pub mod solver;
pub mod test_utils;

pub use constraint_system::ConstraintSystem;
pub use error::InternalError;
pub use solver::{SolverError, SolverOptions};

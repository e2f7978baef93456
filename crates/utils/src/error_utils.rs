// Copyright 2024-2025 Irreducible Inc.

#[cfg(feature = "bail_panic")]
#[macro_export]
macro_rules! bail {
	($err:expr) => {
		panic!("{}", $err);
	};
}

#[cfg(not(feature = "bail_panic"))]
#[macro_export]
macro_rules! bail {
	($err:expr) => {
		return Err($err.into());
	};
}

#[macro_export]
macro_rules! ensure {
	($cond:expr, $err:expr) => {
		if !$cond {
			$crate::bail!($err);
		}
	};
}

/// Returns an internal invariant violation from the enclosing function.
///
/// Internal errors indicate a defect in the producer of the constraint system or in the engine
/// itself, never a bad user input. With the `abort_on_internal` feature they abort the process
/// instead, which keeps the failing stack around for debugging.
#[cfg(feature = "abort_on_internal")]
#[macro_export]
macro_rules! bail_internal {
	($err:expr) => {
		panic!("internal invariant violated: {}", $err);
	};
}

#[cfg(not(feature = "abort_on_internal"))]
#[macro_export]
macro_rules! bail_internal {
	($err:expr) => {
		return Err($err.into());
	};
}

#[macro_export]
macro_rules! ensure_internal {
	($cond:expr, $err:expr) => {
		if !$cond {
			$crate::bail_internal!($err);
		}
	};
}

// Copyright 2024 Irreducible Inc.

/// Returns `2^log_size`, or `None` when it does not fit in a `usize`.
pub const fn checked_pow2(log_size: usize) -> Option<usize> {
	if log_size >= usize::BITS as usize {
		None
	} else {
		Some(1 << log_size)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_checked_pow2() {
		assert_eq!(checked_pow2(0), Some(1));
		assert_eq!(checked_pow2(10), Some(1024));
		assert_eq!(checked_pow2(usize::BITS as usize - 1), Some(1 << (usize::BITS - 1)));
		assert_eq!(checked_pow2(usize::BITS as usize), None);
	}
}

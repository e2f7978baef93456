// Copyright 2024 Irreducible Inc.

/// Read boolean flag from the environment variable.
pub fn boolean_env_flag_set(flag: &str) -> bool {
	match std::env::var(flag) {
		Ok(val) => ["1", "on", "ON", "true", "TRUE", "yes", "YES"].contains(&val.as_str()),
		Err(_) => false,
	}
}

/// Read a non-negative integer from the environment variable.
///
/// Returns `None` when the variable is unset or does not parse.
pub fn usize_env_var(name: &str) -> Option<usize> {
	std::env::var(name).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_usize_env_var() {
		std::env::set_var("RANKONE_UTILS_TEST_USIZE", " 17 ");
		assert_eq!(usize_env_var("RANKONE_UTILS_TEST_USIZE"), Some(17));

		std::env::set_var("RANKONE_UTILS_TEST_USIZE", "seventeen");
		assert_eq!(usize_env_var("RANKONE_UTILS_TEST_USIZE"), None);

		assert_eq!(usize_env_var("RANKONE_UTILS_TEST_UNSET"), None);
	}

	#[test]
	fn test_boolean_env_flag() {
		std::env::set_var("RANKONE_UTILS_TEST_FLAG", "yes");
		assert!(boolean_env_flag_set("RANKONE_UTILS_TEST_FLAG"));
		std::env::set_var("RANKONE_UTILS_TEST_FLAG", "0");
		assert!(!boolean_env_flag_set("RANKONE_UTILS_TEST_FLAG"));
	}
}

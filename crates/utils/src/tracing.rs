// Copyright 2023-2025 Irreducible Inc.

use crate::env::boolean_env_flag_set;

/// Installs the global `tracing` subscriber.
///
/// Verbosity follows `RUST_LOG` and defaults to `info`. Setting `RANKONE_TRACE_SPANS` also
/// reports span close events with their busy and idle time, which is how solver stages are
/// timed. Calling this more than once is harmless.
pub fn init_tracing() {
	use tracing_subscriber::{
		fmt::{self, format::FmtSpan},
		layer::SubscriberExt,
		util::SubscriberInitExt,
		EnvFilter,
	};

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let span_events = if boolean_env_flag_set("RANKONE_TRACE_SPANS") {
		FmtSpan::CLOSE
	} else {
		FmtSpan::NONE
	};

	let _ = tracing_subscriber::registry()
		.with(filter)
		.with(fmt::layer().with_span_events(span_events))
		.try_init();
}

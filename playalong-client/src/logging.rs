use tracing_subscriber::{EnvFilter, FmtSubscriber};

const FALLBACK_FILTER: &str = "info";

/// Installs the global subscriber. Invalid filters fall back to `info`, a
/// subscriber that is already installed stays in place.
pub fn init_logging(filters: &str) {
	let filter = EnvFilter::try_new(filters).unwrap_or_else(|error| {
		eprintln!("Invalid log filters '{filters}' ({error}), falling back to '{FALLBACK_FILTER}'.");
		EnvFilter::new(FALLBACK_FILTER)
	});

	let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

	if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
		eprintln!("Failed to set global default subscriber: {error}");
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn should_tolerate_repeated_and_invalid_initialization() {
		init_logging("info,playalong_client=debug");
		init_logging("[not a filter");
	}
}

use crate::episode::PositionKey;
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{debug, warn};

/// Best-effort persistence of the elapsed seconds per episode and page.
/// Storage failures are logged and otherwise ignored.
#[derive(Clone)]
pub struct PositionStore {
	storage: Arc<dyn Storage>,
}

impl PositionStore {
	pub fn new(storage: Arc<dyn Storage>) -> Self {
		Self { storage }
	}

	/// Previously saved position, or 0 if there is none or it can't be read.
	pub fn load(&self, key: &PositionKey) -> f64 {
		let key = key.to_string();
		let text = match self.storage.get_item(&key) {
			Ok(Some(text)) => text,
			Ok(None) => return 0.0,
			Err(error) => {
				warn!("Failed to load position '{}': {}", key, error);
				return 0.0;
			}
		};

		match text.trim().parse::<f64>() {
			Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => seconds,
			_ => {
				debug!("Ignoring unusable saved position '{}' for '{}'.", text, key);
				0.0
			}
		}
	}

	pub fn save(&self, key: &PositionKey, seconds: f64) {
		let key = key.to_string();
		if let Err(error) = self.storage.set_item(&key, &seconds.to_string()) {
			warn!("Failed to save position '{}': {}", key, error);
		}
	}

	pub fn clear(&self, key: &PositionKey) {
		let key = key.to_string();
		if let Err(error) = self.storage.remove_item(&key) {
			warn!("Failed to clear position '{}': {}", key, error);
		}
	}
}

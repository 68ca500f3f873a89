use crate::storage::Storage;
use crate::storage::error::StorageError;
use parking_lot::Mutex;
use std::collections::BTreeMap;

#[derive(Default)]
pub struct MemoryStorage {
	items: Mutex<BTreeMap<String, String>>,
	quota: Option<usize>,
}

impl MemoryStorage {
	pub fn with_quota(quota: usize) -> Self {
		Self {
			items: Default::default(),
			quota: Some(quota),
		}
	}
}

impl Storage for MemoryStorage {
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
		Ok(self.items.lock().get(key).cloned())
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
		let mut items = self.items.lock();
		if let Some(quota) = self.quota {
			let used: usize = items
				.iter()
				.filter(|(existing_key, _)| existing_key.as_str() != key)
				.map(|(key, value)| key.len() + value.len())
				.sum();
			if used + key.len() + value.len() > quota {
				return Err(StorageError::QuotaExceeded { quota });
			}
		}

		items.insert(key.to_owned(), value.to_owned());
		Ok(())
	}

	fn remove_item(&self, key: &str) -> Result<(), StorageError> {
		self.items.lock().remove(key);
		Ok(())
	}
}

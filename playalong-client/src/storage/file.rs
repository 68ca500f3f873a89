use crate::storage::Storage;
use crate::storage::error::StorageError;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Keeps all items as one JSON object in a single file.
pub struct FileStorage {
	path: PathBuf,
	quota: Option<usize>,
	// serializes read-modify-write cycles within this process
	lock: Mutex<()>,
}

impl FileStorage {
	pub fn new(path: impl Into<PathBuf>, quota: Option<usize>) -> Self {
		Self {
			path: path.into(),
			quota,
			lock: Mutex::new(()),
		}
	}

	fn read(&self) -> Result<BTreeMap<String, String>, StorageError> {
		match std::fs::read_to_string(&self.path) {
			Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
			Ok(text) => Ok(serde_json::from_str(&text)?),
			Err(error) if error.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
			Err(error) => Err(error.into()),
		}
	}

	fn write(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
		let text = serde_json::to_string(items)?;
		match self.quota {
			Some(quota) if text.len() > quota => return Err(StorageError::QuotaExceeded { quota }),
			_ => {}
		}

		std::fs::write(&self.path, text)?;
		Ok(())
	}
}

impl Storage for FileStorage {
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
		let _guard = self.lock.lock();
		Ok(self.read()?.remove(key))
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
		let _guard = self.lock.lock();
		let mut items = self.read()?;
		items.insert(key.to_owned(), value.to_owned());
		self.write(&items)
	}

	fn remove_item(&self, key: &str) -> Result<(), StorageError> {
		let _guard = self.lock.lock();
		let mut items = self.read()?;
		if items.remove(key).is_some() {
			self.write(&items)?;
		}
		Ok(())
	}
}

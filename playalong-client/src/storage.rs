use crate::storage::error::StorageError;
use static_assertions::assert_obj_safe;

pub mod error;
pub mod file;
pub mod memory;


/// String key-value storage that outlives a single session, like a browser's `localStorage`.
pub trait Storage: Send + Sync {
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
	fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

assert_obj_safe!(Storage);

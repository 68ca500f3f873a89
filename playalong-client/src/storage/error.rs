use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
	#[error("Storage quota of {quota} bytes exceeded.")]
	QuotaExceeded { quota: usize },
	#[error("IO operation failed: {0}")]
	Io(#[from] std::io::Error),
	#[error("Stored data is corrupt: {0}")]
	Corrupt(#[from] serde_json::Error),
}

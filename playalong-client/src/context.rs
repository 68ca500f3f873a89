use crate::configuration::Configuration;
use crate::storage::Storage;
use crate::storage::file::FileStorage;
use crate::utils::time_source::TimeSource;
use anyhow::Context;
use std::sync::Arc;

#[derive(Clone)]
pub struct ApplicationContext {
	pub configuration: Configuration,
	pub time_source: TimeSource,
	pub client: reqwest::Client,
	pub storage: Arc<dyn Storage>,
}

impl ApplicationContext {
	pub fn new(configuration: Configuration, time_source: TimeSource) -> anyhow::Result<ApplicationContext> {
		let client = reqwest::Client::builder()
			.timeout(configuration.request_timeout)
			.build()
			.context("Failed to build HTTP client")?;

		let storage = Arc::new(FileStorage::new(
			configuration.storage_path.clone(),
			configuration.storage_quota_bytes,
		));

		Ok(Self {
			configuration,
			time_source,
			client,
			storage,
		})
	}
}

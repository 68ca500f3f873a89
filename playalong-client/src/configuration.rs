use crate::playback::PlaybackSettings;
use serde::Deserialize;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Configuration {
	/// Base of the comment API and the watch time endpoints.
	#[serde(with = "base_url_deserializer")]
	pub backend_url: Url,
	pub log_filters: String,
	/// JSON file the playback positions are kept in.
	pub storage_path: PathBuf,
	#[serde(default)]
	pub storage_quota_bytes: Option<usize>,
	#[serde(with = "nonzero_duration_deserializer")]
	pub tick_interval: Duration,
	pub report_threshold_seconds: f64,
	pub skip_seconds: f64,
	#[serde(with = "humantime_serde")]
	pub request_timeout: Duration,
	pub use_beacon: bool,
	/// How long queued beacons and requests in flight may still be delivered
	/// after the session ends.
	#[serde(with = "humantime_serde")]
	pub report_drain_timeout: Duration,
}

impl Configuration {
	pub fn from_file(path: impl AsRef<Path>) -> Result<Configuration, ConfigurationError> {
		let text = read_to_string(path)?;

		Ok(Configuration::try_from(text.as_str())?)
	}

	pub fn playback_settings(&self) -> PlaybackSettings {
		PlaybackSettings::builder()
			.report_threshold_seconds(self.report_threshold_seconds)
			.skip_seconds(self.skip_seconds)
			.tick_interval(self.tick_interval)
			.build()
	}
}

impl TryFrom<&str> for Configuration {
	type Error = toml::de::Error;

	fn try_from(text: &str) -> Result<Self, Self::Error> {
		toml::from_str(text)
	}
}

#[derive(Error, Debug)]
pub enum ConfigurationError {
	#[error("Failed to deserialize with error: {0}")]
	DeserializationError(#[from] toml::de::Error),
	#[error("IO operation failed: {0}")]
	IoError(#[from] std::io::Error),
}

// See https://serde.rs/custom-date-format.html
mod base_url_deserializer {
	use serde::{self, Deserialize, Deserializer};
	use url::Url;

	/// Relative endpoints are joined onto this URL, so it needs to end in a slash.
	pub fn deserialize<'deserializer, D>(deserializer: D) -> Result<Url, D::Error>
	where
		D: Deserializer<'deserializer>,
	{
		let mut string = String::deserialize(deserializer)?;
		if !string.ends_with('/') {
			string.push('/');
		}

		let url = Url::parse(&string).map_err(serde::de::Error::custom)?;
		if url.cannot_be_a_base() {
			return Err(serde::de::Error::custom(format!("'{url}' cannot be a base URL")));
		}
		Ok(url)
	}
}

mod nonzero_duration_deserializer {
	use serde::{self, Deserializer};
	use std::time::Duration;

	pub fn deserialize<'deserializer, D>(deserializer: D) -> Result<Duration, D::Error>
	where
		D: Deserializer<'deserializer>,
	{
		let duration = humantime_serde::deserialize(deserializer)?;
		if duration == Duration::ZERO {
			return Err(serde::de::Error::custom("duration must not be zero"));
		}
		Ok(duration)
	}
}

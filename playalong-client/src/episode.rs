use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use tracing::warn;
use typed_builder::TypedBuilder;

#[derive(derive_more::From, derive_more::Deref, derive_more::Display, Debug, Clone, PartialEq, Eq, Hash)]
pub struct EpisodeId(String);

#[derive(derive_more::From, derive_more::Deref, derive_more::Display, Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaId(String);

#[derive(derive_more::From, derive_more::Deref, derive_more::Display, Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType(String);

/// The static data attributes of a progress container, read once when the page loads.
#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct EpisodeAttributes {
	#[builder(setter(into))]
	pub episode_id: EpisodeId,
	#[builder(default, setter(strip_option, into))]
	pub media_type: Option<MediaType>,
	#[builder(default, setter(strip_option, into))]
	pub media_id: Option<MediaId>,
	#[builder(setter(transform = |duration: f64| sanitize_duration(duration)))]
	pub duration_seconds: f64,
	#[builder(setter(into))]
	pub page_path: String,
}

impl EpisodeAttributes {
	/// Reads the `epid`, `media-type`, `media-id` and `duration` attributes.
	/// A missing or malformed duration becomes 0, empty identifiers count as missing.
	pub fn from_data_attributes(attributes: &HashMap<String, String>, page_path: impl Into<String>) -> Self {
		let attribute = |name: &str| {
			attributes
				.get(name)
				.map(|value| value.trim())
				.filter(|value| !value.is_empty())
				.map(ToOwned::to_owned)
		};

		let duration_seconds = match attribute("duration") {
			None => 0.0,
			Some(text) => text.parse::<f64>().unwrap_or_else(|_| {
				warn!("Malformed episode duration '{}', assuming 0.", text);
				0.0
			}),
		};

		Self {
			episode_id: EpisodeId::from(attribute("epid").unwrap_or_default()),
			media_type: attribute("media-type").map(MediaType::from),
			media_id: attribute("media-id").map(MediaId::from),
			duration_seconds: sanitize_duration(duration_seconds),
			page_path: page_path.into(),
		}
	}

	pub fn position_key(&self) -> PositionKey {
		PositionKey {
			episode_id: self.episode_id.clone(),
			page_path: self.page_path.clone(),
		}
	}
}

fn sanitize_duration(duration: f64) -> f64 {
	if duration.is_finite() && duration > 0.0 { duration } else { 0.0 }
}

/// Namespaces a persisted position by episode and page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionKey {
	pub episode_id: EpisodeId,
	pub page_path: String,
}

impl Display for PositionKey {
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
		write!(formatter, "episode:{}:{}", self.episode_id, self.page_path)
	}
}

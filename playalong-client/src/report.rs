use crate::episode::EpisodeAttributes;
use serde::{Deserialize, Serialize};
use static_assertions::assert_obj_safe;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub mod beacon;
pub mod keepalive;
#[cfg(test)]
pub mod test_utils;

/// The watched-time delta as it goes over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchTimeReport {
	pub watched_seconds: f64,
	pub media_type: String,
	pub media_id: String,
}

/// Fire-and-forget delivery of reports. Implementations must not block and
/// must never retry: every report is delivered at most once.
pub trait WatchTimeTransport: Send + Sync {
	fn send(&self, report: WatchTimeReport);
}

assert_obj_safe!(WatchTimeTransport);

#[derive(Error, Debug, PartialEq)]
pub enum ReportRejected {
	#[error("Watched seconds must be positive and finite, got {0}.")]
	InvalidSeconds(f64),
	#[error("Media type or media id is missing.")]
	MissingMedia,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ReportTarget {
	media_type: String,
	media_id: String,
}

/// Sends watched-time deltas through the beacon if there is one, otherwise
/// through a keepalive request.
#[derive(Clone)]
pub struct WatchTimeReporter {
	target: Option<ReportTarget>,
	beacon: Option<Arc<dyn WatchTimeTransport>>,
	request: Arc<dyn WatchTimeTransport>,
}

impl WatchTimeReporter {
	pub fn new(
		episode: &EpisodeAttributes,
		beacon: Option<Arc<dyn WatchTimeTransport>>,
		request: Arc<dyn WatchTimeTransport>,
	) -> Self {
		let target = match (&episode.media_type, &episode.media_id) {
			(Some(media_type), Some(media_id)) => Some(ReportTarget {
				media_type: media_type.to_string(),
				media_id: media_id.to_string(),
			}),
			_ => None,
		};

		Self {
			target,
			beacon,
			request,
		}
	}

	pub fn flush(&self, seconds: f64) -> Result<(), ReportRejected> {
		if !seconds.is_finite() || seconds <= 0.0 {
			return Err(ReportRejected::InvalidSeconds(seconds));
		}
		let Some(ReportTarget { media_type, media_id }) = &self.target else {
			return Err(ReportRejected::MissingMedia);
		};

		let report = WatchTimeReport {
			watched_seconds: seconds,
			media_type: media_type.clone(),
			media_id: media_id.clone(),
		};

		match &self.beacon {
			Some(beacon) => {
				debug!("Beaconing {:.2}s for {} {}.", seconds, media_type, media_id);
				beacon.send(report);
			}
			None => {
				debug!("Requesting {:.2}s for {} {}.", seconds, media_type, media_id);
				self.request.send(report);
			}
		}
		Ok(())
	}
}

use crate::report::{WatchTimeReport, WatchTimeTransport};
use parking_lot::Mutex;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use url::Url;

/// Sends each report as a JSON request on its own task, so the request
/// outlives whatever triggered it. Failures are only logged.
#[derive(Clone)]
pub struct KeepaliveRequestTransport {
	client: reqwest::Client,
	url: Url,
	in_flight: Arc<Mutex<JoinSet<()>>>,
}

#[derive(Error, Debug)]
pub enum TransportError {
	#[error("Request failed: {0}")]
	Request(#[from] reqwest::Error),
	#[error("Non-JSON response: {0}")]
	NonJsonResponse(String),
	#[error("Server refused watch time: {}", .0.as_deref().unwrap_or("no message"))]
	Refused(Option<String>),
}

#[derive(Debug, Deserialize)]
struct ServerReply {
	#[serde(default)]
	success: bool,
	message: Option<String>,
}

impl KeepaliveRequestTransport {
	pub fn new(client: reqwest::Client, url: Url) -> Self {
		Self {
			client,
			url,
			in_flight: Default::default(),
		}
	}

	/// Waits for every request sent so far. Requests sent while draining are
	/// waited for by the next call.
	pub async fn drain(&self) {
		let mut in_flight = std::mem::take(&mut *self.in_flight.lock());
		debug!("Waiting for {} watch time request(s).", in_flight.len());

		while let Some(result) = in_flight.join_next().await {
			if let Err(error) = result {
				warn!("Watch time request task failed: {}", error);
			}
		}
	}
}

impl WatchTimeTransport for KeepaliveRequestTransport {
	fn send(&self, report: WatchTimeReport) {
		let client = self.client.clone();
		let url = self.url.clone();

		let mut in_flight = self.in_flight.lock();
		// forget requests that are already done
		while in_flight.try_join_next().is_some() {}
		in_flight.spawn(async move {
			match deliver(&client, url, &report).await {
				Ok(message) => info!(
					"Sent {:.2}s for {} {}. Server response: {}",
					report.watched_seconds,
					report.media_type,
					report.media_id,
					message.as_deref().unwrap_or("No specific message.")
				),
				Err(error) => error!("Failed to update watch time: {}", error),
			}
		});
	}
}

async fn deliver(client: &reqwest::Client, url: Url, report: &WatchTimeReport) -> Result<Option<String>, TransportError> {
	let response = client.post(url).json(report).send().await?;

	let is_json = response
		.headers()
		.get(CONTENT_TYPE)
		.and_then(|content_type| content_type.to_str().ok())
		.is_some_and(|content_type| content_type.contains("application/json"));
	if !is_json {
		let status = response.status();
		let text = response.text().await?;
		return Err(TransportError::NonJsonResponse(if text.is_empty() {
			status.to_string()
		} else {
			text
		}));
	}

	let response = response.error_for_status()?;
	let ServerReply { success, message } = response.json().await?;
	if success { Ok(message) } else { Err(TransportError::Refused(message)) }
}

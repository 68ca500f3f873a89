use crate::report::{WatchTimeReport, WatchTimeTransport};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

/// Queues reports for a background worker that keeps sending after the
/// session that produced them is gone. Responses are never looked at.
#[derive(Clone)]
pub struct BeaconTransport {
	sender: mpsc::UnboundedSender<WatchTimeReport>,
}

impl BeaconTransport {
	/// Spawns the worker onto the current runtime. The worker finishes once every
	/// `BeaconTransport` clone is dropped and the queue is drained.
	pub fn spawn(client: reqwest::Client, url: Url) -> (Self, JoinHandle<()>) {
		let (sender, receiver) = mpsc::unbounded_channel();
		let worker = tokio::spawn(run_worker(client, url, receiver));

		(Self { sender }, worker)
	}
}

impl WatchTimeTransport for BeaconTransport {
	fn send(&self, report: WatchTimeReport) {
		if self.sender.send(report).is_err() {
			warn!("Beacon worker has stopped, dropping watch time report.");
		}
	}
}

async fn run_worker(client: reqwest::Client, url: Url, mut receiver: mpsc::UnboundedReceiver<WatchTimeReport>) {
	while let Some(report) = receiver.recv().await {
		let result = client.post(url.clone()).form(&report).send().await;
		match result {
			Ok(response) => debug!(
				"Beacon sent {:.2}s for {} {} ({}).",
				report.watched_seconds,
				report.media_type,
				report.media_id,
				response.status()
			),
			Err(error) => debug!("Beacon for {} {} was lost: {}", report.media_type, report.media_id, error),
		}
	}
}

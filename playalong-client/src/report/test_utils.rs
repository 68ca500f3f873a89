use crate::report::{WatchTimeReport, WatchTimeTransport};
use parking_lot::Mutex;
use std::sync::Arc;

/// Keeps every report it is asked to send.
#[derive(Clone, Default)]
pub struct RecordingTransport {
	reports: Arc<Mutex<Vec<WatchTimeReport>>>,
}

impl RecordingTransport {
	pub fn reports(&self) -> Vec<WatchTimeReport> {
		self.reports.lock().clone()
	}

	pub fn watched_seconds(&self) -> Vec<f64> {
		self.reports
			.lock()
			.iter()
			.map(|report| report.watched_seconds)
			.collect()
	}
}

impl WatchTimeTransport for RecordingTransport {
	fn send(&self, report: WatchTimeReport) {
		self.reports.lock().push(report);
	}
}

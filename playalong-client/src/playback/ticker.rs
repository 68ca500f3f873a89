use crate::utils::time_source::{Interval, TimeSource};
use std::time::Duration;

/// Name of the ticker's clock in a test [`TimeSource`].
pub const TICKER: &str = "ticker";

/// At most one repeating timer. Starting always cancels the previous timer
/// first, so ticks can never come from two schedules at once.
pub struct Ticker {
	time_source: TimeSource,
	period: Duration,
	interval: Option<Interval>,
}

impl Ticker {
	pub fn new(time_source: TimeSource, period: Duration) -> Self {
		Self {
			time_source,
			period,
			interval: None,
		}
	}

	/// (Re)starts the schedule, the next tick is one full period away.
	pub fn start(&mut self) {
		self.stop();
		self.interval = Some(self.time_source.interval_at(TICKER, self.period, self.period));
	}

	pub fn stop(&mut self) {
		drop(self.interval.take());
	}

	pub fn is_running(&self) -> bool {
		self.interval.is_some()
	}

	/// Completes on the next tick. Never completes while stopped.
	pub async fn tick(&mut self) {
		match &mut self.interval {
			Some(interval) => interval.tick().await,
			None => std::future::pending().await,
		}
	}
}

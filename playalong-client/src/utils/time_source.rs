use futures_util::StreamExt;
use futures_util::stream::Stream;
use pin_project::pin_project;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{Notify, broadcast};
use tokio::time::{MissedTickBehavior, interval_at, timeout};
use tokio_stream::wrappers::BroadcastStream;

/// Source of timers. Either backed by tokio or, in test mode, by named
/// clocks that only move when [`TimeSource::advance_time`] is called.
#[derive(Clone, Default)]
pub struct TimeSource {
	test_time_sources: Option<Arc<TestTimeSources>>,
}

#[derive(Default)]
pub struct TestTimeSources {
	named_time_sources: parking_lot::Mutex<BTreeMap<&'static str, Arc<TestTimeSource>>>,
}

pub struct TestTimeSource {
	time_sender: broadcast::Sender<Duration>,
	notification: Notify,
}

impl Default for TestTimeSource {
	fn default() -> Self {
		Self {
			time_sender: broadcast::channel(64).0,
			notification: Notify::new(),
		}
	}
}

impl TestTimeSources {
	fn time_source(&self, name: &'static str) -> Arc<TestTimeSource> {
		let mut time_sources = self.named_time_sources.lock();
		time_sources.entry(name).or_default().clone()
	}

	fn interval_at(&self, name: &'static str, start: Duration, period: Duration) -> TestInterval {
		let time_source = self.time_source(name);
		let interval = TestInterval {
			current_time: Duration::ZERO,
			next_deadline: start,
			period,
			receiver: BroadcastStream::new(time_source.time_sender.subscribe()),
		};

		time_source.notification.notify_waiters();

		interval
	}

	fn timeout<ValueFuture: Future>(
		&self,
		name: &'static str,
		duration: Duration,
		future: ValueFuture,
	) -> TestTimeout<ValueFuture> {
		let time_source = self.time_source(name);
		let timeout = TestTimeout {
			future,
			current_time: Duration::ZERO,
			deadline: duration,
			receiver: BroadcastStream::new(time_source.time_sender.subscribe()),
		};

		time_source.notification.notify_waiters();

		timeout
	}

	fn advance_time(&self, name: &'static str, by_duration: Duration) {
		let time_source = self.time_source(name);
		let _ = time_source.time_sender.send(by_duration); // nobody listening is fine
	}

	fn subscriber_count(&self, name: &'static str) -> usize {
		self.time_source(name).time_sender.receiver_count()
	}

	async fn wait_for_time_request(&self, name: &'static str) {
		let time_source = self.time_source(name);
		time_source.notification.notified().await;
	}
}

impl TimeSource {
	pub fn test() -> Self {
		Self {
			test_time_sources: Some(Default::default()),
		}
	}

	pub fn interval_at(&self, name: &'static str, start: Duration, period: Duration) -> Interval {
		match &self.test_time_sources {
			None => {
				let mut interval = interval_at(tokio::time::Instant::now() + start, period);
				interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
				Interval::Tokio(interval)
			}
			Some(test_time_sources) => Interval::Test(test_time_sources.interval_at(name, start, period)),
		}
	}

	pub fn timeout<ValueFuture: Future>(
		&self,
		name: &'static str,
		duration: Duration,
		future: ValueFuture,
	) -> Timeout<ValueFuture> {
		match &self.test_time_sources {
			None => Timeout::Tokio(timeout(duration, future)),
			Some(test_time_sources) => Timeout::Test(test_time_sources.timeout(name, duration, future)),
		}
	}

	/// # Panics
	/// When not in test mode.
	pub fn advance_time(&self, name: &'static str, by_duration: Duration) {
		self.test_time_sources
			.as_ref()
			.expect("Can only be called in test mode.")
			.advance_time(name, by_duration);
	}

	/// Number of live timers registered under `name`. Always 0 outside of test mode.
	pub fn active_timers(&self, name: &'static str) -> usize {
		self.test_time_sources
			.as_ref()
			.map_or(0, |test_time_sources| test_time_sources.subscriber_count(name))
	}

	pub async fn wait_for_time_request(&self, name: &'static str) {
		match &self.test_time_sources {
			None => (),
			Some(test_time_sources) => test_time_sources.wait_for_time_request(name).await,
		}
	}
}

pub enum Interval {
	Tokio(tokio::time::Interval),
	Test(TestInterval),
}

impl Interval {
	pub async fn tick(&mut self) {
		match self {
			Interval::Tokio(interval) => {
				interval.tick().await;
			}
			Interval::Test(interval) => {
				if interval.next().await.is_none() {
					// the clock is gone, so this interval never fires again
					std::future::pending::<()>().await;
				}
			}
		}
	}
}

pub struct TestInterval {
	current_time: Duration,
	next_deadline: Duration,
	period: Duration,
	receiver: BroadcastStream<Duration>,
}

impl Stream for TestInterval {
	type Item = ();

	fn poll_next(mut self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		loop {
			match self.receiver.poll_next_unpin(context) {
				Poll::Ready(Some(Ok(time_delta))) => self.current_time += time_delta,
				Poll::Ready(Some(Err(_lagged))) => {}
				Poll::Ready(None) => return Poll::Ready(None),
				Poll::Pending => break,
			}
		}

		if self.current_time >= self.next_deadline {
			let period = self.period;
			self.next_deadline += period;
			return Poll::Ready(Some(()));
		}

		Poll::Pending
	}
}

#[pin_project(project = ProjectedTimeout)]
pub enum Timeout<ValueFuture> {
	Tokio(#[pin] tokio::time::Timeout<ValueFuture>),
	Test(#[pin] TestTimeout<ValueFuture>),
}

impl<ValueFuture: Future> Future for Timeout<ValueFuture> {
	type Output = Result<ValueFuture::Output, ()>;

	fn poll(self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Self::Output> {
		match self.project() {
			ProjectedTimeout::Tokio(timeout) => timeout.poll(context).map_err(|_elapsed| ()),
			ProjectedTimeout::Test(timeout) => timeout.poll(context),
		}
	}
}

#[pin_project]
pub struct TestTimeout<ValueFuture> {
	#[pin]
	future: ValueFuture,
	current_time: Duration,
	deadline: Duration,
	receiver: BroadcastStream<Duration>,
}

impl<ValueFuture: Future> Future for TestTimeout<ValueFuture> {
	type Output = Result<ValueFuture::Output, ()>;

	fn poll(self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Self::Output> {
		let this = self.project();
		loop {
			match this.receiver.poll_next_unpin(context) {
				Poll::Ready(Some(Ok(time_delta))) => *this.current_time += time_delta,
				Poll::Ready(Some(Err(_lagged))) => {}
				Poll::Ready(None) => return Poll::Ready(Err(())),
				Poll::Pending => break,
			}
		}

		if this.current_time >= this.deadline {
			return Poll::Ready(Err(()));
		}

		this.future.poll(context).map(Ok)
	}
}

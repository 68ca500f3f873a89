use crate::comment_sync::CommentSync;
use crate::episode::{EpisodeAttributes, PositionKey};
use crate::heatmap::Heatmap;
use crate::playback::state::{PlaybackPhase, PlaybackState};
use crate::playback::ticker::Ticker;
use crate::position_store::PositionStore;
use crate::render::{PlaybackSurface, Renderer, pointer_ratio};
use crate::report::WatchTimeReporter;
use crate::utils::time_source::TimeSource;
use std::time::Duration;
use tracing::{debug, info, warn};
use typed_builder::TypedBuilder;

pub mod state;
pub mod ticker;

#[cfg(test)]
mod tests;

/// Simulated seconds of playback per tick.
const SECONDS_PER_TICK: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, TypedBuilder)]
pub struct PlaybackSettings {
	/// Accumulated watched seconds that trigger a report.
	#[builder(default = 10.0)]
	pub report_threshold_seconds: f64,
	#[builder(default = 15.0)]
	pub skip_seconds: f64,
	#[builder(default = Duration::from_secs(1))]
	pub tick_interval: Duration,
}

impl Default for PlaybackSettings {
	fn default() -> Self {
		Self::builder().build()
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipDirection {
	Forward,
	Backward,
}

/// The collaborators of a [`PlaybackController`], one set per page.
#[derive(TypedBuilder)]
pub struct PlaybackDependencies {
	pub position_store: PositionStore,
	pub reporter: WatchTimeReporter,
	#[builder(default)]
	pub comment_sync: CommentSync,
	pub surface: Box<dyn PlaybackSurface>,
	#[builder(default)]
	pub time_source: TimeSource,
}

/// Owns the playback state of one episode on one page and reacts to user
/// intents and ticks. Every transition ends by drawing a frame and persisting
/// the position.
pub struct PlaybackController {
	state: PlaybackState,
	key: PositionKey,
	settings: PlaybackSettings,
	position_store: PositionStore,
	reporter: WatchTimeReporter,
	comment_sync: CommentSync,
	surface: Box<dyn PlaybackSurface>,
	ticker: Ticker,
}

impl PlaybackController {
	/// Restores the saved position and paints it.
	pub fn new(episode: &EpisodeAttributes, settings: PlaybackSettings, dependencies: PlaybackDependencies) -> Self {
		let PlaybackDependencies {
			position_store,
			reporter,
			comment_sync,
			surface,
			time_source,
		} = dependencies;

		let key = episode.position_key();
		let restored = position_store.load(&key);
		let state = PlaybackState::new(episode.duration_seconds, restored);
		debug!("Restored position {}s for '{}'.", state.elapsed_seconds, key);

		let mut controller = Self {
			state,
			key,
			settings,
			position_store,
			reporter,
			comment_sync,
			surface,
			ticker: Ticker::new(time_source, settings.tick_interval),
		};
		controller.commit();
		controller
	}

	pub fn state(&self) -> &PlaybackState {
		&self.state
	}

	pub fn play(&mut self) {
		match self.state.phase {
			PlaybackPhase::Playing | PlaybackPhase::Ended => return,
			PlaybackPhase::Idle | PlaybackPhase::Paused => {}
		}

		self.state.phase = PlaybackPhase::Playing;
		self.ticker.start();
		info!("Playing '{}' from {}s.", self.key, self.state.elapsed_seconds);
		self.commit();
	}

	pub fn pause(&mut self) {
		if !self.state.is_playing() {
			return;
		}

		self.state.phase = PlaybackPhase::Paused;
		self.ticker.stop();
		self.flush_pending();
		info!("Paused '{}' at {}s.", self.key, self.state.elapsed_seconds);
		self.commit();
	}

	/// The play button.
	pub fn toggle(&mut self) {
		if self.state.is_playing() {
			self.pause();
		} else {
			self.play();
		}
	}

	/// Jumps to `target_seconds`, clamped to the episode. While playing, the
	/// tick schedule restarts so the next tick is a full period away.
	pub fn seek(&mut self, target_seconds: f64) {
		self.state.elapsed_seconds = self.state.clamp_position(target_seconds);

		if self.state.has_ended() && self.state.elapsed_seconds < self.state.duration_seconds {
			self.state.phase = PlaybackPhase::Paused;
		}
		if self.state.is_playing() {
			self.ticker.start();
		}

		debug!("Seeked '{}' to {}s.", self.key, self.state.elapsed_seconds);
		self.commit();
	}

	/// A click on the progress track, `offset_x` pixels from its left edge.
	pub fn seek_to_pointer(&mut self, offset_x: f64) {
		let Some(ratio) = pointer_ratio(offset_x, self.surface.track_width()) else {
			debug!("Ignoring click on a track without width.");
			return;
		};

		self.seek(ratio * self.state.duration_seconds);
	}

	pub fn skip(&mut self, direction: SkipDirection) {
		let delta = match direction {
			SkipDirection::Forward => self.settings.skip_seconds,
			SkipDirection::Backward => -self.settings.skip_seconds,
		};

		self.seek(self.state.elapsed_seconds + delta);
	}

	/// Advances playback by one second.
	pub fn tick(&mut self) {
		if !self.state.is_playing() {
			return;
		}

		self.state.elapsed_seconds += SECONDS_PER_TICK;
		self.state.pending_watched_seconds += SECONDS_PER_TICK;
		if self.state.pending_watched_seconds >= self.settings.report_threshold_seconds {
			self.flush_pending();
		}

		if self.state.elapsed_seconds >= self.state.duration_seconds {
			self.state.elapsed_seconds = self.state.duration_seconds;
			self.ticker.stop();
			self.state.phase = PlaybackPhase::Ended;
			info!("Finished '{}'.", self.key);
			self.flush_pending();
		}

		self.commit();
	}

	/// Previews the time under the cursor. Only while not playing, and
	/// without touching the state.
	pub fn hover(&mut self, offset_x: f64) {
		if self.state.is_playing() {
			return;
		}

		if let Some(preview) = Renderer::hover_preview(&self.state, offset_x, self.surface.track_width()) {
			self.surface.draw_hover(&preview);
		}
	}

	pub fn leave(&mut self) {
		if !self.state.is_playing() {
			self.surface.hide_tooltip();
		}
	}

	pub fn show_heatmap(&mut self, heatmap: &Heatmap) {
		self.surface.draw_heatmap(heatmap);
	}

	/// Waits for the ticker. Never completes unless playing.
	pub async fn next_tick(&mut self) {
		self.ticker.tick().await;
	}

	/// The page goes away: last chance to report what was watched.
	pub fn teardown(&mut self) {
		self.ticker.stop();
		self.flush_pending();
	}

	fn flush_pending(&mut self) {
		let seconds = std::mem::take(&mut self.state.pending_watched_seconds);
		if seconds <= 0.0 {
			return;
		}

		if let Err(error) = self.reporter.flush(seconds) {
			warn!("Cannot send watch time: {}", error);
		}
	}

	fn commit(&mut self) {
		let frame = Renderer::render(&self.state, self.surface.track_width(), &self.comment_sync);
		self.surface.draw(&frame);

		if self.state.has_ended() {
			self.position_store.clear(&self.key);
		} else {
			self.position_store.save(&self.key, self.state.elapsed_seconds);
		}
	}
}

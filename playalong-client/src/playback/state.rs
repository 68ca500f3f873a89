#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackPhase {
	/// Freshly loaded, position fixed.
	#[default]
	Idle,
	/// The ticker is running.
	Playing,
	/// Stopped by the user before the end.
	Paused,
	/// Ran until the end, the saved position is gone.
	Ended,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackState {
	/// Position in the episode, always within `0..=duration_seconds`.
	pub elapsed_seconds: f64,
	pub duration_seconds: f64,
	pub phase: PlaybackPhase,
	/// Watched seconds not yet reported.
	pub pending_watched_seconds: f64,
}

impl PlaybackState {
	pub fn new(duration_seconds: f64, restored_elapsed_seconds: f64) -> Self {
		let mut state = Self {
			elapsed_seconds: 0.0,
			duration_seconds: duration_seconds.max(0.0),
			phase: PlaybackPhase::Idle,
			pending_watched_seconds: 0.0,
		};
		state.elapsed_seconds = state.clamp_position(restored_elapsed_seconds);
		state
	}

	pub fn is_playing(&self) -> bool {
		self.phase == PlaybackPhase::Playing
	}

	pub fn has_ended(&self) -> bool {
		self.phase == PlaybackPhase::Ended
	}

	/// `elapsed / duration` within `0..=1`, or 0 for an episode without duration.
	pub fn progress_ratio(&self) -> f64 {
		if self.duration_seconds <= 0.0 {
			return 0.0;
		}

		(self.elapsed_seconds / self.duration_seconds).clamp(0.0, 1.0)
	}

	pub fn clamp_position(&self, seconds: f64) -> f64 {
		if seconds.is_nan() {
			return 0.0;
		}

		seconds.clamp(0.0, self.duration_seconds)
	}
}

use crate::comment_sync::{CommentSync, CommentVisibility};
use crate::heatmap::Heatmap;
use crate::playback::state::PlaybackState;
use crate::time_format::format_time;
use static_assertions::assert_obj_safe;

pub mod log_surface;
#[cfg(test)]
pub mod test_utils;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayButton {
	Play,
	Pause,
}

impl PlayButton {
	pub fn glyph(self) -> &'static str {
		match self {
			PlayButton::Play => "▶",
			PlayButton::Pause => "❚❚",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TooltipDisplay {
	Shown,
	Hidden,
	/// Leave whatever the hover preview did.
	Unchanged,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
	pub text: String,
	pub left_px: f64,
	pub display: TooltipDisplay,
}

/// Everything the progress widget shows for one playback state.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
	pub fill_ratio: f64,
	pub tooltip: Tooltip,
	pub play_button: PlayButton,
	pub current_time: String,
	pub total_time: String,
	/// Prefill for the timestamp field of the comment form.
	pub comment_timestamp: String,
	pub comments: Vec<CommentVisibility>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HoverPreview {
	pub text: String,
	pub left_px: f64,
}

/// Where frames end up, e.g. the page's progress widget.
pub trait PlaybackSurface: Send {
	/// Width of the progress track in pixels.
	fn track_width(&self) -> f64;
	fn draw(&mut self, frame: &Frame);
	fn draw_hover(&mut self, preview: &HoverPreview);
	fn hide_tooltip(&mut self);
	fn draw_heatmap(&mut self, heatmap: &Heatmap);
}

assert_obj_safe!(PlaybackSurface);

pub struct Renderer;

impl Renderer {
	pub fn render(state: &PlaybackState, track_width: f64, comment_sync: &CommentSync) -> Frame {
		let fill_ratio = state.progress_ratio();
		let playing = state.is_playing();
		let current_time = format_time(state.elapsed_seconds);

		Frame {
			fill_ratio,
			tooltip: Tooltip {
				text: current_time.clone(),
				left_px: fill_ratio * sanitize_width(track_width),
				display: if playing {
					TooltipDisplay::Shown
				} else {
					TooltipDisplay::Unchanged
				},
			},
			play_button: if playing { PlayButton::Pause } else { PlayButton::Play },
			comment_timestamp: current_time.clone(),
			current_time,
			total_time: format_time(state.duration_seconds),
			comments: comment_sync.update_visibility(state.elapsed_seconds),
		}
	}

	/// The time under the cursor, for previewing a seek without doing it.
	pub fn hover_preview(state: &PlaybackState, offset_x: f64, track_width: f64) -> Option<HoverPreview> {
		let ratio = pointer_ratio(offset_x, track_width)?;

		Some(HoverPreview {
			text: format_time(ratio * state.duration_seconds),
			left_px: ratio * track_width,
		})
	}
}

/// Cursor position as fraction of the track, `None` for a track without width.
pub fn pointer_ratio(offset_x: f64, track_width: f64) -> Option<f64> {
	if !track_width.is_finite() || track_width <= 0.0 || offset_x.is_nan() {
		return None;
	}

	Some((offset_x / track_width).clamp(0.0, 1.0))
}

fn sanitize_width(track_width: f64) -> f64 {
	if track_width.is_finite() && track_width > 0.0 { track_width } else { 0.0 }
}

use crate::heatmap::Heatmap;
use crate::render::{Frame, HoverPreview, PlaybackSurface};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Headless surface that writes what a page would show to the log.
pub struct LogSurface {
	track_width: f64,
	visible_comments: BTreeSet<String>,
}

impl LogSurface {
	pub fn new(track_width: f64) -> Self {
		Self {
			track_width,
			visible_comments: BTreeSet::new(),
		}
	}
}

impl PlaybackSurface for LogSurface {
	fn track_width(&self) -> f64 {
		self.track_width
	}

	fn draw(&mut self, frame: &Frame) {
		info!(
			"{} {} / {} [{:>5.1}%]",
			frame.play_button.glyph(),
			frame.current_time,
			frame.total_time,
			frame.fill_ratio * 100.0
		);

		for comment in &frame.comments {
			if comment.visible {
				if self.visible_comments.insert(comment.id.clone()) {
					info!("Comment '{}' revealed.", comment.id);
				}
			} else if self.visible_comments.remove(&comment.id) {
				debug!("Comment '{}' hidden.", comment.id);
			}
		}
	}

	fn draw_hover(&mut self, preview: &HoverPreview) {
		info!("Seek preview: {} at {:.0}px", preview.text, preview.left_px);
	}

	fn hide_tooltip(&mut self) {
		debug!("Seek preview hidden.");
	}

	fn draw_heatmap(&mut self, heatmap: &Heatmap) {
		let sparkline: String = heatmap
			.buckets
			.iter()
			.map(|bucket| match bucket.normalized_density {
				density if density <= 0.0 => ' ',
				density if density < 0.25 => '░',
				density if density < 0.5 => '▒',
				density if density < 0.75 => '▓',
				_ => '█',
			})
			.collect();
		info!("Comment heatmap: [{}]", sparkline);
		debug!("Heatmap gradient: {}", heatmap.color_ramp.to_css());
	}
}

use crate::heatmap::Heatmap;
use crate::render::{Frame, HoverPreview, PlaybackSurface};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
pub enum Drawing {
	Frame(Frame),
	Hover(HoverPreview),
	HiddenTooltip,
	Heatmap(Heatmap),
}

/// Remembers everything drawn onto it. Clones share the recording.
#[derive(Clone)]
pub struct RecordingSurface {
	track_width: f64,
	drawings: Arc<Mutex<Vec<Drawing>>>,
}

impl RecordingSurface {
	pub fn new(track_width: f64) -> Self {
		Self {
			track_width,
			drawings: Default::default(),
		}
	}

	pub fn drawings(&self) -> Vec<Drawing> {
		self.drawings.lock().clone()
	}

	pub fn frames(&self) -> Vec<Frame> {
		self.drawings
			.lock()
			.iter()
			.filter_map(|drawing| match drawing {
				Drawing::Frame(frame) => Some(frame.clone()),
				_ => None,
			})
			.collect()
	}

	/// # Panics
	/// If nothing was drawn yet.
	pub fn last_frame(&self) -> Frame {
		self.frames().pop().expect("No frame was drawn")
	}

	pub fn last_drawing(&self) -> Option<Drawing> {
		self.drawings.lock().last().cloned()
	}

	pub fn heatmaps(&self) -> Vec<Heatmap> {
		self.drawings
			.lock()
			.iter()
			.filter_map(|drawing| match drawing {
				Drawing::Heatmap(heatmap) => Some(heatmap.clone()),
				_ => None,
			})
			.collect()
	}
}

impl PlaybackSurface for RecordingSurface {
	fn track_width(&self) -> f64 {
		self.track_width
	}

	fn draw(&mut self, frame: &Frame) {
		self.drawings.lock().push(Drawing::Frame(frame.clone()));
	}

	fn draw_hover(&mut self, preview: &HoverPreview) {
		self.drawings.lock().push(Drawing::Hover(preview.clone()));
	}

	fn hide_tooltip(&mut self) {
		self.drawings.lock().push(Drawing::HiddenTooltip);
	}

	fn draw_heatmap(&mut self, heatmap: &Heatmap) {
		self.drawings.lock().push(Drawing::Heatmap(heatmap.clone()));
	}
}

use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct CommentAnchor {
	pub id: String,
	pub timestamp_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentVisibility {
	pub id: String,
	pub visible: bool,
}

/// Reveals time-anchored comments once playback has reached them.
#[derive(Debug, Default, Clone)]
pub struct CommentSync {
	anchors: Vec<CommentAnchor>,
}

impl CommentSync {
	pub fn new(anchors: Vec<CommentAnchor>) -> Self {
		Self { anchors }
	}

	/// Registers anchors from `(id, data-secs)` attribute pairs, skipping unparseable timestamps.
	pub fn from_attributes<'a>(attributes: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
		let anchors = attributes
			.into_iter()
			.filter_map(|(id, seconds)| match seconds.trim().parse::<f64>() {
				Ok(timestamp_seconds) if !timestamp_seconds.is_nan() => Some(CommentAnchor {
					id: id.to_owned(),
					timestamp_seconds,
				}),
				_ => {
					warn!("Skipping comment '{}' with invalid timestamp '{}'.", id, seconds);
					None
				}
			})
			.collect();

		Self { anchors }
	}

	pub fn anchors(&self) -> &[CommentAnchor] {
		&self.anchors
	}

	pub fn update_visibility(&self, elapsed_seconds: f64) -> Vec<CommentVisibility> {
		self.anchors
			.iter()
			.map(|anchor| CommentVisibility {
				id: anchor.id.clone(),
				visible: anchor.timestamp_seconds <= elapsed_seconds,
			})
			.collect()
	}
}

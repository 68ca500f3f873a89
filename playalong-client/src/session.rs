use crate::episode::MediaId;
use crate::heatmap::source::CommentSource;
use crate::heatmap::{Heatmap, HeatmapBuilder};
use crate::intent::UserIntent;
use crate::playback::PlaybackController;
use crate::playback::state::PlaybackState;
use std::pin::pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// One page's worth of playback: multiplexes user intents, ticks and the
/// heatmap fetch onto the controller until the intent stream ends.
pub struct Session {
	controller: PlaybackController,
	comment_source: Option<Arc<dyn CommentSource>>,
	media_id: Option<MediaId>,
}

impl Session {
	pub fn new(
		controller: PlaybackController,
		comment_source: Option<Arc<dyn CommentSource>>,
		media_id: Option<MediaId>,
	) -> Self {
		Self {
			controller,
			comment_source,
			media_id,
		}
	}

	/// Runs until `intents` closes, which is treated as the page going away.
	pub async fn run(self, mut intents: mpsc::UnboundedReceiver<UserIntent>) -> PlaybackState {
		let Self {
			mut controller,
			comment_source,
			media_id,
		} = self;

		let duration_seconds = controller.state().duration_seconds;
		let mut heatmap = pin!(load_heatmap(comment_source, media_id, duration_seconds));
		let mut heatmap_pending = true;

		loop {
			tokio::select! {
				// ticks that are due go before intents that arrived at the same time
				biased;

				() = controller.next_tick() => controller.tick(),
				heatmap = &mut heatmap, if heatmap_pending => {
					heatmap_pending = false;
					if let Some(heatmap) = heatmap {
						controller.show_heatmap(&heatmap);
					}
				}
				intent = intents.recv() => match intent {
					Some(intent) => intent.apply(&mut controller),
					None => break,
				},
			}
		}

		debug!("Intent stream closed, tearing down.");
		controller.teardown();
		*controller.state()
	}
}

async fn load_heatmap(
	comment_source: Option<Arc<dyn CommentSource>>,
	media_id: Option<MediaId>,
	duration_seconds: f64,
) -> Option<Heatmap> {
	let (Some(comment_source), Some(media_id)) = (comment_source, media_id) else {
		debug!("No comment source or media id, skipping heatmap.");
		return None;
	};

	match comment_source.comment_timestamps(&media_id).await {
		Ok(timestamps) => Some(HeatmapBuilder::build(&timestamps, duration_seconds)),
		Err(error) => {
			warn!("Failed to load comment heatmap: {}", error);
			None
		}
	}
}

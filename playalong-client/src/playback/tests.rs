use super::*;
use crate::render::test_utils::{Drawing, RecordingSurface};
use crate::render::{HoverPreview, PlayButton};
use crate::report::test_utils::RecordingTransport;
use crate::storage::Storage;
use crate::storage::memory::MemoryStorage;
use crate::playback::ticker::TICKER;
use futures_util::poll;
use std::pin::pin;
use std::sync::Arc;
use std::task::Poll;

const STORAGE_KEY: &str = "episode:1:/episode/1";
const TRACK_WIDTH: f64 = 300.0;

struct Harness {
	controller: PlaybackController,
	storage: Arc<MemoryStorage>,
	surface: RecordingSurface,
	requests: RecordingTransport,
	time_source: TimeSource,
}

fn episode(duration_seconds: f64) -> EpisodeAttributes {
	EpisodeAttributes::builder()
		.episode_id("1".to_owned())
		.media_type("episode".to_owned())
		.media_id("42".to_owned())
		.duration_seconds(duration_seconds)
		.page_path("/episode/1")
		.build()
}

fn harness(duration_seconds: f64) -> Harness {
	harness_with_storage(duration_seconds, Arc::new(MemoryStorage::default()), CommentSync::default())
}

fn harness_with_storage(duration_seconds: f64, storage: Arc<MemoryStorage>, comment_sync: CommentSync) -> Harness {
	let episode = episode(duration_seconds);
	let surface = RecordingSurface::new(TRACK_WIDTH);
	let requests = RecordingTransport::default();
	let time_source = TimeSource::test();

	let controller = PlaybackController::new(
		&episode,
		PlaybackSettings::default(),
		PlaybackDependencies::builder()
			.position_store(PositionStore::new(storage.clone()))
			.reporter(WatchTimeReporter::new(&episode, None, Arc::new(requests.clone())))
			.comment_sync(comment_sync)
			.surface(Box::new(surface.clone()))
			.time_source(time_source.clone())
			.build(),
	);

	Harness {
		controller,
		storage,
		surface,
		requests,
		time_source,
	}
}

impl Harness {
	fn stored_position(&self) -> Option<String> {
		self.storage.get_item(STORAGE_KEY).expect("Failed to get item")
	}

	fn ticks(&mut self, count: usize) {
		for _ in 0..count {
			self.controller.tick();
		}
	}
}

#[test]
fn should_paint_and_persist_initial_position() {
	let harness = harness(300.0);

	let frame = harness.surface.last_frame();
	assert_eq!("0:00", frame.current_time);
	assert_eq!("5:00", frame.total_time);
	assert_eq!(PlayButton::Play, frame.play_button);
	assert_eq!(Some("0".to_owned()), harness.stored_position());
	assert_eq!(PlaybackPhase::Idle, harness.controller.state().phase);
}

#[test]
fn should_restore_saved_position() {
	let storage = Arc::new(MemoryStorage::default());
	storage.set_item(STORAGE_KEY, "120").expect("Failed to set item");

	let harness = harness_with_storage(300.0, storage, CommentSync::default());

	assert_eq!(120.0, harness.controller.state().elapsed_seconds);
	assert_eq!("2:00", harness.surface.last_frame().current_time);
}

#[test]
fn should_start_from_zero_with_unusable_saved_position() {
	let storage = Arc::new(MemoryStorage::default());
	storage.set_item(STORAGE_KEY, "garbage").expect("Failed to set item");

	let harness = harness_with_storage(300.0, storage, CommentSync::default());

	assert_eq!(0.0, harness.controller.state().elapsed_seconds);
}

#[test]
fn should_play_and_advance_one_second_per_tick() {
	let mut harness = harness(300.0);

	harness.controller.play();
	harness.ticks(3);

	assert_eq!(3.0, harness.controller.state().elapsed_seconds);
	assert_eq!(PlayButton::Pause, harness.surface.last_frame().play_button);
	assert_eq!(Some("3".to_owned()), harness.stored_position());
}

#[test]
fn should_ignore_play_while_playing() {
	let mut harness = harness(300.0);
	harness.controller.play();
	let drawn = harness.surface.frames().len();

	harness.controller.play();

	assert_eq!(drawn, harness.surface.frames().len());
	assert_eq!(1, harness.time_source.active_timers(TICKER));
}

#[test]
fn should_ignore_ticks_while_not_playing() {
	let mut harness = harness(300.0);

	harness.ticks(5);

	assert_eq!(0.0, harness.controller.state().elapsed_seconds);
}

#[test]
fn should_flush_once_per_ten_seconds_of_playback() {
	let mut harness = harness(300.0);
	harness.controller.play();

	harness.ticks(9);
	assert!(harness.requests.reports().is_empty());

	harness.ticks(1);
	assert_eq!(vec![10.0], harness.requests.watched_seconds());
	assert_eq!(0.0, harness.controller.state().pending_watched_seconds);

	harness.ticks(15);
	assert_eq!(vec![10.0, 10.0], harness.requests.watched_seconds());
	assert_eq!(5.0, harness.controller.state().pending_watched_seconds);
}

#[test]
fn should_flush_pending_seconds_on_pause() {
	let mut harness = harness(300.0);
	harness.controller.play();
	harness.ticks(7);

	harness.controller.pause();

	assert_eq!(vec![7.0], harness.requests.watched_seconds());
	assert_eq!(0.0, harness.controller.state().pending_watched_seconds);
	assert_eq!(PlaybackPhase::Paused, harness.controller.state().phase);
	assert_eq!(0, harness.time_source.active_timers(TICKER));
}

#[test]
fn should_not_flush_nothing_on_pause() {
	let mut harness = harness(300.0);
	harness.controller.play();
	harness.ticks(10);

	harness.controller.pause();

	assert_eq!(vec![10.0], harness.requests.watched_seconds());
}

#[test]
fn should_toggle_between_playing_and_paused() {
	let mut harness = harness(300.0);

	harness.controller.toggle();
	assert_eq!(PlaybackPhase::Playing, harness.controller.state().phase);

	harness.controller.toggle();
	assert_eq!(PlaybackPhase::Paused, harness.controller.state().phase);

	harness.controller.toggle();
	assert_eq!(PlaybackPhase::Playing, harness.controller.state().phase);
}

#[test]
fn should_show_clamped_time_after_seek() {
	let mut harness = harness(300.0);

	harness.controller.seek(65.0);
	assert_eq!("1:05", harness.surface.last_frame().current_time);

	harness.controller.seek(1000.0);
	assert_eq!("5:00", harness.surface.last_frame().current_time);
	assert_eq!(1.0, harness.surface.last_frame().fill_ratio);

	harness.controller.seek(-10.0);
	assert_eq!("0:00", harness.surface.last_frame().current_time);

	harness.controller.seek(f64::NAN);
	assert_eq!(0.0, harness.controller.state().elapsed_seconds);
}

#[test]
fn should_persist_position_after_seek() {
	let mut harness = harness(300.0);

	harness.controller.seek(42.5);

	assert_eq!(Some("42.5".to_owned()), harness.stored_position());
}

#[test]
fn should_not_end_by_seeking_to_the_end() {
	let mut harness = harness(300.0);

	harness.controller.seek(300.0);

	assert_eq!(PlaybackPhase::Idle, harness.controller.state().phase);
	assert_eq!(Some("300".to_owned()), harness.stored_position());
}

#[tokio::test]
async fn should_tick_exactly_once_one_period_after_seeking_while_playing() {
	let mut harness = harness(300.0);
	harness.controller.play();
	harness.time_source.advance_time(TICKER, Duration::from_millis(600));

	harness.controller.seek(100.0);
	assert_eq!(1, harness.time_source.active_timers(TICKER));

	harness.time_source.advance_time(TICKER, Duration::from_millis(600));
	{
		let mut tick = pin!(harness.controller.next_tick());
		assert_eq!(Poll::Pending, poll!(tick.as_mut()));

		harness.time_source.advance_time(TICKER, Duration::from_millis(400));
		assert_eq!(Poll::Ready(()), poll!(tick.as_mut()));
	}
	harness.controller.tick();
	assert_eq!(101.0, harness.controller.state().elapsed_seconds);

	let mut tick = pin!(harness.controller.next_tick());
	assert_eq!(Poll::Pending, poll!(tick.as_mut()));
}

#[tokio::test]
async fn should_not_tick_after_pause() {
	let mut harness = harness(300.0);
	harness.controller.play();
	harness.controller.pause();

	harness.time_source.advance_time(TICKER, Duration::from_secs(5));

	let mut tick = pin!(harness.controller.next_tick());
	assert_eq!(Poll::Pending, poll!(tick.as_mut()));
}

#[test]
fn should_skip_forward_and_backward_by_fifteen_seconds() {
	let mut harness = harness(300.0);
	harness.controller.seek(100.0);

	harness.controller.skip(SkipDirection::Forward);
	assert_eq!(115.0, harness.controller.state().elapsed_seconds);

	harness.controller.skip(SkipDirection::Backward);
	harness.controller.skip(SkipDirection::Backward);
	assert_eq!(85.0, harness.controller.state().elapsed_seconds);
}

#[test]
fn should_clamp_skips_to_the_episode() {
	let mut harness = harness(300.0);

	harness.controller.skip(SkipDirection::Backward);
	assert_eq!(0.0, harness.controller.state().elapsed_seconds);

	harness.controller.seek(290.0);
	harness.controller.skip(SkipDirection::Forward);
	assert_eq!(300.0, harness.controller.state().elapsed_seconds);
}

#[test]
fn should_seek_to_clicked_position() {
	let mut harness = harness(300.0);

	harness.controller.seek_to_pointer(TRACK_WIDTH / 4.0);
	assert_eq!(75.0, harness.controller.state().elapsed_seconds);

	harness.controller.seek_to_pointer(TRACK_WIDTH * 2.0);
	assert_eq!(300.0, harness.controller.state().elapsed_seconds);

	harness.controller.seek_to_pointer(-TRACK_WIDTH);
	assert_eq!(0.0, harness.controller.state().elapsed_seconds);
}

#[test]
fn should_end_playback_at_the_end() {
	let mut harness = harness(30.0);
	harness.controller.seek(25.0);
	harness.controller.play();

	harness.ticks(5);

	let state = harness.controller.state();
	assert_eq!(PlaybackPhase::Ended, state.phase);
	assert_eq!(30.0, state.elapsed_seconds);
	assert_eq!(None, harness.stored_position());
	assert_eq!(vec![5.0], harness.requests.watched_seconds());
	assert_eq!(0, harness.time_source.active_timers(TICKER));
	assert_eq!(PlayButton::Play, harness.surface.last_frame().play_button);
	assert_eq!(1.0, harness.surface.last_frame().fill_ratio);
}

#[test]
fn should_clamp_fractional_positions_at_the_end() {
	let mut harness = harness(30.0);
	harness.controller.seek(29.5);
	harness.controller.play();

	harness.ticks(1);

	assert_eq!(PlaybackPhase::Ended, harness.controller.state().phase);
	assert_eq!(30.0, harness.controller.state().elapsed_seconds);
}

#[test]
fn should_flush_threshold_and_remainder_when_ending() {
	let mut harness = harness(12.0);
	harness.controller.play();

	harness.ticks(12);

	assert_eq!(vec![10.0, 2.0], harness.requests.watched_seconds());
}

#[test]
fn should_start_from_zero_after_reload_once_ended() {
	let mut harness = harness(5.0);
	harness.controller.play();
	harness.ticks(5);
	assert_eq!(PlaybackPhase::Ended, harness.controller.state().phase);

	let reloaded = harness_with_storage(5.0, harness.storage.clone(), CommentSync::default());

	assert_eq!(0.0, reloaded.controller.state().elapsed_seconds);
	assert_eq!(PlaybackPhase::Idle, reloaded.controller.state().phase);
}

#[test]
fn should_not_play_once_ended() {
	let mut harness = harness(5.0);
	harness.controller.play();
	harness.ticks(5);

	harness.controller.play();

	assert_eq!(PlaybackPhase::Ended, harness.controller.state().phase);
	assert_eq!(0, harness.time_source.active_timers(TICKER));
}

#[test]
fn should_leave_ended_by_seeking_back() {
	let mut harness = harness(5.0);
	harness.controller.play();
	harness.ticks(5);

	harness.controller.seek(1.0);

	assert_eq!(PlaybackPhase::Paused, harness.controller.state().phase);
	assert_eq!(Some("1".to_owned()), harness.stored_position());
	harness.controller.play();
	assert_eq!(PlaybackPhase::Playing, harness.controller.state().phase);
}

#[test]
fn should_reveal_comment_exactly_when_reaching_its_timestamp() {
	let comment_sync = CommentSync::from_attributes([("answer", "42")]);
	let mut harness = harness_with_storage(300.0, Arc::new(MemoryStorage::default()), comment_sync);
	harness.controller.seek(40.0);
	harness.controller.play();

	harness.ticks(1);
	assert!(!harness.surface.last_frame().comments[0].visible);

	harness.ticks(1);
	assert!(harness.surface.last_frame().comments[0].visible);
}

#[test]
fn should_preview_hover_without_changing_state() {
	let mut harness = harness(300.0);
	harness.controller.seek(10.0);
	let frames = harness.surface.frames().len();

	harness.controller.hover(TRACK_WIDTH / 2.0);

	assert_eq!(
		Some(Drawing::Hover(HoverPreview {
			text: "2:30".to_owned(),
			left_px: 150.0,
		})),
		harness.surface.last_drawing()
	);
	assert_eq!(10.0, harness.controller.state().elapsed_seconds);
	assert_eq!(frames, harness.surface.frames().len());
	assert_eq!(Some("10".to_owned()), harness.stored_position());
	assert!(harness.requests.reports().is_empty());
}

#[test]
fn should_not_preview_hover_while_playing() {
	let mut harness = harness(300.0);
	harness.controller.play();
	let drawings = harness.surface.drawings().len();

	harness.controller.hover(TRACK_WIDTH / 2.0);
	harness.controller.leave();

	assert_eq!(drawings, harness.surface.drawings().len());
}

#[test]
fn should_hide_tooltip_when_leaving_while_not_playing() {
	let mut harness = harness(300.0);

	harness.controller.hover(TRACK_WIDTH / 2.0);
	harness.controller.leave();

	assert_eq!(Some(Drawing::HiddenTooltip), harness.surface.last_drawing());
}

#[test]
fn should_flush_pending_seconds_on_teardown() {
	let mut harness = harness(300.0);
	harness.controller.play();
	harness.ticks(4);

	harness.controller.teardown();

	assert_eq!(vec![4.0], harness.requests.watched_seconds());
	assert_eq!(0, harness.time_source.active_timers(TICKER));
}

#[test]
fn should_not_report_on_teardown_without_pending_seconds() {
	let mut harness = harness(300.0);

	harness.controller.teardown();

	assert!(harness.requests.reports().is_empty());
}

#[test]
fn should_keep_playing_when_storage_fails() {
	let storage = Arc::new(MemoryStorage::with_quota(0));
	let mut harness = harness_with_storage(300.0, storage, CommentSync::default());

	harness.controller.play();
	harness.ticks(3);

	assert_eq!(3.0, harness.controller.state().elapsed_seconds);
	assert_eq!(None, harness.stored_position());
}

#[test]
fn should_play_without_reporting_when_media_is_unknown() {
	let episode = EpisodeAttributes::builder()
		.episode_id("1".to_owned())
		.duration_seconds(300.0)
		.page_path("/episode/1")
		.build();
	let requests = RecordingTransport::default();
	let mut controller = PlaybackController::new(
		&episode,
		PlaybackSettings::default(),
		PlaybackDependencies::builder()
			.position_store(PositionStore::new(Arc::new(MemoryStorage::default())))
			.reporter(WatchTimeReporter::new(&episode, None, Arc::new(requests.clone())))
			.surface(Box::new(RecordingSurface::new(TRACK_WIDTH)))
			.time_source(TimeSource::test())
			.build(),
	);

	controller.play();
	for _ in 0..10 {
		controller.tick();
	}

	assert_eq!(10.0, controller.state().elapsed_seconds);
	assert_eq!(0.0, controller.state().pending_watched_seconds);
	assert!(requests.reports().is_empty());
}

#[test]
fn should_render_zero_progress_without_duration() {
	let mut harness = harness(0.0);

	harness.controller.seek(10.0);

	assert_eq!(0.0, harness.surface.last_frame().fill_ratio);
	assert_eq!(0.0, harness.controller.state().elapsed_seconds);
}

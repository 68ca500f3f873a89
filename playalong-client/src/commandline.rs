use crate::comment_sync::CommentSync;
use crate::configuration::Configuration;
use crate::context::ApplicationContext;
use crate::episode::EpisodeAttributes;
use crate::error::PlayalongError;
use crate::heatmap::source::{CommentSource, HttpCommentSource};
use crate::intent::read_intents;
use crate::logging::init_logging;
use crate::playback::state::PlaybackState;
use crate::playback::{PlaybackController, PlaybackDependencies};
use crate::position_store::PositionStore;
use crate::render::log_surface::LogSurface;
use crate::report::beacon::BeaconTransport;
use crate::report::keepalive::KeepaliveRequestTransport;
use crate::report::{WatchTimeReporter, WatchTimeTransport};
use crate::session::Session;
use crate::utils::time_source::TimeSource;
use anyhow::Context;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Width in pixels of the progress track drawn by the log surface.
const TRACK_WIDTH: f64 = 100.0;
const REPORT_DRAIN: &str = "report drain";

#[derive(clap::Parser)]
pub struct Commandline {
	#[clap(short = 'c', long = "config-file", default_value = "configuration.toml")]
	pub configuration_file_path: String,
	#[clap(subcommand)]
	pub command: BaseCommand,
}

#[derive(clap::Subcommand)]
pub enum BaseCommand {
	/// Play an episode, reading commands from stdin
	Run(EpisodeArguments),
	/// Print the configuration
	Configuration,
}

/// The data attributes of the episode's progress container.
#[derive(clap::Args, Debug, PartialEq)]
pub struct EpisodeArguments {
	#[clap(long)]
	pub episode_id: String,
	#[clap(long)]
	pub media_type: Option<String>,
	#[clap(long)]
	pub media_id: Option<String>,
	/// Length of the episode in seconds
	#[clap(long)]
	pub duration: Option<String>,
	/// Path of the page the episode is embedded in
	#[clap(long, default_value = "/")]
	pub page_path: String,
	/// Comment anchored at a timestamp, can be repeated
	#[clap(long = "comment", value_name = "ID=SECONDS")]
	pub comments: Vec<String>,
}

impl EpisodeArguments {
	pub fn episode_attributes(&self) -> EpisodeAttributes {
		let attributes: HashMap<String, String> = [
			("epid", Some(&self.episode_id)),
			("media-type", self.media_type.as_ref()),
			("media-id", self.media_id.as_ref()),
			("duration", self.duration.as_ref()),
		]
		.into_iter()
		.filter_map(|(name, value)| value.map(|value| (name.to_owned(), value.clone())))
		.collect();

		EpisodeAttributes::from_data_attributes(&attributes, self.page_path.clone())
	}

	pub fn comment_sync(&self) -> CommentSync {
		CommentSync::from_attributes(
			self.comments
				.iter()
				.map(|comment| comment.split_once('=').unwrap_or((comment.as_str(), ""))),
		)
	}
}

impl Commandline {
	pub async fn run(self) -> Result<(), PlayalongError> {
		let configuration = Configuration::from_file(&self.configuration_file_path)?;
		let time_source = TimeSource::default();
		let application_context = ApplicationContext::new(configuration, time_source)?;

		init_logging(&application_context.configuration.log_filters);

		match self.command {
			BaseCommand::Run(episode) => {
				let final_state = play_episode(&application_context, &episode, tokio::io::stdin()).await?;
				info!(
					"Stopped '{}' at {}s ({:?}).",
					episode.episode_id, final_state.elapsed_seconds, final_state.phase
				);
			}
			BaseCommand::Configuration => println!("{:#?}", application_context.configuration),
		}
		Ok(())
	}
}

/// Plays one episode with intents read from `input`, then gives reports that
/// are still on their way a grace period to be delivered.
async fn play_episode(
	context: &ApplicationContext,
	arguments: &EpisodeArguments,
	input: impl AsyncRead + Unpin + Send + 'static,
) -> Result<PlaybackState, PlayalongError> {
	let configuration = &context.configuration;
	let episode = arguments.episode_attributes();

	let (reporter, pending_reports) = create_reporter(context, &episode)?;
	let controller = PlaybackController::new(
		&episode,
		configuration.playback_settings(),
		PlaybackDependencies::builder()
			.position_store(PositionStore::new(context.storage.clone()))
			.reporter(reporter)
			.comment_sync(arguments.comment_sync())
			.surface(Box::new(LogSurface::new(TRACK_WIDTH)))
			.time_source(context.time_source.clone())
			.build(),
	);
	let comment_source: Arc<dyn CommentSource> = Arc::new(HttpCommentSource::new(
		context.client.clone(),
		configuration.backend_url.clone(),
	));
	let session = Session::new(controller, Some(comment_source), episode.media_id.clone());

	let (intent_sender, intent_receiver) = mpsc::unbounded_channel();
	let reader = tokio::spawn(read_intents(input, intent_sender));
	let final_state = session.run(intent_receiver).await;
	drop(reader);

	drain_reports(context, pending_reports).await;

	Ok(final_state)
}

/// Reports that may still be on their way when the session ends.
struct PendingReports {
	requests: KeepaliveRequestTransport,
	beacon_worker: Option<JoinHandle<()>>,
}

impl PendingReports {
	async fn delivered(self) {
		self.requests.drain().await;
		if let Some(beacon_worker) = self.beacon_worker {
			if let Err(error) = beacon_worker.await {
				warn!("Beacon worker failed: {}", error);
			}
		}
	}
}

fn create_reporter(
	context: &ApplicationContext,
	episode: &EpisodeAttributes,
) -> anyhow::Result<(WatchTimeReporter, PendingReports)> {
	let backend_url = &context.configuration.backend_url;

	let request_url = backend_url
		.join("update_watch_time")
		.context("Invalid watch time URL")?;
	let requests = KeepaliveRequestTransport::new(context.client.clone(), request_url);
	let request: Arc<dyn WatchTimeTransport> = Arc::new(requests.clone());

	if !context.configuration.use_beacon {
		let pending_reports = PendingReports {
			requests,
			beacon_worker: None,
		};
		return Ok((WatchTimeReporter::new(episode, None, request), pending_reports));
	}

	let beacon_url = backend_url
		.join("update_watch_time_beacon")
		.context("Invalid watch time beacon URL")?;
	let (beacon, beacon_worker) = BeaconTransport::spawn(context.client.clone(), beacon_url);
	let beacon: Arc<dyn WatchTimeTransport> = Arc::new(beacon);
	let pending_reports = PendingReports {
		requests,
		beacon_worker: Some(beacon_worker),
	};

	Ok((WatchTimeReporter::new(episode, Some(beacon), request), pending_reports))
}

async fn drain_reports(context: &ApplicationContext, pending_reports: PendingReports) {
	let grace_period = context.configuration.report_drain_timeout;
	match context
		.time_source
		.timeout(REPORT_DRAIN, grace_period, pending_reports.delivered())
		.await
	{
		Ok(()) => debug!("All watch time reports delivered."),
		Err(()) => warn!("Gave up on undelivered watch time reports after {:?}.", grace_period),
	}
}

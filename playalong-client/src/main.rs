use crate::commandline::Commandline;
use crate::error::PlayalongError;
use clap::Parser;
use std::process::ExitCode;

mod commandline;
mod comment_sync;
mod configuration;
mod context;
mod episode;
mod error;
mod heatmap;
mod intent;
mod logging;
mod playback;
mod position_store;
mod render;
mod report;
mod session;
mod storage;
mod time_format;
mod utils;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
	let result = match Commandline::try_parse() {
		Ok(commandline) => commandline.run().await,
		Err(error) => Err(PlayalongError::from(error)),
	};

	match result {
		Ok(()) => ExitCode::SUCCESS,
		Err(PlayalongError::Commandline(error)) => error.exit(),
		Err(error) => {
			eprintln!("{error}");
			ExitCode::FAILURE
		}
	}
}

use crate::playback::{PlaybackController, SkipDirection};
use crate::time_format::parse_time;
use std::str::FromStr;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

const QUIT: &str = "quit";

/// Something the user did to the progress widget.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UserIntent {
	Toggle,
	Play,
	Pause,
	Seek { seconds: f64 },
	Click { offset_x: f64 },
	Skip(SkipDirection),
	Hover { offset_x: f64 },
	Leave,
}

impl UserIntent {
	pub fn apply(self, controller: &mut PlaybackController) {
		use UserIntent::*;
		match self {
			Toggle => controller.toggle(),
			Play => controller.play(),
			Pause => controller.pause(),
			Seek { seconds } => controller.seek(seconds),
			Click { offset_x } => controller.seek_to_pointer(offset_x),
			Skip(direction) => controller.skip(direction),
			Hover { offset_x } => controller.hover(offset_x),
			Leave => controller.leave(),
		}
	}
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IntentParseError {
	#[error("Unknown command '{0}'.")]
	UnknownCommand(String),
	#[error("Command '{0}' needs a number.")]
	MissingNumber(&'static str),
	#[error("'{0}' is not a number.")]
	InvalidNumber(String),
}

impl FromStr for UserIntent {
	type Err = IntentParseError;

	fn from_str(line: &str) -> Result<Self, Self::Err> {
		let mut words = line.split_whitespace();
		let command = words.next().unwrap_or_default();
		let argument = words.next();

		let intent = match command {
			"toggle" => UserIntent::Toggle,
			"play" => UserIntent::Play,
			"pause" => UserIntent::Pause,
			"seek" => UserIntent::Seek {
				seconds: position("seek", argument)?,
			},
			"click" => UserIntent::Click {
				offset_x: number("click", argument)?,
			},
			"forward" => UserIntent::Skip(SkipDirection::Forward),
			"back" => UserIntent::Skip(SkipDirection::Backward),
			"hover" => UserIntent::Hover {
				offset_x: number("hover", argument)?,
			},
			"leave" => UserIntent::Leave,
			unknown => return Err(IntentParseError::UnknownCommand(unknown.to_owned())),
		};
		Ok(intent)
	}
}

fn number(command: &'static str, argument: Option<&str>) -> Result<f64, IntentParseError> {
	let argument = argument.ok_or(IntentParseError::MissingNumber(command))?;
	argument
		.parse()
		.map_err(|_| IntentParseError::InvalidNumber(argument.to_owned()))
}

/// Seconds, or a timestamp like `1:05`.
fn position(command: &'static str, argument: Option<&str>) -> Result<f64, IntentParseError> {
	let argument = argument.ok_or(IntentParseError::MissingNumber(command))?;
	argument
		.parse::<f64>()
		.or_else(|_| parse_time(argument).map(|seconds| seconds as f64))
		.map_err(|_| IntentParseError::InvalidNumber(argument.to_owned()))
}

/// Forwards one intent per line of `input` until `quit` or the end of input.
/// Returning drops `intents`, which ends the session.
pub async fn read_intents(input: impl AsyncRead + Unpin, intents: mpsc::UnboundedSender<UserIntent>) {
	let mut lines = BufReader::new(input).lines();
	loop {
		let line = match lines.next_line().await {
			Ok(Some(line)) => line,
			Ok(None) => {
				debug!("End of input.");
				break;
			}
			Err(error) => {
				error!("Failed to read input: {}", error);
				break;
			}
		};

		let line = line.trim();
		if line.is_empty() {
			continue;
		}
		if line == QUIT {
			debug!("Quit requested.");
			break;
		}

		match line.parse::<UserIntent>() {
			Ok(intent) => {
				if intents.send(intent).is_err() {
					break;
				}
			}
			Err(error) => warn!("{}", error),
		}
	}
}

use thiserror::Error;

/// Formats seconds as `M:SS`, or `H:MM:SS` once there is at least one full hour.
/// The hour field is not padded.
pub fn format_time(seconds: f64) -> String {
	let total = whole_seconds(seconds);
	let hours = total / 3600;
	let minutes = (total % 3600) / 60;
	let seconds = total % 60;

	if hours > 0 {
		format!("{hours}:{minutes:02}:{seconds:02}")
	} else {
		format!("{minutes}:{seconds:02}")
	}
}

fn whole_seconds(seconds: f64) -> u64 {
	if !seconds.is_finite() || seconds <= 0.0 {
		return 0;
	}

	seconds.round() as u64
}

/// Parses the `M:SS` or `H:MM:SS` format used by the comment form.
pub fn parse_time(text: &str) -> Result<u64, TimeParseError> {
	let fields = text
		.trim()
		.split(':')
		.map(|field| field.parse::<u64>().map_err(|_| TimeParseError::InvalidField(field.to_owned())))
		.collect::<Result<Vec<_>, _>>()?;

	let (hours, minutes, seconds) = match fields.as_slice() {
		&[minutes, seconds] => (0, minutes, seconds),
		&[hours, minutes, seconds] => (hours, minutes, seconds),
		_ => return Err(TimeParseError::InvalidFormat(text.to_owned())),
	};

	hours
		.checked_mul(3600)
		.and_then(|total| total.checked_add(minutes.checked_mul(60)?))
		.and_then(|total| total.checked_add(seconds))
		.ok_or_else(|| TimeParseError::OutOfRange(text.to_owned()))
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TimeParseError {
	#[error("Invalid time format '{0}', expected M:SS or H:MM:SS.")]
	InvalidFormat(String),
	#[error("Invalid time field '{0}'.")]
	InvalidField(String),
	#[error("Time '{0}' is too large.")]
	OutOfRange(String),
}

use std::fmt::{Display, Formatter, Write};

pub mod source;

const SECONDS_PER_BUCKET: f64 = 30.0;
const MINIMUM_BUCKETS: usize = 10;
const MAXIMUM_BUCKETS: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapBucket {
	pub index: usize,
	pub comment_count: usize,
	pub normalized_density: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HslColor {
	pub hue: f64,
	pub saturation_percent: f64,
	pub lightness_percent: f64,
}

impl Display for HslColor {
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
		write!(
			formatter,
			"hsl({}, {}%, {}%)",
			self.hue, self.saturation_percent, self.lightness_percent
		)
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
	pub color: HslColor,
	pub position_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradientRamp(pub Vec<GradientStop>);

impl GradientRamp {
	/// A left-to-right CSS `linear-gradient` through all stops.
	pub fn to_css(&self) -> String {
		let mut css = String::from("linear-gradient(to right");
		for GradientStop {
			color,
			position_percent,
		} in &self.0
		{
			let _ = write!(css, ", {color} {position_percent}%");
		}
		css.push(')');
		css
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
	pub buckets: Vec<HeatmapBucket>,
	pub gray_ramp: GradientRamp,
	pub color_ramp: GradientRamp,
}

pub struct HeatmapBuilder;

impl HeatmapBuilder {
	pub fn bucket_count(duration_seconds: f64) -> usize {
		let natural = if duration_seconds.is_finite() && duration_seconds > 0.0 {
			(duration_seconds / SECONDS_PER_BUCKET).floor() as usize
		} else {
			0
		};
		natural.clamp(MINIMUM_BUCKETS, MAXIMUM_BUCKETS)
	}

	pub fn build(timestamps: &[f64], duration_seconds: f64) -> Heatmap {
		let bucket_count = Self::bucket_count(duration_seconds);
		let counts = Self::count_comments(timestamps, duration_seconds, bucket_count);

		// all zero still normalizes against 1, which yields the baseline ramp
		let maximum = counts.iter().copied().max().unwrap_or(0).max(1) as f64;

		let buckets: Vec<_> = counts
			.into_iter()
			.enumerate()
			.map(|(index, comment_count)| HeatmapBucket {
				index,
				comment_count,
				normalized_density: comment_count as f64 / maximum,
			})
			.collect();

		let stop = |bucket: &HeatmapBucket, color: HslColor| GradientStop {
			color,
			position_percent: bucket.index as f64 / bucket_count as f64 * 100.0,
		};
		let gray_ramp = buckets
			.iter()
			.map(|bucket| {
				stop(
					bucket,
					HslColor {
						hue: 0.0,
						saturation_percent: 0.0,
						lightness_percent: 90.0 - bucket.normalized_density * 60.0,
					},
				)
			})
			.collect();
		let color_ramp = buckets
			.iter()
			.map(|bucket| {
				stop(
					bucket,
					HslColor {
						hue: 250.0,
						saturation_percent: 80.0,
						lightness_percent: 85.0 - bucket.normalized_density * 60.0,
					},
				)
			})
			.collect();

		Heatmap {
			buckets,
			gray_ramp: GradientRamp(gray_ramp),
			color_ramp: GradientRamp(color_ramp),
		}
	}

	fn count_comments(timestamps: &[f64], duration_seconds: f64, bucket_count: usize) -> Vec<usize> {
		let mut counts = vec![0; bucket_count];
		if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
			return counts;
		}

		let bucket_width = duration_seconds / bucket_count as f64;
		for &timestamp in timestamps {
			if !timestamp.is_finite() || timestamp < 0.0 {
				continue;
			}

			let index = (timestamp / bucket_width).floor() as usize;
			// a comment at the very end rounds into a bucket that doesn't exist
			if let Some(count) = counts.get_mut(index) {
				*count += 1;
			}
		}
		counts
	}
}

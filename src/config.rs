use crate::error::{Error, Result};
use crate::recording::{RecordMode, RECORDING_XFADE_OVERLAP};


/// What the engine outputs before enough audio has been recorded to play grains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ColdStartPolicy {
	/// Pass the dry input through unchanged.
	Passthrough,
	Silence,
}


#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
	pub sample_rate: u32,
	/// Recording buffer length in seconds.
	pub buffer_seconds: f32,
	pub record_mode: RecordMode,
	pub cold_start: ColdStartPolicy,
	/// Crossfade length in samples at the start and end of a recording pass.
	pub xfade_len: usize,
	/// Minimum recorded audio before grains may spawn.
	pub min_playable_ms: f32,
	/// Seed for spawn jitter, pan and pitch randomization.
	pub seed: u64,
}

impl Default for EngineConfig {
	fn default() -> Self {
		EngineConfig {
			sample_rate: 48000,
			buffer_seconds: 5.0,
			record_mode: RecordMode::Refill,
			cold_start: ColdStartPolicy::Passthrough,
			xfade_len: RECORDING_XFADE_OVERLAP,
			min_playable_ms: 100.0,
			seed: 0,
		}
	}
}

impl EngineConfig {
	pub fn capacity(&self) -> usize {
		(self.buffer_seconds * self.sample_rate as f32).round() as usize
	}

	pub fn min_playable_samples(&self) -> usize {
		((self.min_playable_ms / 1000.0 * self.sample_rate as f32).round() as usize).max(1)
	}

	pub fn validate(&self) -> Result<()> {
		if self.sample_rate == 0 {
			return Err(Error::invalid_config("sample_rate", "must be non-zero"));
		}

		if !self.buffer_seconds.is_finite() || self.buffer_seconds <= 0.0 {
			return Err(Error::invalid_config("buffer_seconds", format!("must be positive, got {}", self.buffer_seconds)));
		}

		if !self.min_playable_ms.is_finite() || self.min_playable_ms < 0.0 {
			return Err(Error::invalid_config("min_playable_ms", format!("must not be negative, got {}", self.min_playable_ms)));
		}

		let capacity = self.capacity();

		// a pass needs room for a full fade in and a full fade out
		if capacity < 2 * self.xfade_len + 1 {
			return Err(Error::invalid_config("xfade_len", format!("{} samples does not fit twice into a {capacity} sample buffer", self.xfade_len)));
		}

		if self.min_playable_samples() > capacity {
			return Err(Error::invalid_config("min_playable_ms", "longer than the recording buffer"));
		}

		Ok(())
	}
}

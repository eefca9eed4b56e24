//! Maps normalized `[0, 1]` control values (knobs, sliders, control voltages) onto engine parameters.

use crate::params::{Parameters, SpawnRate};


pub const PITCH_RANGE_SEMITONES: f32 = 24.0;
pub const MIN_GRAIN_MS: f32 = 5.0;
pub const MAX_GRAIN_MS: f32 = 1000.0;
pub const MAX_DENSITY: f32 = 8.0;
pub const MAX_POSITION_COUNT: f32 = 8.0;
pub const MAX_PITCH_JITTER: f32 = 12.0;
pub const MAX_SCAN_SPEED: f32 = 2.0;

/// Below this the density control switches automatic spawning off.
const DENSITY_DEADZONE: f32 = 0.01;


/// Raw control positions, each in `[0, 1]`. Bipolar controls are centered at 0.5.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlValues {
	pub pitch: f32,
	/// Bipolar: left of center plays grains in reverse.
	pub grain_length: f32,
	pub density: f32,
	pub jitter: f32,
	pub position: f32,
	pub splay: f32,
	pub position_count: f32,
	pub dry_wet: f32,
	pub pan_spread: f32,
	pub position_spread: f32,
	pub pitch_jitter: f32,
	pub scan: f32,
}

impl Default for ControlValues {
	fn default() -> Self {
		ControlValues {
			pitch: 0.5,
			grain_length: 0.6,
			density: 0.25,
			jitter: 0.0,
			position: 0.0,
			splay: 0.0,
			position_count: 0.0,
			dry_wet: 0.5,
			pan_spread: 0.0,
			position_spread: 0.0,
			pitch_jitter: 0.0,
			scan: 0.5,
		}
	}
}

impl ControlValues {
	/// Positions and splay scale with the recorded length, so the full travel of a
	/// control always covers the material that exists.
	pub fn to_parameters(&self, sample_rate: u32, recorded_length: usize) -> Parameters {
		let bipolar = |value: f32| (value.clamp(0.0, 1.0) - 0.5) * 2.0;
		let unipolar = |value: f32| value.clamp(0.0, 1.0);
		let ms_to_samples = |ms: f32| ms / 1000.0 * sample_rate as f32;

		let length_control = bipolar(self.grain_length);
		let length_ms = MIN_GRAIN_MS + length_control.abs() * (MAX_GRAIN_MS - MIN_GRAIN_MS);
		let grain_length = ms_to_samples(length_ms).max(1.0).copysign(length_control);

		let density = unipolar(self.density);
		let spawn_rate = if density < DENSITY_DEADZONE {
			SpawnRate::Density(0.0)
		} else {
			SpawnRate::Density((density * MAX_DENSITY) as f64)
		};

		Parameters {
			pitch: bipolar(self.pitch) * PITCH_RANGE_SEMITONES,
			grain_length,
			spawn_rate,
			jitter: unipolar(self.jitter),
			position: unipolar(self.position) as f64 * recorded_length as f64,
			splay: unipolar(self.splay) as f64 * recorded_length as f64,
			// whole counts only; a count just above 2 divides splay by nearly zero
			position_count: (1.0 + unipolar(self.position_count) * (MAX_POSITION_COUNT - 1.0)).round(),
			dry_wet: unipolar(self.dry_wet),
			pan_spread: unipolar(self.pan_spread),
			position_spread: unipolar(self.position_spread) as f64,
			pitch_jitter: unipolar(self.pitch_jitter) * MAX_PITCH_JITTER,
			scan_speed: bipolar(self.scan) * MAX_SCAN_SPEED,
		}
	}
}

/// How often automatic spawns happen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnRate {
	/// Target samples between spawns.
	Interval(f64),
	/// Target number of concurrent grains. The interval is `grain length / density`.
	Density(f64),
}


/// Parameter snapshot, refreshed once per block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Parameters {
	/// Pitch shift in semitones.
	pub pitch: f32,
	/// Grain length in samples. The sign selects forward or reverse playback.
	pub grain_length: f32,
	pub spawn_rate: SpawnRate,
	/// Fraction of the interval randomized per spawn, in `[0, 1]`.
	pub jitter: f32,
	/// Primary spawn position in samples.
	pub position: f64,
	/// Spread between the primary position and the last rotating position, in samples.
	pub splay: f64,
	/// Number of rotating spawn positions. May be fractional; it is floored when cycling.
	pub position_count: f32,
	/// 0 is fully dry, 1 is fully wet.
	pub dry_wet: f32,
	pub pan_spread: f32,
	/// Random scatter of each grain's anchor, as a fraction of the recorded length.
	pub position_spread: f64,
	/// Random pitch deviation per grain in semitones.
	pub pitch_jitter: f32,
	/// Drift of the primary position, in samples per sample.
	pub scan_speed: f32,
}

impl Default for Parameters {
	fn default() -> Self {
		Parameters {
			pitch: 0.0,
			grain_length: 9600.0,
			spawn_rate: SpawnRate::Interval(16000.0),
			jitter: 0.0,
			position: 0.0,
			splay: 0.0,
			position_count: 1.0,
			dry_wet: 0.5,
			pan_spread: 0.0,
			position_spread: 0.0,
			pitch_jitter: 0.0,
			scan_speed: 0.0,
		}
	}
}

impl Parameters {
	pub fn grain_length_samples(&self) -> u32 {
		(self.grain_length.abs().round() as u32).max(1)
	}

	pub fn is_reversed(&self) -> bool {
		self.grain_length.is_sign_negative()
	}

	/// Samples between automatic spawns, or `None` if automatic spawning is off.
	pub fn spawn_interval(&self) -> Option<f64> {
		let interval = match self.spawn_rate {
			SpawnRate::Interval(samples) => samples,
			SpawnRate::Density(density) => self.grain_length_samples() as f64 / density,
		};

		(interval.is_finite() && interval > 0.0).then_some(interval)
	}
}



#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordEvent {
	Start,
	Stop,
}


/// Everything the engine consumes at a block boundary besides audio.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BlockControls {
	pub parameters: Parameters,
	pub record: Option<RecordEvent>,
	/// Level of the manual-spawn gate. Spawns fire on its rising edge.
	pub trigger_gate: bool,
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn density_derives_interval() {
		let params = Parameters {
			grain_length: 1000.0,
			spawn_rate: SpawnRate::Density(4.0),
			.. Parameters::default()
		};
		assert_eq!(params.spawn_interval(), Some(250.0));

		let reversed = Parameters { grain_length: -1000.0, .. params };
		assert_eq!(reversed.spawn_interval(), Some(250.0));
		assert!(reversed.is_reversed());
	}

	#[test]
	fn zero_rate_never_spawns() {
		let params = Parameters { spawn_rate: SpawnRate::Density(0.0), .. Parameters::default() };
		assert_eq!(params.spawn_interval(), None);

		let params = Parameters { spawn_rate: SpawnRate::Interval(0.0), .. Parameters::default() };
		assert_eq!(params.spawn_interval(), None);

		let params = Parameters { spawn_rate: SpawnRate::Interval(f64::INFINITY), .. Parameters::default() };
		assert_eq!(params.spawn_interval(), None);
	}

	#[test]
	fn grain_length_never_zero() {
		let params = Parameters { grain_length: 0.2, .. Parameters::default() };
		assert_eq!(params.grain_length_samples(), 1);

		let params = Parameters { grain_length: -480.4, .. Parameters::default() };
		assert_eq!(params.grain_length_samples(), 480);
	}
}

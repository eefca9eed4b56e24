use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::grain::Grain;
use crate::params::Parameters;
use crate::util::fwrap;


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnKind {
	Automatic,
	Manual,
}


/// Latch that turns a held gate into exactly one spawn per press.
#[derive(Clone, Copy, Debug)]
pub struct ManualTrigger {
	primed: bool,
}

impl ManualTrigger {
	pub fn new() -> ManualTrigger {
		ManualTrigger { primed: true }
	}

	pub fn is_primed(&self) -> bool {
		self.primed
	}

	/// Feeds the current gate level and returns whether a spawn fires.
	pub fn update(&mut self, gate: bool) -> bool {
		if !gate {
			self.primed = true;
			return false;
		}

		std::mem::replace(&mut self.primed, false)
	}
}

impl Default for ManualTrigger {
	fn default() -> Self {
		ManualTrigger::new()
	}
}



/// Decides when grains spawn and where they start.
pub struct SpawnScheduler {
	samples_since_last_spawn: f64,
	/// Drawn once per spawn from `[-1, 1]` and scaled by the jitter parameter.
	jitter_draw: f32,
	next_position_index: usize,

	manual: ManualTrigger,
	manual_pending: bool,

	rng: StdRng,
}

impl SpawnScheduler {
	pub fn new(seed: u64) -> SpawnScheduler {
		let mut rng = StdRng::seed_from_u64(seed);
		let jitter_draw = rng.gen_range(-1.0..=1.0);

		SpawnScheduler {
			samples_since_last_spawn: 0.0,
			jitter_draw,
			next_position_index: 0,

			manual: ManualTrigger::new(),
			manual_pending: false,

			rng,
		}
	}

	pub fn next_position_index(&self) -> usize {
		self.next_position_index
	}

	pub fn samples_since_last_spawn(&self) -> f64 {
		self.samples_since_last_spawn
	}

	/// Feeds the manual trigger gate. A rising edge while primed queues one spawn for the next tick.
	pub fn update_trigger(&mut self, gate: bool) {
		if self.manual.update(gate) {
			self.manual_pending = true;
		}
	}

	/// Drops a press that has not been taken by `tick` yet.
	pub fn cancel_pending(&mut self) {
		self.manual_pending = false;
	}

	/// Samples until the current automatic interval elapses, with this interval's jitter applied.
	pub fn actual_spawn_time(&self, params: &Parameters) -> Option<f64> {
		let interval = params.spawn_interval()?;
		let jitter = params.jitter.clamp(0.0, 1.0) as f64 * self.jitter_draw as f64;

		Some((interval * (1.0 + jitter)).max(1.0))
	}

	/// Advances one sample and reports whether a spawn is due.
	///
	/// A fire is consumed whether or not the caller finds a free slot for it: spawns are never
	/// queued or retried.
	pub fn tick(&mut self, params: &Parameters) -> Option<SpawnKind> {
		self.samples_since_last_spawn += 1.0;

		if std::mem::take(&mut self.manual_pending) {
			self.jitter_draw = self.rng.gen_range(-1.0..=1.0);
			return Some(SpawnKind::Manual);
		}

		let threshold = self.actual_spawn_time(params)?;
		if self.samples_since_last_spawn < threshold {
			return None;
		}

		// keep the sub-sample remainder so fractional intervals average out
		self.samples_since_last_spawn = (self.samples_since_last_spawn - threshold).fract();
		self.jitter_draw = self.rng.gen_range(-1.0..=1.0);

		Some(SpawnKind::Automatic)
	}

	/// Builds the next grain at the current rotating position and advances the rotation.
	pub fn spawn(&mut self, params: &Parameters, primary: f64, recorded_length: usize) -> Grain {
		let count = params.position_count.max(1.0);
		let cycle = count.floor() as usize;

		// the count may have shrunk since the last spawn
		let index = if self.next_position_index < cycle { self.next_position_index } else { 0 };
		self.next_position_index = (index + 1) % cycle;

		let scatter = self.rng.gen_range(-0.5..=0.5) * params.position_spread * recorded_length as f64;
		let position = spawn_position(index, count, primary + scatter, params.splay, recorded_length);

		let pan = 0.5 + self.rng.gen_range(-0.5..=0.5) * params.pan_spread;
		let semitones = params.pitch + self.rng.gen_range(-1.0..=1.0) * params.pitch_jitter;
		let direction = if params.is_reversed() { -1.0 } else { 1.0 };
		let playback_speed = direction * (semitones as f64 / 12.0).exp2();

		Grain {
			position_index: index,
			.. Grain::new(position, params.grain_length_samples(), playback_speed, pan.clamp(0.0, 1.0))
		}
	}
}



/// Position of rotating spawn point `index` out of `count`, anchored at `primary` and spread over `splay`.
///
/// `count` may be fractional. The result is wrapped into `[0, recorded_length)`.
pub fn spawn_position(index: usize, count: f32, primary: f64, splay: f64, recorded_length: usize) -> f64 {
	let count = count as f64;
	let i = index as f64;

	let position = if index == 0 {
		primary
	} else if i >= count - 1.0 {
		primary + splay
	} else {
		primary + i * (splay / (count - 2.0))
	};

	fwrap(position, recorded_length as f64)
}

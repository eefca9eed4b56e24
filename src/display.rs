use crate::grain::{Grain, MAX_GRAIN_COUNT};
use crate::recording::{RecordState, SUMMARY_BINS};


#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GrainView {
	pub alive: bool,
	pub spawn_position: f64,
	pub step: u32,
	pub length: u32,
	pub pan: f32,
	pub playback_speed: f64,
}

impl GrainView {
	pub fn from_grain(grain: &Grain) -> GrainView {
		GrainView {
			alive: true,
			spawn_position: grain.spawn_position,
			step: grain.step,
			length: grain.length,
			pan: grain.pan,
			playback_speed: grain.playback_speed,
		}
	}

	pub fn read_position(&self) -> f64 {
		self.spawn_position + self.step as f64 * self.playback_speed
	}

	/// Pitch shift in semitones, ignoring direction.
	pub fn semitones(&self) -> f64 {
		12.0 * self.playback_speed.abs().log2()
	}

	/// Lifetime progress in `[0, 1]`.
	pub fn progress(&self) -> f32 {
		self.step as f32 / self.length.max(1) as f32
	}
}


/// Read-only copy of the engine state for rendering. Stale by up to one block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplaySnapshot {
	pub write_head: usize,
	pub recorded_length: usize,
	pub capacity: usize,
	pub record_state: RecordState,
	pub primary_position: f64,
	pub grains: [GrainView; MAX_GRAIN_COUNT],
	pub occupancy: usize,
	pub dropped_spawns: u64,
	pub summary: [f32; SUMMARY_BINS],
}

impl Default for DisplaySnapshot {
	fn default() -> Self {
		DisplaySnapshot {
			write_head: 0,
			recorded_length: 0,
			capacity: 0,
			record_state: RecordState::Idle,
			primary_position: 0.0,
			grains: [GrainView::default(); MAX_GRAIN_COUNT],
			occupancy: 0,
			dropped_spawns: 0,
			summary: [0.0; SUMMARY_BINS],
		}
	}
}

impl DisplaySnapshot {
	pub fn live_grains(&self) -> impl Iterator<Item = &GrainView> + '_ {
		self.grains.iter().filter(|grain| grain.alive)
	}

	pub fn is_recording(&self) -> bool {
		self.record_state.is_recording()
	}
}

use arrayvec::ArrayVec;

use crate::recording::RecordingBuffer;
use crate::util::smoothstep;


pub const MAX_GRAIN_COUNT: usize = 32;


/// One in-flight playback event reading a windowed snippet of the recording.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Grain {
	/// Playback duration in samples.
	pub length: u32,
	/// Fractional sample offset into the recording where playback started.
	pub spawn_position: f64,
	/// Samples elapsed since spawn.
	pub step: u32,
	/// 0 is fully left, 1 is fully right.
	pub pan: f32,
	/// Resampling ratio. Negative plays in reverse.
	pub playback_speed: f64,
	/// Which rotating spawn position this grain came from.
	pub position_index: usize,
}

impl Grain {
	pub fn new(spawn_position: f64, length: u32, playback_speed: f64, pan: f32) -> Grain {
		Grain {
			length: length.max(1),
			spawn_position,
			step: 0,
			pan,
			playback_speed,
			position_index: 0,
		}
	}

	pub fn is_alive(&self) -> bool {
		self.step <= self.length
	}

	pub fn read_position(&self) -> f64 {
		self.spawn_position + self.step as f64 * self.playback_speed
	}

	/// Smoothstep-shaped triangle, 0 at both ends and 1 at the midpoint.
	pub fn envelope(&self) -> f32 {
		let length = self.length.max(1);
		let progress = length.saturating_sub(self.step).min(self.step) as f32 / length as f32;

		2.0 * smoothstep(progress)
	}

	/// Produces this grain's stereo contribution for the current step, then advances it.
	pub fn process(&mut self, source: &RecordingBuffer) -> [f32; 2] {
		let signal = source.read_interpolated(self.read_position()) * self.envelope();
		self.step += 1;

		[signal * (1.0 - self.pan), signal * self.pan]
	}
}



/// Fixed set of grain slots. Allocation and release are the only ways a slot changes hands.
pub struct GrainPool {
	slots: [Grain; MAX_GRAIN_COUNT],
	in_use: [bool; MAX_GRAIN_COUNT],
	free_list: ArrayVec<usize, MAX_GRAIN_COUNT>,
}

impl GrainPool {
	pub fn new() -> GrainPool {
		GrainPool {
			slots: [Grain::default(); MAX_GRAIN_COUNT],
			in_use: [false; MAX_GRAIN_COUNT],
			// reversed so that slot 0 is handed out first
			free_list: (0..MAX_GRAIN_COUNT).rev().collect(),
		}
	}

	pub fn allocate(&mut self, grain: Grain) -> Option<usize> {
		let slot = self.free_list.pop()?;
		self.slots[slot] = grain;
		self.in_use[slot] = true;
		Some(slot)
	}

	/// Returns `slot` to the free list. Releasing a free slot is a no-op.
	pub fn release(&mut self, slot: usize) {
		if slot < MAX_GRAIN_COUNT && self.in_use[slot] {
			self.in_use[slot] = false;
			self.free_list.push(slot);
		}
	}

	pub fn clear(&mut self) {
		for slot in 0..MAX_GRAIN_COUNT {
			self.release(slot);
		}
	}

	pub fn occupancy(&self) -> usize {
		MAX_GRAIN_COUNT - self.free_list.len()
	}

	pub fn free_count(&self) -> usize {
		self.free_list.len()
	}

	pub fn is_full(&self) -> bool {
		self.free_list.is_empty()
	}

	pub fn is_in_use(&self, slot: usize) -> bool {
		self.in_use.get(slot).copied().unwrap_or(false)
	}

	pub fn get(&self, slot: usize) -> Option<&Grain> {
		self.is_in_use(slot).then(|| &self.slots[slot])
	}

	pub fn iter(&self) -> impl Iterator<Item = (usize, &Grain)> + '_ {
		self.slots.iter()
			.enumerate()
			.filter(|(slot, _)| self.in_use[*slot])
	}

	/// Mixes every live grain for one output sample, releasing grains that finish.
	pub fn render(&mut self, source: &RecordingBuffer) -> [f32; 2] {
		let mut mix = [0.0; 2];

		for slot in 0..MAX_GRAIN_COUNT {
			if !self.in_use[slot] {
				continue;
			}

			let [left, right] = self.slots[slot].process(source);
			mix[0] += left;
			mix[1] += right;

			if !self.slots[slot].is_alive() {
				self.release(slot);
			}
		}

		mix
	}
}

impl Default for GrainPool {
	fn default() -> Self {
		GrainPool::new()
	}
}

use crate::config::{ColdStartPolicy, EngineConfig};
use crate::display::{DisplaySnapshot, GrainView};
use crate::error::Result;
use crate::grain::{GrainPool, MAX_GRAIN_COUNT};
use crate::params::{BlockControls, Parameters, RecordEvent};
use crate::recording::RecordingBuffer;
use crate::scheduler::{SpawnKind, SpawnScheduler};
use crate::util::fwrap;


/// Owns all engine state. The audio callback holds it exclusively; nothing on the
/// per-sample path allocates, locks or loops beyond `MAX_GRAIN_COUNT`.
pub struct AudioEngine {
	config: EngineConfig,

	recording: RecordingBuffer,
	pool: GrainPool,
	scheduler: SpawnScheduler,

	parameters: Parameters,
	scan_offset: f64,
	min_playable: usize,

	dropped_spawns: u64,
}

impl AudioEngine {
	pub fn new(config: EngineConfig) -> Result<AudioEngine> {
		config.validate()?;

		log::debug!("engine: {} sample buffer, {:?} mode, min playable {} samples",
			config.capacity(), config.record_mode, config.min_playable_samples());

		Ok(AudioEngine {
			recording: RecordingBuffer::new(config.capacity(), config.record_mode, config.xfade_len),
			pool: GrainPool::new(),
			scheduler: SpawnScheduler::new(config.seed),

			parameters: Parameters::default(),
			scan_offset: 0.0,
			min_playable: config.min_playable_samples(),

			dropped_spawns: 0,

			config,
		})
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	pub fn parameters(&self) -> &Parameters {
		&self.parameters
	}

	pub fn set_parameters(&mut self, parameters: Parameters) {
		self.parameters = parameters;
	}

	pub fn recording(&self) -> &RecordingBuffer {
		&self.recording
	}

	pub fn pool(&self) -> &GrainPool {
		&self.pool
	}

	pub fn dropped_spawns(&self) -> u64 {
		self.dropped_spawns
	}

	pub fn is_playable(&self) -> bool {
		self.recording.recorded_length() >= self.min_playable
	}

	/// Primary spawn position including scan drift.
	pub fn primary_position(&self) -> f64 {
		self.parameters.position + self.scan_offset
	}

	pub fn start_recording(&mut self) {
		// a fresh take invalidates every grain reading the old one
		if self.recording.start_rewinds() {
			self.pool.clear();
			self.scan_offset = 0.0;
		}

		self.recording.start_recording();
	}

	pub fn stop_recording(&mut self) {
		self.recording.stop_recording();
	}

	pub fn set_trigger_gate(&mut self, gate: bool) {
		self.scheduler.update_trigger(gate);
	}

	/// Forgets the recording and silences all grains.
	pub fn clear(&mut self) {
		self.recording.clear();
		self.pool.clear();
		self.scan_offset = 0.0;
	}

	/// Processes one block. `input` and `output` must have the same length.
	pub fn process_block(&mut self, controls: &BlockControls, input: &[[f32; 2]], output: &mut [[f32; 2]]) {
		debug_assert_eq!(input.len(), output.len());

		self.parameters = controls.parameters;

		match controls.record {
			Some(RecordEvent::Start) => self.start_recording(),
			Some(RecordEvent::Stop) => self.stop_recording(),
			None => {}
		}

		self.set_trigger_gate(controls.trigger_gate);

		for (frame_in, frame_out) in input.iter().zip(output.iter_mut()) {
			*frame_out = self.process_frame(*frame_in);
		}

		self.advance_scan(input.len());
	}

	/// Processes one frame. Only the left input channel is recorded.
	pub fn process_frame(&mut self, input: [f32; 2]) -> [f32; 2] {
		if self.recording.is_recording() {
			self.recording.write(input[0]);
		}
		self.recording.advance_write_head();

		if !self.is_playable() {
			// presses with nothing to play are dropped, not held until playable
			self.scheduler.cancel_pending();

			return match self.config.cold_start {
				ColdStartPolicy::Passthrough => input,
				ColdStartPolicy::Silence => [0.0; 2],
			};
		}

		if let Some(kind) = self.scheduler.tick(&self.parameters) {
			self.spawn(kind);
		}

		let wet = self.pool.render(&self.recording);
		let mix = self.parameters.dry_wet.clamp(0.0, 1.0);

		[
			input[0] * (1.0 - mix) + wet[0] * mix,
			input[1] * (1.0 - mix) + wet[1] * mix,
		]
	}

	pub fn snapshot(&self, snapshot: &mut DisplaySnapshot) {
		snapshot.write_head = self.recording.write_head();
		snapshot.recorded_length = self.recording.recorded_length();
		snapshot.capacity = self.recording.capacity();
		snapshot.record_state = self.recording.state();
		snapshot.primary_position = fwrap(self.primary_position(), self.recording.recorded_length() as f64);
		snapshot.occupancy = self.pool.occupancy();
		snapshot.dropped_spawns = self.dropped_spawns;
		snapshot.summary = *self.recording.summary();

		for slot in 0..MAX_GRAIN_COUNT {
			snapshot.grains[slot] = self.pool.get(slot)
				.map(GrainView::from_grain)
				.unwrap_or_default();
		}
	}

	fn spawn(&mut self, kind: SpawnKind) -> Option<usize> {
		if self.pool.is_full() {
			self.dropped_spawns += 1;
			return None;
		}

		let grain = self.scheduler.spawn(&self.parameters, self.primary_position(), self.recording.recorded_length());
		let slot = self.pool.allocate(grain);
		debug_assert!(slot.is_some(), "{kind:?} spawn found no slot in a non-full pool");
		slot
	}

	fn advance_scan(&mut self, frames: usize) {
		let recorded_length = self.recording.recorded_length() as f64;
		self.scan_offset = fwrap(self.scan_offset + self.parameters.scan_speed as f64 * frames as f64, recorded_length);
	}
}

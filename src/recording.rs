use crate::util::{lerp, wrap};


/// Samples blended at either end of a recording pass.
pub const RECORDING_XFADE_OVERLAP: usize = 100;

/// Number of peak bins kept for the waveform overview.
pub const SUMMARY_BINS: usize = 256;


/// What `start_recording` does with previously recorded material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum RecordMode {
	/// Rewind to the top of the buffer and record a fresh take. Recording stops when the buffer is full.
	Refill,
	/// Keep recording from wherever the write head sits, overwriting the oldest material.
	Rolling,
}


#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RecordState {
	#[default]
	Idle,
	FadingIn { remaining: usize },
	Recording,
	FadingOut { remaining: usize },
}

impl RecordState {
	pub fn is_recording(&self) -> bool {
		!matches!(self, RecordState::Idle)
	}
}



pub struct RecordingBuffer {
	samples: Box<[f32]>,
	write_head: usize,
	recorded_length: usize,

	state: RecordState,
	mode: RecordMode,
	xfade_len: usize,

	summary: [f32; SUMMARY_BINS],
	summary_bin: usize,
}

impl RecordingBuffer {
	pub fn new(capacity: usize, mode: RecordMode, xfade_len: usize) -> RecordingBuffer {
		debug_assert!(capacity > 0, "recording buffer needs a non-zero capacity");

		RecordingBuffer {
			samples: vec![0.0; capacity].into_boxed_slice(),
			write_head: 0,
			recorded_length: 0,

			state: RecordState::Idle,
			mode,
			xfade_len,

			summary: [0.0; SUMMARY_BINS],
			summary_bin: usize::MAX,
		}
	}

	pub fn capacity(&self) -> usize {
		self.samples.len()
	}

	pub fn write_head(&self) -> usize {
		self.write_head
	}

	pub fn recorded_length(&self) -> usize {
		self.recorded_length
	}

	pub fn state(&self) -> RecordState {
		self.state
	}

	pub fn mode(&self) -> RecordMode {
		self.mode
	}

	pub fn is_recording(&self) -> bool {
		self.state.is_recording()
	}

	/// Per-bin peak amplitude over the whole capacity.
	pub fn summary(&self) -> &[f32; SUMMARY_BINS] {
		&self.summary
	}

	/// Whether `start_recording` would begin a fresh take from the start of the buffer.
	pub fn start_rewinds(&self) -> bool {
		self.mode == RecordMode::Refill && !matches!(self.state, RecordState::FadingIn { .. } | RecordState::Recording)
	}

	/// In Refill mode a restart always rewinds and fades in from silence, even mid fade-out,
	/// since the head jumps away from the material it was blending into.
	pub fn start_recording(&mut self) {
		self.state = match (self.mode, self.state) {
			(_, RecordState::FadingIn { .. } | RecordState::Recording) => return,

			// Resume from the current blend level so the gain doesn't jump.
			(RecordMode::Rolling, RecordState::FadingOut { remaining }) => {
				self.fading_in(self.xfade_len - remaining)
			}

			(RecordMode::Rolling, RecordState::Idle) => {
				self.recorded_length = self.capacity();
				self.fading_in(self.xfade_len)
			}

			(RecordMode::Refill, _) => {
				self.write_head = 0;
				self.recorded_length = 0;
				self.fading_in(self.xfade_len)
			}
		};
	}

	pub fn stop_recording(&mut self) {
		self.state = match self.state {
			RecordState::Idle | RecordState::FadingOut { .. } => return,
			RecordState::Recording => self.fading_out(self.xfade_len),
			RecordState::FadingIn { remaining } => self.fading_out(self.xfade_len - remaining),
		};
	}

	/// Records one sample at the write head. Does nothing while idle.
	pub fn write(&mut self, sample: f32) {
		let existing = self.samples[self.write_head];
		let value = match self.state {
			RecordState::Idle => return,
			RecordState::Recording => sample,
			RecordState::FadingIn { remaining } => {
				lerp(existing, sample, 1.0 - remaining as f32 / self.xfade_len as f32)
			}
			RecordState::FadingOut { remaining } => {
				lerp(existing, sample, remaining as f32 / self.xfade_len as f32)
			}
		};

		self.samples[self.write_head] = value;
		self.update_summary(value);

		self.recorded_length = (self.recorded_length + 1).min(self.capacity());

		self.state = match self.state {
			RecordState::FadingIn { remaining } => self.fading_in(remaining - 1),
			RecordState::FadingOut { remaining } => self.fading_out(remaining - 1),
			state => state,
		};

		if self.mode == RecordMode::Refill {
			let left = self.capacity() - self.recorded_length;

			if left == 0 {
				self.state = RecordState::Idle;
			} else if left == self.xfade_len && self.state == RecordState::Recording {
				self.state = self.fading_out(self.xfade_len);
			}
		}
	}

	/// Called once per sample tick whether recording or not.
	pub fn advance_write_head(&mut self) {
		self.write_head = (self.write_head + 1) % self.capacity();
	}

	pub fn read(&self, index: i64) -> f32 {
		if self.recorded_length == 0 {
			return 0.0;
		}

		self.samples[wrap(index, self.recorded_length)]
	}

	/// First-order resampling between the two samples around `position`.
	pub fn read_interpolated(&self, position: f64) -> f32 {
		let base = position.floor();
		let fraction = (position - base) as f32;
		let index = base as i64;

		lerp(self.read(index), self.read(index + 1), fraction)
	}

	/// Silences the whole buffer. O(capacity), but never allocates.
	pub fn clear(&mut self) {
		self.samples.fill(0.0);
		self.write_head = 0;
		self.recorded_length = 0;
		self.state = RecordState::Idle;
		self.summary = [0.0; SUMMARY_BINS];
		self.summary_bin = usize::MAX;
	}

	fn fading_in(&self, remaining: usize) -> RecordState {
		if remaining == 0 {
			RecordState::Recording
		} else {
			RecordState::FadingIn { remaining }
		}
	}

	fn fading_out(&self, remaining: usize) -> RecordState {
		if remaining == 0 {
			RecordState::Idle
		} else {
			RecordState::FadingOut { remaining }
		}
	}

	fn update_summary(&mut self, value: f32) {
		let bin = self.write_head * SUMMARY_BINS / self.capacity();

		if bin != self.summary_bin {
			self.summary_bin = bin;
			self.summary[bin] = 0.0;
		}

		self.summary[bin] = self.summary[bin].max(value.abs());
	}
}



#[cfg(test)]
mod tests {
	use super::*;

	fn record(buffer: &mut RecordingBuffer, samples: impl IntoIterator<Item = f32>) {
		for sample in samples {
			buffer.write(sample);
			buffer.advance_write_head();
		}
	}

	#[test]
	fn empty_buffer_reads_silence() {
		let buffer = RecordingBuffer::new(1000, RecordMode::Refill, RECORDING_XFADE_OVERLAP);
		assert_eq!(buffer.read(0), 0.0);
		assert_eq!(buffer.read(-17), 0.0);
		assert_eq!(buffer.read_interpolated(3.5), 0.0);
	}

	#[test]
	fn write_head_free_runs_when_idle() {
		let mut buffer = RecordingBuffer::new(10, RecordMode::Rolling, 0);
		for _ in 0..23 {
			buffer.write(1.0);
			buffer.advance_write_head();
		}

		assert_eq!(buffer.write_head(), 3);
		assert_eq!(buffer.recorded_length(), 0);
		assert!(!buffer.is_recording());
	}

	#[test]
	fn wraparound_matches_floor_mod() {
		let mut buffer = RecordingBuffer::new(1000, RecordMode::Refill, 0);
		buffer.start_recording();
		record(&mut buffer, (0..37).map(|i| i as f32));
		buffer.stop_recording();

		let len = buffer.recorded_length() as i64;
		assert_eq!(len, 37);

		for i in -3 * len..3 * len {
			let canonical = ((i % len) + len) % len;
			assert_eq!(buffer.read(i), buffer.read(canonical), "index {i}");
			assert_eq!(buffer.read(i), canonical as f32);
		}
	}

	#[test]
	fn interpolated_read_blends_neighbours() {
		let mut buffer = RecordingBuffer::new(100, RecordMode::Refill, 0);
		buffer.start_recording();
		record(&mut buffer, (0..10).map(|i| i as f32));

		assert!((buffer.read_interpolated(2.25) - 2.25).abs() < 1e-6);
		// wraps from the last sample back to the first
		assert!((buffer.read_interpolated(9.5) - 4.5).abs() < 1e-6);
		assert!((buffer.read_interpolated(-0.5) - 4.5).abs() < 1e-6);
	}

	#[test]
	fn immediate_start_stop_has_no_click() {
		let amplitude = 0.5;
		let mut buffer = RecordingBuffer::new(1000, RecordMode::Refill, RECORDING_XFADE_OVERLAP);

		buffer.start_recording();
		record(&mut buffer, [amplitude]);
		buffer.stop_recording();

		while buffer.is_recording() {
			record(&mut buffer, [amplitude]);
		}

		let max_step = amplitude / RECORDING_XFADE_OVERLAP as f32 + 1e-6;
		let len = buffer.recorded_length() as i64;
		for i in 0..len {
			let delta = (buffer.read(i + 1) - buffer.read(i)).abs();
			assert!(delta <= max_step, "delta {delta} at {i}");
		}
	}

	#[test]
	fn full_pass_fades_both_ends() {
		let amplitude = 0.8;
		let mut buffer = RecordingBuffer::new(4000, RecordMode::Refill, RECORDING_XFADE_OVERLAP);

		buffer.start_recording();
		record(&mut buffer, std::iter::repeat(amplitude).take(1000));
		buffer.stop_recording();
		while buffer.is_recording() {
			record(&mut buffer, [amplitude]);
		}

		assert_eq!(buffer.recorded_length(), 1000 + RECORDING_XFADE_OVERLAP);
		assert_eq!(buffer.read(0), 0.0);
		assert_eq!(buffer.read(500), amplitude);

		// the loop seam is where playback wraps from the end back to the start
		let len = buffer.recorded_length() as i64;
		let seam = (buffer.read(len - 1) - buffer.read(len)).abs();
		assert!(seam <= amplitude / RECORDING_XFADE_OVERLAP as f32 + 1e-6);

		let max_step = amplitude / RECORDING_XFADE_OVERLAP as f32 + 1e-6;
		for i in 0..len {
			assert!((buffer.read(i + 1) - buffer.read(i)).abs() <= max_step);
		}
	}

	#[test]
	fn refill_stops_when_full() {
		let mut buffer = RecordingBuffer::new(1000, RecordMode::Refill, RECORDING_XFADE_OVERLAP);
		buffer.start_recording();
		record(&mut buffer, std::iter::repeat(1.0).take(2000));

		assert_eq!(buffer.state(), RecordState::Idle);
		assert_eq!(buffer.recorded_length(), 1000);

		// faded out on the way into the overrun
		assert!(buffer.read(999) < 0.02);
		assert_eq!(buffer.read(500), 1.0);
	}

	#[test]
	fn rolling_overwrites_oldest() {
		let mut buffer = RecordingBuffer::new(100, RecordMode::Rolling, 0);
		buffer.start_recording();
		assert_eq!(buffer.recorded_length(), 100);

		record(&mut buffer, (0..150).map(|i| i as f32));
		assert!(buffer.is_recording());
		assert_eq!(buffer.read(0), 100.0);
		assert_eq!(buffer.read(49), 149.0);
		assert_eq!(buffer.read(50), 50.0);
	}

	#[test]
	fn restart_during_fade_out_resumes_level() {
		let mut buffer = RecordingBuffer::new(1000, RecordMode::Rolling, 10);
		buffer.start_recording();
		record(&mut buffer, std::iter::repeat(1.0).take(20));
		assert_eq!(buffer.state(), RecordState::Recording);

		buffer.stop_recording();
		record(&mut buffer, std::iter::repeat(1.0).take(3));
		assert_eq!(buffer.state(), RecordState::FadingOut { remaining: 7 });

		buffer.start_recording();
		assert_eq!(buffer.state(), RecordState::FadingIn { remaining: 3 });
	}

	#[test]
	fn stop_then_start_has_no_seam() {
		let xfade_len = 10;
		let mut buffer = RecordingBuffer::new(1000, RecordMode::Rolling, xfade_len);
		buffer.start_recording();
		record(&mut buffer, std::iter::repeat(1.0).take(20));

		buffer.stop_recording();
		record(&mut buffer, std::iter::repeat(1.0).take(3));
		buffer.start_recording();
		record(&mut buffer, std::iter::repeat(1.0).take(20));

		let written: Vec<f32> = (0..43).map(|i| buffer.read(i)).collect();
		let max_step = 1.0 / xfade_len as f32 + 1e-5;

		for pair in written.windows(2) {
			assert!((pair[1] - pair[0]).abs() <= max_step, "{written:?}");
		}

		// the dip bottoms out where the fade-out turned around
		assert!((written[23] - 0.7).abs() < 1e-5);
		assert_eq!(written[42], 1.0);
	}

	#[test]
	fn refill_restart_mid_fade_out_rewinds() {
		let mut buffer = RecordingBuffer::new(1000, RecordMode::Refill, 10);
		buffer.start_recording();
		record(&mut buffer, std::iter::repeat(1.0).take(20));
		buffer.stop_recording();
		record(&mut buffer, std::iter::repeat(1.0).take(3));

		assert!(buffer.is_recording());
		assert!(buffer.start_rewinds());

		buffer.start_recording();
		assert_eq!(buffer.state(), RecordState::FadingIn { remaining: 10 });
		assert_eq!(buffer.recorded_length(), 0);
		assert_eq!(buffer.write_head(), 0);
		assert!(!buffer.start_rewinds());
	}

	#[test]
	fn repeated_events_are_ignored() {
		let mut buffer = RecordingBuffer::new(1000, RecordMode::Refill, 10);
		buffer.stop_recording();
		assert_eq!(buffer.state(), RecordState::Idle);

		buffer.start_recording();
		record(&mut buffer, std::iter::repeat(1.0).take(5));
		buffer.start_recording();
		assert_eq!(buffer.state(), RecordState::FadingIn { remaining: 5 });
		assert_eq!(buffer.recorded_length(), 5);
	}

	#[test]
	fn summary_tracks_peaks() {
		let mut buffer = RecordingBuffer::new(SUMMARY_BINS * 4, RecordMode::Refill, 0);
		buffer.start_recording();
		record(&mut buffer, [0.1, -0.7, 0.2, 0.3, 0.4]);

		assert_eq!(buffer.summary()[0], 0.7);
		assert_eq!(buffer.summary()[1], 0.4);

		buffer.clear();
		assert_eq!(buffer.summary()[0], 0.0);
		assert_eq!(buffer.recorded_length(), 0);
	}
}

//! The block processing path must never touch the heap once the engine is built.

use assert_no_alloc::{assert_no_alloc, AllocDisabler};

#[cfg(debug_assertions)]
#[global_allocator]
static A: AllocDisabler = AllocDisabler;

use grainwaves::{AudioEngine, BlockControls, DisplaySnapshot, EngineConfig, Parameters, RecordEvent, RecordMode, SpawnRate};


const BLOCK: usize = 64;


fn config(record_mode: RecordMode) -> EngineConfig {
	EngineConfig {
		buffer_seconds: 1.0,
		record_mode,
		min_playable_ms: 10.0,
		seed: 7,
		.. EngineConfig::default()
	}
}

fn input_block(offset: usize) -> [[f32; 2]; BLOCK] {
	let mut block = [[0.0; 2]; BLOCK];
	for (i, frame) in block.iter_mut().enumerate() {
		let value = ((offset + i) as f32 * 0.031).sin() * 0.8;
		*frame = [value, -value];
	}
	block
}

/// Drives `blocks` blocks through the engine, letting `update` change the controls before each one.
fn render(engine: &mut AudioEngine, blocks: usize, mut update: impl FnMut(usize, &mut BlockControls)) {
	let mut controls = BlockControls::default();
	let mut output = [[0.0; 2]; BLOCK];
	let mut snapshot = DisplaySnapshot::default();

	assert_no_alloc(|| {
		for n in 0..blocks {
			controls.record = None;
			update(n, &mut controls);

			engine.process_block(&controls, &input_block(n * BLOCK), &mut output);
			engine.snapshot(&mut snapshot);
		}
	});
}


#[test]
fn dense_cloud_is_alloc_free() {
	let mut engine = AudioEngine::new(config(RecordMode::Refill)).unwrap();

	render(&mut engine, 2000, |n, controls| {
		if n == 0 {
			controls.record = Some(RecordEvent::Start);
			controls.parameters = Parameters {
				grain_length: 4000.0,
				spawn_rate: SpawnRate::Density(48.0),
				jitter: 0.5,
				splay: 3000.0,
				position_count: 4.0,
				pan_spread: 1.0,
				position_spread: 0.3,
				pitch_jitter: 7.0,
				scan_speed: 0.25,
				dry_wet: 0.7,
				.. Parameters::default()
			};
		}

		// restart a pass while the pool is still full
		if n == 1200 {
			controls.record = Some(RecordEvent::Start);
		}
	});

	assert!(engine.dropped_spawns() > 0);
}

#[test]
fn manual_triggers_and_rolling_overwrite_are_alloc_free() {
	let mut engine = AudioEngine::new(config(RecordMode::Rolling)).unwrap();

	render(&mut engine, 2000, |n, controls| {
		if n == 0 {
			controls.record = Some(RecordEvent::Start);
			controls.parameters = Parameters {
				pitch: -12.0,
				grain_length: 1500.0,
				spawn_rate: SpawnRate::Interval(0.0),
				scan_speed: -1.5,
				dry_wet: 1.0,
				.. Parameters::default()
			};
		}

		controls.trigger_gate = n % 8 < 3;

		if n == 1500 {
			controls.record = Some(RecordEvent::Stop);
		}
	});

	assert_eq!(engine.recording().recorded_length(), engine.recording().capacity());
	assert!(engine.pool().occupancy() > 0);
}

#[test]
fn clear_mid_stream_is_alloc_free() {
	let mut engine = AudioEngine::new(config(RecordMode::Refill)).unwrap();

	render(&mut engine, 400, |n, controls| {
		if n == 0 {
			controls.record = Some(RecordEvent::Start);
			controls.parameters.spawn_rate = SpawnRate::Interval(300.0);
		}
	});

	assert_no_alloc(|| engine.clear());
	assert_eq!(engine.recording().recorded_length(), 0);
	assert_eq!(engine.pool().occupancy(), 0);
}

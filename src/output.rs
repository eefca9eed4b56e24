use cpal::traits::{DeviceTrait, StreamTrait};
use ringbuf::traits::{Consumer, Observer, Producer};
use ringbuf::{HeapCons, HeapProd};

use grainwaves::{AudioEngine, BlockControls, DisplaySnapshot, Parameters, RecordEvent};


/// Frames handed to the engine per `process_block` call.
pub const BLOCK_SIZE: usize = 64;

/// Input frames allowed to queue up before the oldest are skipped.
const MAX_INPUT_BACKLOG: usize = BLOCK_SIZE * 16;


/// Messages from the control side into the audio callback.
#[derive(Clone, Copy, Debug)]
pub enum EngineCommand {
	SetParameters(Parameters),
	Record(RecordEvent),
	TriggerGate(bool),
	Clear,
}



/// Runs the engine inside the output device callback.
pub struct OutputStream {
	_stream: cpal::Stream,
}


impl OutputStream {
	pub fn start(device: &cpal::Device, config: cpal::StreamConfig, engine: AudioEngine,
		input: HeapCons<f32>, commands: HeapCons<EngineCommand>, snapshots: HeapProd<DisplaySnapshot>)
		-> anyhow::Result<OutputStream>
	{
		let mut callback = Callback {
			engine,
			input,
			commands,
			snapshots,

			controls: BlockControls::default(),
			snapshot: DisplaySnapshot::default(),
			channels: config.channels as usize,
		};

		let stream = device.build_output_stream(
			&config,

			move |data: &mut [f32], callback_info: &cpal::OutputCallbackInfo| {
				callback.process(data, callback_info);
			},

			move |err| {
				log::error!("output stream error: {err}");
			}
		)?;

		stream.play()?;

		Ok(OutputStream {
			_stream: stream,
		})
	}
}



struct Callback {
	engine: AudioEngine,

	input: HeapCons<f32>,
	commands: HeapCons<EngineCommand>,
	snapshots: HeapProd<DisplaySnapshot>,

	controls: BlockControls,
	snapshot: DisplaySnapshot,
	channels: usize,
}

impl Callback {
	fn process(&mut self, data: &mut [f32], _: &cpal::OutputCallbackInfo) {
		self.drain_commands();

		let backlog = self.input.occupied_len().saturating_sub(MAX_INPUT_BACKLOG);
		self.input.skip(backlog);

		let mut input = [[0.0; 2]; BLOCK_SIZE];
		let mut output = [[0.0; 2]; BLOCK_SIZE];

		for chunk in data.chunks_mut(BLOCK_SIZE * self.channels) {
			let frames = chunk.len() / self.channels;

			for frame in &mut input[..frames] {
				let sample = self.input.try_pop().unwrap_or(0.0);
				*frame = [sample, sample];
			}

			self.engine.process_block(&self.controls, &input[..frames], &mut output[..frames]);
			self.controls.record = None;

			for (device_frame, frame) in chunk.chunks_mut(self.channels).zip(&output[..frames]) {
				for (channel, sample) in device_frame.iter_mut().enumerate() {
					*sample = frame.get(channel).copied().unwrap_or(0.0);
				}
			}
		}

		self.engine.snapshot(&mut self.snapshot);

		// the display side only wants the latest; drop when it falls behind
		let _ = self.snapshots.try_push(self.snapshot);
	}

	fn drain_commands(&mut self) {
		while let Some(command) = self.commands.try_pop() {
			match command {
				EngineCommand::SetParameters(parameters) => self.controls.parameters = parameters,
				EngineCommand::Record(event) => self.controls.record = Some(event),

				// fed straight through so a press and release inside one callback still spawns
				EngineCommand::TriggerGate(gate) => {
					self.engine.set_trigger_gate(gate);
					self.controls.trigger_gate = gate;
				}

				EngineCommand::Clear => self.engine.clear(),
			}
		}
	}
}

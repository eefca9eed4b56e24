use tokio::sync::mpsc;
use tokio::sync::{Mutex, MutexGuard};
use tokio::task;
use tokio::runtime::Handle;
use std::sync::Arc;

use cpal::traits::{HostTrait, DeviceTrait};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::HeapRb;

use grainwaves::{AudioEngine, DisplaySnapshot, EngineConfig, Error, Parameters, RecordEvent};

use crate::{input, output};
use crate::output::EngineCommand;


const COMMAND_QUEUE: usize = 64;
const SNAPSHOT_QUEUE: usize = 4;



pub struct Coordinator {
	cmd_tx: mpsc::Sender<EngineCommand>,

	display_state: Arc<Mutex<DisplayState>>,
}

#[derive(Default)]
pub struct DisplayState {
	pub snapshot: DisplaySnapshot,
	pub sample_rate: u32,
}



impl Coordinator {
	pub fn start(config: EngineConfig) -> anyhow::Result<Coordinator> {
		let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_QUEUE);
		let display_state = Arc::new(Mutex::new(DisplayState::default()));
		let async_handle = Handle::current();

		std::thread::spawn({
			let display_state = display_state.clone();

			move || {
				if let Err(err) = start_inner(cmd_rx, display_state, config, async_handle) {
					log::error!("audio coordinator stopped: {err:#}");
				}
			}
		});

		Ok(Coordinator {
			cmd_tx,
			display_state,
		})
	}

	pub fn start_record(&self) {
		log::info!("recording started");
		self.send(EngineCommand::Record(RecordEvent::Start));
	}

	pub fn stop_record(&self) {
		log::info!("recording stopped");
		self.send(EngineCommand::Record(RecordEvent::Stop));
	}

	pub fn clear_buffer(&self) {
		log::info!("recording cleared");
		self.send(EngineCommand::Clear);
	}

	pub fn set_parameters(&self, parameters: Parameters) {
		self.send(EngineCommand::SetParameters(parameters));
	}

	pub fn set_trigger_gate(&self, gate: bool) {
		self.send(EngineCommand::TriggerGate(gate));
	}

	pub fn display_state(&self) -> MutexGuard<'_, DisplayState> {
		task::block_in_place(|| self.display_state.blocking_lock())
	}

	fn send(&self, command: EngineCommand) {
		if let Err(err) = self.cmd_tx.try_send(command) {
			log::warn!("dropping {command:?}: {err}");
		}
	}
}



fn start_inner(mut cmd_rx: mpsc::Receiver<EngineCommand>, display_state: Arc<Mutex<DisplayState>>,
	mut config: EngineConfig, async_handle: tokio::runtime::Handle) -> anyhow::Result<()>
{
	let host = cpal::default_host();
	let output_device = host.default_output_device().ok_or_else(|| Error::Device("no default output device".into()))?;
	let input_device = host.default_input_device().ok_or_else(|| Error::Device("no default input device".into()))?;


	log::info!("input config: {:?}", input_device.default_input_config());
	log::info!("output config: {:?}", output_device.default_output_config());

	let input_config = cpal::StreamConfig {
		channels: 1,
		.. input_device.default_input_config()?.config()
	};

	let output_config = cpal::StreamConfig {
		channels: 2,
		.. output_device.default_output_config()?.config()
	};


	let resample_ratio = output_config.sample_rate.0 as f64 / input_config.sample_rate.0 as f64;

	config.sample_rate = output_config.sample_rate.0;
	let engine = AudioEngine::new(config)?;

	// about half a second of input slack
	let (input_prod, input_cons) = HeapRb::<f32>::new(output_config.sample_rate.0 as usize / 2).split();
	let (mut command_prod, command_cons) = HeapRb::<EngineCommand>::new(COMMAND_QUEUE).split();
	let (snapshot_prod, mut snapshot_cons) = HeapRb::<DisplaySnapshot>::new(SNAPSHOT_QUEUE).split();

	let _input_stream = input::InputStream::start(&input_device, input_config, input_prod, resample_ratio)?;
	let _output_stream = output::OutputStream::start(&output_device, output_config.clone(), engine, input_cons, command_cons, snapshot_prod)?;

	display_state.blocking_lock().sample_rate = output_config.sample_rate.0;

	// Required because cpal::Stream is not Send and this infects InputStream and OutputStream.
	async_handle.block_on(async move {
		use tokio::time::MissedTickBehavior;

		let mut interval = tokio::time::interval(std::time::Duration::from_millis(16));
		interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

		loop {
			tokio::select!{
				value = cmd_rx.recv() => match value {
					Some(cmd) => {
						log::debug!("{cmd:?}");

						if command_prod.try_push(cmd).is_err() {
							log::warn!("engine command queue full, dropping {cmd:?}");
						}
					}

					None => break,
				},

				_ = interval.tick() => {
					let mut latest = None;
					while let Some(snapshot) = snapshot_cons.try_pop() {
						latest = Some(snapshot);
					}

					if let Some(snapshot) = latest {
						display_state.lock().await.snapshot = snapshot;
					}
				}
			}
		}

		Ok(())
	})
}

use eframe::egui;
use anyhow::Result;
use clap::Parser;

use grainwaves::{ColdStartPolicy, ControlValues, EngineConfig, Parameters, RecordMode, MAX_GRAIN_COUNT, RECORDING_XFADE_OVERLAP};


mod input;
mod output;
mod coordinator;
mod view;

use coordinator::Coordinator;


/// Live granular resynthesis of the default input device.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
	/// Length of the recording buffer in seconds.
	#[arg(long, default_value_t = 5.0)]
	buffer_seconds: f32,

	/// Whether each recording pass replaces the buffer or keeps rolling over it.
	#[arg(long, value_enum, default_value_t = RecordMode::Refill)]
	record_mode: RecordMode,

	/// Output before enough audio has been recorded to play grains.
	#[arg(long, value_enum, default_value_t = ColdStartPolicy::Passthrough)]
	cold_start: ColdStartPolicy,

	/// Crossfade length in samples at the ends of a recording pass.
	#[arg(long, default_value_t = RECORDING_XFADE_OVERLAP)]
	xfade: usize,

	/// Minimum recorded audio before grains spawn.
	#[arg(long, default_value_t = 100.0)]
	min_playable_ms: f32,

	/// Seed for grain randomization. Random when omitted.
	#[arg(long)]
	seed: Option<u64>,

	#[arg(long, default_value_t = log::LevelFilter::Info)]
	log_level: log::LevelFilter,
}

impl Args {
	fn engine_config(&self) -> EngineConfig {
		EngineConfig {
			buffer_seconds: self.buffer_seconds,
			record_mode: self.record_mode,
			cold_start: self.cold_start,
			xfade_len: self.xfade,
			min_playable_ms: self.min_playable_ms,
			seed: self.seed.unwrap_or_else(rand::random),
			.. EngineConfig::default()
		}
	}
}


#[tokio::main]
async fn main() -> Result<()> {
	std::env::set_var("RUST_BACKTRACE", "1");

	let args = Args::parse();

	simple_logger::SimpleLogger::new()
		.with_level(args.log_level)
		.init()?;

	let config = args.engine_config();
	config.validate()?;

	log::info!("starting with {config:?}");

	let coordinator = Coordinator::start(config)?;

	eframe::run_native("Grainwaves", <_>::default(), Box::new(move |_cc| {
		Box::new(AppRoot {
			coordinator,
			controls: ControlValues::default(),
			trigger_held: false,
			sent_parameters: None,
		})
	}));

	Ok(())
}



struct AppRoot {
	coordinator: Coordinator,
	controls: ControlValues,
	trigger_held: bool,
	sent_parameters: Option<Parameters>,
}

impl eframe::App for AppRoot {
	fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
		let (snapshot, sample_rate) = {
			let display_state = self.coordinator.display_state();
			(display_state.snapshot, display_state.sample_rate)
		};

		egui::CentralPanel::default().show(ctx, |ui| {
			ui.horizontal(|ui| {
				if snapshot.is_recording() {
					if ui.button("Stop").clicked() {
						self.coordinator.stop_record();
					}
				} else {
					if ui.button("Record").clicked() {
						self.coordinator.start_record();
					}
				}

				if ui.button("Clear").clicked() {
					self.coordinator.clear_buffer();
				}

				// gate follows the button while held
				let trigger_held = ui.button("Trigger").is_pointer_button_down_on();
				if trigger_held != self.trigger_held {
					self.trigger_held = trigger_held;
					self.coordinator.set_trigger_gate(trigger_held);
				}

				let seconds = snapshot.recorded_length as f32 / sample_rate.max(1) as f32;
				ui.label(format!("{seconds:.2}s recorded"));
				ui.label(format!("{}/{MAX_GRAIN_COUNT} grains", snapshot.occupancy));

				if snapshot.dropped_spawns > 0 {
					ui.label(format!("{} dropped", snapshot.dropped_spawns));
				}
			});

			ui.horizontal_wrapped(|ui| {
				let controls = &mut self.controls;

				knob(ui, &mut controls.pitch, "pitch");
				knob(ui, &mut controls.pitch_jitter, "pitch jitter");
				knob(ui, &mut controls.grain_length, "length");
				knob(ui, &mut controls.density, "density");
				knob(ui, &mut controls.jitter, "jitter");
				knob(ui, &mut controls.position, "position");
				knob(ui, &mut controls.splay, "splay");
				knob(ui, &mut controls.position_count, "positions");
				knob(ui, &mut controls.position_spread, "spread");
				knob(ui, &mut controls.pan_spread, "pan spread");
				knob(ui, &mut controls.scan, "scan");
				knob(ui, &mut controls.dry_wet, "dry/wet");
			});

			ui.add(view::Waveform {
				snapshot: &snapshot,
				position: &mut self.controls.position,
			});
		});

		ctx.request_repaint();

		let parameters = self.controls.to_parameters(sample_rate, snapshot.recorded_length);
		if self.sent_parameters != Some(parameters) {
			self.coordinator.set_parameters(parameters);
			self.sent_parameters = Some(parameters);
		}
	}
}


fn knob(ui: &mut egui::Ui, value: &mut f32, label: &str) {
	ui.add(egui::Slider::new(value, 0.0..=1.0).text(label));
}

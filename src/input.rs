use cpal::traits::{DeviceTrait, StreamTrait};
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;


const RESAMPLE_CHUNK: usize = 256;


/// Captures the mono input device into a lock-free ring buffer read by the output callback.
pub struct InputStream {
	_stream: cpal::Stream,

	running: Arc<AtomicBool>,
}



impl InputStream {
	/// `resample_ratio` is output rate over input rate. Anything but 1 routes the input through a resampler thread.
	pub fn start(device: &cpal::Device, config: cpal::StreamConfig, samples: HeapProd<f32>, resample_ratio: f64) -> anyhow::Result<InputStream> {
		let running = Arc::new(AtomicBool::new(true));

		let mut sink = if resample_ratio == 1.0 {
			samples
		} else {
			let (raw_prod, raw_cons) = HeapRb::<f32>::new(RESAMPLE_CHUNK * 64).split();
			start_resampler(raw_cons, samples, resample_ratio, running.clone());
			raw_prod
		};

		let stream = device.build_input_stream(
			&config,
			move |data: &[f32], _: &cpal::InputCallbackInfo| {
				// on overflow the newest input is dropped
				sink.push_slice(data);
			},

			move |err| {
				log::error!("input stream error: {err}");
			}
		)?;

		stream.play()?;

		Ok(InputStream {
			_stream: stream,
			running,
		})
	}
}

impl Drop for InputStream {
	fn drop(&mut self) {
		self.running.store(false, Ordering::Relaxed);
	}
}



fn start_resampler(mut raw: HeapCons<f32>, mut out: HeapProd<f32>, ratio: f64, running: Arc<AtomicBool>) {
	use rubato::{Resampler, SincFixedIn, InterpolationType, InterpolationParameters, WindowFunction};

	log::info!("resampling input by {ratio:.4}");

	std::thread::spawn(move || {
		let params = InterpolationParameters {
			sinc_len: 256,
			f_cutoff: 0.95,
			interpolation: InterpolationType::Linear,
			oversampling_factor: 256,
			window: WindowFunction::BlackmanHarris2,
		};

		let mut resampler = match SincFixedIn::<f32>::new(ratio, 2.0, params, RESAMPLE_CHUNK, 1) {
			Ok(resampler) => resampler,
			Err(err) => {
				log::error!("failed to create input resampler: {err}");
				return;
			}
		};

		let mut waves_in = vec![vec![0.0; RESAMPLE_CHUNK]];

		while running.load(Ordering::Relaxed) {
			if raw.occupied_len() < RESAMPLE_CHUNK {
				std::thread::sleep(Duration::from_millis(1));
				continue;
			}

			raw.pop_slice(&mut waves_in[0]);

			match resampler.process(&waves_in, None) {
				Ok(waves_out) => {
					out.push_slice(&waves_out[0]);
				}

				Err(err) => {
					log::error!("input resampling failed: {err}");
					break;
				}
			}
		}

		log::debug!("input resampler stopped");
	});
}

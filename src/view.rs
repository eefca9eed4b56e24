use grainwaves::{DisplaySnapshot, GrainView};



/// Recording overview with the write head, the primary spawn position and every live grain.
/// Clicking or dragging moves the primary position.
pub struct Waveform<'a> {
	pub snapshot: &'a DisplaySnapshot,

	/// Normalized primary position control.
	pub position: &'a mut f32,
}


impl egui::Widget for Waveform<'_> {
	fn ui(mut self, ui: &mut egui::Ui) -> egui::Response {
		let (mut response, mut painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
		let rect = response.rect.shrink(5.0);

		response.rect = rect;
		painter.set_clip_rect(response.rect);

		let mapping = SampleDisplayMapping::new(rect.x_range(), self.snapshot.capacity);

		let bg_color = ui.visuals().panel_fill;
		let outline_stroke = ui.visuals().window_stroke;
		let wave_color = egui::Color32::YELLOW;
		let cursor_stroke = egui::Stroke::new(1.0, egui::Color32::LIGHT_BLUE);
		let position_stroke = egui::Stroke::new(1.5, egui::Color32::LIGHT_GREEN);
		let write_head_stroke = if self.snapshot.is_recording() {
			egui::Stroke::new(2.0, egui::Color32::RED)
		} else {
			egui::Stroke::new(1.0, egui::Color32::GRAY)
		};
		let recorded_color = egui::Color32::LIGHT_BLUE.linear_multiply(0.08);

		// Background
		painter.rect(rect, 0.0, bg_color, outline_stroke);

		// Handle interactions
		self.handle_input(&mut response, &mapping);

		if self.snapshot.capacity == 0 {
			return response;
		}

		let display_height = rect.height();
		let center_y = rect.min.y + display_height / 2.0;

		// Recorded region
		{
			let end_x = mapping.sample_to_display(self.snapshot.recorded_length as f64);
			let recorded_rect = egui::Rect::from_x_y_ranges(rect.min.x..=end_x, rect.y_range());
			painter.rect(recorded_rect, 0.0, recorded_color, egui::Stroke::NONE);
		}

		// Summary bars
		let bins = self.snapshot.summary.len();
		let bin_width = rect.width() / bins as f32;

		for (bin, &peak) in self.snapshot.summary.iter().enumerate() {
			let x = rect.min.x + bin as f32 * bin_width;
			let half_height = display_height * peak.min(1.0) / 2.0;
			let bar = egui::Rect::from_x_y_ranges(x..=x + bin_width.max(1.0), center_y - half_height..=center_y + half_height);

			painter.rect(bar, 0.0, wave_color, egui::Stroke::NONE);
		}

		// Mouse cursor
		if let Some(pos) = response.hover_pos() {
			painter.vline(pos.x, rect.y_range(), cursor_stroke);
		}

		// Primary spawn position
		if self.snapshot.recorded_length > 0 {
			let position_x = mapping.sample_to_display(self.snapshot.primary_position);
			painter.vline(position_x, rect.y_range(), position_stroke);
		}

		// Grains: x follows the read head, y follows the pan
		for grain in self.snapshot.live_grains() {
			let center = egui::pos2(
				mapping.sample_to_display(wrapped_read_position(grain, self.snapshot.recorded_length)),
				rect.min.y + grain.pan * display_height,
			);

			let level = 1.0 - (2.0 * grain.progress() - 1.0).abs();
			let color = if grain.playback_speed < 0.0 {
				egui::Color32::from_rgb(255, 140, 60)
			} else {
				egui::Color32::from_rgb(120, 220, 255)
			};

			painter.circle_filled(center, 2.0 + 4.0 * level, color.linear_multiply(0.3 + 0.7 * level));
		}

		// Write head
		let write_head_x = mapping.sample_to_display(self.snapshot.write_head as f64);
		painter.vline(write_head_x, rect.y_range(), write_head_stroke);

		response
	}
}

impl Waveform<'_> {
	fn handle_input(&mut self, response: &mut egui::Response, mapping: &SampleDisplayMapping) {
		let recorded_length = self.snapshot.recorded_length;
		if recorded_length == 0 || !(response.clicked() || response.dragged()) {
			return;
		}

		if let Some(pos) = response.interact_pointer_pos() {
			let sample_index = mapping.display_to_sample(pos.x);

			*self.position = (sample_index as f32 / recorded_length as f32).clamp(0.0, 1.0);
			response.mark_changed();
		}
	}
}


fn wrapped_read_position(grain: &GrainView, recorded_length: usize) -> f64 {
	if recorded_length == 0 {
		return 0.0;
	}

	grain.read_position().rem_euclid(recorded_length as f64)
}


use std::ops::RangeInclusive;


struct SampleDisplayMapping {
	display_start: f32,
	display_to_sample_ratio: f32,
	num_samples: usize,
}

impl SampleDisplayMapping {
	pub fn new(display_range: RangeInclusive<f32>, num_samples: usize) -> Self {
		let (display_start, display_end) = display_range.into_inner();
		let display_width = (display_end - display_start).max(1.0);
		let display_to_sample_ratio = num_samples.max(1) as f32 / display_width;

		SampleDisplayMapping {
			display_start,
			display_to_sample_ratio,
			num_samples,
		}
	}

	pub fn sample_to_display(&self, sample: f64) -> f32 {
		self.sample_to_display_magnitude(sample) + self.display_start
	}

	pub fn sample_to_display_magnitude(&self, sample: f64) -> f32 {
		sample as f32 / self.display_to_sample_ratio
	}

	pub fn display_to_sample(&self, display: f32) -> usize {
		(((display - self.display_start) * self.display_to_sample_ratio).max(0.0) as usize)
			.min(self.num_samples)
	}
}

//! Real-time granular synthesis over a live recording buffer.
//!
//! [`AudioEngine`] records a mono input into a [`RecordingBuffer`] and resynthesizes it as a cloud of
//! short, independently pitched and panned [`Grain`]s. It is driven one block at a time from an audio
//! callback and never allocates, locks or blocks while doing so.

pub mod config;
pub mod controls;
pub mod display;
pub mod engine;
pub mod error;
pub mod grain;
pub mod params;
pub mod recording;
pub mod scheduler;

mod util;

pub use config::{ColdStartPolicy, EngineConfig};
pub use controls::ControlValues;
pub use display::{DisplaySnapshot, GrainView};
pub use engine::AudioEngine;
pub use error::Error;
pub use grain::{Grain, GrainPool, MAX_GRAIN_COUNT};
pub use params::{BlockControls, Parameters, RecordEvent, SpawnRate};
pub use recording::{RecordMode, RecordState, RecordingBuffer, RECORDING_XFADE_OVERLAP};
pub use scheduler::{ManualTrigger, SpawnKind, SpawnScheduler};

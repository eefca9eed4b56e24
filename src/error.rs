use thiserror::Error;


pub type Result<T> = std::result::Result<T, Error>;


#[derive(Debug, Error)]
pub enum Error {
	#[error("invalid config '{name}': {message}")]
	InvalidConfig {
		name: &'static str,
		message: String,
	},

	#[error("audio device error: {0}")]
	Device(String),
}

impl Error {
	pub fn invalid_config(name: &'static str, message: impl Into<String>) -> Error {
		Error::InvalidConfig { name, message: message.into() }
	}
}

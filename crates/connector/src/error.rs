use std::path::PathBuf;

/// Integration errors raised by the connector.
///
/// These indicate a broken registration or configuration. Failures inside
/// listener callbacks never surface here; they are logged and suppressed.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
	#[error("listener registered without categories (origin {origin})")]
	EmptyCategories { origin: String },

	#[error("event-filter listener registered without event kinds (origin {origin})")]
	EmptyEventMask { origin: String },

	#[error("timer registered with a zero interval (origin {origin})")]
	ZeroInterval { origin: String },

	#[error("failed to read connector options from {}: {source}", path.display())]
	OptionsIo {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid connector options: {0}")]
	OptionsParse(#[from] toml::de::Error),
}

pub type Result<T, E = ConnectorError> = std::result::Result<T, E>;

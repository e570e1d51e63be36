//! Connector options loaded from TOML.
//!
//! Options act as plugin on/off switches: a listener whose name or origin is
//! listed starts disabled. Disabled listeners stay wired to their objects, so
//! flipping them back on later only affects future dispatches.

use std::path::Path;

use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::error::{ConnectorError, Result};
use crate::listener::Origin;

/// Registration-time switches for a [`Connector`](crate::Connector).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectorOptions {
	/// Listener names that start disabled.
	pub disabled: Vec<String>,
	/// Origins (source files) whose listeners start disabled.
	pub disabled_origins: Vec<String>,
}

impl ConnectorOptions {
	/// Parses options from a TOML document.
	pub fn from_toml_str(content: &str) -> Result<Self> {
		Ok(toml::from_str(content)?)
	}

	/// Reads and parses an options file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path).map_err(|source| ConnectorError::OptionsIo {
			path: path.to_path_buf(),
			source,
		})?;
		let options = Self::from_toml_str(&content)?;
		tracing::debug!(
			path = %path.display(),
			disabled = options.disabled.len(),
			disabled_origins = options.disabled_origins.len(),
			"connector.options.loaded"
		);
		Ok(options)
	}

	/// Merges another options layer, keeping entries from both.
	pub fn merge(&mut self, other: ConnectorOptions) {
		let mut seen: FxHashSet<String> = self.disabled.iter().cloned().collect();
		self.disabled.extend(other.disabled.into_iter().filter(|name| seen.insert(name.clone())));

		let mut seen: FxHashSet<String> = self.disabled_origins.iter().cloned().collect();
		self.disabled_origins
			.extend(other.disabled_origins.into_iter().filter(|origin| seen.insert(origin.clone())));
	}

	/// Returns true if a listener with this name and origin should start disabled.
	pub fn starts_disabled(&self, name: Option<&str>, origin: &Origin) -> bool {
		if let Some(name) = name
			&& self.disabled.iter().any(|d| d == name)
		{
			return true;
		}
		self.disabled_origins.iter().any(|o| origin.matches(o))
	}
}

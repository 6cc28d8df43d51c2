//! Configuration file support for benchgen
//!
//! Supports `.benchgen.yaml` files that can be placed anywhere in the directory
//! hierarchy. benchgen searches from the working directory upward to the filesystem root.

use std::{
	fs,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// The name of the config file benchgen looks for
pub const CONFIG_FILE_NAME: &str = ".benchgen.yaml";

/// Root configuration structure for .benchgen.yaml
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BenchgenConfig {
	/// Directory the application folders are written to. Relative paths are
	/// resolved against the working directory.
	#[serde(default)]
	pub output_dir: Option<PathBuf>,

	/// Nodes the benchmark workloads are pinned to
	#[serde(default)]
	pub workers: Cluster,
}

/// The four worker nodes of the benchmark cluster.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Cluster {
	pub worker1: String,
	pub worker2: String,
	pub worker3: String,
	pub worker4: String,
}

impl Default for Cluster {
	fn default() -> Self {
		Self {
			worker1: "autothrottle-2".to_string(),
			worker2: "autothrottle-3".to_string(),
			worker3: "autothrottle-4".to_string(),
			worker4: "autothrottle-5".to_string(),
		}
	}
}

/// Index of a worker, for placement tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Worker {
	W1,
	W2,
	W3,
	W4,
}

impl Cluster {
	pub fn node(&self, worker: Worker) -> &str {
		match worker {
			Worker::W1 => &self.worker1,
			Worker::W2 => &self.worker2,
			Worker::W3 => &self.worker3,
			Worker::W4 => &self.worker4,
		}
	}
}

impl BenchgenConfig {
	/// Load the explicitly given config file, or search from `start_dir` upward.
	/// Without any config file the defaults are used.
	pub fn resolve(explicit: Option<&Path>, start_dir: &Path) -> Result<Self> {
		if let Some(path) = explicit {
			return Self::load_from_file(path);
		}
		Ok(Self::load_from_directory(start_dir)?.unwrap_or_default())
	}

	/// Load config by searching from the given directory upward
	pub fn load_from_directory(start_dir: &Path) -> Result<Option<Self>> {
		if let Some(config_path) = find_config_file(start_dir) {
			let config = Self::load_from_file(&config_path)?;
			Ok(Some(config))
		} else {
			debug!("no {CONFIG_FILE_NAME} found, using defaults");
			Ok(None)
		}
	}

	/// Load config from a specific file path
	pub fn load_from_file(path: &Path) -> Result<Self> {
		debug!(path = %path.display(), "loading config");
		let content = fs::read_to_string(path)
			.with_context(|| format!("failed to read config file: {}", path.display()))?;
		let config: BenchgenConfig = serde_yaml_with_quirks::from_str(&content)
			.with_context(|| format!("failed to parse config file: {}", path.display()))?;
		Ok(config)
	}

	/// Output directory, with the CLI flag taking priority over the file.
	pub fn output_dir(&self, cli_override: Option<&Path>) -> PathBuf {
		cli_override
			.map(Path::to_path_buf)
			.or_else(|| self.output_dir.clone())
			.unwrap_or_else(|| PathBuf::from("."))
	}
}

/// Search for a config file starting from `start_dir` and walking up to the filesystem root
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
	let mut current = start_dir.to_path_buf();

	// Canonicalize if possible to handle relative paths
	if let Ok(canonical) = current.canonicalize() {
		current = canonical;
	}

	loop {
		let config_path = current.join(CONFIG_FILE_NAME);
		if config_path.is_file() {
			return Some(config_path);
		}

		if !current.pop() {
			return None;
		}
	}
}

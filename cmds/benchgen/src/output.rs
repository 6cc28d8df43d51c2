//! Rendering documents to bytes and keeping the files on disk in sync.
//!
//! Every selected document is serialized before the first file is touched,
//! so a failing application never leaves a half-updated tree behind.

use std::{
	fs,
	io::{ErrorKind, Write},
	path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use similar::TextDiff;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::{apps::App, config::Cluster};

/// A serialized document and where it belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
	/// Relative to the output directory
	pub path: PathBuf,
	pub content: String,
}

/// Render and serialize every document of `apps`, in order.
pub fn render(apps: &[App], cluster: &Cluster) -> Result<Vec<RenderedFile>> {
	let mut files = Vec::new();
	for &app in apps {
		for target in app.render(cluster)? {
			let content = target
				.document
				.to_json()
				.with_context(|| format!("serializing {}", target.path.display()))?;
			debug!(path = %target.path.display(), records = target.document.len(), "rendered");
			files.push(RenderedFile {
				path: target.path,
				content,
			});
		}
	}
	Ok(files)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
	Written,
	Unchanged,
}

/// Summary of a [`write_all`] run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteSummary {
	pub written: Vec<PathBuf>,
	pub unchanged: Vec<PathBuf>,
}

/// Write every file below `output_dir`, creating directories as needed.
pub fn write_all(output_dir: &Path, files: &[RenderedFile]) -> Result<WriteSummary> {
	let mut summary = WriteSummary::default();
	for file in files {
		let path = output_dir.join(&file.path);
		match write_if_changed(&path, &file.content)? {
			WriteOutcome::Written => {
				info!(path = %path.display(), "wrote");
				summary.written.push(path);
			}
			WriteOutcome::Unchanged => {
				debug!(path = %path.display(), "unchanged");
				summary.unchanged.push(path);
			}
		}
	}
	Ok(summary)
}

/// Replace `path` with `content` unless it already holds exactly that.
pub fn write_if_changed(path: &Path, content: &str) -> Result<WriteOutcome> {
	if read_existing(path)?.as_deref() == Some(content) {
		return Ok(WriteOutcome::Unchanged);
	}
	write_atomic(path, content)?;
	Ok(WriteOutcome::Written)
}

/// Write through a temporary file in the target directory, then rename it
/// over `path`. Readers see either the old or the new content.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
	let dir = match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent,
		_ => Path::new("."),
	};
	fs::create_dir_all(dir)
		.with_context(|| format!("failed to create directory: {}", dir.display()))?;

	let mut temp = NamedTempFile::new_in(dir)
		.with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
	temp.write_all(content.as_bytes())
		.with_context(|| format!("failed to write {}", path.display()))?;
	temp.flush()?;
	temp.persist(path)
		.with_context(|| format!("failed to replace {}", path.display()))?;
	Ok(())
}

fn read_existing(path: &Path) -> Result<Option<String>> {
	match fs::read_to_string(path) {
		Ok(content) => Ok(Some(content)),
		Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
		Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
	}
}

/// A file on disk that does not match its rendered content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleFile {
	pub path: PathBuf,
	pub missing: bool,
	/// Unified diff from the file on disk to the rendered content.
	pub diff: String,
}

/// Compare the rendered files with what is currently below `output_dir`.
pub fn check(output_dir: &Path, files: &[RenderedFile]) -> Result<Vec<StaleFile>> {
	let mut stale = Vec::new();
	for file in files {
		let path = output_dir.join(&file.path);
		let existing = read_existing(&path)?;
		if existing.as_deref() == Some(file.content.as_str()) {
			debug!(path = %path.display(), "up to date");
			continue;
		}

		let relative = file.path.display().to_string();
		let (old_header, old) = match &existing {
			Some(content) => (format!("a/{relative}"), content.as_str()),
			None => ("/dev/null".to_owned(), ""),
		};
		let diff = TextDiff::from_lines(old, file.content.as_str())
			.unified_diff()
			.context_radius(3)
			.header(&old_header, &format!("b/{relative}"))
			.to_string();

		stale.push(StaleFile {
			path,
			missing: existing.is_none(),
			diff,
		});
	}
	Ok(stale)
}

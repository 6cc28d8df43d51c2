//! Check command handler.

use std::{io::Write, path::PathBuf};

use anyhow::{bail, Result};
use clap::Args;
use tracing::warn;

use super::{AppSelection, CommonArgs};
use crate::output;

#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
	#[command(flatten)]
	pub selection: AppSelection,

	/// Directory holding the generated application folders
	#[arg(long)]
	pub output_dir: Option<PathBuf>,

	#[command(flatten)]
	pub common: CommonArgs,
}

/// Run the check command.
///
/// Prints a unified diff for every stale file and fails if there is any.
pub fn run<W: Write>(args: CheckArgs, mut writer: W) -> Result<()> {
	let config = args.common.load_config()?;
	let output_dir = config.output_dir(args.output_dir.as_deref());
	let apps = args.selection.resolve();

	let files = output::render(&apps, &config.workers)?;
	let stale = output::check(&output_dir, &files)?;

	for file in &stale {
		warn!(path = %file.path.display(), missing = file.missing, "out of date");
		write!(writer, "{}", file.diff)?;
	}
	writer.flush()?;

	if !stale.is_empty() {
		bail!(
			"{} of {} file(s) out of date, run `benchgen generate`",
			stale.len(),
			files.len()
		);
	}
	Ok(())
}

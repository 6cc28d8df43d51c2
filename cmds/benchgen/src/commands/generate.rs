//! Generate command handler.

use std::{io::Write, path::PathBuf};

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::{AppSelection, CommonArgs};
use crate::output;

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
	#[command(flatten)]
	pub selection: AppSelection,

	/// Directory to write the application folders to
	#[arg(long)]
	pub output_dir: Option<PathBuf>,

	#[command(flatten)]
	pub common: CommonArgs,
}

/// Run the generate command.
pub fn run<W: Write>(args: GenerateArgs, mut writer: W) -> Result<()> {
	let config = args.common.load_config()?;
	let output_dir = config.output_dir(args.output_dir.as_deref());
	let apps = args.selection.resolve();

	let files = output::render(&apps, &config.workers)?;
	let summary = output::write_all(&output_dir, &files)?;

	info!(
		written = summary.written.len(),
		unchanged = summary.unchanged.len(),
		"generation finished"
	);
	for path in &summary.written {
		writeln!(writer, "wrote {}", path.display())?;
	}
	Ok(())
}

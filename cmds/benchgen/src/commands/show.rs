//! Show command handler.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use super::CommonArgs;
use crate::{apps::App, output};

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
	/// Application to print
	#[arg(value_enum)]
	pub app: App,

	#[command(flatten)]
	pub common: CommonArgs,
}

/// Run the show command.
pub fn run<W: Write>(args: ShowArgs, mut writer: W) -> Result<()> {
	let config = args.common.load_config()?;
	for file in output::render(&[args.app], &config.workers)? {
		writer.write_all(file.content.as_bytes())?;
	}
	writer.flush()?;
	Ok(())
}

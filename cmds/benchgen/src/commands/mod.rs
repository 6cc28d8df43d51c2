pub mod check;
pub mod generate;
pub mod show;

pub mod util;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::Level;

use crate::{apps::App, config::BenchgenConfig};

/// Flags accepted by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
	/// Log level (error, warn, info, debug, trace). Overrides RUST_LOG
	#[arg(long)]
	pub log_level: Option<Level>,

	/// Config file to use instead of searching for .benchgen.yaml
	#[arg(long)]
	pub config: Option<PathBuf>,
}

impl CommonArgs {
	pub fn load_config(&self) -> Result<BenchgenConfig> {
		let cwd = std::env::current_dir().context("failed to get current directory")?;
		BenchgenConfig::resolve(self.config.as_deref(), &cwd)
	}
}

/// Applications a command works on.
#[derive(Args, Debug, Clone, Default)]
pub struct AppSelection {
	/// Application to process; may be repeated. Defaults to all of them
	#[arg(long = "app", value_enum)]
	pub apps: Vec<App>,
}

impl AppSelection {
	/// Selected applications in catalogue order, without repeats.
	pub fn resolve(&self) -> Vec<App> {
		if self.apps.is_empty() {
			return App::ALL.to_vec();
		}
		App::ALL
			.into_iter()
			.filter(|app| self.apps.contains(app))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case::all(vec![], App::ALL.to_vec())]
	#[case::single(vec![App::TrainTicket], vec![App::TrainTicket])]
	#[case::reordered(
		vec![App::TrainTicket, App::HotelReservation, App::TrainTicket],
		vec![App::HotelReservation, App::TrainTicket]
	)]
	fn test_app_selection(#[case] apps: Vec<App>, #[case] expected: Vec<App>) {
		assert_eq!(AppSelection { apps }.resolve(), expected);
	}
}

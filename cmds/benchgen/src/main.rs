use anyhow::Result;
use benchgen::{
	commands::{self, util::BrokenPipeGuard, CommonArgs},
	telemetry,
};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "benchgen")]
#[command(about = "Kubernetes manifests for the microservice benchmarks", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Write the manifests of the selected applications
	Generate(commands::generate::GenerateArgs),

	/// Fail if the manifests on disk differ from what would be generated
	Check(commands::check::CheckArgs),

	/// Print the manifests of one application
	Show(commands::show::ShowArgs),
}

impl Commands {
	fn common(&self) -> &CommonArgs {
		match self {
			Commands::Generate(args) => &args.common,
			Commands::Check(args) => &args.common,
			Commands::Show(args) => &args.common,
		}
	}
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	telemetry::init(cli.command.common().log_level)?;

	let stdout = BrokenPipeGuard::new(std::io::stdout());

	match cli.command {
		Commands::Generate(args) => commands::generate::run(args, stdout),
		Commands::Check(args) => commands::check::run(args, stdout),
		Commands::Show(args) => commands::show::run(args, stdout),
	}
}

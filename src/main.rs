use anyhow::Result;
use clap::Parser;

use hedatu::cli::{Cli, Command};
use hedatu::{commands, logging};

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	logging::init(cli.verbose);

	match &cli.command {
		Command::Run(args) => commands::run::run(&cli, args).await,
		Command::Validate => commands::validate::run(&cli),
		Command::Probe => commands::probe::run(&cli).await,
		Command::Deploy => commands::deploy::run(&cli).await,
		Command::Form { command } => commands::form::run(&cli, command).await,
		Command::Tx { command } => commands::tx::run(&cli, command).await,
		Command::Config { command } => commands::config::run(&cli, command),
	}
}

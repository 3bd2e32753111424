use anyhow::{bail, Result};

use crate::cli::{Cli, ConfigCommand};
use crate::config::Config;
use crate::commands::load_config;

pub fn run(cli: &Cli, cmd: &ConfigCommand) -> Result<()> {
	match cmd {
		ConfigCommand::Show => {
			let config = load_config(cli)?;
			print!("{}", toml::to_string_pretty(&config)?);
			Ok(())
		}
		ConfigCommand::Init { force } => {
			let path = match &cli.config {
				Some(p) => p.clone(),
				None => Config::path()?,
			};
			if path.exists() && !force {
				bail!("{} already exists (use --force to overwrite)", path.display());
			}
			let written = Config::default().save(Some(&path))?;
			println!("Wrote default configuration to {}", written.display());
			Ok(())
		}
	}
}

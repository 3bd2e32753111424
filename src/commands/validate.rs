use anyhow::Result;

use crate::cli::Cli;
use crate::commands::{load_binary, load_config};

/// Static pre-flight check of the contract binary.
pub fn run(cli: &Cli) -> Result<()> {
	let config = load_config(cli)?;
	let binary = load_binary(&config)?;

	if binary.warnings.is_empty() {
		println!("Binary is valid; no compatibility advisories.");
	} else {
		println!(
			"Binary is valid with {} advisory warning(s).",
			binary.warnings.len()
		);
	}
	Ok(())
}

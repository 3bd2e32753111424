use anyhow::Result;

use crate::cli::Cli;
use crate::commands::{load_binary, load_config, load_interface, new_session, resolve_node};
use crate::deploy::{self, Deployment};

pub async fn run(cli: &Cli) -> Result<()> {
	let config = load_config(cli)?;
	let binary = load_binary(&config)?;
	let interface = load_interface(&config)?;

	let resolved = resolve_node(&config).await?;
	let mut session = new_session(&config, resolved.node);

	let deployment = deploy::deploy(&mut session, &binary, &interface).await?;
	print_deployment(&deployment);
	Ok(())
}

pub fn print_deployment(d: &Deployment) {
	println!("Contract deployed.");
	println!("  Address: {}", d.address);
	println!("  TX:      {}", d.tx_hash);
	println!("  Block:   {}", d.block_number);
	println!("  Gas:     {}", d.gas_used);
}

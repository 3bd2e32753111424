use anyhow::Result;

use crate::cli::Cli;
use crate::commands::{load_config, resolve_node};
use crate::rpc::Node;
use crate::tx_builder::chain_id_or_fallback;

pub async fn run(cli: &Cli) -> Result<()> {
	let config = load_config(cli)?;
	let resolved = resolve_node(&config).await?;

	for failure in &resolved.failures {
		println!("  skipped {}: {}", failure.endpoint, failure.reason);
	}
	let chain_id =
		chain_id_or_fallback(&resolved.node, config.network.fallback_chain_id).await;
	println!("Endpoint: {}", resolved.node.url());
	println!("Chain ID: {chain_id}");
	println!("Head:     {}", resolved.head);
	Ok(())
}

use anyhow::{Context, Result};
use alloy::primitives::TxHash;

use crate::cli::{Cli, TxCommand};
use crate::commands::{load_config, resolve_node};
use crate::rpc::Node;

pub async fn run(cli: &Cli, cmd: &TxCommand) -> Result<()> {
	let config = load_config(cli)?;

	match cmd {
		TxCommand::Status { tx_hash } => {
			let hash: TxHash = tx_hash
				.parse()
				.with_context(|| format!("invalid transaction hash: {tx_hash}"))?;
			let resolved = resolve_node(&config).await?;

			match resolved.node.transaction_receipt(hash).await? {
				Some(receipt) => {
					let status = if receipt.status { "success" } else { "reverted" };
					println!("Transaction: {hash}");
					println!("Status:      {status}");
					println!("Block:       {}", receipt.block_number);
					println!("Gas used:    {}", receipt.gas_used);
					if let Some(address) = receipt.contract_address {
						println!("Contract:    {address}");
					}
					if let Some(reason) = receipt.revert_reason {
						println!("Reason:      {reason}");
					}
					println!("Logs:        {}", receipt.logs.len());
				}
				None => println!("No receipt yet for {hash} (pending or unknown)."),
			}
			Ok(())
		}
	}
}

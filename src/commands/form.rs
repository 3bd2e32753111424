use alloy::primitives::U256;
use anyhow::Result;

use crate::cli::{Cli, FormCommand};
use crate::commands::{
	load_config, load_interface, new_session, parse_address, resolve_node,
};
use crate::contracts::FormData;
use crate::events::{self, FormHistory};
use crate::records::Forms;

pub async fn run(cli: &Cli, cmd: &FormCommand) -> Result<()> {
	let config = load_config(cli)?;
	let interface = load_interface(&config)?;

	match cmd {
		FormCommand::Create {
			contract,
			datu1,
			datu2,
		} => {
			let forms = Forms::new(parse_address(contract)?, interface);
			let resolved = resolve_node(&config).await?;
			let mut session = new_session(&config, resolved.node);

			let created = forms
				.create(&mut session, &FormData::new(datu1.as_str(), datu2.as_str()))
				.await?;
			println!("Form created.");
			println!("  zenbakia: {}", created.id);
			println!("  TX:       {}", created.receipt.tx_hash);
			println!("  Block:    {}", created.receipt.block_number);
			Ok(())
		}
		FormCommand::Update {
			contract,
			id,
			datu1,
			datu2,
		} => {
			let forms = Forms::new(parse_address(contract)?, interface);
			let resolved = resolve_node(&config).await?;
			let mut session = new_session(&config, resolved.node);

			let receipt = forms
				.update(
					&mut session,
					U256::from(*id),
					&FormData::new(datu1.as_str(), datu2.as_str()),
				)
				.await?;
			println!("Form {id} updated.");
			println!("  TX:    {}", receipt.tx_hash);
			println!("  Block: {}", receipt.block_number);
			Ok(())
		}
		FormCommand::Get { contract, id } => {
			let forms = Forms::new(parse_address(contract)?, interface);
			let resolved = resolve_node(&config).await?;

			let data = forms.read(&resolved.node, U256::from(*id)).await?;
			print_form(U256::from(*id), &data);
			Ok(())
		}
		FormCommand::History {
			contract,
			id,
			from_block,
		} => {
			let forms = Forms::new(parse_address(contract)?, interface);
			let resolved = resolve_node(&config).await?;

			let history =
				events::history(&resolved.node, &forms, U256::from(*id), *from_block).await;
			print_history(U256::from(*id), &history);
			Ok(())
		}
	}
}

pub fn print_form(id: U256, data: &FormData) {
	println!("Form {id}:");
	println!("  datu1: {}", data.datu1);
	println!("  datu2: {}", data.datu2);
}

pub fn print_history(id: U256, history: &FormHistory) {
	println!(
		"Events for form {id}: {} created, {} updated",
		history.created.len(),
		history.updated.len()
	);
	let all = history
		.created
		.iter()
		.map(|e| ("created", e))
		.chain(history.updated.iter().map(|e| ("updated", e)));
	for (kind, event) in all {
		let tx = event
			.tx_hash
			.map(|h| h.to_string())
			.unwrap_or_else(|| "unknown".into());
		println!(
			"  {kind:<7} block={}  tx={tx}  datu1={:?}  datu2={:?}",
			event.block_number, event.data.datu1, event.data.datu2
		);
	}
}

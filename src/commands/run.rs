use anyhow::Result;

use crate::cli::{Cli, RunArgs};
use crate::commands::deploy::print_deployment;
use crate::commands::form::{print_form, print_history};
use crate::commands::{load_binary, load_config, load_interface, new_session, resolve_node};
use crate::contracts::FormData;
use crate::deploy;
use crate::events;
use crate::records::Forms;

/// The full deployment-and-exercise routine. Every step runs in sequence
/// and any failure other than event retrieval ends the run.
pub async fn run(cli: &Cli, args: &RunArgs) -> Result<()> {
	let config = load_config(cli)?;

	// 1. Connect.
	let resolved = resolve_node(&config).await?;

	// 2. Fresh account for this run.
	let mut session = new_session(&config, resolved.node);

	// 3. Load and validate artifacts before anything is sent.
	let binary = load_binary(&config)?;
	let interface = load_interface(&config)?;

	// 4. Deploy.
	let deployment = deploy::deploy(&mut session, &binary, &interface).await?;
	print_deployment(&deployment);
	let forms = Forms::new(deployment.address, interface);

	// 5. Create a form and read it back.
	let created = forms
		.create(
			&mut session,
			&FormData::new(args.datu1.as_str(), args.datu2.as_str()),
		)
		.await?;
	println!("Form created with zenbakia {}", created.id);
	print_form(created.id, &forms.read(session.node(), created.id).await?);

	// 6. Apply updates in order.
	for pair in args.update.chunks_exact(2) {
		let data = FormData::new(pair[0].as_str(), pair[1].as_str());
		let receipt = forms.update(&mut session, created.id, &data).await?;
		println!(
			"Form {} updated in block {}",
			created.id, receipt.block_number
		);
	}
	if !args.update.is_empty() {
		print_form(created.id, &forms.read(session.node(), created.id).await?);
	}

	// 7. Verify through the event log.
	let history =
		events::history(session.node(), &forms, created.id, deployment.block_number).await;
	print_history(created.id, &history);

	println!();
	println!("[SUCCESS] All operations completed.");
	Ok(())
}

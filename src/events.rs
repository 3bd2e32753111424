//! Best-effort retrieval of a record's created/updated history.
//!
//! This is a verification aid, not a source of truth: any query failure is
//! logged and degrades to an empty sequence instead of aborting the run.

use alloy::primitives::{TxHash, U256};

use crate::contracts::{id_topic, FormData, RecordEventKind};
use crate::error::{Error, Result};
use crate::records::Forms;
use crate::rpc::{LogQuery, Node};

/// One decoded record event.
#[derive(Debug, Clone, PartialEq)]
pub struct FormEvent {
	pub block_number: u64,
	pub log_index: u64,
	pub tx_hash: Option<TxHash>,
	pub data: FormData,
}

/// Events for one record, each sequence in block order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormHistory {
	pub created: Vec<FormEvent>,
	pub updated: Vec<FormEvent>,
}

/// Fetch every created and updated event for record `id` between
/// `from_block` and the current chain head.
pub async fn history<N: Node + ?Sized>(
	node: &N,
	forms: &Forms,
	id: U256,
	from_block: u64,
) -> FormHistory {
	let head = match node.block_number().await {
		Ok(head) => head,
		Err(e) => {
			let err = Error::EventQueryFailed(format!("chain head: {e}"));
			tracing::warn!(error = %err, "skipping event history");
			return FormHistory::default();
		}
	};

	let mut history = FormHistory::default();
	for (kind, out) in [
		(RecordEventKind::Created, &mut history.created),
		(RecordEventKind::Updated, &mut history.updated),
	] {
		match query(node, forms, kind, id, from_block, head).await {
			Ok(events) => *out = events,
			Err(e) => tracing::warn!(
				event = forms.interface().event_name(kind),
				error = %e,
				"event query failed, treating as empty"
			),
		}
	}

	tracing::info!(
		zenbakia = %id,
		from_block,
		to_block = head,
		created = history.created.len(),
		updated = history.updated.len(),
		"event history retrieved"
	);
	history
}

async fn query<N: Node + ?Sized>(
	node: &N,
	forms: &Forms,
	kind: RecordEventKind,
	id: U256,
	from_block: u64,
	to_block: u64,
) -> Result<Vec<FormEvent>> {
	let interface = forms.interface();
	let logs = node
		.logs(&LogQuery {
			address: forms.address(),
			event: interface.event_selector(kind),
			topic1: Some(id_topic(id)),
			from_block,
			to_block,
		})
		.await
		.map_err(|e| Error::EventQueryFailed(e.to_string()))?;

	let mut events: Vec<FormEvent> = logs
		.iter()
		.filter_map(|log| {
			let decoded = interface.decode_record_event(kind, log);
			if decoded.is_none() {
				tracing::debug!(?log, "skipping undecodable log");
			}
			let decoded = decoded.filter(|d| d.id == id)?;
			Some(FormEvent {
				block_number: log.block_number.unwrap_or_default(),
				log_index: log.log_index.unwrap_or_default(),
				tx_hash: log.tx_hash,
				data: decoded.data,
			})
		})
		.collect();

	events.sort_by_key(|e| (e.block_number, e.log_index));
	Ok(events)
}

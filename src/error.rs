use std::time::Duration;

use alloy::primitives::{TxHash, U256};
use thiserror::Error;

/// One failed liveness probe during endpoint resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointFailure {
	pub endpoint: String,
	pub reason: String,
}

/// Everything the orchestrator can fail with.
#[derive(Debug, Error)]
pub enum Error {
	#[error("no reachable endpoint: {}", describe_attempts(.attempts))]
	NoReachableEndpoint { attempts: Vec<EndpointFailure> },

	#[error("malformed contract binary: {0}")]
	MalformedBinary(String),

	#[error(
		"transaction {tx_hash} reverted in block {block_number} (gas used {gas_used}){}",
		.revert_reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default()
	)]
	TransactionReverted {
		tx_hash: TxHash,
		block_number: u64,
		gas_used: u64,
		revert_reason: Option<String>,
	},

	#[error("no receipt for transaction {tx_hash} after {}s; re-query it later", .waited.as_secs())]
	ConfirmationTimeout { tx_hash: TxHash, waited: Duration },

	#[error("deployment receipt for {tx_hash} carries no contract address")]
	MissingContractAddress { tx_hash: TxHash },

	#[error("no record-created event could be decoded from transaction {tx_hash}")]
	RecordIdentifierNotFound { tx_hash: TxHash },

	#[error("record {id} not found: {reason}")]
	RecordNotFound { id: U256, reason: String },

	#[error("event query failed: {0}")]
	EventQueryFailed(String),

	#[error("RPC error: {0}")]
	Rpc(String),

	#[error("signing failed: {0}")]
	Signing(String),

	#[error("contract interface error: {0}")]
	Interface(String),
}

pub type Result<T> = std::result::Result<T, Error>;

fn describe_attempts(attempts: &[EndpointFailure]) -> String {
	if attempts.is_empty() {
		return "no endpoints configured".into();
	}
	attempts
		.iter()
		.map(|a| format!("{} ({})", a.endpoint, a.reason))
		.collect::<Vec<_>>()
		.join(", ")
}

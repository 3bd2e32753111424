use std::sync::Arc;

use alloy::network::{ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{Filter, Log, TransactionReceipt, TransactionRequest};
use alloy::transports::{RpcError, TransportResult};
use serde_json::{json, Value};

use crate::error::{Error, Result};

/// A log entry as observed in a receipt or a log query.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
	pub address: Address,
	pub topics: Vec<B256>,
	pub data: Bytes,
	pub block_number: Option<u64>,
	pub log_index: Option<u64>,
	pub tx_hash: Option<TxHash>,
}

/// Confirmation record for a mined transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
	pub tx_hash: TxHash,
	/// The sole authority on success.
	pub status: bool,
	pub block_number: u64,
	pub gas_used: u64,
	/// Set only for contract creations.
	pub contract_address: Option<Address>,
	pub logs: Vec<LogEntry>,
	pub revert_reason: Option<String>,
}

/// Historical log query: one event signature, optionally narrowed by the
/// first indexed topic, over an inclusive block range.
#[derive(Debug, Clone, PartialEq)]
pub struct LogQuery {
	pub address: Address,
	pub event: B256,
	pub topic1: Option<B256>,
	pub from_block: u64,
	pub to_block: u64,
}

/// Result of a read-only call. A revert is an answer from the contract,
/// not a transport failure, so it is reported here rather than as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
	Returned(Bytes),
	Reverted(String),
}

/// The JSON-RPC surface the orchestrator needs from an EVM node.
#[async_trait::async_trait]
pub trait Node: Send + Sync {
	/// Endpoint this node handle is bound to.
	fn url(&self) -> &str;

	async fn block_number(&self) -> Result<u64>;

	async fn chain_id(&self) -> Result<u64>;

	async fn balance(&self, address: Address) -> Result<U256>;

	/// Number of transactions sent from `address`, i.e. its next nonce.
	async fn transaction_count(&self, address: Address) -> Result<u64>;

	async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash>;

	/// `None` while the transaction is still pending.
	async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>>;

	async fn call(&self, to: Address, data: Bytes) -> Result<CallOutcome>;

	async fn logs(&self, query: &LogQuery) -> Result<Vec<LogEntry>>;
}

/// Node handle backed by an alloy HTTP provider.
///
/// Standard calls go through the provider. The receipt's `revertReason`
/// field is a node extension the typed receipt drops, so it is fetched with
/// a raw JSON-RPC request.
pub struct RpcClient {
	provider: Arc<dyn Provider + Send + Sync>,
	url: String,
	http: reqwest::Client,
}

impl RpcClient {
	pub fn new(url: &str) -> Result<Self> {
		let parsed: url::Url = url
			.parse()
			.map_err(|e| Error::Rpc(format!("invalid RPC URL '{url}': {e}")))?;
		let provider = ProviderBuilder::new().connect_http(parsed);
		Ok(Self {
			provider: Arc::new(provider),
			url: url.to_owned(),
			http: reqwest::Client::new(),
		})
	}

	/// Fetch and decode the revert reason some nodes attach to receipts.
	async fn revert_reason(&self, tx_hash: TxHash) -> Option<String> {
		let body = json!({
			"id": 1,
			"jsonrpc": "2.0",
			"method": "eth_getTransactionReceipt",
			"params": [tx_hash]
		});

		let resp: Value = self
			.http
			.post(&self.url)
			.json(&body)
			.send()
			.await
			.ok()?
			.json()
			.await
			.ok()?;

		resp.pointer("/result/revertReason")
			.and_then(Value::as_str)
			.map(decode_revert_reason)
	}
}

#[async_trait::async_trait]
impl Node for RpcClient {
	fn url(&self) -> &str {
		&self.url
	}

	async fn block_number(&self) -> Result<u64> {
		self.provider.get_block_number().await.map_err(rpc_err)
	}

	async fn chain_id(&self) -> Result<u64> {
		self.provider.get_chain_id().await.map_err(rpc_err)
	}

	async fn balance(&self, address: Address) -> Result<U256> {
		self.provider.get_balance(address).await.map_err(rpc_err)
	}

	async fn transaction_count(&self, address: Address) -> Result<u64> {
		self.provider
			.get_transaction_count(address)
			.await
			.map_err(rpc_err)
	}

	async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash> {
		let pending = self
			.provider
			.send_raw_transaction(raw)
			.await
			.map_err(rpc_err)?;
		Ok(*pending.tx_hash())
	}

	async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>> {
		let Some(raw) = self
			.provider
			.get_transaction_receipt(tx_hash)
			.await
			.map_err(rpc_err)?
		else {
			return Ok(None);
		};

		let mut receipt = receipt_from_rpc(&raw);
		if !receipt.status {
			receipt.revert_reason = self.revert_reason(tx_hash).await;
		}
		Ok(Some(receipt))
	}

	async fn call(&self, to: Address, data: Bytes) -> Result<CallOutcome> {
		let req = TransactionRequest::default().with_to(to).with_input(data);
		call_outcome(self.provider.call(req).await)
	}

	async fn logs(&self, query: &LogQuery) -> Result<Vec<LogEntry>> {
		let mut filter = Filter::new()
			.address(query.address)
			.event_signature(query.event)
			.from_block(query.from_block)
			.to_block(query.to_block);
		if let Some(topic) = query.topic1 {
			filter = filter.topic1(topic);
		}

		let logs = self.provider.get_logs(&filter).await.map_err(rpc_err)?;
		Ok(logs.iter().map(log_from_rpc).collect())
	}
}

impl std::fmt::Debug for RpcClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RpcClient").field("url", &self.url).finish()
	}
}

// -- Conversions --

fn receipt_from_rpc(raw: &TransactionReceipt) -> Receipt {
	Receipt {
		tx_hash: raw.transaction_hash,
		status: raw.status(),
		block_number: raw.block_number.unwrap_or_default(),
		gas_used: raw.gas_used,
		contract_address: raw.contract_address,
		logs: raw.inner.logs().iter().map(log_from_rpc).collect(),
		revert_reason: None,
	}
}

fn log_from_rpc(log: &Log) -> LogEntry {
	LogEntry {
		address: log.address(),
		topics: log.topics().to_vec(),
		data: log.data().data.clone(),
		block_number: log.block_number,
		log_index: log.log_index,
		tx_hash: log.transaction_hash,
	}
}

/// Split a read-only call's result into a contract answer and a transport
/// failure. Nodes report reverts as JSON-RPC errors: geth uses code 3, others
/// only say "revert" in the message.
fn call_outcome(res: TransportResult<Bytes>) -> Result<CallOutcome> {
	match res {
		Ok(out) => Ok(CallOutcome::Returned(out)),
		Err(RpcError::ErrorResp(payload))
			if payload.code == 3 || payload.message.to_lowercase().contains("revert") =>
		{
			Ok(CallOutcome::Reverted(payload.message.to_string()))
		}
		Err(e) => Err(rpc_err(e)),
	}
}

/// Revert data is usually an ABI-encoded `Error(string)`; anything else is
/// passed through as-is.
fn decode_revert_reason(raw: &str) -> String {
	let digits = raw.strip_prefix("0x").unwrap_or(raw);
	hex::decode(digits)
		.ok()
		.and_then(|bytes| alloy::sol_types::decode_revert_reason(&bytes))
		.unwrap_or_else(|| raw.to_owned())
}

fn rpc_err(e: impl std::fmt::Display) -> Error {
	Error::Rpc(e.to_string())
}

#[cfg(test)]
mod tests {
	use alloy::rpc::json_rpc::ErrorPayload;
	use alloy::transports::TransportErrorKind;

	use super::*;

	#[test]
	fn rejects_unparseable_url() {
		let err = RpcClient::new("not a url").unwrap_err();
		assert!(err.to_string().contains("invalid RPC URL"));
	}

	#[test]
	fn keeps_url() {
		let client = RpcClient::new("http://127.0.0.1:8545").unwrap();
		assert_eq!(client.url(), "http://127.0.0.1:8545");
	}

	#[test]
	fn decodes_error_string_revert() {
		// Error("no such form")
		let raw = concat!(
			"0x08c379a0",
			"0000000000000000000000000000000000000000000000000000000000000020",
			"000000000000000000000000000000000000000000000000000000000000000c",
			"6e6f207375636820666f726d0000000000000000000000000000000000000000"
		);
		assert!(decode_revert_reason(raw).contains("no such form"));
	}

	fn error_response(json: &str) -> TransportResult<Bytes> {
		let payload: ErrorPayload = serde_json::from_str(json).unwrap();
		Err(RpcError::ErrorResp(payload))
	}

	#[test]
	fn code_3_error_is_a_revert() {
		let res = error_response(
			r#"{"code":3,"message":"execution reverted: no such form","data":"0x08c379a0"}"#,
		);
		assert_eq!(
			call_outcome(res).unwrap(),
			CallOutcome::Reverted("execution reverted: no such form".into())
		);
	}

	#[test]
	fn revert_message_without_code_3_is_a_revert() {
		let res = error_response(r#"{"code":-32000,"message":"Execution reverted"}"#);
		assert_eq!(
			call_outcome(res).unwrap(),
			CallOutcome::Reverted("Execution reverted".into())
		);
	}

	#[test]
	fn other_error_responses_are_rpc_failures() {
		let res = error_response(r#"{"code":-32601,"message":"method not found"}"#);
		let err = call_outcome(res).unwrap_err();
		assert!(matches!(err, Error::Rpc(ref m) if m.contains("method not found")), "{err}");
	}

	#[test]
	fn transport_failure_is_not_a_revert() {
		let res: TransportResult<Bytes> =
			Err(TransportErrorKind::custom_str("connection refused"));
		let err = call_outcome(res).unwrap_err();
		assert!(matches!(err, Error::Rpc(ref m) if m.contains("connection refused")), "{err}");
	}

	#[test]
	fn returned_output_passes_through() {
		let out = Bytes::from_static(&[1, 2, 3]);
		assert_eq!(
			call_outcome(Ok(out.clone())).unwrap(),
			CallOutcome::Returned(out)
		);
	}

	#[test]
	fn passes_through_undecodable_reason() {
		assert_eq!(decode_revert_reason("out of gas"), "out of gas");
	}
}

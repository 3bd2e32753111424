//! In-memory stand-in for an EVM node running the Formularioak contract.
//!
//! Signed raw transactions are decoded and applied immediately: every
//! accepted transaction is mined in its own block. The contract keeps its
//! forms in a vector and assigns identifiers from 1 upwards.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use alloy::consensus::{Transaction, TxEnvelope};
use alloy::dyn_abi::{DynSolValue, JsonAbiExt};
use alloy::eips::Decodable2718;
use alloy::json_abi::JsonAbi;
use alloy::primitives::{keccak256, Address, Bytes, TxHash, TxKind, B256, U256};

use hedatu::config::Config;
use hedatu::contracts::{id_topic, ContractInterface};
use hedatu::rpc::{CallOutcome, LogEntry, LogQuery, Node, Receipt};
use hedatu::tx_builder::TxPolicy;
use hedatu::{Error, Result};

pub const ABI: &str = include_str!("../fixtures/Formularioak.abi");

/// solc preamble followed by a little filler.
pub const BINARY: &str = "0x6080604052348015600e575f80fd5b50";

pub fn interface() -> ContractInterface {
	ContractInterface::from_json(ABI, &Config::default().interface_names()).unwrap()
}

/// Default policy with waits short enough for tests.
pub fn fast_policy() -> TxPolicy {
	let mut policy = Config::default().tx_policy();
	policy.poll_interval = Duration::from_millis(5);
	policy.deploy_timeout = Some(Duration::from_secs(5));
	policy.call_timeout = Some(Duration::from_secs(5));
	policy
}

/// What the node saw for one accepted transaction.
#[derive(Debug, Clone)]
pub struct SentTx {
	pub hash: TxHash,
	pub nonce: u64,
	pub chain_id: Option<u64>,
	pub gas_limit: u64,
	pub gas_price: Option<u128>,
	pub kind: TxKind,
}

#[derive(Default)]
pub struct Behaviour {
	/// Next accepted transaction gets a failed receipt.
	pub revert_next: bool,
	/// Receipts are never published.
	pub withhold_receipts: bool,
	/// The contract performs writes without emitting events.
	pub silent: bool,
	pub chain_id_unavailable: bool,
	pub logs_unavailable: bool,
	/// Receipt queries that fail before the node answers again.
	pub receipt_errors: usize,
}

#[derive(Default)]
struct State {
	block: u64,
	nonce: u64,
	nonce_queries: usize,
	forms: HashMap<Address, Vec<(String, String)>>,
	receipts: HashMap<TxHash, Receipt>,
	logs: Vec<LogEntry>,
	sent: Vec<SentTx>,
	behaviour: Behaviour,
}

pub struct FakeNode {
	url: String,
	abi: JsonAbi,
	chain_id: u64,
	state: Mutex<State>,
}

impl FakeNode {
	pub fn new() -> Self {
		Self {
			url: "http://fake:8545".into(),
			abi: serde_json::from_str(ABI).unwrap(),
			chain_id: 2018,
			state: Mutex::new(State {
				block: 100,
				..State::default()
			}),
		}
	}

	pub fn chain_id_value(&self) -> u64 {
		self.chain_id
	}

	pub fn behave(&self, f: impl FnOnce(&mut Behaviour)) {
		f(&mut self.state.lock().unwrap().behaviour);
	}

	pub fn sent(&self) -> Vec<SentTx> {
		self.state.lock().unwrap().sent.clone()
	}

	pub fn nonce_queries(&self) -> usize {
		self.state.lock().unwrap().nonce_queries
	}

	pub fn on_chain_nonce(&self) -> u64 {
		self.state.lock().unwrap().nonce
	}

	pub fn head(&self) -> u64 {
		self.state.lock().unwrap().block
	}

	fn apply(&self, state: &mut State, tx: &TxEnvelope, hash: TxHash) -> Receipt {
		let block = state.block;
		let mut receipt = Receipt {
			tx_hash: hash,
			status: true,
			block_number: block,
			gas_used: 21_000,
			contract_address: None,
			logs: Vec::new(),
			revert_reason: None,
		};

		if std::mem::take(&mut state.behaviour.revert_next) {
			receipt.status = false;
			receipt.revert_reason = Some("revert: forced failure".into());
			return receipt;
		}

		match tx.kind() {
			TxKind::Create => {
				let address = Address::from_word(keccak256(block.to_be_bytes()));
				state.forms.insert(address, Vec::new());
				receipt.contract_address = Some(address);
			}
			TxKind::Call(to) => match self.execute(state, to, tx.input()) {
				Ok(logs) => {
					let silent = state.behaviour.silent;
					for (i, (topics, data)) in logs.into_iter().enumerate() {
						if silent {
							break;
						}
						receipt.logs.push(LogEntry {
							address: to,
							topics,
							data,
							block_number: Some(block),
							log_index: Some(i as u64),
							tx_hash: Some(hash),
						});
					}
				}
				Err(reason) => {
					receipt.status = false;
					receipt.revert_reason = Some(reason);
				}
			},
		}
		receipt
	}

	/// Run a state-changing call; returns emitted `(topics, data)` pairs.
	fn execute(
		&self,
		state: &mut State,
		to: Address,
		input: &Bytes,
	) -> std::result::Result<Vec<(Vec<B256>, Bytes)>, String> {
		let (name, args) = self.decode_call(input)?;
		let forms = state
			.forms
			.get_mut(&to)
			.ok_or_else(|| "no contract at address".to_string())?;

		match name.as_str() {
			"createForm" => {
				let (a, b) = two_strings(&args[0], &args[1])?;
				forms.push((a.clone(), b.clone()));
				let id = U256::from(forms.len());
				Ok(vec![self.event("FormCreated", id, &a, &b)])
			}
			"updateForm" => {
				let id = args[0].as_uint().ok_or("bad id")?.0;
				let (a, b) = two_strings(&args[1], &args[2])?;
				let index = slot(forms.len(), id)?;
				forms[index] = (a.clone(), b.clone());
				Ok(vec![self.event("FormUpdated", id, &a, &b)])
			}
			other => Err(format!("{other} is not a write")),
		}
	}

	fn decode_call(&self, input: &[u8]) -> std::result::Result<(String, Vec<DynSolValue>), String> {
		if input.len() < 4 {
			return Err("no selector".into());
		}
		let f = self
			.abi
			.functions()
			.find(|f| f.selector().as_slice() == &input[..4])
			.ok_or("unknown selector")?;
		let args = f
			.abi_decode_input(&input[4..])
			.map_err(|e| e.to_string())?;
		Ok((f.name.clone(), args))
	}

	fn event(&self, name: &str, id: U256, a: &str, b: &str) -> (Vec<B256>, Bytes) {
		let selector = self.abi.event(name).unwrap()[0].selector();
		let data = DynSolValue::Tuple(vec![
			DynSolValue::String(a.into()),
			DynSolValue::String(b.into()),
		])
		.abi_encode_params();
		(
			vec![selector, id_topic(id)],
			data.into(),
		)
	}
}

#[async_trait::async_trait]
impl Node for FakeNode {
	fn url(&self) -> &str {
		&self.url
	}

	async fn block_number(&self) -> Result<u64> {
		Ok(self.head())
	}

	async fn chain_id(&self) -> Result<u64> {
		if self.state.lock().unwrap().behaviour.chain_id_unavailable {
			return Err(Error::Rpc("method not supported".into()));
		}
		Ok(self.chain_id)
	}

	async fn balance(&self, _address: Address) -> Result<U256> {
		Ok(U256::ZERO)
	}

	async fn transaction_count(&self, _address: Address) -> Result<u64> {
		let mut state = self.state.lock().unwrap();
		state.nonce_queries += 1;
		Ok(state.nonce)
	}

	async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash> {
		let tx = TxEnvelope::decode_2718(&mut &raw[..])
			.map_err(|e| Error::Rpc(format!("undecodable transaction: {e}")))?;
		let hash = keccak256(raw);

		let mut state = self.state.lock().unwrap();
		if tx.nonce() != state.nonce {
			return Err(Error::Rpc(format!(
				"nonce mismatch: expected {}, got {}",
				state.nonce,
				tx.nonce()
			)));
		}

		state.nonce += 1;
		state.block += 1;
		state.sent.push(SentTx {
			hash,
			nonce: tx.nonce(),
			chain_id: tx.chain_id(),
			gas_limit: tx.gas_limit(),
			gas_price: tx.gas_price(),
			kind: tx.kind(),
		});

		let receipt = self.apply(&mut state, &tx, hash);
		state.logs.extend(receipt.logs.iter().cloned());
		if !state.behaviour.withhold_receipts {
			state.receipts.insert(hash, receipt);
		}
		Ok(hash)
	}

	async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>> {
		let mut state = self.state.lock().unwrap();
		if state.behaviour.receipt_errors > 0 {
			state.behaviour.receipt_errors -= 1;
			return Err(Error::Rpc("connection reset by peer".into()));
		}
		Ok(state.receipts.get(&tx_hash).cloned())
	}

	async fn call(&self, to: Address, data: Bytes) -> Result<CallOutcome> {
		let (name, args) = match self.decode_call(&data) {
			Ok(decoded) => decoded,
			Err(reason) => return Ok(CallOutcome::Reverted(reason)),
		};
		let state = self.state.lock().unwrap();
		let Some(forms) = state.forms.get(&to) else {
			return Ok(CallOutcome::Returned(Bytes::new()));
		};

		match name.as_str() {
			"getForm" => {
				let Some((id, _)) = args[0].as_uint() else {
					return Ok(CallOutcome::Reverted("bad id".into()));
				};
				match slot(forms.len(), id) {
					Ok(i) => {
						let (a, b) = &forms[i];
						let out = DynSolValue::Tuple(vec![
							DynSolValue::String(a.clone()),
							DynSolValue::String(b.clone()),
						])
						.abi_encode_params();
						Ok(CallOutcome::Returned(out.into()))
					}
					Err(reason) => Ok(CallOutcome::Reverted(reason)),
				}
			}
			"getFormCount" => Ok(CallOutcome::Returned(
				DynSolValue::Uint(U256::from(forms.len()), 256)
					.abi_encode()
					.into(),
			)),
			other => Ok(CallOutcome::Reverted(format!("{other} is not a view"))),
		}
	}

	async fn logs(&self, query: &LogQuery) -> Result<Vec<LogEntry>> {
		let state = self.state.lock().unwrap();
		if state.behaviour.logs_unavailable {
			return Err(Error::Rpc("query returned more than 10000 results".into()));
		}
		Ok(state
			.logs
			.iter()
			.filter(|log| log.address == query.address)
			.filter(|log| log.topics.first() == Some(&query.event))
			.filter(|log| match query.topic1 {
				Some(t) => log.topics.get(1) == Some(&t),
				None => true,
			})
			.filter(|log| {
				let b = log.block_number.unwrap_or_default();
				(query.from_block..=query.to_block).contains(&b)
			})
			.cloned()
			.collect())
	}
}

fn two_strings(
	a: &DynSolValue,
	b: &DynSolValue,
) -> std::result::Result<(String, String), String> {
	match (a.as_str(), b.as_str()) {
		(Some(a), Some(b)) => Ok((a.to_owned(), b.to_owned())),
		_ => Err("expected two strings".into()),
	}
}

/// Index of form `id` (1-based) in a store of `len` forms.
fn slot(len: usize, id: U256) -> std::result::Result<usize, String> {
	let id = usize::try_from(id).map_err(|_| "form does not exist".to_string())?;
	if id == 0 || id > len {
		return Err("form does not exist".into());
	}
	Ok(id - 1)
}

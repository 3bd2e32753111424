//! Building, signing, submitting and confirming transactions.
//!
//! Every submission starts from freshly fetched account and network state:
//! the nonce is the sender's on-chain transaction count at build time and
//! is never cached between submissions, so a reverted or timed-out
//! transaction can never cause the next one to reuse a stale value.

use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::rpc::types::TransactionRequest;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::error::{Error, Result};
use crate::rpc::{Node, Receipt};
use crate::signer::Signer;

/// Gas, chain and confirmation parameters applied to every submission.
#[derive(Debug, Clone, PartialEq)]
pub struct TxPolicy {
	pub gas_limit: u64,
	pub gas_price: u128,
	/// Used when the node fails to report its chain ID.
	pub fallback_chain_id: u64,
	/// `None` waits indefinitely.
	pub deploy_timeout: Option<Duration>,
	/// `None` waits indefinitely.
	pub call_timeout: Option<Duration>,
	pub poll_interval: Duration,
}

/// What a transaction does.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
	/// Contract creation: init code followed by encoded constructor args.
	Create { code: Bytes },
	/// Invocation of an existing contract: selector followed by args.
	Call { to: Address, data: Bytes },
}

/// A transaction with every field filled in, ready to sign.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTransaction {
	pub from: Address,
	pub nonce: u64,
	pub gas_limit: u64,
	pub gas_price: u128,
	pub chain_id: u64,
	pub payload: Payload,
}

impl PendingTransaction {
	pub fn into_request(self) -> TransactionRequest {
		let tx = TransactionRequest::default()
			.with_from(self.from)
			.with_nonce(self.nonce)
			.with_gas_limit(self.gas_limit)
			.with_gas_price(self.gas_price)
			.with_chain_id(self.chain_id);

		match self.payload {
			Payload::Create { code } => tx.with_deploy_code(code),
			Payload::Call { to, data } => tx.with_to(to).with_input(data),
		}
	}
}

impl TxPolicy {
	fn timeout_for(&self, payload: &Payload) -> Option<Duration> {
		match payload {
			Payload::Create { .. } => self.deploy_timeout,
			Payload::Call { .. } => self.call_timeout,
		}
	}
}

/// The node's chain ID, or `fallback` if it cannot be fetched.
pub async fn chain_id_or_fallback<N: Node + ?Sized>(node: &N, fallback: u64) -> u64 {
	match node.chain_id().await {
		Ok(id) => id,
		Err(e) => {
			tracing::warn!(error = %e, fallback, "could not fetch chain ID, using fallback");
			fallback
		}
	}
}

/// Fill in nonce, gas and chain ID for `payload` sent by `from`.
pub async fn build<N: Node + ?Sized>(
	node: &N,
	from: Address,
	policy: &TxPolicy,
	payload: Payload,
) -> Result<PendingTransaction> {
	let chain_id = chain_id_or_fallback(node, policy.fallback_chain_id).await;
	let nonce = node.transaction_count(from).await?;

	Ok(PendingTransaction {
		from,
		nonce,
		gas_limit: policy.gas_limit,
		gas_price: policy.gas_price,
		chain_id,
		payload,
	})
}

/// Build, sign and broadcast `payload`, then block until its receipt is
/// observed or the policy's timeout for this kind of payload elapses.
///
/// A receipt with failed status is returned as `TransactionReverted`.
pub async fn submit<N, S>(
	node: &N,
	signer: &S,
	policy: &TxPolicy,
	payload: Payload,
	description: &str,
) -> Result<Receipt>
where
	N: Node + ?Sized,
	S: Signer + ?Sized,
{
	let wait = policy.timeout_for(&payload);
	let pending = build(node, signer.address(), policy, payload).await?;
	tracing::info!(
		op = description,
		from = %pending.from,
		nonce = pending.nonce,
		chain_id = pending.chain_id,
		gas_limit = pending.gas_limit,
		gas_price = %pending.gas_price,
		"submitting transaction"
	);

	let signed = signer.sign_transaction(pending.into_request()).await?;
	let tx_hash = node.send_raw_transaction(&signed.raw).await?;
	if tx_hash != signed.hash {
		tracing::warn!(local = %signed.hash, node = %tx_hash, "node reported a different transaction hash");
	}
	tracing::info!(op = description, %tx_hash, "waiting for confirmation");

	let receipt = wait_for_receipt(node, tx_hash, wait, policy.poll_interval).await?;

	if !receipt.status {
		tracing::error!(
			op = description,
			%tx_hash,
			block = receipt.block_number,
			gas_used = receipt.gas_used,
			reason = receipt.revert_reason.as_deref().unwrap_or("none"),
			"transaction reverted"
		);
		return Err(Error::TransactionReverted {
			tx_hash,
			block_number: receipt.block_number,
			gas_used: receipt.gas_used,
			revert_reason: receipt.revert_reason,
		});
	}

	tracing::info!(
		op = description,
		%tx_hash,
		block = receipt.block_number,
		gas_used = receipt.gas_used,
		"transaction confirmed"
	);
	Ok(receipt)
}

/// Poll for `tx_hash`'s receipt every `poll` until it appears, giving up
/// after `limit` when one is set.
///
/// A failed poll is logged and retried until the limit.
pub async fn wait_for_receipt<N: Node + ?Sized>(
	node: &N,
	tx_hash: TxHash,
	limit: Option<Duration>,
	poll: Duration,
) -> Result<Receipt> {
	let poll_loop = async {
		let mut ticker = interval(poll.max(Duration::from_millis(1)));
		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
		loop {
			ticker.tick().await;
			match node.transaction_receipt(tx_hash).await {
				Ok(Some(receipt)) => return receipt,
				Ok(None) => tracing::debug!(%tx_hash, "transaction pending"),
				Err(e) => tracing::warn!(%tx_hash, error = %e, "receipt query failed, retrying"),
			}
		}
	};

	match limit {
		None => Ok(poll_loop.await),
		Some(limit) => timeout(limit, poll_loop)
			.await
			.map_err(|_| Error::ConfirmationTimeout {
				tx_hash,
				waited: limit,
			}),
	}
}

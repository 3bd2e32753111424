use alloy::primitives::Address;

use crate::error::Result;
use crate::rpc::{Node, Receipt};
use crate::signer::Signer;
use crate::tx_builder::{self, Payload, TxPolicy};

/// Everything one run operates on: the resolved node, the run's account and
/// the transaction policy. Passed explicitly to every operation.
///
/// Submitting takes `&mut self`, so two transactions from the same account
/// can never be in flight at once and each nonce is fetched only after the
/// previous transaction's outcome is known.
pub struct Session<N> {
	endpoint: String,
	node: N,
	signer: Box<dyn Signer>,
	policy: TxPolicy,
}

impl<N: Node> Session<N> {
	pub fn new(node: N, signer: Box<dyn Signer>, policy: TxPolicy) -> Self {
		Self {
			endpoint: node.url().to_owned(),
			node,
			signer,
			policy,
		}
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	pub fn node(&self) -> &N {
		&self.node
	}

	/// The run's account address.
	pub fn address(&self) -> Address {
		self.signer.address()
	}

	pub fn policy(&self) -> &TxPolicy {
		&self.policy
	}

	/// Sign, submit and confirm one transaction from the run's account.
	pub async fn submit(&mut self, payload: Payload, description: &str) -> Result<Receipt> {
		tx_builder::submit(
			&self.node,
			self.signer.as_ref(),
			&self.policy,
			payload,
			description,
		)
		.await
	}
}

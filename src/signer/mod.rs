pub mod local;

use alloy::primitives::{Address, Bytes, TxHash};
use alloy::rpc::types::TransactionRequest;

use crate::error::Result;

pub use local::LocalSigner;

/// A transaction ready for broadcast.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
	/// EIP-2718 encoding accepted by `eth_sendRawTransaction`.
	pub raw: Bytes,
	pub hash: TxHash,
}

/// Produces signatures for the orchestrator's account.
#[async_trait::async_trait]
pub trait Signer: Send + Sync {
	/// The address this signer controls.
	fn address(&self) -> Address;

	/// Sign a fully populated transaction request.
	async fn sign_transaction(&self, tx: TransactionRequest) -> Result<SignedTransaction>;
}

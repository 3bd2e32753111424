use alloy::eips::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{keccak256, Address, Bytes};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer as _;

use crate::error::{Error, Result};

use super::SignedTransaction;

/// An in-memory key generated for a single run. Never persisted or logged.
pub struct LocalSigner {
	address: Address,
	wallet: EthereumWallet,
}

impl LocalSigner {
	/// Generate a fresh random account.
	pub fn generate() -> Self {
		Self::from_key(PrivateKeySigner::random())
	}

	/// Use an existing hex-encoded private key (with or without `0x`).
	pub fn from_private_key(hex_key: &str) -> Result<Self> {
		let key: PrivateKeySigner = hex_key
			.strip_prefix("0x")
			.unwrap_or(hex_key)
			.parse()
			.map_err(|e| Error::Signing(format!("invalid private key: {e}")))?;
		Ok(Self::from_key(key))
	}

	fn from_key(key: PrivateKeySigner) -> Self {
		Self {
			address: key.address(),
			wallet: EthereumWallet::from(key),
		}
	}
}

#[async_trait::async_trait]
impl super::Signer for LocalSigner {
	fn address(&self) -> Address {
		self.address
	}

	async fn sign_transaction(&self, tx: TransactionRequest) -> Result<SignedTransaction> {
		let envelope = tx
			.build(&self.wallet)
			.await
			.map_err(|e| Error::Signing(e.to_string()))?;
		let raw = envelope.encoded_2718();
		Ok(SignedTransaction {
			hash: keccak256(&raw),
			raw: Bytes::from(raw),
		})
	}
}

impl std::fmt::Debug for LocalSigner {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LocalSigner")
			.field("address", &self.address)
			.finish_non_exhaustive()
	}
}

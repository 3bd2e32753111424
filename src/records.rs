//! Create, update and read form records on a deployed contract.

use alloy::primitives::{Address, U256};

use crate::contracts::{ContractInterface, FormData, RecordEventKind};
use crate::error::{Error, Result};
use crate::rpc::{CallOutcome, Node, Receipt};
use crate::session::Session;
use crate::tx_builder::Payload;

/// A record created by this run.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedForm {
	/// Identifier ("zenbakia") the contract assigned, taken from the
	/// record-created event.
	pub id: U256,
	pub receipt: Receipt,
}

/// Handle on a deployed record contract.
#[derive(Debug, Clone)]
pub struct Forms {
	address: Address,
	interface: ContractInterface,
}

impl Forms {
	pub fn new(address: Address, interface: ContractInterface) -> Self {
		Self { address, interface }
	}

	pub fn address(&self) -> Address {
		self.address
	}

	pub fn interface(&self) -> &ContractInterface {
		&self.interface
	}

	/// Create a record and return the identifier decoded from the
	/// record-created event in its receipt.
	pub async fn create<N: Node>(
		&self,
		session: &mut Session<N>,
		data: &FormData,
	) -> Result<CreatedForm> {
		let call = self.interface.encode_create(data)?;
		let receipt = session
			.submit(
				Payload::Call {
					to: self.address,
					data: call,
				},
				"create form",
			)
			.await?;

		let id = receipt
			.logs
			.iter()
			.filter(|log| log.address == self.address)
			.find_map(|log| {
				self.interface
					.decode_record_event(RecordEventKind::Created, log)
			})
			.map(|event| event.id)
			.ok_or(Error::RecordIdentifierNotFound {
				tx_hash: receipt.tx_hash,
			})?;

		tracing::info!(zenbakia = %id, tx_hash = %receipt.tx_hash, "form created");
		Ok(CreatedForm { id, receipt })
	}

	/// Replace both fields of record `id`.
	pub async fn update<N: Node>(
		&self,
		session: &mut Session<N>,
		id: U256,
		data: &FormData,
	) -> Result<Receipt> {
		let call = self.interface.encode_update(id, data)?;
		let receipt = session
			.submit(
				Payload::Call {
					to: self.address,
					data: call,
				},
				"update form",
			)
			.await?;

		tracing::info!(zenbakia = %id, tx_hash = %receipt.tx_hash, "form updated");
		Ok(receipt)
	}

	/// Read record `id` through a read-only call. Needs no account.
	///
	/// A revert or undecodable output is `RecordNotFound`; transport failures
	/// surface as `Rpc`.
	pub async fn read<N: Node + ?Sized>(&self, node: &N, id: U256) -> Result<FormData> {
		let call = self.interface.encode_read(id)?;
		match node.call(self.address, call).await? {
			CallOutcome::Reverted(reason) => Err(Error::RecordNotFound { id, reason }),
			CallOutcome::Returned(output) => {
				self.interface
					.decode_read(&output)
					.map_err(|e| Error::RecordNotFound {
						id,
						reason: e.to_string(),
					})
			}
		}
	}
}

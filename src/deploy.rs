use alloy::primitives::{Address, TxHash};

use crate::bytecode::{self, ValidatedBinary};
use crate::contracts::ContractInterface;
use crate::error::{Error, Result};
use crate::rpc::Node;
use crate::session::Session;
use crate::tx_builder::Payload;

/// A contract instance created by this run.
#[derive(Debug, Clone, PartialEq)]
pub struct Deployment {
	pub address: Address,
	pub tx_hash: TxHash,
	/// Block that included the creation; later event queries start here.
	pub block_number: u64,
	pub gas_used: u64,
}

/// Deploy `binary` with no constructor arguments and return the address the
/// network assigned to it.
pub async fn deploy<N: Node>(
	session: &mut Session<N>,
	binary: &ValidatedBinary,
	interface: &ContractInterface,
) -> Result<Deployment> {
	let ctor_inputs = interface.constructor_inputs();
	if ctor_inputs > 0 {
		return Err(Error::Interface(format!(
			"constructor expects {ctor_inputs} argument(s) but deployments carry none"
		)));
	}

	preflight(session, binary).await;

	let receipt = session
		.submit(
			Payload::Create {
				code: binary.bytes.clone(),
			},
			"deploy",
		)
		.await?;

	let address = receipt
		.contract_address
		.ok_or(Error::MissingContractAddress {
			tx_hash: receipt.tx_hash,
		})?;

	tracing::info!(%address, block = receipt.block_number, "contract deployed");

	Ok(Deployment {
		address,
		tx_hash: receipt.tx_hash,
		block_number: receipt.block_number,
		gas_used: receipt.gas_used,
	})
}

/// Informational checks only: on a zero-gas network neither the balance nor
/// the intrinsic gas estimate can block a deployment.
async fn preflight<N: Node>(session: &Session<N>, binary: &ValidatedBinary) {
	let address = session.address();
	match session.node().balance(address).await {
		Ok(balance) => tracing::info!(%address, %balance, "account balance (wei)"),
		Err(e) => tracing::warn!(%address, error = %e, "could not fetch account balance"),
	}

	let intrinsic = bytecode::intrinsic_deploy_gas(binary.len());
	tracing::info!(
		bytes = binary.len(),
		intrinsic_gas = intrinsic,
		gas_limit = session.policy().gas_limit,
		"deployment pre-flight"
	);
	if intrinsic > session.policy().gas_limit {
		tracing::warn!(
			intrinsic_gas = intrinsic,
			gas_limit = session.policy().gas_limit,
			"gas limit is below the intrinsic cost of this deployment"
		);
	}
}

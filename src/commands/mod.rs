pub mod config;
pub mod deploy;
pub mod form;
pub mod probe;
pub mod run;
pub mod tx;
pub mod validate;

use anyhow::{Context, Result};

use crate::bytecode::{self, ValidatedBinary};
use crate::cli::Cli;
use crate::config::Config;
use crate::contracts::ContractInterface;
use crate::endpoint::{self, Resolved};
use crate::rpc::RpcClient;
use crate::session::Session;
use crate::signer::LocalSigner;

/// Effective configuration: the file (or defaults) with `--endpoint`,
/// `--bytecode` and `--abi` applied on top.
pub fn load_config(cli: &Cli) -> Result<Config> {
	let mut config = Config::load(cli.config.as_deref())?;
	apply_overrides(cli, &mut config);
	Ok(config)
}

fn apply_overrides(cli: &Cli, config: &mut Config) {
	if !cli.endpoints.is_empty() {
		config.network.endpoints = cli.endpoints.clone();
	}
	if let Some(path) = &cli.bytecode {
		config.contract.bytecode_path = path.clone();
	}
	if let Some(path) = &cli.abi {
		config.contract.abi_path = path.clone();
	}
}

/// Connect to the first reachable endpoint.
pub async fn resolve_node(config: &Config) -> Result<Resolved<RpcClient>> {
	let resolved = endpoint::resolve_rpc(
		&config.network.endpoints,
		config.network.default_port,
		config.probe_timeout(),
	)
	.await?;
	println!("Connected to {} (block {})", resolved.endpoint, resolved.head);
	Ok(resolved)
}

/// Generate the run's account and bind it to `node`.
pub fn new_session(config: &Config, node: RpcClient) -> Session<RpcClient> {
	let signer = LocalSigner::generate();
	let session = Session::new(node, Box::new(signer), config.tx_policy());
	println!("Generated account {}", session.address());
	session
}

/// Read and validate the contract binary, printing any advisories.
pub fn load_binary(config: &Config) -> Result<ValidatedBinary> {
	let path = &config.contract.bytecode_path;
	let raw = std::fs::read_to_string(path)
		.with_context(|| format!("reading contract binary {}", path.display()))?;
	let binary = bytecode::validate(&raw)?;

	println!("Contract binary: {}", path.display());
	println!("  Length:  {} bytes", binary.len());
	println!("  Starts:  {}...", &binary.hex[..binary.hex.len().min(20)]);
	for warning in &binary.warnings {
		println!("  WARNING: {warning}");
	}
	Ok(binary)
}

pub fn load_interface(config: &Config) -> Result<ContractInterface> {
	ContractInterface::load(&config.contract.abi_path, &config.interface_names())
}

pub fn parse_address(s: &str) -> Result<alloy::primitives::Address> {
	s.parse()
		.with_context(|| format!("invalid contract address: {s}"))
}

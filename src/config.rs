use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::contracts::InterfaceNames;
use crate::tx_builder::TxPolicy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	pub network: NetworkConfig,
	pub transaction: TransactionConfig,
	pub contract: ContractConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
	/// Candidate endpoints, tried in order. Bare hosts get `http://` and
	/// `default_port`.
	pub endpoints: Vec<String>,
	pub default_port: u16,
	/// Bound on the liveness probe of each candidate.
	pub rpc_timeout_secs: u64,
	/// Chain ID used when the node cannot report one.
	pub fallback_chain_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionConfig {
	pub gas_limit: u64,
	/// Wei. Zero on networks configured for free execution.
	pub gas_price: u64,
	pub deploy_timeout_secs: u64,
	/// Absent means wait for the receipt indefinitely.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub call_timeout_secs: Option<u64>,
	pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
	pub bytecode_path: PathBuf,
	pub abi_path: PathBuf,
	pub create_function: String,
	pub update_function: String,
	pub read_function: String,
	pub created_event: String,
	pub updated_event: String,
}

impl Default for NetworkConfig {
	fn default() -> Self {
		Self {
			endpoints: vec!["85.190.243.52".into()],
			default_port: 8545,
			rpc_timeout_secs: 10,
			fallback_chain_id: 1337,
		}
	}
}

impl Default for TransactionConfig {
	fn default() -> Self {
		Self {
			gas_limit: 0x7FFF_FFFF,
			gas_price: 0,
			deploy_timeout_secs: 90,
			call_timeout_secs: None,
			poll_interval_ms: 1000,
		}
	}
}

impl Default for ContractConfig {
	fn default() -> Self {
		Self {
			bytecode_path: "Formularioak.bytecode".into(),
			abi_path: "Formularioak.abi".into(),
			create_function: "createForm".into(),
			update_function: "updateForm".into(),
			read_function: "getForm".into(),
			created_event: "FormCreated".into(),
			updated_event: "FormUpdated".into(),
		}
	}
}

impl Config {
	/// Directory where CLI state is stored (~/.hedatu/).
	pub fn dir() -> anyhow::Result<PathBuf> {
		dirs::home_dir()
			.map(|home| home.join(".hedatu"))
			.ok_or_else(|| anyhow!("could not determine home directory"))
	}

	/// Path to the default config file.
	pub fn path() -> anyhow::Result<PathBuf> {
		Ok(Self::dir()?.join("config.toml"))
	}

	/// Load config from `path` (or the default location), falling back to
	/// defaults if no file exists.
	pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
		let path = match path {
			Some(p) => p.to_owned(),
			None => Self::path()?,
		};
		if path.exists() {
			let content = std::fs::read_to_string(&path)
				.with_context(|| format!("reading {}", path.display()))?;
			toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
		} else {
			Ok(Self::default())
		}
	}

	/// Persist the config, creating the parent directory if needed.
	pub fn save(&self, path: Option<&Path>) -> anyhow::Result<PathBuf> {
		let path = match path {
			Some(p) => p.to_owned(),
			None => Self::path()?,
		};
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(&path, toml::to_string_pretty(self)?)?;
		Ok(path)
	}

	/// Transaction policy derived from the `[transaction]` and `[network]`
	/// sections.
	pub fn tx_policy(&self) -> TxPolicy {
		let tx = &self.transaction;
		TxPolicy {
			gas_limit: tx.gas_limit,
			gas_price: u128::from(tx.gas_price),
			fallback_chain_id: self.network.fallback_chain_id,
			deploy_timeout: Some(Duration::from_secs(tx.deploy_timeout_secs)),
			call_timeout: tx.call_timeout_secs.map(Duration::from_secs),
			poll_interval: Duration::from_millis(tx.poll_interval_ms),
		}
	}

	pub fn probe_timeout(&self) -> Duration {
		Duration::from_secs(self.network.rpc_timeout_secs)
	}

	pub fn interface_names(&self) -> InterfaceNames {
		let c = &self.contract;
		InterfaceNames {
			create_function: c.create_function.clone(),
			update_function: c.update_function.clone(),
			read_function: c.read_function.clone(),
			created_event: c.created_event.clone(),
			updated_event: c.updated_event.clone(),
		}
	}
}

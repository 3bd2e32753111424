use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
	name = "hedatu",
	about = "Deploy the Formularioak record contract to a private EVM network and exercise it.",
	version
)]
pub struct Cli {
	/// Config file (defaults to ~/.hedatu/config.toml).
	#[arg(long, global = true)]
	pub config: Option<PathBuf>,

	/// Candidate RPC endpoint, tried in the order given. Replaces the
	/// configured list. Bare hosts get http:// and the default port.
	#[arg(long = "endpoint", global = true)]
	pub endpoints: Vec<String>,

	/// Hex-encoded contract binary.
	#[arg(long, global = true)]
	pub bytecode: Option<PathBuf>,

	/// Contract interface description (JSON ABI).
	#[arg(long, global = true)]
	pub abi: Option<PathBuf>,

	/// Log debug output (RUST_LOG overrides).
	#[arg(short, long, global = true)]
	pub verbose: bool,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
	/// Full routine: connect, create an account, validate, deploy, create and
	/// read a form, apply updates, and verify the event history.
	Run(RunArgs),

	/// Validate the contract binary without touching the network.
	Validate,

	/// Find the first reachable endpoint.
	Probe,

	/// Validate and deploy the contract from a fresh account.
	Deploy,

	/// Operate on forms of an already deployed contract.
	Form {
		#[command(subcommand)]
		command: FormCommand,
	},

	/// Check transaction status on-chain.
	Tx {
		#[command(subcommand)]
		command: TxCommand,
	},

	/// Show or initialise the configuration file.
	Config {
		#[command(subcommand)]
		command: ConfigCommand,
	},
}

#[derive(Args)]
pub struct RunArgs {
	/// First field of the created form.
	#[arg(long, default_value = "Sample Data 1")]
	pub datu1: String,

	/// Second field of the created form.
	#[arg(long, default_value = "Sample Data 2")]
	pub datu2: String,

	/// Replace the form's fields after creation. Repeat to update several
	/// times, in order.
	#[arg(long, num_args = 2, value_names = ["DATU1", "DATU2"])]
	pub update: Vec<String>,
}

// -- Form subcommands --

#[derive(Subcommand)]
pub enum FormCommand {
	/// Create a form from a fresh account.
	Create {
		/// Contract address (0x-prefixed).
		#[arg(long)]
		contract: String,

		#[arg(long)]
		datu1: String,

		#[arg(long)]
		datu2: String,
	},

	/// Replace both fields of a form.
	Update {
		/// Contract address (0x-prefixed).
		#[arg(long)]
		contract: String,

		/// Form identifier (zenbakia).
		#[arg(long)]
		id: u64,

		#[arg(long)]
		datu1: String,

		#[arg(long)]
		datu2: String,
	},

	/// Read a form's fields.
	Get {
		/// Contract address (0x-prefixed).
		#[arg(long)]
		contract: String,

		/// Form identifier (zenbakia).
		#[arg(long)]
		id: u64,
	},

	/// List a form's created/updated events.
	History {
		/// Contract address (0x-prefixed).
		#[arg(long)]
		contract: String,

		/// Form identifier (zenbakia).
		#[arg(long)]
		id: u64,

		/// First block to search.
		#[arg(long, default_value = "0")]
		from_block: u64,
	},
}

// -- Tx subcommands --

#[derive(Subcommand)]
pub enum TxCommand {
	/// Check confirmation status of a transaction.
	Status {
		/// Transaction hash (0x-prefixed).
		tx_hash: String,
	},
}

// -- Config subcommands --

#[derive(Subcommand)]
pub enum ConfigCommand {
	/// Print the effective configuration: the file with command-line
	/// overrides applied.
	Show,

	/// Write the default configuration to disk.
	Init {
		/// Overwrite an existing file.
		#[arg(long)]
		force: bool,
	},
}

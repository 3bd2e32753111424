pub mod bytecode;
pub mod cli;
pub mod commands;
pub mod config;
pub mod contracts;
pub mod deploy;
pub mod endpoint;
pub mod error;
pub mod events;
pub mod logging;
pub mod records;
pub mod rpc;
pub mod session;
pub mod signer;
pub mod tx_builder;

pub use error::{Error, Result};

//! The contract's interface description: which functions create, update and
//! read records, which events announce them, and how to encode calls and
//! decode results against a JSON ABI.

use std::path::Path;

use alloy::dyn_abi::{DynSolValue, EventExt, FunctionExt, JsonAbiExt};
use alloy::json_abi::{Event, Function, JsonAbi};
use alloy::primitives::{Bytes, LogData, B256, U256};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::rpc::LogEntry;

/// Names of the interface items the record workflow relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceNames {
	pub create_function: String,
	pub update_function: String,
	pub read_function: String,
	pub created_event: String,
	pub updated_event: String,
}

/// The two opaque string fields a form record holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormData {
	pub datu1: String,
	pub datu2: String,
}

impl FormData {
	pub fn new(datu1: impl Into<String>, datu2: impl Into<String>) -> Self {
		Self {
			datu1: datu1.into(),
			datu2: datu2.into(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordEventKind {
	Created,
	Updated,
}

/// A record event decoded from a log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecordEvent {
	pub id: U256,
	pub data: FormData,
}

#[derive(Debug, Clone)]
pub struct ContractInterface {
	abi: JsonAbi,
	create: Function,
	update: Function,
	read: Function,
	created: Event,
	updated: Event,
}

impl ContractInterface {
	/// Load the interface description from a file. Accepts a bare ABI array
	/// or a compiler artifact with an `abi` member.
	pub fn load(path: &Path, names: &InterfaceNames) -> anyhow::Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("reading interface description {}", path.display()))?;
		Ok(Self::from_json(&content, names)?)
	}

	pub fn from_json(json: &str, names: &InterfaceNames) -> Result<Self> {
		let value: Value = serde_json::from_str(json)
			.map_err(|e| Error::Interface(format!("not valid JSON: {e}")))?;
		let value = match value {
			Value::Object(mut artifact) => artifact
				.remove("abi")
				.ok_or_else(|| Error::Interface("object has no `abi` member".into()))?,
			other => other,
		};
		let abi: JsonAbi = serde_json::from_value(value)
			.map_err(|e| Error::Interface(format!("not a JSON ABI: {e}")))?;

		Ok(Self {
			create: function(&abi, &names.create_function, 2)?,
			update: function(&abi, &names.update_function, 3)?,
			read: function(&abi, &names.read_function, 1)?,
			created: event(&abi, &names.created_event)?,
			updated: event(&abi, &names.updated_event)?,
			abi,
		})
	}

	/// Number of inputs the constructor declares (zero when it has none).
	pub fn constructor_inputs(&self) -> usize {
		self.abi
			.constructor
			.as_ref()
			.map(|c| c.inputs.len())
			.unwrap_or(0)
	}

	pub fn encode_create(&self, data: &FormData) -> Result<Bytes> {
		encode(&self.create, &[string(&data.datu1), string(&data.datu2)])
	}

	pub fn encode_update(&self, id: U256, data: &FormData) -> Result<Bytes> {
		encode(
			&self.update,
			&[DynSolValue::Uint(id, 256), string(&data.datu1), string(&data.datu2)],
		)
	}

	pub fn encode_read(&self, id: U256) -> Result<Bytes> {
		encode(&self.read, &[DynSolValue::Uint(id, 256)])
	}

	/// Decode the read function's return data into the two stored fields.
	pub fn decode_read(&self, output: &[u8]) -> Result<FormData> {
		let values = self
			.read
			.abi_decode_output(output)
			.map_err(|e| Error::Interface(format!("{}: {e}", self.read.name)))?;
		match values.as_slice() {
			[a, b, ..] => match (a.as_str(), b.as_str()) {
				(Some(a), Some(b)) => Ok(FormData::new(a, b)),
				_ => Err(Error::Interface(format!(
					"{} did not return two strings",
					self.read.name
				))),
			},
			_ => Err(Error::Interface(format!(
				"{} returned {} values, expected 2",
				self.read.name,
				values.len()
			))),
		}
	}

	pub fn event_name(&self, kind: RecordEventKind) -> &str {
		&self.record_event(kind).name
	}

	/// Topic-0 value identifying the event.
	pub fn event_selector(&self, kind: RecordEventKind) -> B256 {
		self.record_event(kind).selector()
	}

	/// Decode `log` as the given record event. `None` when the log is a
	/// different event or does not match the declared shape.
	pub fn decode_record_event(
		&self,
		kind: RecordEventKind,
		log: &LogEntry,
	) -> Option<DecodedRecordEvent> {
		let event = self.record_event(kind);
		if log.topics.first() != Some(&event.selector()) {
			return None;
		}

		let data = LogData::new(log.topics.clone(), log.data.clone())?;
		let decoded = event.decode_log(&data).ok()?;
		let (id, _) = decoded.indexed.first()?.as_uint()?;
		let datu1 = decoded.body.first()?.as_str()?;
		let datu2 = decoded.body.get(1)?.as_str()?;

		Some(DecodedRecordEvent {
			id,
			data: FormData::new(datu1, datu2),
		})
	}

	fn record_event(&self, kind: RecordEventKind) -> &Event {
		match kind {
			RecordEventKind::Created => &self.created,
			RecordEventKind::Updated => &self.updated,
		}
	}
}

/// Topic encoding of a record identifier (a left-padded uint256).
pub fn id_topic(id: U256) -> B256 {
	B256::from(id.to_be_bytes::<32>())
}

// -- Helpers --

fn function(abi: &JsonAbi, name: &str, arity: usize) -> Result<Function> {
	abi.function(name)
		.and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == arity))
		.cloned()
		.ok_or_else(|| {
			Error::Interface(format!("no function `{name}` taking {arity} argument(s)"))
		})
}

fn event(abi: &JsonAbi, name: &str) -> Result<Event> {
	abi.event(name)
		.and_then(|overloads| {
			overloads
				.iter()
				.find(|e| !e.anonymous && e.inputs.iter().any(|p| p.indexed))
		})
		.cloned()
		.ok_or_else(|| Error::Interface(format!("no event `{name}` with an indexed field")))
}

fn encode(function: &Function, args: &[DynSolValue]) -> Result<Bytes> {
	function
		.abi_encode_input(args)
		.map(Bytes::from)
		.map_err(|e| Error::Interface(format!("encoding {}: {e}", function.name)))
}

fn string(s: &str) -> DynSolValue {
	DynSolValue::String(s.to_owned())
}

//! Pre-flight checks for a compiled contract binary.
//!
//! Everything here is static: the binary is inspected before it ever goes
//! over the wire so that artifacts which are guaranteed to fault on an older
//! EVM never cost a nonce slot or a confirmation wait.

use std::fmt;

use alloy::primitives::Bytes;

use crate::error::{Error, Result};

/// Preamble emitted by solc (`PUSH1 0x80`).
const SOLC_PREAMBLE: [u8; 2] = [0x60, 0x80];

/// `PUSH0` (EIP-3855, Shanghai).
const PUSH0: u8 = 0x5f;
const PUSH0_SCAN_BYTES: usize = 100;

/// Designated invalid instruction.
const INVALID: u8 = 0xfe;
const INVALID_SCAN_BYTES: usize = 50;

/// A non-fatal finding about a binary that passed structural validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryWarning {
	/// The binary does not start with `0x6080`.
	UnexpectedPreamble { found: String },
	/// `PUSH0` opcodes in the leading bytes, with their byte offsets.
	Push0 { offsets: Vec<usize> },
	/// `INVALID` opcodes in the leading bytes, with their byte offsets.
	InvalidOpcode { offsets: Vec<usize> },
}

impl fmt::Display for BinaryWarning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::UnexpectedPreamble { found } => write!(
				f,
				"binary starts with 0x{found} instead of the solc preamble 0x6080; \
				 it may not have been produced by the expected toolchain"
			),
			Self::Push0 { offsets } => write!(
				f,
				"PUSH0 (0x5f) at byte offsets {}; the target network must support the \
				 Shanghai EVM revision (EIP-3855) or deployment will fail with an \
				 invalid-instruction fault",
				join_offsets(offsets)
			),
			Self::InvalidOpcode { offsets } => write!(
				f,
				"INVALID (0xfe) at byte offsets {}; the binary may be corrupted or \
				 mismatched with its interface description",
				join_offsets(offsets)
			),
		}
	}
}

/// A structurally valid binary plus the advisories raised against it.
#[derive(Debug, Clone)]
pub struct ValidatedBinary {
	/// Canonical form: `0x` followed by lowercase hex.
	pub hex: String,
	pub bytes: Bytes,
	pub warnings: Vec<BinaryWarning>,
}

impl ValidatedBinary {
	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}
}

/// Validate raw binary text as read from storage.
pub fn validate(raw: &str) -> Result<ValidatedBinary> {
	let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
	let digits = cleaned
		.strip_prefix("0x")
		.or_else(|| cleaned.strip_prefix("0X"))
		.unwrap_or(&cleaned);

	if digits.is_empty() {
		return Err(Error::MalformedBinary("binary is empty".into()));
	}
	if let Some((pos, c)) = digits.char_indices().find(|(_, c)| !c.is_ascii_hexdigit()) {
		return Err(Error::MalformedBinary(format!(
			"non-hexadecimal character {c:?} at position {pos}"
		)));
	}
	if digits.len() % 2 != 0 {
		return Err(Error::MalformedBinary(format!(
			"odd number of hex digits ({})",
			digits.len()
		)));
	}

	let bytes =
		hex::decode(digits).map_err(|e| Error::MalformedBinary(e.to_string()))?;

	let mut warnings = Vec::new();

	if !bytes.starts_with(&SOLC_PREAMBLE) {
		let head = &bytes[..bytes.len().min(SOLC_PREAMBLE.len())];
		warnings.push(BinaryWarning::UnexpectedPreamble {
			found: hex::encode(head),
		});
	}

	let push0 = offsets_of(&bytes, PUSH0, PUSH0_SCAN_BYTES);
	if !push0.is_empty() {
		warnings.push(BinaryWarning::Push0 { offsets: push0 });
	}

	let invalid = offsets_of(&bytes, INVALID, INVALID_SCAN_BYTES);
	if !invalid.is_empty() {
		warnings.push(BinaryWarning::InvalidOpcode { offsets: invalid });
	}

	for w in &warnings {
		tracing::warn!(warning = %w, "contract binary advisory");
	}
	tracing::info!(
		bytes = bytes.len(),
		hex_digits = digits.len(),
		warnings = warnings.len(),
		"contract binary validated"
	);

	Ok(ValidatedBinary {
		hex: format!("0x{}", hex::encode(&bytes)),
		bytes: Bytes::from(bytes),
		warnings,
	})
}

/// Estimated intrinsic gas for a creation transaction carrying `byte_len`
/// bytes of code: base cost, creation surcharge and a flat per-byte charge.
pub fn intrinsic_deploy_gas(byte_len: usize) -> u64 {
	21_000 + 32_000 + 200 * byte_len as u64
}

fn offsets_of(bytes: &[u8], needle: u8, window: usize) -> Vec<usize> {
	bytes
		.iter()
		.take(window)
		.enumerate()
		.filter(|(_, b)| **b == needle)
		.map(|(i, _)| i)
		.collect()
}

fn join_offsets(offsets: &[usize]) -> String {
	offsets
		.iter()
		.map(usize::to_string)
		.collect::<Vec<_>>()
		.join(", ")
}

use core::fmt;

use bytes::BytesMut;
use rlp::DecoderError;

/// Part of an envelope a structural error was found in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Structure {
	/// The outer field list, or the bytes around it.
	Envelope,
	/// The list of access list entries.
	AccessList,
	AccessListEntry,
	StorageKeys,
	/// The list of authorization tuples.
	AuthorizationList,
	AuthorizationTuple,
	/// A named scalar field.
	Field(&'static str),
}

impl fmt::Display for Structure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Envelope => f.write_str("envelope"),
			Self::AccessList => f.write_str("access list"),
			Self::AccessListEntry => f.write_str("access list entry"),
			Self::StorageKeys => f.write_str("storage key list"),
			Self::AuthorizationList => f.write_str("authorization list"),
			Self::AuthorizationTuple => f.write_str("authorization tuple"),
			Self::Field(name) => write!(f, "field `{}`", name),
		}
	}
}

/// Shape violation found while decoding.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Malformed {
	#[error("expected {expected} elements, found {actual}")]
	ListLength { expected: usize, actual: usize },
	#[error("expected RLP element list")]
	ExpectedList,
	#[error("expected RLP byte string")]
	ExpectedBytes,
	#[error("expected a single type byte")]
	ExpectedTypeByte,
	#[error("{0} trailing bytes")]
	TrailingBytes(usize),
	#[error("no bytes to decode")]
	Empty,
	#[error("invalid RLP: {0:?}")]
	Rlp(DecoderError),
}

/// Errors returned by every envelope codec operation.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum EnvelopeError {
	/// The leading type byte is not one of the supported discriminators.
	#[error("rlp type byte {0:#04x} is not supported")]
	UnsupportedTransactionType(u8),
	/// Structurally invalid input.
	#[error("malformed {structure}: {reason}")]
	MalformedEnvelope {
		structure: Structure,
		reason: Malformed,
	},
	/// A structurally valid value breaks a semantic invariant.
	#[error("{0}")]
	InvalidEnvelopeState(&'static str),
}

impl EnvelopeError {
	pub(crate) fn malformed(structure: Structure, reason: Malformed) -> Self {
		Self::MalformedEnvelope { structure, reason }
	}
}

/// Encodable typed transactions.
pub trait EnvelopedEncodable {
	/// Encode the type byte, if any, followed by the payload.
	fn encode(&self) -> Result<BytesMut, EnvelopeError> {
		let payload = self.encode_payload()?;

		let mut out = BytesMut::with_capacity(payload.len() + 1);
		if let Some(type_id) = self.type_id() {
			debug_assert!(type_id <= 0x7f);
			out.extend_from_slice(&[type_id]);
		}

		out.extend_from_slice(&payload[..]);
		Ok(out)
	}

	/// Type Id of the transaction.
	fn type_id(&self) -> Option<u8>;

	/// Encode inner payload.
	fn encode_payload(&self) -> Result<BytesMut, EnvelopeError>;
}

/// Decodable typed transactions.
pub trait EnvelopedDecodable: Sized {
	/// Decode raw bytes to a Self type.
	fn decode(bytes: &[u8]) -> Result<Self, EnvelopeError>;
}

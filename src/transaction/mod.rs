mod eip1559;
mod eip7702;
mod legacy;

use alloc::{string::String, string::ToString, vec::Vec};
use core::fmt;

use bytes::BytesMut;
use ethereum_types::H256;
use sha3::{Digest, Keccak256};

pub use self::{
	eip1559::{EIP1559Envelope, EIP1559_TYPE_ID},
	eip7702::{AccessListEntry, AuthorizationTuple, EIP7702Envelope, EIP7702_TYPE_ID},
	legacy::LegacyEnvelope,
};
use crate::{
	enveloped::{
		EnvelopeError, EnvelopedDecodable, EnvelopedEncodable, Malformed, Structure,
	},
	rlp_item::RlpItem,
};

/// Split a raw transaction into its type byte and RLP payload.
///
/// A payload starting with a list header is a legacy transaction and has no
/// type byte. Otherwise the first RLP item must be a single byte.
pub(crate) fn split_type_id(bytes: &[u8]) -> Result<(Option<u8>, &[u8]), EnvelopeError> {
	match bytes.first() {
		None => Err(EnvelopeError::malformed(
			Structure::Envelope,
			Malformed::Empty,
		)),
		Some(first) if *first >= 0xc0 => Ok((None, bytes)),
		Some(_) => {
			let (item, consumed) = RlpItem::parse_prefix(bytes)
				.map_err(|reason| EnvelopeError::malformed(Structure::Envelope, reason))?;

			match item.as_bytes() {
				Some([type_id]) => Ok((Some(*type_id), &bytes[consumed..])),
				_ => Err(EnvelopeError::malformed(
					Structure::Envelope,
					Malformed::ExpectedTypeByte,
				)),
			}
		}
	}
}

/// Any transaction envelope the codec understands.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransactionEnvelope {
	/// Legacy transaction type
	Legacy(LegacyEnvelope),
	/// EIP-1559 transaction
	EIP1559(EIP1559Envelope),
	/// EIP-7702 transaction
	EIP7702(EIP7702Envelope),
}

impl TransactionEnvelope {
	/// Input data of the call, or init code for a contract creation.
	pub fn call_data(&self) -> &[u8] {
		match self {
			Self::Legacy(tx) => &tx.call_data,
			Self::EIP1559(tx) => &tx.call_data,
			Self::EIP7702(tx) => &tx.call_data,
		}
	}

	pub fn set_call_data(&mut self, call_data: Vec<u8>) {
		match self {
			Self::Legacy(tx) => tx.call_data = call_data,
			Self::EIP1559(tx) => tx.call_data = call_data,
			Self::EIP7702(tx) => tx.call_data = call_data,
		}
	}

	/// Keccak-256 of the encoded envelope, the Ethereum transaction hash.
	pub fn hash(&self) -> Result<H256, EnvelopeError> {
		let encoded = self.encode()?;
		Ok(H256::from_slice(&Keccak256::digest(&encoded[..])))
	}

	pub fn format_diagnostic(&self) -> String {
		self.to_string()
	}
}

impl EnvelopedEncodable for TransactionEnvelope {
	fn type_id(&self) -> Option<u8> {
		match self {
			Self::Legacy(tx) => tx.type_id(),
			Self::EIP1559(tx) => tx.type_id(),
			Self::EIP7702(tx) => tx.type_id(),
		}
	}

	fn encode_payload(&self) -> Result<BytesMut, EnvelopeError> {
		match self {
			Self::Legacy(tx) => tx.encode_payload(),
			Self::EIP1559(tx) => tx.encode_payload(),
			Self::EIP7702(tx) => tx.encode_payload(),
		}
	}
}

impl EnvelopedDecodable for TransactionEnvelope {
	fn decode(bytes: &[u8]) -> Result<Self, EnvelopeError> {
		match split_type_id(bytes)? {
			(None, payload) => Ok(Self::Legacy(LegacyEnvelope::decode_payload(payload)?)),
			(Some(EIP1559_TYPE_ID), payload) => {
				Ok(Self::EIP1559(EIP1559Envelope::decode_payload(payload)?))
			}
			(Some(EIP7702_TYPE_ID), payload) => {
				Ok(Self::EIP7702(EIP7702Envelope::decode_payload(payload)?))
			}
			(Some(other), _) => Err(EnvelopeError::UnsupportedTransactionType(other)),
		}
	}
}

impl fmt::Display for TransactionEnvelope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Legacy(tx) => fmt::Display::fmt(tx, f),
			Self::EIP1559(tx) => fmt::Display::fmt(tx, f),
			Self::EIP7702(tx) => fmt::Display::fmt(tx, f),
		}
	}
}

impl From<LegacyEnvelope> for TransactionEnvelope {
	fn from(tx: LegacyEnvelope) -> Self {
		TransactionEnvelope::Legacy(tx)
	}
}

impl From<EIP1559Envelope> for TransactionEnvelope {
	fn from(tx: EIP1559Envelope) -> Self {
		TransactionEnvelope::EIP1559(tx)
	}
}

impl From<EIP7702Envelope> for TransactionEnvelope {
	fn from(tx: EIP7702Envelope) -> Self {
		TransactionEnvelope::EIP7702(tx)
	}
}

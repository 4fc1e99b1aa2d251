use alloc::{string::String, string::ToString, vec::Vec};
use core::fmt;

use bytes::BytesMut;

use crate::{
	enveloped::{EnvelopeError, EnvelopedDecodable, EnvelopedEncodable, Structure},
	rlp_item::RlpItem,
	transaction::split_type_id,
	util::HexBytes,
};

/// Pre EIP-2718 transaction: a bare nine element list with no type byte.
///
/// `v` carries the recovery id, with the chain id folded in for EIP-155
/// signatures. Nothing is interpreted; fields hold their wire bytes.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LegacyEnvelope {
	pub nonce: Vec<u8>,
	pub gas_price: Vec<u8>,
	pub gas_limit: Vec<u8>,
	pub to: Vec<u8>,
	pub value: Vec<u8>,
	pub call_data: Vec<u8>,
	pub v: Vec<u8>,
	pub r: Vec<u8>,
	pub s: Vec<u8>,
}

impl LegacyEnvelope {
	pub(crate) fn decode_payload(payload: &[u8]) -> Result<Self, EnvelopeError> {
		Self::from_rlp(RlpItem::parse(payload)?)
	}

	fn from_rlp(item: RlpItem) -> Result<Self, EnvelopeError> {
		let [nonce, gas_price, gas_limit, to, value, call_data, v, r, s] =
			item.into_fields::<9>(Structure::Envelope)?;

		Ok(Self {
			nonce: nonce.into_field("nonce")?,
			gas_price: gas_price.into_field("gasPrice")?,
			gas_limit: gas_limit.into_field("gasLimit")?,
			to: to.into_field("to")?,
			value: value.into_field("value")?,
			call_data: call_data.into_field("callData")?,
			v: v.into_field("v")?,
			r: r.into_field("r")?,
			s: s.into_field("s")?,
		})
	}

	fn to_rlp(&self) -> RlpItem {
		RlpItem::List(alloc::vec![
			self.nonce.as_slice().into(),
			self.gas_price.as_slice().into(),
			self.gas_limit.as_slice().into(),
			self.to.as_slice().into(),
			self.value.as_slice().into(),
			self.call_data.as_slice().into(),
			self.v.as_slice().into(),
			self.r.as_slice().into(),
			self.s.as_slice().into(),
		])
	}

	pub fn format_diagnostic(&self) -> String {
		self.to_string()
	}
}

impl EnvelopedEncodable for LegacyEnvelope {
	fn type_id(&self) -> Option<u8> {
		None
	}

	fn encode_payload(&self) -> Result<BytesMut, EnvelopeError> {
		Ok(self.to_rlp().serialize())
	}
}

impl EnvelopedDecodable for LegacyEnvelope {
	fn decode(bytes: &[u8]) -> Result<Self, EnvelopeError> {
		match split_type_id(bytes)? {
			(None, payload) => Self::decode_payload(payload),
			(Some(type_id), _) => Err(EnvelopeError::UnsupportedTransactionType(type_id)),
		}
	}
}

impl fmt::Display for LegacyEnvelope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LegacyEnvelope")
			.field("nonce", &HexBytes(&self.nonce))
			.field("gas_price", &HexBytes(&self.gas_price))
			.field("gas_limit", &HexBytes(&self.gas_limit))
			.field("to", &HexBytes(&self.to))
			.field("value", &HexBytes(&self.value))
			.field("call_data", &HexBytes(&self.call_data))
			.field("v", &HexBytes(&self.v))
			.field("r", &HexBytes(&self.r))
			.field("s", &HexBytes(&self.s))
			.finish()
	}
}

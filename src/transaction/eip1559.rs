use alloc::{string::String, string::ToString, vec::Vec};
use core::fmt;

use bytes::BytesMut;

use crate::{
	enveloped::{
		EnvelopeError, EnvelopedDecodable, EnvelopedEncodable, Malformed, Structure,
	},
	rlp_item::RlpItem,
	transaction::{eip7702::access_list_from_rlp, split_type_id, AccessListEntry},
	util::HexBytes,
};

pub const EIP1559_TYPE_ID: u8 = 0x02;

/// Transaction in the EIP-1559 (dynamic fee) format, type `0x02`.
///
/// The access list is not destructured: `access_list` holds the payload of
/// that RLP list with the list header stripped, and is written back verbatim
/// under a fresh header. An empty access list is an empty vector.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EIP1559Envelope {
	pub chain_id: Vec<u8>,
	pub nonce: Vec<u8>,
	pub max_priority_gas: Vec<u8>,
	pub max_gas: Vec<u8>,
	pub gas_limit: Vec<u8>,
	pub to: Vec<u8>,
	pub value: Vec<u8>,
	pub call_data: Vec<u8>,
	pub access_list: Vec<u8>,
	pub recovery_id: Vec<u8>,
	pub r: Vec<u8>,
	pub s: Vec<u8>,
}

impl EIP1559Envelope {
	pub(crate) fn decode_payload(payload: &[u8]) -> Result<Self, EnvelopeError> {
		Self::from_rlp(RlpItem::parse(payload)?)
	}

	fn from_rlp(item: RlpItem) -> Result<Self, EnvelopeError> {
		let [
			chain_id,
			nonce,
			max_priority_gas,
			max_gas,
			gas_limit,
			to,
			value,
			call_data,
			access_list,
			recovery_id,
			r,
			s,
		] = item.into_fields::<12>(Structure::Envelope)?;

		let access_list = RlpItem::list_payload(&access_list.into_list(Structure::AccessList)?);

		Ok(Self {
			chain_id: chain_id.into_field("chainId")?,
			nonce: nonce.into_field("nonce")?,
			max_priority_gas: max_priority_gas.into_field("maxPriorityGas")?,
			max_gas: max_gas.into_field("maxGas")?,
			gas_limit: gas_limit.into_field("gasLimit")?,
			to: to.into_field("to")?,
			value: value.into_field("value")?,
			call_data: call_data.into_field("callData")?,
			access_list,
			recovery_id: recovery_id.into_field("recoveryId")?,
			r: r.into_field("r")?,
			s: s.into_field("s")?,
		})
	}

	/// The stored access list payload wrapped back into an RLP list.
	fn access_list_item(&self) -> Result<RlpItem, EnvelopeError> {
		RlpItem::parse_list_payload(&self.access_list, Structure::AccessList).map_err(|_| {
			EnvelopeError::InvalidEnvelopeState("access list must hold a run of RLP items")
		})
	}

	/// Destructure the opaque access list payload into entries.
	pub fn access_list_entries(&self) -> Result<Vec<AccessListEntry>, EnvelopeError> {
		access_list_from_rlp(RlpItem::parse_list_payload(
			&self.access_list,
			Structure::AccessList,
		)?)
	}

	fn to_rlp(&self) -> Result<RlpItem, EnvelopeError> {
		Ok(RlpItem::List(alloc::vec![
			self.chain_id.as_slice().into(),
			self.nonce.as_slice().into(),
			self.max_priority_gas.as_slice().into(),
			self.max_gas.as_slice().into(),
			self.gas_limit.as_slice().into(),
			self.to.as_slice().into(),
			self.value.as_slice().into(),
			self.call_data.as_slice().into(),
			self.access_list_item()?,
			self.recovery_id.as_slice().into(),
			self.r.as_slice().into(),
			self.s.as_slice().into(),
		]))
	}

	pub fn format_diagnostic(&self) -> String {
		self.to_string()
	}
}

impl EnvelopedEncodable for EIP1559Envelope {
	fn type_id(&self) -> Option<u8> {
		Some(EIP1559_TYPE_ID)
	}

	fn encode_payload(&self) -> Result<BytesMut, EnvelopeError> {
		Ok(self.to_rlp()?.serialize())
	}
}

impl EnvelopedDecodable for EIP1559Envelope {
	fn decode(bytes: &[u8]) -> Result<Self, EnvelopeError> {
		match split_type_id(bytes)? {
			(Some(EIP1559_TYPE_ID), payload) => Self::decode_payload(payload),
			(Some(other), _) => Err(EnvelopeError::UnsupportedTransactionType(other)),
			(None, _) => Err(EnvelopeError::malformed(
				Structure::Envelope,
				Malformed::ExpectedTypeByte,
			)),
		}
	}
}

impl fmt::Display for EIP1559Envelope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EIP1559Envelope")
			.field("chain_id", &HexBytes(&self.chain_id))
			.field("nonce", &HexBytes(&self.nonce))
			.field("max_priority_gas", &HexBytes(&self.max_priority_gas))
			.field("max_gas", &HexBytes(&self.max_gas))
			.field("gas_limit", &HexBytes(&self.gas_limit))
			.field("to", &HexBytes(&self.to))
			.field("value", &HexBytes(&self.value))
			.field("call_data", &HexBytes(&self.call_data))
			.field("access_list", &HexBytes(&self.access_list))
			.field("recovery_id", &HexBytes(&self.recovery_id))
			.field("r", &HexBytes(&self.r))
			.field("s", &HexBytes(&self.s))
			.finish()
	}
}

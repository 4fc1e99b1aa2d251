use alloc::{string::String, string::ToString, vec::Vec};
use core::fmt;

use bytes::BytesMut;

use crate::{
	enveloped::{
		EnvelopeError, EnvelopedDecodable, EnvelopedEncodable, Malformed, Structure,
	},
	rlp_item::RlpItem,
	transaction::split_type_id,
	util::{DisplayList, HexBytes, HexList},
};

pub const EIP7702_TYPE_ID: u8 = 0x04;

/// State an EIP-2930 style access list declares: an address and the storage
/// keys touched under it.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccessListEntry {
	pub address: Vec<u8>,
	pub storage_keys: Vec<Vec<u8>>,
}

impl AccessListEntry {
	pub fn new(address: Vec<u8>, storage_keys: Vec<Vec<u8>>) -> Self {
		Self {
			address,
			storage_keys,
		}
	}

	fn from_rlp(item: RlpItem) -> Result<Self, EnvelopeError> {
		let [address, storage_keys] = item.into_fields::<2>(Structure::AccessListEntry)?;

		Ok(Self {
			address: address.into_field("address")?,
			storage_keys: storage_keys
				.into_list(Structure::StorageKeys)?
				.into_iter()
				.map(|key| key.into_field("storageKey"))
				.collect::<Result<Vec<_>, _>>()?,
		})
	}

	fn to_rlp(&self) -> RlpItem {
		RlpItem::List(alloc::vec![
			self.address.as_slice().into(),
			RlpItem::List(
				self.storage_keys
					.iter()
					.map(|key| key.as_slice().into())
					.collect()
			),
		])
	}

	pub fn format_diagnostic(&self) -> String {
		self.to_string()
	}
}

impl fmt::Display for AccessListEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AccessListEntry")
			.field("address", &HexBytes(&self.address))
			.field("storage_keys", &HexList(&self.storage_keys))
			.finish()
	}
}

/// Signed delegation record carried in an EIP-7702 authorization list.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuthorizationTuple {
	pub chain_id: Vec<u8>,
	pub address: Vec<u8>,
	pub nonce: Vec<u8>,
	pub y_parity: Vec<u8>,
	pub r: Vec<u8>,
	pub s: Vec<u8>,
}

impl AuthorizationTuple {
	fn from_rlp(item: RlpItem) -> Result<Self, EnvelopeError> {
		let [chain_id, address, nonce, y_parity, r, s] =
			item.into_fields::<6>(Structure::AuthorizationTuple)?;

		Ok(Self {
			chain_id: chain_id.into_field("chainId")?,
			address: address.into_field("address")?,
			nonce: nonce.into_field("nonce")?,
			y_parity: y_parity.into_field("yParity")?,
			r: r.into_field("r")?,
			s: s.into_field("s")?,
		})
	}

	fn to_rlp(&self) -> RlpItem {
		RlpItem::List(alloc::vec![
			self.chain_id.as_slice().into(),
			self.address.as_slice().into(),
			self.nonce.as_slice().into(),
			self.y_parity.as_slice().into(),
			self.r.as_slice().into(),
			self.s.as_slice().into(),
		])
	}

	pub fn format_diagnostic(&self) -> String {
		self.to_string()
	}
}

impl fmt::Display for AuthorizationTuple {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AuthorizationTuple")
			.field("chain_id", &HexBytes(&self.chain_id))
			.field("address", &HexBytes(&self.address))
			.field("nonce", &HexBytes(&self.nonce))
			.field("y_parity", &HexBytes(&self.y_parity))
			.field("r", &HexBytes(&self.r))
			.field("s", &HexBytes(&self.s))
			.finish()
	}
}

/// Decode an access list item (a list of `[address, [storageKey, ...]]`).
pub(crate) fn access_list_from_rlp(item: RlpItem) -> Result<Vec<AccessListEntry>, EnvelopeError> {
	item.into_list(Structure::AccessList)?
		.into_iter()
		.map(AccessListEntry::from_rlp)
		.collect()
}

pub(crate) fn access_list_to_rlp(entries: &[AccessListEntry]) -> RlpItem {
	RlpItem::List(entries.iter().map(AccessListEntry::to_rlp).collect())
}

fn authorization_list_from_rlp(item: RlpItem) -> Result<Vec<AuthorizationTuple>, EnvelopeError> {
	item.into_list(Structure::AuthorizationList)?
		.into_iter()
		.map(AuthorizationTuple::from_rlp)
		.collect()
}

const EMPTY_AUTHORIZATION_LIST: &str = "authorization list must not be empty";

/// Transaction in the EIP-7702 (set code) format, type `0x04`.
///
/// Every scalar is kept as the raw byte string found on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EIP7702Envelope {
	pub chain_id: Vec<u8>,
	pub nonce: Vec<u8>,
	pub max_priority_fee_per_gas: Vec<u8>,
	pub max_fee_per_gas: Vec<u8>,
	pub gas_limit: Vec<u8>,
	pub to: Vec<u8>,
	pub value: Vec<u8>,
	pub call_data: Vec<u8>,
	pub access_list: Vec<AccessListEntry>,
	/// Must hold at least one tuple, checked on decode and on encode.
	pub authorization_list: Vec<AuthorizationTuple>,
	pub signature_y_parity: Vec<u8>,
	pub r: Vec<u8>,
	pub s: Vec<u8>,
}

impl EIP7702Envelope {
	pub(crate) fn decode_payload(payload: &[u8]) -> Result<Self, EnvelopeError> {
		Self::from_rlp(RlpItem::parse(payload)?)
	}

	fn from_rlp(item: RlpItem) -> Result<Self, EnvelopeError> {
		let [
			chain_id,
			nonce,
			max_priority_fee_per_gas,
			max_fee_per_gas,
			gas_limit,
			to,
			value,
			call_data,
			access_list,
			authorization_list,
			signature_y_parity,
			r,
			s,
		] = item.into_fields::<13>(Structure::Envelope)?;

		let access_list = access_list_from_rlp(access_list)?;
		let authorization_list = authorization_list_from_rlp(authorization_list)?;
		if authorization_list.is_empty() {
			return Err(EnvelopeError::InvalidEnvelopeState(
				EMPTY_AUTHORIZATION_LIST,
			));
		}

		Ok(Self {
			chain_id: chain_id.into_field("chainId")?,
			nonce: nonce.into_field("nonce")?,
			max_priority_fee_per_gas: max_priority_fee_per_gas
				.into_field("maxPriorityFeePerGas")?,
			max_fee_per_gas: max_fee_per_gas.into_field("maxFeePerGas")?,
			gas_limit: gas_limit.into_field("gasLimit")?,
			to: to.into_field("to")?,
			value: value.into_field("value")?,
			call_data: call_data.into_field("callData")?,
			access_list,
			authorization_list,
			signature_y_parity: signature_y_parity.into_field("signatureYParity")?,
			r: r.into_field("r")?,
			s: s.into_field("s")?,
		})
	}

	fn to_rlp(&self) -> Result<RlpItem, EnvelopeError> {
		if self.authorization_list.is_empty() {
			return Err(EnvelopeError::InvalidEnvelopeState(
				EMPTY_AUTHORIZATION_LIST,
			));
		}

		Ok(RlpItem::List(alloc::vec![
			self.chain_id.as_slice().into(),
			self.nonce.as_slice().into(),
			self.max_priority_fee_per_gas.as_slice().into(),
			self.max_fee_per_gas.as_slice().into(),
			self.gas_limit.as_slice().into(),
			self.to.as_slice().into(),
			self.value.as_slice().into(),
			self.call_data.as_slice().into(),
			access_list_to_rlp(&self.access_list),
			RlpItem::List(
				self.authorization_list
					.iter()
					.map(AuthorizationTuple::to_rlp)
					.collect()
			),
			self.signature_y_parity.as_slice().into(),
			self.r.as_slice().into(),
			self.s.as_slice().into(),
		]))
	}

	pub fn format_diagnostic(&self) -> String {
		self.to_string()
	}
}

impl EnvelopedEncodable for EIP7702Envelope {
	fn type_id(&self) -> Option<u8> {
		Some(EIP7702_TYPE_ID)
	}

	fn encode_payload(&self) -> Result<BytesMut, EnvelopeError> {
		Ok(self.to_rlp()?.serialize())
	}
}

impl EnvelopedDecodable for EIP7702Envelope {
	fn decode(bytes: &[u8]) -> Result<Self, EnvelopeError> {
		match split_type_id(bytes)? {
			(Some(EIP7702_TYPE_ID), payload) => Self::decode_payload(payload),
			(Some(other), _) => Err(EnvelopeError::UnsupportedTransactionType(other)),
			(None, _) => Err(EnvelopeError::malformed(
				Structure::Envelope,
				Malformed::ExpectedTypeByte,
			)),
		}
	}
}

impl fmt::Display for EIP7702Envelope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EIP7702Envelope")
			.field("chain_id", &HexBytes(&self.chain_id))
			.field("nonce", &HexBytes(&self.nonce))
			.field(
				"max_priority_fee_per_gas",
				&HexBytes(&self.max_priority_fee_per_gas),
			)
			.field("max_fee_per_gas", &HexBytes(&self.max_fee_per_gas))
			.field("gas_limit", &HexBytes(&self.gas_limit))
			.field("to", &HexBytes(&self.to))
			.field("value", &HexBytes(&self.value))
			.field("call_data", &HexBytes(&self.call_data))
			.field("access_list", &DisplayList(&self.access_list))
			.field(
				"authorization_list",
				&DisplayList(&self.authorization_list),
			)
			.field("signature_y_parity", &HexBytes(&self.signature_y_parity))
			.field("r", &HexBytes(&self.r))
			.field("s", &HexBytes(&self.s))
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloc::vec;
	use hex_literal::hex;
	use test_case::test_case;

	const RAW_TX_TYPE_4: &[u8] = &hex!("04f9010a82012a032f3083018000947e3a9eaf9bcc39e2ffa38eb30bf7a93feacbc181880de0b6b3a76400008412345678f838f794aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaae1a0bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbf85ef85c82012a94cccccccccccccccccccccccccccccccccccccccc0101a01111111111111111111111111111111111111111111111111111111111111111a0222222222222222222222222222222222222222222222222222222222222222201a03333333333333333333333333333333333333333333333333333333333333333a04444444444444444444444444444444444444444444444444444444444444444");

	fn fixture() -> EIP7702Envelope {
		EIP7702Envelope {
			chain_id: hex!("012a").to_vec(),
			nonce: hex!("03").to_vec(),
			max_priority_fee_per_gas: hex!("2f").to_vec(),
			max_fee_per_gas: hex!("30").to_vec(),
			gas_limit: hex!("018000").to_vec(),
			to: hex!("7e3a9eaf9bcc39e2ffa38eb30bf7a93feacbc181").to_vec(),
			value: hex!("0de0b6b3a7640000").to_vec(),
			call_data: hex!("12345678").to_vec(),
			access_list: vec![AccessListEntry::new(
				vec![0xaa; 20],
				vec![vec![0xbb; 32]],
			)],
			authorization_list: vec![AuthorizationTuple {
				chain_id: hex!("012a").to_vec(),
				address: vec![0xcc; 20],
				nonce: hex!("01").to_vec(),
				y_parity: hex!("01").to_vec(),
				r: vec![0x11; 32],
				s: vec![0x22; 32],
			}],
			signature_y_parity: hex!("01").to_vec(),
			r: vec![0x33; 32],
			s: vec![0x44; 32],
		}
	}

	#[test]
	fn decodes_fixture() {
		let tx = EIP7702Envelope::decode(RAW_TX_TYPE_4).unwrap();

		assert_eq!(tx, fixture());
		assert_eq!(&tx.encode().unwrap()[..], RAW_TX_TYPE_4);
	}

	#[test]
	fn encodes_fixture() {
		assert_eq!(&fixture().encode().unwrap()[..], RAW_TX_TYPE_4);
	}

	#[test]
	fn access_list_region_round_trips() {
		let region = hex!("f838f794aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaae1a0bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
		let entries = access_list_from_rlp(RlpItem::parse(&region).unwrap()).unwrap();

		assert_eq!(
			entries,
			vec![AccessListEntry::new(vec![0xaa; 20], vec![vec![0xbb; 32]])]
		);
		assert_eq!(&access_list_to_rlp(&entries).serialize()[..], &region[..]);
	}

	#[test]
	fn rejects_empty_authorization_list_on_encode() {
		let mut tx = fixture();
		tx.authorization_list.clear();

		assert_eq!(
			tx.encode(),
			Err(EnvelopeError::InvalidEnvelopeState(EMPTY_AUTHORIZATION_LIST))
		);
	}

	#[test]
	fn rejects_empty_authorization_list_on_decode() {
		let bytes = hex!("04f8ab82012a032f3083018000947e3a9eaf9bcc39e2ffa38eb30bf7a93feacbc181880de0b6b3a76400008412345678f838f794aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaae1a0bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbc001a03333333333333333333333333333333333333333333333333333333333333333a04444444444444444444444444444444444444444444444444444444444444444");

		assert_eq!(
			EIP7702Envelope::decode(&bytes),
			Err(EnvelopeError::InvalidEnvelopeState(EMPTY_AUTHORIZATION_LIST))
		);
	}

	#[test_case(12 ; "one field short")]
	#[test_case(14 ; "one field extra")]
	fn rejects_wrong_field_count(count: usize) {
		let mut fields = fixture().to_rlp().unwrap().as_list().unwrap().to_vec();
		fields.resize(count, RlpItem::Bytes(vec![]));

		let mut bytes = vec![EIP7702_TYPE_ID];
		bytes.extend_from_slice(&RlpItem::List(fields).serialize());

		assert_eq!(
			EIP7702Envelope::decode(&bytes),
			Err(EnvelopeError::malformed(
				Structure::Envelope,
				Malformed::ListLength {
					expected: 13,
					actual: count
				}
			))
		);
	}

	#[test]
	fn rejects_short_access_list_entry() {
		let mut fields = fixture().to_rlp().unwrap().as_list().unwrap().to_vec();
		fields[8] = RlpItem::List(vec![RlpItem::List(vec![vec![0xaa; 20].into()])]);

		assert_eq!(
			EIP7702Envelope::from_rlp(RlpItem::List(fields)),
			Err(EnvelopeError::malformed(
				Structure::AccessListEntry,
				Malformed::ListLength {
					expected: 2,
					actual: 1
				}
			))
		);
	}

	#[test]
	fn rejects_long_authorization_tuple() {
		let mut fields = fixture().to_rlp().unwrap().as_list().unwrap().to_vec();
		let mut tuple = fixture().authorization_list[0].to_rlp().as_list().unwrap().to_vec();
		tuple.push(RlpItem::Bytes(vec![]));
		fields[9] = RlpItem::List(vec![RlpItem::List(tuple)]);

		assert_eq!(
			EIP7702Envelope::from_rlp(RlpItem::List(fields)),
			Err(EnvelopeError::malformed(
				Structure::AuthorizationTuple,
				Malformed::ListLength {
					expected: 6,
					actual: 7
				}
			))
		);
	}

	#[test]
	fn rejects_scalar_in_list_position() {
		let mut fields = fixture().to_rlp().unwrap().as_list().unwrap().to_vec();
		fields[9] = RlpItem::Bytes(vec![0x01]);

		assert_eq!(
			EIP7702Envelope::from_rlp(RlpItem::List(fields)),
			Err(EnvelopeError::malformed(
				Structure::AuthorizationList,
				Malformed::ExpectedList
			))
		);
	}

	#[test]
	fn rejects_scalar_access_list() {
		let mut fields = fixture().to_rlp().unwrap().as_list().unwrap().to_vec();
		fields[8] = RlpItem::Bytes(vec![0x01]);

		assert_eq!(
			EIP7702Envelope::from_rlp(RlpItem::List(fields)),
			Err(EnvelopeError::malformed(
				Structure::AccessList,
				Malformed::ExpectedList
			))
		);
	}

	#[test]
	fn rejects_scalar_storage_keys() {
		let mut fields = fixture().to_rlp().unwrap().as_list().unwrap().to_vec();
		fields[8] = RlpItem::List(vec![RlpItem::List(vec![
			vec![0xaa; 20].into(),
			vec![0xbb; 32].into(),
		])]);

		assert_eq!(
			EIP7702Envelope::from_rlp(RlpItem::List(fields)),
			Err(EnvelopeError::malformed(
				Structure::StorageKeys,
				Malformed::ExpectedList
			))
		);
	}

	#[test]
	fn rejects_list_in_scalar_position() {
		let mut fields = fixture().to_rlp().unwrap().as_list().unwrap().to_vec();
		fields[5] = RlpItem::List(vec![]);

		assert_eq!(
			EIP7702Envelope::from_rlp(RlpItem::List(fields)),
			Err(EnvelopeError::malformed(
				Structure::Field("to"),
				Malformed::ExpectedBytes
			))
		);
	}

	#[test]
	fn rejects_other_type_bytes() {
		let mut bytes = RAW_TX_TYPE_4.to_vec();
		bytes[0] = 0x02;

		assert_eq!(
			EIP7702Envelope::decode(&bytes),
			Err(EnvelopeError::UnsupportedTransactionType(0x02))
		);
	}

	#[test]
	fn rejects_scalar_body() {
		assert_eq!(
			EIP7702Envelope::decode(&[0x04, 0x01]),
			Err(EnvelopeError::malformed(
				Structure::Envelope,
				Malformed::ExpectedList
			))
		);
	}

	#[test]
	fn diagnostic_is_lowercase_hex() {
		let text = fixture().format_diagnostic();

		assert!(text.starts_with("EIP7702Envelope { chain_id: 012a, nonce: 03,"));
		assert!(text.contains(
			"access_list: [AccessListEntry { address: aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa, storage_keys: [bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb] }]"
		));
		assert!(text.contains("AuthorizationTuple { chain_id: 012a, address: cccccccccccccccccccccccccccccccccccccccc, nonce: 01, y_parity: 01,"));
		assert!(text.ends_with("s: 4444444444444444444444444444444444444444444444444444444444444444 }"));
	}
}

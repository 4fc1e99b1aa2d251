//! Generic RLP tree used as the intermediate form of every envelope.
//!
//! Envelope variants never touch raw RLP bytes directly: decoding parses the
//! payload into an [`RlpItem`] and maps positional items onto typed fields,
//! encoding builds an [`RlpItem`] from the fields and serializes it.

use alloc::vec::Vec;

use bytes::BytesMut;
use rlp::{DecoderError, Rlp, RlpStream};

use crate::enveloped::{EnvelopeError, Malformed, Structure};

/// Deeper nesting than this is rejected instead of recursing further.
const MAX_DEPTH: usize = 64;

/// A byte string or an ordered list of items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RlpItem {
	Bytes(Vec<u8>),
	List(Vec<RlpItem>),
}

impl RlpItem {
	/// Parse exactly one item spanning all of `bytes`.
	///
	/// Parsing is strict: non-canonical length prefixes, single bytes below
	/// `0x80` wrapped in a string header, truncated input and trailing bytes
	/// are all rejected, so serializing the result reproduces `bytes`.
	pub fn parse(bytes: &[u8]) -> Result<Self, EnvelopeError> {
		Self::parse_in(bytes, Structure::Envelope)
	}

	pub(crate) fn parse_in(bytes: &[u8], structure: Structure) -> Result<Self, EnvelopeError> {
		let (item, consumed) = Self::parse_prefix(bytes)
			.map_err(|reason| EnvelopeError::malformed(structure, reason))?;

		if consumed != bytes.len() {
			return Err(EnvelopeError::malformed(
				structure,
				Malformed::TrailingBytes(bytes.len() - consumed),
			));
		}

		Ok(item)
	}

	/// Parse the first item of `bytes`, returning it along with the number of
	/// bytes it occupies.
	pub(crate) fn parse_prefix(bytes: &[u8]) -> Result<(Self, usize), Malformed> {
		Self::parse_at_depth(bytes, 0)
	}

	fn parse_at_depth(bytes: &[u8], depth: usize) -> Result<(Self, usize), Malformed> {
		if bytes.is_empty() {
			return Err(Malformed::Empty);
		}
		if depth > MAX_DEPTH {
			return Err(Malformed::Rlp(DecoderError::Custom("nesting too deep")));
		}

		let info = Rlp::new(bytes).payload_info().map_err(Malformed::Rlp)?;
		let total = info
			.header_len
			.checked_add(info.value_len)
			.filter(|total| *total <= bytes.len())
			.ok_or(Malformed::Rlp(DecoderError::RlpIsTooShort))?;
		let payload = &bytes[info.header_len..total];

		if bytes[0] >= 0xc0 {
			let items = Self::parse_items_at_depth(payload, depth + 1)?;
			return Ok((Self::List(items), total));
		}

		// `0x81 0x05` must have been written as `0x05`.
		if info.header_len == 1 && payload.len() == 1 && payload[0] < 0x80 {
			return Err(Malformed::Rlp(DecoderError::RlpInvalidIndirection));
		}

		Ok((Self::Bytes(payload.to_vec()), total))
	}

	fn parse_items_at_depth(mut bytes: &[u8], depth: usize) -> Result<Vec<Self>, Malformed> {
		let mut items = Vec::new();
		while !bytes.is_empty() {
			let (item, consumed) = Self::parse_at_depth(bytes, depth)?;
			items.push(item);
			bytes = &bytes[consumed..];
		}
		Ok(items)
	}

	/// Parse the payload of a list with its header stripped, that is a run of
	/// concatenated items.
	pub(crate) fn parse_list_payload(
		bytes: &[u8],
		structure: Structure,
	) -> Result<Self, EnvelopeError> {
		Self::parse_items_at_depth(bytes, 1)
			.map(Self::List)
			.map_err(|reason| EnvelopeError::malformed(structure, reason))
	}

	/// Encoding of the items of a list without the list header.
	pub(crate) fn list_payload(items: &[Self]) -> Vec<u8> {
		let mut out = Vec::new();
		for item in items {
			out.extend_from_slice(&item.serialize());
		}
		out
	}

	/// Canonical RLP encoding of this item.
	pub fn serialize(&self) -> BytesMut {
		rlp::encode(self)
	}

	pub fn as_bytes(&self) -> Option<&[u8]> {
		match self {
			Self::Bytes(bytes) => Some(bytes),
			Self::List(_) => None,
		}
	}

	pub fn as_list(&self) -> Option<&[RlpItem]> {
		match self {
			Self::Bytes(_) => None,
			Self::List(items) => Some(items),
		}
	}

	pub fn is_list(&self) -> bool {
		matches!(self, Self::List(_))
	}

	/// Take the byte string of a scalar field named `name`.
	pub(crate) fn into_field(self, name: &'static str) -> Result<Vec<u8>, EnvelopeError> {
		match self {
			Self::Bytes(bytes) => Ok(bytes),
			Self::List(_) => Err(EnvelopeError::malformed(
				Structure::Field(name),
				Malformed::ExpectedBytes,
			)),
		}
	}

	pub(crate) fn into_list(self, structure: Structure) -> Result<Vec<RlpItem>, EnvelopeError> {
		match self {
			Self::List(items) => Ok(items),
			Self::Bytes(_) => Err(EnvelopeError::malformed(structure, Malformed::ExpectedList)),
		}
	}

	/// Take a list of exactly `N` items.
	pub(crate) fn into_fields<const N: usize>(
		self,
		structure: Structure,
	) -> Result<[RlpItem; N], EnvelopeError> {
		let items = self.into_list(structure)?;
		let actual = items.len();

		items.try_into().map_err(|_| {
			EnvelopeError::malformed(structure, Malformed::ListLength { expected: N, actual })
		})
	}
}

impl rlp::Encodable for RlpItem {
	fn rlp_append(&self, s: &mut RlpStream) {
		match self {
			Self::Bytes(bytes) => s.encoder().encode_value(bytes),
			Self::List(items) => {
				s.begin_list(items.len());
				for item in items {
					s.append(item);
				}
			}
		}
	}
}

impl From<Vec<u8>> for RlpItem {
	fn from(bytes: Vec<u8>) -> Self {
		Self::Bytes(bytes)
	}
}

impl From<&[u8]> for RlpItem {
	fn from(bytes: &[u8]) -> Self {
		Self::Bytes(bytes.to_vec())
	}
}

impl From<Vec<RlpItem>> for RlpItem {
	fn from(items: Vec<RlpItem>) -> Self {
		Self::List(items)
	}
}

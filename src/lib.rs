//! Lossless codec for Ethereum transaction envelopes.
//!
//! Decodes legacy, EIP-1559 (`0x02`) and EIP-7702 (`0x04`) transactions into
//! typed values holding the raw wire bytes of every field, and encodes them
//! back. For every well-formed input `encode(decode(bytes)) == bytes`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod enveloped;
mod rlp_item;
mod transaction;
mod util;

pub use enveloped::{
	EnvelopeError, EnvelopedDecodable, EnvelopedEncodable, Malformed, Structure,
};
pub use rlp_item::RlpItem;
pub use transaction::{
	AccessListEntry, AuthorizationTuple, EIP1559Envelope, EIP7702Envelope, LegacyEnvelope,
	TransactionEnvelope, EIP1559_TYPE_ID, EIP7702_TYPE_ID,
};
pub use util::HexBytes;

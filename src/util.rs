//! Hex rendering helpers for diagnostic output.

use alloc::vec::Vec;
use core::fmt;

/// Renders a byte string as lowercase hex without a `0x` prefix.
#[derive(Clone, Copy)]
pub struct HexBytes<'a>(pub &'a [u8]);

impl fmt::Display for HexBytes<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&hex::encode(self.0))
	}
}

impl fmt::Debug for HexBytes<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(self, f)
	}
}

/// Renders a list of byte strings as `[hex, hex, ...]`.
pub(crate) struct HexList<'a>(pub &'a [Vec<u8>]);

impl fmt::Debug for HexList<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list()
			.entries(self.0.iter().map(|bytes| HexBytes(bytes)))
			.finish()
	}
}

/// Renders a list of values through their `Display` impls.
pub(crate) struct DisplayList<'a, T>(pub &'a [T]);

impl<T: fmt::Display> fmt::Debug for DisplayList<'_, T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list()
			.entries(self.0.iter().map(Shown))
			.finish()
	}
}

struct Shown<T>(T);

impl<T: fmt::Display> fmt::Debug for Shown<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&self.0, f)
	}
}

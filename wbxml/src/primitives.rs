/*!
# Primitive wire constructs

Byte-level building blocks of the WBXML grammar: single bytes, multi-byte
unsigned integers (`mb_u_int32` and friends), NUL-terminated strings and
length-prefixed byte runs.

Multi-byte unsigned integers are base-128, big-endian: every byte
contributes its low seven bits, most significant group first, and a set
high bit means that another byte follows.
*/
use std::io;

use crate::error::*;

/// Reader wrapper counting the bytes consumed so far.
///
/// The position is a "dumb" counter of size [`usize`] which may wrap
/// around on some architectures with sufficiently long-running streams.
/// It exists for error diagnostics, not for accounting.
pub(crate) struct CountingReader<T> {
	inner: T,
	position: usize,
}

impl<T: io::Read> CountingReader<T> {
	pub(crate) fn new(inner: T) -> Self {
		Self {
			inner,
			position: 0,
		}
	}

	/// Number of bytes consumed from the underlying reader.
	pub(crate) fn position(&self) -> usize {
		self.position
	}

	pub(crate) fn get_ref(&self) -> &T {
		&self.inner
	}

	pub(crate) fn get_mut(&mut self) -> &mut T {
		&mut self.inner
	}

	pub(crate) fn into_inner(self) -> T {
		self.inner
	}
}

impl<T: io::Read> io::Read for CountingReader<T> {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		let n = self.inner.read(buf)?;
		self.position = self.position.wrapping_add(n);
		Ok(n)
	}
}

fn eof_to_error(e: io::Error, ctx: &'static str) -> Error {
	if e.kind() == io::ErrorKind::UnexpectedEof {
		Error::UnexpectedEof(ctx)
	} else {
		Error::io(e)
	}
}

/// Read a single byte.
pub fn read_u8<R: io::Read>(r: &mut R, ctx: &'static str) -> Result<u8> {
	let mut buf = [0u8; 1];
	match r.read_exact(&mut buf) {
		Ok(()) => Ok(buf[0]),
		Err(e) => Err(eof_to_error(e, ctx)),
	}
}

/// Write a single byte.
pub fn write_u8<W: io::Write>(w: &mut W, b: u8) -> Result<()> {
	w.write_all(&[b])?;
	Ok(())
}

/// Read a multi-byte unsigned integer of at most `max` bytes.
///
/// `max` must be between 1 and 9; with `max == 9` the result uses the
/// full 63 bits such an encoding can carry. If the last permitted byte
/// still has its continuation bit set, the integer is malformed.
pub fn read_mbu<R: io::Read>(r: &mut R, max: usize, ctx: &'static str) -> Result<u64> {
	debug_assert!(max >= 1 && max <= 9);
	let mut result = 0u64;
	for _ in 0..max {
		let b = read_u8(r, ctx)?;
		result = (result << 7) | u64::from(b & 0x7f);
		if b & 0x80 == 0 {
			return Ok(result);
		}
	}
	Err(Error::Format("multi-byte integer longer than its allowed width"))
}

/// Read a `mb_u_int32` as used in all grammar positions.
pub fn read_mbu32<R: io::Read>(r: &mut R, ctx: &'static str) -> Result<u32> {
	Ok(read_mbu(r, 4, ctx)? as u32)
}

/// Write a multi-byte unsigned integer using at most `max` bytes.
///
/// The minimum number of seven-bit groups is emitted; a zero value emits
/// exactly one zero byte. Values which need more than `max` groups fail
/// with [`Error::Overflow`].
pub fn write_mbu<W: io::Write>(w: &mut W, value: u64, max: usize) -> Result<()> {
	debug_assert!(max >= 1 && max <= 10);
	let bits = 64 - value.leading_zeros() as usize;
	let groups = std::cmp::max(1, (bits + 6) / 7);
	if groups > max {
		return Err(Error::Overflow(value));
	}
	for i in (0..groups).rev() {
		let mut b = ((value >> (7 * i)) & 0x7f) as u8;
		if i > 0 {
			b |= 0x80;
		}
		write_u8(w, b)?;
	}
	Ok(())
}

/// Write a `mb_u_int32`.
pub fn write_mbu32<W: io::Write>(w: &mut W, value: u32) -> Result<()> {
	write_mbu(w, u64::from(value), 4)
}

/// Read a NUL-terminated string, excluding the terminator.
///
/// No charset handling takes place; the bytes are returned as found in
/// the stream.
pub fn read_termstr<R: io::Read>(r: &mut R, ctx: &'static str) -> Result<Vec<u8>> {
	let mut result = Vec::with_capacity(8);
	loop {
		let b = read_u8(r, ctx)?;
		if b == 0 {
			return Ok(result);
		}
		result.push(b);
	}
}

/// Write a NUL-terminated string.
pub fn write_termstr<W: io::Write>(w: &mut W, data: &[u8]) -> Result<()> {
	w.write_all(data)?;
	write_u8(w, 0)
}

/// Read exactly `len` bytes.
pub fn read_blob<R: io::Read>(r: &mut R, len: usize, ctx: &'static str) -> Result<Vec<u8>> {
	let mut result = vec![0u8; len];
	match r.read_exact(&mut result[..]) {
		Ok(()) => Ok(result),
		Err(e) => Err(eof_to_error(e, ctx)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn decode_mbu(input: &[u8], max: usize) -> Result<u64> {
		let mut r = &input[..];
		read_mbu(&mut r, max, ERRCTX_MBU)
	}

	fn encode_mbu(value: u64, max: usize) -> Result<Vec<u8>> {
		let mut out = Vec::new();
		write_mbu(&mut out, value, max)?;
		Ok(out)
	}

	#[test]
	fn mbu_decodes_reference_vectors() {
		assert_eq!(decode_mbu(&[0x81, 0x20], 4).unwrap(), 0xA0);
		assert_eq!(decode_mbu(&[0x60], 4).unwrap(), 0x60);
		assert_eq!(decode_mbu(&[0x83, 0x74], 4).unwrap(), 500);
		assert_eq!(decode_mbu(&[0x00], 4).unwrap(), 0);
	}

	#[test]
	fn mbu_encodes_reference_vectors() {
		assert_eq!(encode_mbu(0xA0, 4).unwrap(), vec![0x81, 0x20]);
		assert_eq!(encode_mbu(0x60, 4).unwrap(), vec![0x60]);
		assert_eq!(encode_mbu(500, 4).unwrap(), vec![0x83, 0x74]);
	}

	#[test]
	fn mbu_zero_is_a_single_zero_byte() {
		assert_eq!(encode_mbu(0, 4).unwrap(), vec![0x00]);
	}

	#[test]
	fn mbu_roundtrips_at_width_boundaries() {
		for &(value, max) in &[
			(0x7fu64, 1usize),
			(0x80, 2),
			(0x3fff, 2),
			(0x4000, 3),
			(0x0fff_ffff, 4),
			(u64::max_value() >> 1, 9),
		] {
			let encoded = encode_mbu(value, max).unwrap();
			assert_eq!(encoded.len(), max);
			assert_eq!(decode_mbu(&encoded, max).unwrap(), value);
		}
	}

	#[test]
	fn mbu_encode_rejects_overflow() {
		match encode_mbu(0x80, 1) {
			Err(Error::Overflow(0x80)) => (),
			other => panic!("unexpected encode result: {:?}", other),
		}
		match encode_mbu(0x1000_0000, 4) {
			Err(Error::Overflow(_)) => (),
			other => panic!("unexpected encode result: {:?}", other),
		}
	}

	#[test]
	fn mbu_decode_rejects_overlong_encoding() {
		match decode_mbu(&[0x81, 0x81, 0x81, 0x81, 0x20], 4) {
			Err(Error::Format(_)) => (),
			other => panic!("unexpected decode result: {:?}", other),
		}
	}

	#[test]
	fn mbu_decode_rejects_truncated_input() {
		match decode_mbu(&[0x81], 4) {
			Err(Error::UnexpectedEof(_)) => (),
			other => panic!("unexpected decode result: {:?}", other),
		}
	}

	#[test]
	fn termstr_roundtrip() {
		let mut out = Vec::new();
		write_termstr(&mut out, b"abc").unwrap();
		assert_eq!(out, b"abc\x00");
		let mut r = &out[..];
		assert_eq!(read_termstr(&mut r, ERRCTX_TERMSTR).unwrap(), b"abc");
		assert_eq!(r.len(), 0);
	}

	#[test]
	fn termstr_decode_requires_terminator() {
		let mut r = &b"abc"[..];
		match read_termstr(&mut r, ERRCTX_TERMSTR) {
			Err(Error::UnexpectedEof(_)) => (),
			other => panic!("unexpected decode result: {:?}", other),
		}
	}

	#[test]
	fn blob_read_rejects_short_input() {
		let mut r = &b"ab"[..];
		match read_blob(&mut r, 4, ERRCTX_OPAQUE) {
			Err(Error::UnexpectedEof(_)) => (),
			other => panic!("unexpected read result: {:?}", other),
		}
	}

	#[test]
	fn counting_reader_tracks_consumption() {
		let mut r = CountingReader::new(&b"\x01\x02\x03"[..]);
		assert_eq!(read_u8(&mut r, ERRCTX_UNKNOWN).unwrap(), 1);
		assert_eq!(r.position(), 1);
		read_blob(&mut r, 2, ERRCTX_UNKNOWN).unwrap();
		assert_eq!(r.position(), 3);
	}
}

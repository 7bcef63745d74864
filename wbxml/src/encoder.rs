/*!
# Push encoder for WBXML documents

The [`Encoder`] is the inverse of the decoder: it accepts the same
[`Token`]s and writes a conforming byte stream. Encoding is strictly
synchronous; every token is fully written before the call returns.

Page switches are elided when the active page already matches, and
elements whose start token carries `content == false` have their end
marker suppressed on the wire (the logical [`Token::End`] must still be
passed in).
*/
use std::io;

use crate::codepage::{CodeSpace, RcPtr};
use crate::error::*;
use crate::header::Header;
use crate::primitives::*;
use crate::token::*;

/**
# Streaming WBXML encoder

Writes a single document to a [`io::Write`], resolving names to codes
through the given code spaces.

Encoders are stateful. They can only be used to encode a single document
and have then to be disposed. The encoder does not buffer: bytes reach
the writer as tokens arrive, and flushing the writer remains the
caller's responsibility.
*/
pub struct Encoder<T: io::Write> {
	inner: T,
	tags: RcPtr<CodeSpace>,
	attrs: RcPtr<CodeSpace>,
	tag_page: u8,
	attr_page: u8,
	header: Header,
	/// Names of open elements encoded without the content flag, whose
	/// logical end tokens must not produce an END byte.
	ignore_end: Vec<Name>,
}

impl<T: io::Write> Encoder<T> {
	/// Create a new encoder, wrapping the given writer.
	pub fn new(inner: T, tags: RcPtr<CodeSpace>, attrs: RcPtr<CodeSpace>) -> Self {
		Self {
			inner,
			tags,
			attrs,
			tag_page: 0,
			attr_page: 0,
			header: Header::default(),
			ignore_end: Vec::new(),
		}
	}

	/// Access the inner writer.
	pub fn get_ref(&self) -> &T {
		&self.inner
	}

	/// Access the inner writer, mutably.
	pub fn get_mut(&mut self) -> &mut T {
		&mut self.inner
	}

	/// Release the inner writer.
	pub fn into_inner(self) -> T {
		self.inner
	}

	/// Flush the inner writer.
	pub fn flush(&mut self) -> Result<()> {
		self.inner.flush()?;
		Ok(())
	}

	/// Write the document header and retain it for string table
	/// interning.
	///
	/// Must be called once, before the first token.
	pub fn encode_header(&mut self, header: Header) -> Result<()> {
		header.write(&mut self.inner)?;
		self.header = header;
		Ok(())
	}

	/// Encode a single token.
	pub fn encode_token(&mut self, token: &Token) -> Result<()> {
		match token {
			Token::Start(st) => self.start(st),
			Token::End(name) => self.end(name),
			Token::CharData(data) => self.write_cdata(data),
			Token::Opaque(data) => self.opaque(data),
			Token::Entity(code) => self.entity(*code),
			Token::ProcInst(..) => Err(Error::NotImplemented("processing instruction")),
		}
	}

	fn switch_tag_page(&mut self, page: u8) -> Result<()> {
		if page == self.tag_page {
			return Ok(());
		}
		self.tag_page = page;
		write_u8(&mut self.inner, GLO_SWITCH_PAGE)?;
		write_u8(&mut self.inner, page)
	}

	fn switch_attr_page(&mut self, page: u8) -> Result<()> {
		if page == self.attr_page {
			return Ok(());
		}
		self.attr_page = page;
		write_u8(&mut self.inner, GLO_SWITCH_PAGE)?;
		write_u8(&mut self.inner, page)
	}

	fn start(&mut self, st: &StartElement) -> Result<()> {
		let (code, page) = self.tags.find(st.name.as_str())?;
		if code & 0xC0 != 0 {
			return Err(Error::Format("tag code does not fit in six bits"));
		}
		self.switch_tag_page(page)?;
		let tag = Tag::compose(code, !st.attrs.is_empty(), st.content);
		write_u8(&mut self.inner, tag.into())?;
		if !st.content {
			// no content: the matching end token must not reach the wire
			self.ignore_end.push(st.name.clone());
		}
		if !st.attrs.is_empty() {
			self.attributes(&st.attrs)?;
		}
		Ok(())
	}

	fn attributes(&mut self, attrs: &[Attr]) -> Result<()> {
		for attr in attrs {
			let (code, page) = self.attrs.find(attr.name.as_str())?;
			self.switch_attr_page(page)?;
			write_u8(&mut self.inner, code)?;
			// well-known value names win over the string emitter, even
			// when the value is also present in the string table
			match self.attrs.find(&attr.value) {
				Ok((vcode, vpage)) => {
					self.switch_attr_page(vpage)?;
					write_u8(&mut self.inner, vcode)?;
				}
				Err(Error::UnknownName(..)) => self.write_cdata(attr.value.as_bytes())?,
				Err(e) => return Err(e),
			}
		}
		write_u8(&mut self.inner, GLO_END)
	}

	fn end(&mut self, name: &Name) -> Result<()> {
		if self.ignore_end.last() == Some(name) {
			self.ignore_end.pop();
			return Ok(());
		}
		let (_, page) = self.tags.find(name.as_str())?;
		write_u8(&mut self.inner, GLO_END)?;
		// restore the closed element's page so that sibling tags resolve
		// against the page they were opened under
		self.switch_tag_page(page)
	}

	/// The string emitter: string table reference if the data is an
	/// entry, inline string otherwise. Empty data which is not interned
	/// emits nothing.
	fn write_cdata(&mut self, data: &[u8]) -> Result<()> {
		if let Some(index) = self.header.index_of(data) {
			write_u8(&mut self.inner, GLO_STR_T)?;
			return write_mbu32(&mut self.inner, index);
		}
		if data.is_empty() {
			return Ok(());
		}
		write_u8(&mut self.inner, GLO_STR_I)?;
		write_termstr(&mut self.inner, data)
	}

	fn opaque(&mut self, data: &[u8]) -> Result<()> {
		write_u8(&mut self.inner, GLO_OPAQUE)?;
		write_mbu(&mut self.inner, data.len() as u64, 4)?;
		self.inner.write_all(data)?;
		Ok(())
	}

	fn entity(&mut self, code: u32) -> Result<()> {
		write_u8(&mut self.inner, GLO_ENTITY)?;
		write_mbu32(&mut self.inner, code)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use bytes::Bytes;

	use crate::syncml;

	fn syncml_encoder(buf: &mut Vec<u8>) -> Encoder<&mut Vec<u8>> {
		let attrs: CodeSpace = vec![(0u8, 0x05u8, "A")].into_iter().collect();
		Encoder::new(buf, RcPtr::new(syncml::tags()), RcPtr::new(attrs))
	}

	#[test]
	fn tag_bytes_carry_flags_and_page_switches() {
		for &(ref tag, expected) in &[
			(StartElement::new("SyncML"), &[0x2Du8][..]),
			(StartElement::with_content("SyncML"), &[0x6D][..]),
			(
				StartElement {
					name: "SyncML".into(),
					attrs: vec![Attr::new("A", "")],
					content: true,
				},
				&[0xED, 0x05, 0x01][..],
			),
			(StartElement::new("CS"), &[0x00, 0x08, 0x05][..]),
		] {
			let mut buf = Vec::new();
			let mut e = syncml_encoder(&mut buf);
			e.encode_token(&Token::Start(tag.clone())).unwrap();
			assert_eq!(&buf[..], expected);
		}
	}

	#[test]
	fn end_is_elided_for_contentless_elements() {
		let mut buf = Vec::new();
		let mut e = syncml_encoder(&mut buf);
		e.encode_token(&Token::Start(StartElement::new("SyncML")))
			.unwrap();
		e.encode_token(&Token::End("SyncML".into())).unwrap();
		assert_eq!(buf, vec![0x2D]);
	}

	#[test]
	fn end_is_written_for_content_elements() {
		let mut buf = Vec::new();
		let mut e = syncml_encoder(&mut buf);
		e.encode_token(&Token::Start(StartElement::with_content("SyncML")))
			.unwrap();
		e.encode_token(&Token::End("SyncML".into())).unwrap();
		assert_eq!(buf, vec![0x6D, 0x01]);
	}

	#[test]
	fn sibling_pages_are_restored_after_end() {
		let mut buf = Vec::new();
		let mut e = syncml_encoder(&mut buf);
		e.encode_token(&Token::Start(StartElement::with_content("Meta")))
			.unwrap();
		e.encode_token(&Token::Start(StartElement::with_content("EMI")))
			.unwrap();
		e.encode_token(&Token::End("EMI".into())).unwrap();
		e.encode_token(&Token::End("Meta".into())).unwrap();
		assert_eq!(buf, vec![0x5A, 0x00, 0x01, 0x46, 0x01, 0x01, 0x00, 0x00]);
	}

	#[test]
	fn empty_chardata_is_dropped() {
		let mut buf = Vec::new();
		let mut e = syncml_encoder(&mut buf);
		e.encode_token(&Token::CharData(Bytes::new())).unwrap();
		assert_eq!(buf, Vec::<u8>::new());
	}

	#[test]
	fn interned_chardata_becomes_a_table_reference() {
		let header = Header {
			version: 1,
			public_id: 1,
			charset: 106,
			string_table: Bytes::from_static(b"abc\x00def\x00"),
		};
		let mut header_bytes = Vec::new();
		header.write(&mut header_bytes).unwrap();

		let mut buf = Vec::new();
		let mut e = syncml_encoder(&mut buf);
		e.encode_header(header).unwrap();
		e.encode_token(&Token::CharData(Bytes::from_static(b"def")))
			.unwrap();
		e.encode_token(&Token::CharData(Bytes::from_static(b"xyz")))
			.unwrap();
		assert_eq!(
			&buf[header_bytes.len()..],
			&[0x83, 0x04, 0x03, b'x', b'y', b'z', 0x00][..]
		);
	}

	#[test]
	fn entity_and_opaque_encodings() {
		let mut buf = Vec::new();
		let mut e = syncml_encoder(&mut buf);
		e.encode_token(&Token::Entity(0xA0)).unwrap();
		e.encode_token(&Token::Opaque(Bytes::from_static(&[0xDE, 0xAD])))
			.unwrap();
		assert_eq!(buf, vec![0x02, 0x81, 0x20, 0xC3, 0x02, 0xDE, 0xAD]);
	}

	#[test]
	fn procinst_is_rejected() {
		let mut buf = Vec::new();
		let mut e = syncml_encoder(&mut buf);
		let pi = Token::ProcInst(ProcInst {
			target: "php".into(),
			instruction: Bytes::new(),
		});
		match e.encode_token(&pi) {
			Err(Error::NotImplemented(..)) => (),
			other => panic!("unexpected encode result: {:?}", other),
		}
	}

	#[test]
	fn unknown_names_are_rejected() {
		let mut buf = Vec::new();
		let mut e = syncml_encoder(&mut buf);
		match e.encode_token(&Token::Start(StartElement::new("NOPE"))) {
			Err(Error::UnknownName(..)) => (),
			other => panic!("unexpected encode result: {:?}", other),
		}
	}
}

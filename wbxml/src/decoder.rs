/*!
# Pull decoder for WBXML documents

The [`Decoder`] wraps a [`std::io::BufRead`] and turns the byte stream
into a sequence of [`Token`]s, driven by the consumer through the
[`TokenRead`] trait. It blocks on the underlying reader; tokens are only
ever surfaced whole.

## Example

```
use wbxml::{CodeSpace, Decoder, RcPtr, Token, TokenRead};

let doc: &[u8] = &[0x01, 0x01, 0x03, 0x00, 0x45, 0x01];
let tags = RcPtr::new(vec![(0u8, 0x05u8, "hello")].into_iter().collect::<CodeSpace>());
let attrs = RcPtr::new(CodeSpace::new());
let mut d = Decoder::new(doc, tags, attrs);
let mut names = Vec::new();
d.read_all(|tok| {
	if let Token::Start(st) = tok {
		names.push(st.name);
	}
})
.unwrap();
assert_eq!(names, vec!["hello"]);
```
*/
use std::collections::VecDeque;
use std::io;

use bytes::Bytes;

use crate::codepage::{CodeSpace, RcPtr};
use crate::error::*;
use crate::header::Header;
use crate::primitives::*;
use crate::token::*;

/**
# Source for individual WBXML tokens

This trait is implemented by the decoder frontends. It is analogous to the
[`std::io::Read`] trait, but for document tokens instead of bytes.
*/
pub trait TokenRead {
	/// Read a single token from the document.
	///
	/// If the end of the document has been reached, `None` is returned.
	///
	/// All errors are fatal: after the first error the token stream is
	/// terminated and subsequent calls return `None`.
	fn read(&mut self) -> Result<Option<Token>>;

	/// Read all tokens which the document still holds.
	///
	/// The given `cb` is invoked for each token.
	fn read_all<F>(&mut self, mut cb: F) -> Result<()>
	where
		F: FnMut(Token) -> (),
	{
		loop {
			match self.read()? {
				None => return Ok(()),
				Some(tok) => cb(tok),
			}
		}
	}
}

/// Options for a [`Decoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
	/// Maximum number of bytes accepted for a single length-prefixed
	/// construct (the string table and opaque data).
	///
	/// This exists to limit the memory a hostile length prefix can make
	/// the decoder allocate before the stream runs dry.
	pub max_block_length: usize,
}

impl DecoderOptions {
	/// Set the [`DecoderOptions::max_block_length`] value.
	pub fn max_block_length(mut self, v: usize) -> DecoderOptions {
		self.max_block_length = v;
		self
	}
}

impl Default for DecoderOptions {
	/// Constructs default decoder options.
	///
	/// The defaults are implementation-defined and should not be relied
	/// upon.
	fn default() -> DecoderOptions {
		DecoderOptions {
			max_block_length: 8 << 20,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
	/// Header not processed yet.
	Header,
	/// Before the document element.
	Body,
	/// Inside the content of the innermost open element.
	Content,
	/// After the document element.
	Trailer,
	/// Terminated, by end of document or by an error.
	Eof,
}

/**
# Streaming WBXML decoder

Reads a single document from a [`io::BufRead`], resolving tag and
attribute codes through the given code spaces.

The decoder owns its reader for its lifetime; dropping the decoder
releases it. Code spaces are shared read-only state and can serve any
number of concurrent documents.

Tokens are delivered in document order. Adjacent character data is
coalesced into a single [`Token::CharData`]; elements without the content
flag still yield a matching [`Token::End`] immediately after their
[`Token::Start`].
*/
pub struct Decoder<T: io::BufRead> {
	inner: CountingReader<T>,
	tags: RcPtr<CodeSpace>,
	attrs: RcPtr<CodeSpace>,
	options: DecoderOptions,
	tag_page: u8,
	attr_page: u8,
	header: Option<Header>,
	state: State,
	/// Names of open elements whose END marker is still outstanding.
	stack: Vec<Name>,
	/// Tokens decoded but not yet handed to the consumer. A single wire
	/// construct can produce more than one token (flushed character data
	/// followed by the construct itself), which is why the queue exists.
	tokenq: VecDeque<Token>,
}

impl<T: io::BufRead> Decoder<T> {
	/// Create a new decoder with default options, wrapping the given
	/// reader.
	pub fn new(inner: T, tags: RcPtr<CodeSpace>, attrs: RcPtr<CodeSpace>) -> Self {
		Self::with_options(inner, tags, attrs, DecoderOptions::default())
	}

	/// Create a new decoder with the given options.
	pub fn with_options(
		inner: T,
		tags: RcPtr<CodeSpace>,
		attrs: RcPtr<CodeSpace>,
		options: DecoderOptions,
	) -> Self {
		Self {
			inner: CountingReader::new(inner),
			tags,
			attrs,
			options,
			tag_page: 0,
			attr_page: 0,
			header: None,
			state: State::Header,
			stack: Vec::new(),
			tokenq: VecDeque::new(),
		}
	}

	/// Access the inner reader.
	pub fn get_ref(&self) -> &T {
		self.inner.get_ref()
	}

	/// Access the inner reader, mutably.
	///
	/// Reading from it desynchronizes the decoder from the stream.
	pub fn get_mut(&mut self) -> &mut T {
		self.inner.get_mut()
	}

	/// Release the inner reader.
	pub fn into_inner(self) -> T {
		self.inner.into_inner()
	}

	/// Number of bytes consumed from the reader so far.
	pub fn offset(&self) -> usize {
		self.inner.position()
	}

	/// The document header, parsing it first if necessary.
	///
	/// Like token reads, a failure here terminates the stream.
	pub fn header(&mut self) -> Result<&Header> {
		if let Err(e) = self.ensure_header() {
			self.state = State::Eof;
			return Err(e.at(self.inner.position()));
		}
		Ok(self.header.as_ref().expect("header was just parsed"))
	}

	fn ensure_header(&mut self) -> Result<()> {
		if self.header.is_none() {
			let h = Header::read(&mut self.inner, self.options.max_block_length)?;
			self.header = Some(h);
			if self.state == State::Header {
				self.state = State::Body;
			}
		}
		Ok(())
	}

	fn next_u8(&mut self, ctx: &'static str) -> Result<u8> {
		read_u8(&mut self.inner, ctx)
	}

	fn next_mbu32(&mut self, ctx: &'static str) -> Result<u32> {
		read_mbu32(&mut self.inner, ctx)
	}

	fn string_ref(&self, offset: u32) -> Result<&[u8]> {
		self.header
			.as_ref()
			.expect("header read before body")
			.string_at(offset)
	}

	/// Append the UTF-8 encoding of a character entity to a pending
	/// character data buffer.
	fn fold_entity(buf: &mut Vec<u8>, code: u32) -> Result<()> {
		let ch = std::char::from_u32(code)
			.ok_or(Error::Format("entity is not a Unicode scalar value"))?;
		let mut utf8 = [0u8; 4];
		buf.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
		Ok(())
	}

	/// Drive the state machine until at least one token is queued or the
	/// document ends.
	fn step(&mut self) -> Result<()> {
		loop {
			match self.state {
				State::Header => {
					self.ensure_header()?;
				}
				State::Body => {
					let b = match self.next_u8(ERRCTX_DOCBEGIN) {
						Ok(b) => b,
						// a document without a body terminates the
						// token stream cleanly
						Err(Error::UnexpectedEof(..)) => {
							self.state = State::Eof;
							return Ok(());
						}
						Err(e) => return Err(e),
					};
					if b == GLO_PI {
						return Err(Error::NotImplemented("processing instruction"));
					}
					self.element(b)?;
					if self.stack.is_empty() {
						self.state = State::Trailer;
					} else {
						self.state = State::Content;
					}
					return Ok(());
				}
				State::Content => {
					self.content()?;
					return Ok(());
				}
				State::Trailer => match self.next_u8(ERRCTX_DOCEND) {
					Ok(GLO_PI) => {
						return Err(Error::NotImplemented("processing instruction"))
					}
					Ok(b) => return Err(Error::UnexpectedByte(ERRCTX_DOCEND, b, None)),
					Err(Error::UnexpectedEof(..)) => {
						self.state = State::Eof;
						return Ok(());
					}
					Err(e) => return Err(e),
				},
				State::Eof => return Ok(()),
			}
		}
	}

	/// Process one element whose first byte has already been read.
	///
	/// Emits the start token (and, for elements without content, the
	/// matching end token) and pushes content-bearing elements onto the
	/// element stack.
	fn element(&mut self, b: u8) -> Result<()> {
		let mut b = b;
		loop {
			match b {
				GLO_SWITCH_PAGE => {
					self.tag_page = self.next_u8(ERRCTX_ELEMENT)?;
					b = self.next_u8(ERRCTX_ELEMENT)?;
				}
				GLO_LITERAL | GLO_LITERAL_A | GLO_LITERAL_C | GLO_LITERAL_AC => {
					return Err(Error::NotImplemented("literal element name"))
				}
				_ => break,
			}
		}
		let tag = Tag::from(b);
		let name = self.tags.name(self.tag_page, tag.code())?.clone();
		let attrs = if tag.has_attrs() {
			self.attributes()?
		} else {
			Vec::new()
		};
		let content = tag.has_content();
		self.tokenq.push_back(Token::Start(StartElement {
			name: name.clone(),
			attrs,
			content,
		}));
		if content {
			self.stack.push(name);
		} else {
			// no END marker on the wire; the logical end tag is implied
			self.tokenq.push_back(Token::End(name));
		}
		Ok(())
	}

	/// Read the attribute list of an element, up to and including its
	/// terminating END.
	fn attributes(&mut self) -> Result<Vec<Attr>> {
		let mut attrs = Vec::new();
		let mut b = self.next_u8(ERRCTX_ATTRIBUTES)?;
		loop {
			match b {
				GLO_SWITCH_PAGE => {
					self.attr_page = self.next_u8(ERRCTX_ATTRIBUTES)?;
					b = self.next_u8(ERRCTX_ATTRIBUTES)?;
				}
				GLO_END => return Ok(attrs),
				GLO_LITERAL => {
					let index = self.next_mbu32(ERRCTX_ATTRIBUTES)?;
					let name = String::from_utf8(self.string_ref(index)?.to_vec())
						.map_err(|_| Error::Format("attribute name is not valid UTF-8"))?;
					let (value, next) = self.attr_value()?;
					attrs.push(Attr {
						name: name.into(),
						value,
					});
					b = next;
				}
				b_ if b_ < 0x80 => {
					let name = self.attrs.name(self.attr_page, b_)?.clone();
					let (value, next) = self.attr_value()?;
					attrs.push(Attr { name, value });
					b = next;
				}
				b_ => {
					return Err(Error::UnexpectedByte(
						ERRCTX_ATTRIBUTES,
						b_,
						Some(&["attribute start"]),
					))
				}
			}
		}
	}

	/// Accumulate one attribute value.
	///
	/// The value ends at the next attribute start (a code below 0x80) or
	/// at the END of the attribute list; the terminating byte is returned
	/// alongside the value so the caller can continue the list.
	fn attr_value(&mut self) -> Result<(String, u8)> {
		let mut buf: Vec<u8> = Vec::new();
		loop {
			let b = self.next_u8(ERRCTX_ATTRIBUTE_VALUE)?;
			match b {
				GLO_STR_I => {
					buf.extend_from_slice(&read_termstr(&mut self.inner, ERRCTX_TERMSTR)?);
				}
				GLO_STR_T => {
					let index = self.next_mbu32(ERRCTX_ATTRIBUTE_VALUE)?;
					let part = self.string_ref(index)?.to_vec();
					buf.extend_from_slice(&part);
				}
				GLO_ENTITY => {
					// inside attribute values entities are always folded
					let code = self.next_mbu32(ERRCTX_ENTITY)?;
					Self::fold_entity(&mut buf, code)?;
				}
				GLO_SWITCH_PAGE => {
					self.attr_page = self.next_u8(ERRCTX_ATTRIBUTE_VALUE)?;
				}
				GLO_EXT_I_0 | GLO_EXT_I_1 | GLO_EXT_I_2 | GLO_EXT_T_0 | GLO_EXT_T_1
				| GLO_EXT_T_2 | GLO_EXT_0 | GLO_EXT_1 | GLO_EXT_2 => {
					return Err(Error::NotImplemented("extension token"))
				}
				GLO_END => {
					let value = String::from_utf8(buf)
						.map_err(|_| Error::Format("attribute value is not valid UTF-8"))?;
					return Ok((value, GLO_END));
				}
				b if b < 0x80 => {
					let value = String::from_utf8(buf)
						.map_err(|_| Error::Format("attribute value is not valid UTF-8"))?;
					return Ok((value, b));
				}
				b => {
					let part = self.attrs.name(self.attr_page, b)?.clone();
					buf.extend_from_slice(part.as_bytes());
				}
			}
		}
	}

	/// Process content of the innermost open element until at least one
	/// token can be queued.
	///
	/// Adjacent character data (inline strings, table references and
	/// non-isolated entities) is coalesced into a single buffer which is
	/// flushed on END, opaque data or a nested element start.
	fn content(&mut self) -> Result<()> {
		let mut cdata: Vec<u8> = Vec::new();
		loop {
			let b = self.next_u8(ERRCTX_CONTENT)?;
			match b {
				GLO_STR_I => {
					cdata.extend_from_slice(&read_termstr(&mut self.inner, ERRCTX_TERMSTR)?);
				}
				GLO_STR_T => {
					let index = self.next_mbu32(ERRCTX_CONTENT)?;
					let part = self.string_ref(index)?.to_vec();
					cdata.extend_from_slice(&part);
				}
				GLO_ENTITY => {
					let code = self.next_mbu32(ERRCTX_ENTITY)?;
					if cdata.is_empty() {
						// isolated entity: no neighbouring character
						// data, surfaces as its own token
						self.tokenq.push_back(Token::Entity(code));
						return Ok(());
					}
					Self::fold_entity(&mut cdata, code)?;
				}
				GLO_OPAQUE => {
					self.flush_cdata(&mut cdata);
					let length = self.next_mbu32(ERRCTX_OPAQUE)? as usize;
					if length > self.options.max_block_length {
						return Err(Error::Format(
							"opaque length exceeds configured limit",
						));
					}
					let data = read_blob(&mut self.inner, length, ERRCTX_OPAQUE)?;
					self.tokenq.push_back(Token::Opaque(Bytes::from(data)));
					return Ok(());
				}
				GLO_SWITCH_PAGE => {
					self.tag_page = self.next_u8(ERRCTX_CONTENT)?;
				}
				GLO_EXT_I_0 | GLO_EXT_I_1 | GLO_EXT_I_2 | GLO_EXT_T_0 | GLO_EXT_T_1
				| GLO_EXT_T_2 | GLO_EXT_0 | GLO_EXT_1 | GLO_EXT_2 => {
					return Err(Error::NotImplemented("extension token"))
				}
				GLO_PI => return Err(Error::NotImplemented("processing instruction")),
				GLO_END => {
					self.flush_cdata(&mut cdata);
					let name = self.stack.pop().expect("content state implies open element");
					self.tokenq.push_back(Token::End(name));
					if self.stack.is_empty() {
						self.state = State::Trailer;
					}
					return Ok(());
				}
				b => {
					self.flush_cdata(&mut cdata);
					self.element(b)?;
					return Ok(());
				}
			}
		}
	}

	fn flush_cdata(&mut self, cdata: &mut Vec<u8>) {
		if !cdata.is_empty() {
			let data = std::mem::replace(cdata, Vec::new());
			self.tokenq.push_back(Token::CharData(Bytes::from(data)));
		}
	}
}

impl<T: io::BufRead> TokenRead for Decoder<T> {
	/// Read a single token from the document.
	///
	/// If the end of the document has been reached, `None` is returned.
	///
	/// Errors are annotated with the byte offset at which they were
	/// detected. They are fatal: the stream is terminated and subsequent
	/// calls return `None`.
	fn read(&mut self) -> Result<Option<Token>> {
		if let Some(tok) = self.tokenq.pop_front() {
			return Ok(Some(tok));
		}
		if self.state == State::Eof {
			return Ok(None);
		}
		match self.step() {
			Ok(()) => Ok(self.tokenq.pop_front()),
			Err(e) => {
				self.state = State::Eof;
				Err(e.at(self.inner.position()))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn simple_tags() -> RcPtr<CodeSpace> {
		RcPtr::new(
			vec![(0u8, 0x05u8, "BR"), (0, 0x06, "CARD"), (0, 0x07, "XYZ")]
				.into_iter()
				.collect(),
		)
	}

	fn attr_example_spaces() -> (RcPtr<CodeSpace>, RcPtr<CodeSpace>) {
		let tags = vec![
			(0u8, 0x05u8, "CARD"),
			(0, 0x06, "INPUT"),
			(0, 0x07, "XYZ"),
			(0, 0x08, "DO"),
		]
		.into_iter()
		.collect();
		let attrs = vec![
			(0u8, 0x05u8, "STYLE"),
			(0, 0x06, "TYPE"),
			(0, 0x08, "URL"),
			(0, 0x09, "NAME"),
			(0, 0x0A, "KEY"),
			(0, 0x85, ".org"),
			(0, 0x86, "ACCEPT"),
		]
		.into_iter()
		.collect();
		(RcPtr::new(tags), RcPtr::new(attrs))
	}

	fn decode(
		input: &[u8],
		tags: RcPtr<CodeSpace>,
		attrs: RcPtr<CodeSpace>,
	) -> (Vec<Token>, Result<()>) {
		let mut d = Decoder::new(input, tags, attrs);
		let mut out = Vec::new();
		let result = d.read_all(|tok| out.push(tok));
		(out, result)
	}

	#[test]
	fn decodes_mixed_content_document() {
		// <XYZ><CARD> X &amp; Y<BR/> X&#160;=&#160;1 </CARD></XYZ>
		let input: &[u8] = &[
			0x01, 0x01, 0x03, 0x00, 0x47, 0x46, 0x03, b' ', b'X', b' ', b'&', b' ', b'Y',
			0x00, 0x05, 0x03, 0x20, 0x58, 0x00, 0x02, 0x81, 0x20, 0x03, 0x3D, 0x00, 0x02,
			0x81, 0x20, 0x03, 0x31, 0x20, 0x00, 0x01, 0x01,
		];
		let (tokens, result) = decode(input, simple_tags(), RcPtr::new(CodeSpace::new()));
		result.unwrap();
		assert_eq!(
			tokens,
			vec![
				Token::Start(StartElement::with_content("XYZ")),
				Token::Start(StartElement::with_content("CARD")),
				Token::CharData(Bytes::from_static(b" X & Y")),
				Token::Start(StartElement::new("BR")),
				Token::End("BR".into()),
				Token::CharData(Bytes::from_static(" X\u{A0}=\u{A0}1 ".as_bytes())),
				Token::End("CARD".into()),
				Token::End("XYZ".into()),
			]
		);
	}

	#[test]
	fn decodes_attributes_and_composite_values() {
		let input: &[u8] = &[
			0x01, 0x01, 0x6A, 0x12, b'a', b'b', b'c', 0x00, b' ', b'E', b'n', b't', b'e',
			b'r', b' ', b'n', b'a', b'm', b'e', b':', b' ', 0x00, 0x47, 0xC5, 0x09, 0x83,
			0x00, 0x05, 0x01, 0x88, 0x06, 0x86, 0x08, 0x03, b'x', b'y', b'z', 0x00, 0x85,
			0x03, b'/', b's', 0x00, 0x01, 0x83, 0x04, 0x86, 0x06, 0x0A, 0x03, b'N', 0x00,
			0x01, 0x01, 0x01,
		];
		let (tags, attrs) = attr_example_spaces();
		let (tokens, result) = decode(input, tags, attrs);
		result.unwrap();
		assert_eq!(
			tokens,
			vec![
				Token::Start(StartElement::with_content("XYZ")),
				Token::Start(StartElement {
					name: "CARD".into(),
					attrs: vec![Attr::new("NAME", "abc"), Attr::new("STYLE", "")],
					content: true,
				}),
				Token::Start(StartElement {
					name: "DO".into(),
					attrs: vec![
						Attr::new("TYPE", "ACCEPT"),
						Attr::new("URL", "xyz.org/s"),
					],
					content: false,
				}),
				Token::End("DO".into()),
				Token::CharData(Bytes::from_static(b" Enter name: ")),
				Token::Start(StartElement {
					name: "INPUT".into(),
					attrs: vec![Attr::new("TYPE", ""), Attr::new("KEY", "N")],
					content: false,
				}),
				Token::End("INPUT".into()),
				Token::End("CARD".into()),
				Token::End("XYZ".into()),
			]
		);
	}

	#[test]
	fn isolated_entity_becomes_a_token() {
		// <XYZ>&#160;</XYZ>
		let input: &[u8] = &[0x01, 0x01, 0x03, 0x00, 0x47, 0x02, 0x81, 0x20, 0x01];
		let (tokens, result) = decode(input, simple_tags(), RcPtr::new(CodeSpace::new()));
		result.unwrap();
		assert_eq!(
			tokens,
			vec![
				Token::Start(StartElement::with_content("XYZ")),
				Token::Entity(0xA0),
				Token::End("XYZ".into()),
			]
		);
	}

	#[test]
	fn entity_after_text_is_folded() {
		let input: &[u8] = &[
			0x01, 0x01, 0x03, 0x00, 0x47, 0x03, b'A', 0x00, 0x02, 0x81, 0x20, 0x03, b'B',
			0x00, 0x01,
		];
		let (tokens, result) = decode(input, simple_tags(), RcPtr::new(CodeSpace::new()));
		result.unwrap();
		assert_eq!(
			tokens,
			vec![
				Token::Start(StartElement::with_content("XYZ")),
				Token::CharData(Bytes::from_static("A\u{A0}B".as_bytes())),
				Token::End("XYZ".into()),
			]
		);
	}

	#[test]
	fn entity_before_text_stays_isolated() {
		// folding only looks backwards: an entity at the start of a run
		// is emitted on its own even when text follows
		let input: &[u8] = &[
			0x01, 0x01, 0x03, 0x00, 0x47, 0x02, 0x81, 0x20, 0x03, b'B', 0x00, 0x01,
		];
		let (tokens, result) = decode(input, simple_tags(), RcPtr::new(CodeSpace::new()));
		result.unwrap();
		assert_eq!(
			tokens,
			vec![
				Token::Start(StartElement::with_content("XYZ")),
				Token::Entity(0xA0),
				Token::CharData(Bytes::from_static(b"B")),
				Token::End("XYZ".into()),
			]
		);
	}

	#[test]
	fn opaque_flushes_pending_character_data() {
		let input: &[u8] = &[
			0x01, 0x01, 0x03, 0x00, 0x47, 0x03, b'A', 0x00, 0xC3, 0x02, 0xDE, 0xAD, 0x01,
		];
		let (tokens, result) = decode(input, simple_tags(), RcPtr::new(CodeSpace::new()));
		result.unwrap();
		assert_eq!(
			tokens,
			vec![
				Token::Start(StartElement::with_content("XYZ")),
				Token::CharData(Bytes::from_static(b"A")),
				Token::Opaque(Bytes::from_static(&[0xDE, 0xAD])),
				Token::End("XYZ".into()),
			]
		);
	}

	#[test]
	fn switch_page_changes_tag_lookups() {
		let tags: CodeSpace = vec![(0u8, 0x05u8, "A"), (1, 0x05, "B")]
			.into_iter()
			.collect();
		let input: &[u8] = &[0x01, 0x01, 0x03, 0x00, 0x45, 0x00, 0x01, 0x05, 0x01];
		let (tokens, result) = decode(input, RcPtr::new(tags), RcPtr::new(CodeSpace::new()));
		result.unwrap();
		assert_eq!(
			tokens,
			vec![
				Token::Start(StartElement::with_content("A")),
				Token::Start(StartElement::new("B")),
				Token::End("B".into()),
				Token::End("A".into()),
			]
		);
	}

	#[test]
	fn empty_body_terminates_cleanly() {
		let input: &[u8] = &[0x01, 0x01, 0x03, 0x00];
		let mut d = Decoder::new(input, simple_tags(), RcPtr::new(CodeSpace::new()));
		assert_eq!(d.read().unwrap(), None);
		assert_eq!(d.read().unwrap(), None);
	}

	#[test]
	fn header_is_available_before_tokens() {
		let input: &[u8] = &[0x01, 0x01, 0x6A, 0x04, b'a', 0x00, b'b', 0x00, 0x45, 0x01];
		let tags: CodeSpace = vec![(0u8, 0x05u8, "A")].into_iter().collect();
		let mut d = Decoder::new(input, RcPtr::new(tags), RcPtr::new(CodeSpace::new()));
		{
			let h = d.header().unwrap();
			assert_eq!(h.charset, 106);
			assert_eq!(h.string_at(2).unwrap(), b"b");
		}
		match d.read().unwrap() {
			Some(Token::Start(st)) => assert_eq!(st.name, "A"),
			other => panic!("unexpected token: {:?}", other),
		}
	}

	#[test]
	fn literal_tags_are_rejected() {
		let input: &[u8] = &[0x01, 0x01, 0x03, 0x00, 0x04, 0x00, 0x01];
		let (tokens, result) = decode(input, simple_tags(), RcPtr::new(CodeSpace::new()));
		assert_eq!(tokens.len(), 0);
		match result {
			Err(Error::Position(_, inner)) => match *inner {
				Error::NotImplemented(..) => (),
				other => panic!("unexpected error: {:?}", other),
			},
			other => panic!("unexpected result: {:?}", other),
		}
	}

	#[test]
	fn stream_is_terminated_after_an_error() {
		let input: &[u8] = &[0x01, 0x01, 0x03, 0x00, 0x04, 0x00, 0x01];
		let mut d = Decoder::new(input, simple_tags(), RcPtr::new(CodeSpace::new()));
		match d.read() {
			Err(_) => (),
			other => panic!("unexpected read result: {:?}", other),
		}
		assert_eq!(d.read().unwrap(), None);
	}

	#[test]
	fn unknown_tag_code_is_reported_with_offset() {
		let input: &[u8] = &[0x01, 0x01, 0x03, 0x00, 0x7F, 0x01];
		let (_, result) = decode(input, simple_tags(), RcPtr::new(CodeSpace::new()));
		match result {
			Err(e) => {
				assert_eq!(e.offset(), Some(5));
				match e {
					Error::Position(_, inner) => match *inner {
						Error::UnknownCode(0, 0x3F) => (),
						other => panic!("unexpected error: {:?}", other),
					},
					other => panic!("unexpected error: {:?}", other),
				}
			}
			other => panic!("unexpected result: {:?}", other),
		}
	}

	#[test]
	fn truncated_content_is_an_eof_error() {
		let input: &[u8] = &[0x01, 0x01, 0x03, 0x00, 0x47, 0x03, b'A'];
		let (_, result) = decode(input, simple_tags(), RcPtr::new(CodeSpace::new()));
		match result {
			Err(Error::Position(_, inner)) => match *inner {
				Error::UnexpectedEof(..) => (),
				other => panic!("unexpected error: {:?}", other),
			},
			other => panic!("unexpected result: {:?}", other),
		}
	}

	#[test]
	fn garbage_after_document_element_is_rejected() {
		let input: &[u8] = &[0x01, 0x01, 0x03, 0x00, 0x05, 0xFF];
		let (tokens, result) = decode(input, simple_tags(), RcPtr::new(CodeSpace::new()));
		assert_eq!(tokens.len(), 2);
		match result {
			Err(Error::Position(_, inner)) => match *inner {
				Error::UnexpectedByte(..) => (),
				other => panic!("unexpected error: {:?}", other),
			},
			other => panic!("unexpected result: {:?}", other),
		}
	}

	#[test]
	fn string_table_reference_out_of_range() {
		let input: &[u8] = &[0x01, 0x01, 0x03, 0x00, 0x47, 0x83, 0x00, 0x01];
		let (_, result) = decode(input, simple_tags(), RcPtr::new(CodeSpace::new()));
		match result {
			Err(Error::Position(_, inner)) => match *inner {
				Error::Format(..) => (),
				other => panic!("unexpected error: {:?}", other),
			},
			other => panic!("unexpected result: {:?}", other),
		}
	}
}

/*!
# Schema binding

Maps record shapes onto WBXML token streams: [`Marshal`] drives the
[`Encoder`] from a value, [`Unmarshal`] fills a value from a [`Decoder`].

Implementations exist for the usual leaf types:

- strings encode as character data (empty strings as an empty element),
- integers encode as a character entity carrying the numeric value, and
  decode from entities or decimal character data,
- `bool` encodes as presence of the element; an absent element reads
  back as `false`,
- [`Bytes`] encodes as opaque data,
- `Vec<T>` decodes repeated elements of the same name (sequences other
  than byte sequences are not encodable),
- `Option<T>` maps absence to `None` and allocates on demand,
- `Box<T>` forwards, which keeps recursive shapes finite.

Record types implement the traits either through the derive macros of
`wbxml_proc` (re-exported under the `macros` feature) or by hand, which
is also the hook for custom representations. During record decoding,
child elements without a matching field are skipped wholesale, and
errors are annotated with the dotted path of the field they occurred
under.
*/
use std::convert::TryFrom;
use std::io;

use bytes::Bytes;

use crate::decoder::{Decoder, TokenRead};
use crate::encoder::Encoder;
use crate::error::*;
use crate::token::{Name, StartElement, Token};

/// Value which can drive the encoder below a given start element.
pub trait Marshal {
	/// Encode `self` as the element started by `start`.
	///
	/// The implementation decides the content flag, emits `start` and the
	/// matching end token, and everything in between.
	fn marshal_wbxml<W: io::Write>(&self, e: &mut Encoder<W>, start: StartElement) -> Result<()>;
}

/// Value which can be filled from the decoder below a given start
/// element.
pub trait Unmarshal {
	/// Decode the content of the element started by `start` into `self`,
	/// consuming tokens up to and including the matching end token.
	fn unmarshal_wbxml<R: io::BufRead>(
		&mut self,
		d: &mut Decoder<R>,
		start: &StartElement,
	) -> Result<()>;
}

impl<T: io::Write> Encoder<T> {
	/// Encode a value as the element started by `start`.
	pub fn encode_element<V: Marshal + ?Sized>(
		&mut self,
		v: &V,
		start: StartElement,
	) -> Result<()> {
		v.marshal_wbxml(self, start)
	}
}

impl<T: io::BufRead> Decoder<T> {
	/// Decode the next element of the document into a fresh value.
	pub fn decode<V: Unmarshal + Default>(&mut self) -> Result<V> {
		let mut v = V::default();
		self.decode_element(&mut v, None)?;
		Ok(v)
	}

	/// Decode an element into `v`.
	///
	/// With `start == None` the next token must be the start of the
	/// element; otherwise decoding continues below the given start tag,
	/// whose tokens must already have been consumed.
	pub fn decode_element<V: Unmarshal + ?Sized>(
		&mut self,
		v: &mut V,
		start: Option<&StartElement>,
	) -> Result<()> {
		match start {
			Some(st) => v.unmarshal_wbxml(self, st),
			None => match self.read()? {
				Some(Token::Start(st)) => v.unmarshal_wbxml(self, &st),
				Some(tok) => Err(Error::SchemaMismatch(
					ERRCTX_DOCBEGIN,
					tok.name(),
					Some(&[Token::NAME_START]),
				)),
				None => Err(Error::UnexpectedEof(ERRCTX_DOCBEGIN)),
			},
		}
	}

	/// Consume tokens up to and including the end of the element started
	/// by `start`, respecting nested elements.
	pub fn skip_element(&mut self, start: &StartElement) -> Result<()> {
		let mut depth = 0usize;
		loop {
			match self.read()? {
				Some(Token::Start(..)) => depth += 1,
				Some(Token::End(name)) => {
					if depth == 0 {
						if name == start.name {
							return Ok(());
						}
						return Err(Error::ElementMismatch(start.name.clone(), name));
					}
					depth -= 1;
				}
				Some(..) => (),
				None => return Err(Error::UnexpectedEof(ERRCTX_RECORD)),
			}
		}
	}
}

fn next_token<R: io::BufRead>(d: &mut Decoder<R>, ctx: &'static str) -> Result<Token> {
	match d.read()? {
		Some(tok) => Ok(tok),
		None => Err(Error::UnexpectedEof(ctx)),
	}
}

fn expect_end<R: io::BufRead>(d: &mut Decoder<R>, start: &StartElement) -> Result<()> {
	match next_token(d, ERRCTX_VALUE)? {
		Token::End(name) => {
			if name == start.name {
				Ok(())
			} else {
				Err(Error::ElementMismatch(start.name.clone(), name))
			}
		}
		tok => Err(Error::SchemaMismatch(
			ERRCTX_VALUE,
			tok.name(),
			Some(&[Token::NAME_END]),
		)),
	}
}

fn marshal_text<W: io::Write>(
	e: &mut Encoder<W>,
	mut start: StartElement,
	data: &[u8],
) -> Result<()> {
	start.content = !data.is_empty();
	let name = start.name.clone();
	e.encode_token(&Token::Start(start))?;
	if !data.is_empty() {
		e.encode_token(&Token::CharData(Bytes::copy_from_slice(data)))?;
	}
	e.encode_token(&Token::End(name))
}

/// Read a textual value: one character data or opaque token, or an
/// immediate end tag for the empty value.
fn unmarshal_text<R: io::BufRead>(d: &mut Decoder<R>, start: &StartElement) -> Result<Vec<u8>> {
	match next_token(d, ERRCTX_VALUE)? {
		Token::CharData(data) | Token::Opaque(data) => {
			let out = data.to_vec();
			expect_end(d, start)?;
			Ok(out)
		}
		Token::End(name) => {
			if name == start.name {
				Ok(Vec::new())
			} else {
				Err(Error::ElementMismatch(start.name.clone(), name))
			}
		}
		tok => Err(Error::SchemaMismatch(
			ERRCTX_VALUE,
			tok.name(),
			Some(&[Token::NAME_CHARDATA, Token::NAME_OPAQUE, Token::NAME_END]),
		)),
	}
}

impl Marshal for String {
	fn marshal_wbxml<W: io::Write>(&self, e: &mut Encoder<W>, start: StartElement) -> Result<()> {
		marshal_text(e, start, self.as_bytes())
	}
}

impl Unmarshal for String {
	fn unmarshal_wbxml<R: io::BufRead>(
		&mut self,
		d: &mut Decoder<R>,
		start: &StartElement,
	) -> Result<()> {
		let raw = unmarshal_text(d, start)?;
		*self = String::from_utf8(raw)
			.map_err(|_| Error::Format("character data is not valid UTF-8"))?;
		Ok(())
	}
}

impl Marshal for Name {
	fn marshal_wbxml<W: io::Write>(&self, e: &mut Encoder<W>, start: StartElement) -> Result<()> {
		marshal_text(e, start, self.as_bytes())
	}
}

impl Unmarshal for Name {
	fn unmarshal_wbxml<R: io::BufRead>(
		&mut self,
		d: &mut Decoder<R>,
		start: &StartElement,
	) -> Result<()> {
		let raw = unmarshal_text(d, start)?;
		let text = String::from_utf8(raw)
			.map_err(|_| Error::Format("character data is not valid UTF-8"))?;
		*self = text.into();
		Ok(())
	}
}

macro_rules! impl_bind_int {
	($($ty:ty),*) => {$(
		impl Marshal for $ty {
			fn marshal_wbxml<W: io::Write>(
				&self,
				e: &mut Encoder<W>,
				mut start: StartElement,
			) -> Result<()> {
				start.content = true;
				let name = start.name.clone();
				e.encode_token(&Token::Start(start))?;
				e.encode_token(&Token::Entity(*self as u32))?;
				e.encode_token(&Token::End(name))
			}
		}

		impl Unmarshal for $ty {
			fn unmarshal_wbxml<R: io::BufRead>(
				&mut self,
				d: &mut Decoder<R>,
				start: &StartElement,
			) -> Result<()> {
				match next_token(d, ERRCTX_VALUE)? {
					Token::Entity(code) => {
						*self = <$ty as TryFrom<u32>>::try_from(code)
							.map_err(|_| Error::Format("entity value exceeds the field width"))?;
						expect_end(d, start)
					}
					Token::CharData(data) => {
						let text = std::str::from_utf8(&data)
							.map_err(|_| Error::Format("numeric character data is not valid UTF-8"))?;
						*self = text
							.parse::<$ty>()
							.map_err(|_| Error::Format("malformed decimal number"))?;
						expect_end(d, start)
					}
					tok => Err(Error::SchemaMismatch(
						ERRCTX_VALUE,
						tok.name(),
						Some(&[Token::NAME_ENTITY, Token::NAME_CHARDATA]),
					)),
				}
			}
		}
	)*};
}

impl_bind_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl Marshal for bool {
	/// `true` encodes as an empty element; `false` encodes as nothing at
	/// all.
	fn marshal_wbxml<W: io::Write>(&self, e: &mut Encoder<W>, mut start: StartElement) -> Result<()> {
		if !*self {
			return Ok(());
		}
		start.content = true;
		let name = start.name.clone();
		e.encode_token(&Token::Start(start))?;
		e.encode_token(&Token::End(name))
	}
}

impl Unmarshal for bool {
	/// Presence of the element is the signal; its content is discarded.
	fn unmarshal_wbxml<R: io::BufRead>(
		&mut self,
		d: &mut Decoder<R>,
		start: &StartElement,
	) -> Result<()> {
		d.skip_element(start)?;
		*self = true;
		Ok(())
	}
}

impl Marshal for Bytes {
	fn marshal_wbxml<W: io::Write>(&self, e: &mut Encoder<W>, mut start: StartElement) -> Result<()> {
		start.content = !self.is_empty();
		let name = start.name.clone();
		e.encode_token(&Token::Start(start))?;
		if !self.is_empty() {
			e.encode_token(&Token::Opaque(self.clone()))?;
		}
		e.encode_token(&Token::End(name))
	}
}

impl Unmarshal for Bytes {
	fn unmarshal_wbxml<R: io::BufRead>(
		&mut self,
		d: &mut Decoder<R>,
		start: &StartElement,
	) -> Result<()> {
		let mut acc: Vec<u8> = Vec::new();
		loop {
			match next_token(d, ERRCTX_VALUE)? {
				Token::CharData(data) | Token::Opaque(data) => acc.extend_from_slice(&data),
				Token::End(name) => {
					if name == start.name {
						*self = Bytes::from(acc);
						return Ok(());
					}
					return Err(Error::ElementMismatch(start.name.clone(), name));
				}
				tok => {
					return Err(Error::SchemaMismatch(
						ERRCTX_VALUE,
						tok.name(),
						Some(&[Token::NAME_CHARDATA, Token::NAME_OPAQUE, Token::NAME_END]),
					))
				}
			}
		}
	}
}

/// Repeated elements of the same name accumulate into a vector; every
/// occurrence appends one freshly-default element and decodes into it.
impl<V: Unmarshal + Default> Unmarshal for Vec<V> {
	fn unmarshal_wbxml<R: io::BufRead>(
		&mut self,
		d: &mut Decoder<R>,
		start: &StartElement,
	) -> Result<()> {
		let mut item = V::default();
		item.unmarshal_wbxml(d, start)?;
		self.push(item);
		Ok(())
	}
}

impl<V: Marshal> Marshal for Option<V> {
	fn marshal_wbxml<W: io::Write>(&self, e: &mut Encoder<W>, start: StartElement) -> Result<()> {
		match self {
			Some(v) => v.marshal_wbxml(e, start),
			None => Ok(()),
		}
	}
}

impl<V: Unmarshal + Default> Unmarshal for Option<V> {
	fn unmarshal_wbxml<R: io::BufRead>(
		&mut self,
		d: &mut Decoder<R>,
		start: &StartElement,
	) -> Result<()> {
		self.get_or_insert_with(V::default).unmarshal_wbxml(d, start)
	}
}

impl<V: Marshal> Marshal for Box<V> {
	fn marshal_wbxml<W: io::Write>(&self, e: &mut Encoder<W>, start: StartElement) -> Result<()> {
		(**self).marshal_wbxml(e, start)
	}
}

impl<V: Unmarshal> Unmarshal for Box<V> {
	fn unmarshal_wbxml<R: io::BufRead>(
		&mut self,
		d: &mut Decoder<R>,
		start: &StartElement,
	) -> Result<()> {
		(**self).unmarshal_wbxml(d, start)
	}
}

/*!
# Textual XML rendering

A thin consumer of the token stream which renders it as indented textual
XML, mainly useful for inspecting binary documents.

Character data is written verbatim; escaping (and charset handling in
general) is the caller's business. Opaque data renders as lowercase hex,
entities as their decimal code point.
*/
use std::io;

use crate::decoder::TokenRead;
use crate::error::Result;
use crate::token::{Name, Token};

struct Frame {
	name: Name,
	has_child_elements: bool,
	has_text: bool,
}

fn write_indent<W: io::Write>(w: &mut W, indent: &str, depth: usize) -> io::Result<()> {
	w.write_all(b"\n")?;
	for _ in 0..depth {
		w.write_all(indent.as_bytes())?;
	}
	Ok(())
}

/// Render the whole token stream of `source` as textual XML.
///
/// `indent` is the per-level indentation string. Elements containing only
/// text close on the same line; elements containing child elements have
/// their children indented one level.
pub fn write_xml<W: io::Write, S: TokenRead>(
	w: &mut W,
	source: &mut S,
	indent: &str,
) -> Result<()> {
	let mut stack: Vec<Frame> = Vec::new();
	let mut first = true;

	while let Some(token) = source.read()? {
		match token {
			Token::Start(st) => {
				let inline = stack.last().map(|f| f.has_text).unwrap_or(false);
				if !first && !inline {
					write_indent(w, indent, stack.len())?;
				}
				if let Some(parent) = stack.last_mut() {
					parent.has_child_elements = true;
				}
				write!(w, "<{}", st.name)?;
				for attr in &st.attrs {
					write!(w, " {}=\"{}\"", attr.name, attr.value)?;
				}
				w.write_all(b">")?;
				stack.push(Frame {
					name: st.name,
					has_child_elements: false,
					has_text: false,
				});
				first = false;
			}
			Token::End(..) => {
				// the decoder guarantees proper nesting, so the name on
				// the token matches the frame
				if let Some(frame) = stack.pop() {
					if frame.has_child_elements && !frame.has_text {
						write_indent(w, indent, stack.len())?;
					}
					write!(w, "</{}>", frame.name)?;
				}
				first = false;
			}
			Token::CharData(data) => {
				w.write_all(&data)?;
				if let Some(frame) = stack.last_mut() {
					frame.has_text = true;
				}
				first = false;
			}
			Token::Opaque(data) => {
				for b in data.iter() {
					write!(w, "{:02x}", b)?;
				}
				if let Some(frame) = stack.last_mut() {
					frame.has_text = true;
				}
				first = false;
			}
			Token::Entity(code) => {
				write!(w, "{}", code)?;
				if let Some(frame) = stack.last_mut() {
					frame.has_text = true;
				}
				first = false;
			}
			Token::ProcInst(..) => (),
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	use crate::codepage::{CodeSpace, RcPtr};
	use crate::decoder::Decoder;

	fn render(input: &[u8], tags: CodeSpace, attrs: CodeSpace, indent: &str) -> String {
		let mut d = Decoder::new(input, RcPtr::new(tags), RcPtr::new(attrs));
		let mut out = Vec::new();
		write_xml(&mut out, &mut d, indent).unwrap();
		String::from_utf8(out).unwrap()
	}

	#[test]
	fn renders_mixed_content_inline() {
		let tags: CodeSpace = vec![(0u8, 0x05u8, "BR"), (0, 0x06, "CARD"), (0, 0x07, "XYZ")]
			.into_iter()
			.collect();
		let input: &[u8] = &[
			0x01, 0x01, 0x03, 0x00, 0x47, 0x46, 0x03, b' ', b'X', b' ', b'&', b' ', b'Y',
			0x00, 0x05, 0x03, 0x20, 0x58, 0xC2, 0xA0, 0x3D, 0xC2, 0xA0, 0x31, 0x20, 0x00,
			0x01, 0x01,
		];
		assert_eq!(
			render(input, tags, CodeSpace::new(), "  "),
			"<XYZ>\n  <CARD> X & Y<BR></BR> X\u{A0}=\u{A0}1 </CARD>\n</XYZ>"
		);
	}

	#[test]
	fn renders_attributes_and_nested_elements() {
		let tags: CodeSpace = vec![(0u8, 0x05u8, "CARD"), (0, 0x06, "DO")]
			.into_iter()
			.collect();
		let attrs: CodeSpace = vec![(0u8, 0x09u8, "NAME")].into_iter().collect();
		// <CARD NAME="abc"><DO/></CARD>
		let input: &[u8] = &[
			0x01, 0x01, 0x03, 0x00, 0xC5, 0x09, 0x03, b'a', b'b', b'c', 0x00, 0x01, 0x06,
			0x01,
		];
		assert_eq!(
			render(input, tags, attrs, " "),
			"<CARD NAME=\"abc\">\n <DO></DO>\n</CARD>"
		);
	}

	#[test]
	fn renders_opaque_as_hex_and_entities_as_decimal() {
		let tags: CodeSpace = vec![(0u8, 0x05u8, "A"), (0, 0x06, "B"), (0, 0x07, "C")]
			.into_iter()
			.collect();
		let input: &[u8] = &[
			0x01, 0x01, 0x03, 0x00, 0x45, 0x46, 0xC3, 0x02, 0xDE, 0xAD, 0x01, 0x47, 0x02,
			0x81, 0x20, 0x01, 0x01,
		];
		assert_eq!(
			render(input, tags, CodeSpace::new(), "  "),
			"<A>\n  <B>dead</B>\n  <C>160</C>\n</A>"
		);
	}
}

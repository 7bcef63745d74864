/*!
# Logical WBXML document parts

The term *Token* follows the terminology of pull-style XML APIs. Each
[`Token`] refers to a logical bit of the WBXML document which has been
decoded, and the same tokens drive the [`Encoder`] in the other direction.

## Document token sequence

A well-formed document produces the following sequence of tokens:

1. One *element sequence*

An *element sequence* consists of:

1. [`Token::Start`]
2. Zero or more element sequences, [`Token::CharData`], [`Token::Opaque`]
   or [`Token::Entity`], mixed arbitrarily
3. [`Token::End`] carrying the same name as the matching [`Token::Start`]

The decoder pairs every start with exactly one end token at the same
nesting depth, including for elements whose wire representation carries no
end marker.

   [`Encoder`]: crate::Encoder
*/
use bytes::Bytes;
use smartstring::alias::String as SmartString;

/// String type used for element and attribute names.
///
/// Names in WBXML documents are drawn from code pages and are almost
/// universally short, which makes an inline-allocated small string the
/// appropriate representation.
pub type Name = SmartString;

/// Reserved global tokens, valid in every code page.
///
/// Any byte in element context whose low six bits are outside this range
/// is a [`Tag`].
pub(crate) const GLO_SWITCH_PAGE: u8 = 0x00;
pub(crate) const GLO_END: u8 = 0x01;
pub(crate) const GLO_ENTITY: u8 = 0x02;
pub(crate) const GLO_STR_I: u8 = 0x03;
pub(crate) const GLO_LITERAL: u8 = 0x04;
pub(crate) const GLO_EXT_I_0: u8 = 0x40;
pub(crate) const GLO_EXT_I_1: u8 = 0x41;
pub(crate) const GLO_EXT_I_2: u8 = 0x42;
pub(crate) const GLO_PI: u8 = 0x43;
pub(crate) const GLO_LITERAL_C: u8 = 0x44;
pub(crate) const GLO_EXT_T_0: u8 = 0x80;
pub(crate) const GLO_EXT_T_1: u8 = 0x81;
pub(crate) const GLO_EXT_T_2: u8 = 0x82;
pub(crate) const GLO_STR_T: u8 = 0x83;
pub(crate) const GLO_LITERAL_A: u8 = 0x84;
pub(crate) const GLO_EXT_0: u8 = 0xC0;
pub(crate) const GLO_EXT_1: u8 = 0xC1;
pub(crate) const GLO_EXT_2: u8 = 0xC2;
pub(crate) const GLO_OPAQUE: u8 = 0xC3;
pub(crate) const GLO_LITERAL_AC: u8 = 0xC4;

/// A non-global tag byte.
///
/// The low six bits carry the code within the active tag code page; bit 7
/// flags a following attribute list and bit 6 flags element content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag(u8);

impl Tag {
	const ATTR_MASK: u8 = 0x80;
	const CONTENT_MASK: u8 = 0x40;
	const CODE_MASK: u8 = 0x3f;

	/// Compose a tag byte from a code and the two flag bits.
	///
	/// # Panics
	///
	/// Panics if `code` does not fit in the low six bits.
	pub fn compose(code: u8, attrs: bool, content: bool) -> Tag {
		assert!((code & !Self::CODE_MASK) == 0, "tag code out of range");
		let mut b = code;
		if attrs {
			b |= Self::ATTR_MASK;
		}
		if content {
			b |= Self::CONTENT_MASK;
		}
		Tag(b)
	}

	/// Whether an attribute list follows the tag byte.
	pub fn has_attrs(&self) -> bool {
		self.0 & Self::ATTR_MASK != 0
	}

	/// Whether element content (and a closing `END`) follows.
	pub fn has_content(&self) -> bool {
		self.0 & Self::CONTENT_MASK != 0
	}

	/// The code identifying the tag in its code page.
	pub fn code(&self) -> u8 {
		self.0 & Self::CODE_MASK
	}
}

impl From<u8> for Tag {
	fn from(b: u8) -> Tag {
		Tag(b)
	}
}

impl From<Tag> for u8 {
	fn from(t: Tag) -> u8 {
		t.0
	}
}

/// An attribute of a WBXML element.
///
/// Values are always surfaced as a single string, even when the wire
/// representation was a composite of value codes, inline strings, table
/// references and entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
	pub name: Name,
	pub value: String,
}

impl Attr {
	pub fn new<N: Into<Name>, V: Into<String>>(name: N, value: V) -> Attr {
		Attr {
			name: name.into(),
			value: value.into(),
		}
	}
}

/// The start tag of a WBXML element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StartElement {
	/// Name of the element, resolved through the tag code space.
	pub name: Name,

	/// Attributes, in wire order. Empty for elements without the
	/// attribute flag.
	pub attrs: Vec<Attr>,

	/// Content flag. On decode this reflects the tag byte. On encode,
	/// `false` instructs the encoder to omit the end marker for this
	/// element; the matching [`Token::End`] must still be passed in.
	pub content: bool,
}

impl StartElement {
	/// Create a start tag without attributes or content.
	pub fn new<N: Into<Name>>(name: N) -> StartElement {
		StartElement {
			name: name.into(),
			attrs: Vec::new(),
			content: false,
		}
	}

	/// Create a start tag with the content flag set.
	pub fn with_content<N: Into<Name>>(name: N) -> StartElement {
		StartElement {
			name: name.into(),
			attrs: Vec::new(),
			content: true,
		}
	}
}

/// A processing instruction.
///
/// Carried for completeness of the data model: the decoder rejects PI
/// constructs as unsupported and the encoder refuses to emit this token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcInst {
	pub target: Name,
	pub instruction: Bytes,
}

/**
A single WBXML token

Tokens are emitted by the [`Decoder`] and accepted by the [`Encoder`].
They do not map one-to-one to wire constructs: the decoder coalesces
adjacent character data into a single [`Token::CharData`], page switches
never surface as tokens, and elements without the content flag still
produce a matching [`Token::End`].

   [`Decoder`]: crate::Decoder
   [`Encoder`]: crate::Encoder
*/
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
	/// Start of an element, including its attributes.
	Start(StartElement),

	/// End of the element with the given name.
	End(Name),

	/// A coalesced run of inline strings, string table references and
	/// folded entities.
	///
	/// Never empty and never adjacent to another `CharData` token.
	CharData(Bytes),

	/// Opaque application data, carried verbatim.
	Opaque(Bytes),

	/// A character entity standing alone in element content.
	///
	/// Entities which border character data are folded into the
	/// neighbouring [`Token::CharData`] as their UTF-8 encoding instead.
	Entity(u32),

	/// A processing instruction. Not produced by the decoder; rejected by
	/// the encoder.
	ProcInst(ProcInst),
}

impl Token {
	pub const NAME_START: &'static str = "StartElement";
	pub const NAME_END: &'static str = "EndElement";
	pub const NAME_CHARDATA: &'static str = "CharData";
	pub const NAME_OPAQUE: &'static str = "Opaque";
	pub const NAME_ENTITY: &'static str = "Entity";
	pub const NAME_PROCINST: &'static str = "ProcInst";

	/// Return a static string describing the token type.
	///
	/// This is intended for error messages.
	pub fn name(&self) -> &'static str {
		match self {
			Self::Start(..) => Self::NAME_START,
			Self::End(..) => Self::NAME_END,
			Self::CharData(..) => Self::NAME_CHARDATA,
			Self::Opaque(..) => Self::NAME_OPAQUE,
			Self::Entity(..) => Self::NAME_ENTITY,
			Self::ProcInst(..) => Self::NAME_PROCINST,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tag_unpacks_code_and_flags() {
		let t = Tag::from(0xC5);
		assert_eq!(t.code(), 0x05);
		assert!(t.has_attrs());
		assert!(t.has_content());

		let t = Tag::from(0x47);
		assert_eq!(t.code(), 0x07);
		assert!(!t.has_attrs());
		assert!(t.has_content());

		let t = Tag::from(0x05);
		assert_eq!(t.code(), 0x05);
		assert!(!t.has_attrs());
		assert!(!t.has_content());
	}

	#[test]
	fn tag_composition_mirrors_decomposition() {
		for &(code, attrs, content, expected) in &[
			(0x2du8, false, false, 0x2du8),
			(0x2d, false, true, 0x6d),
			(0x2d, true, true, 0xed),
			(0x05, true, false, 0x85),
		] {
			let t = Tag::compose(code, attrs, content);
			assert_eq!(u8::from(t), expected);
			assert_eq!(t.code(), code);
			assert_eq!(t.has_attrs(), attrs);
			assert_eq!(t.has_content(), content);
		}
	}

	#[test]
	#[should_panic(expected = "tag code out of range")]
	fn tag_composition_rejects_wide_codes() {
		Tag::compose(0x40, false, false);
	}
}

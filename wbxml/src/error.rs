/*!
# Error types

This module holds the error types returned by the various functions of this
crate.
*/
use std::error;
use std::fmt;
use std::io;
use std::ops::Deref;
use std::result::Result as StdResult;
use std::sync::Arc;

use crate::token::Name;

pub const ERRCTX_UNKNOWN: &'static str = "in unknown context";
pub const ERRCTX_HEADER: &'static str = "in document header";
pub const ERRCTX_STRING_TABLE: &'static str = "in string table";
pub const ERRCTX_MBU: &'static str = "in multi-byte integer";
pub const ERRCTX_TERMSTR: &'static str = "in terminated string";
pub const ERRCTX_DOCBEGIN: &'static str = "at beginning of document body";
pub const ERRCTX_DOCEND: &'static str = "at end of document";
pub const ERRCTX_ELEMENT: &'static str = "in element";
pub const ERRCTX_ATTRIBUTES: &'static str = "in attribute list";
pub const ERRCTX_ATTRIBUTE_VALUE: &'static str = "in attribute value";
pub const ERRCTX_CONTENT: &'static str = "in element content";
pub const ERRCTX_OPAQUE: &'static str = "in opaque data";
pub const ERRCTX_ENTITY: &'static str = "in character entity";
pub const ERRCTX_RECORD: &'static str = "in record element";
pub const ERRCTX_VALUE: &'static str = "in value element";

/// [`std::sync::Arc`]-based wrapper around [`std::io::Error`] to allow
/// cloning.
#[derive(Clone)]
pub struct IOErrorWrapper(Arc<io::Error>);

impl IOErrorWrapper {
	fn wrap(e: io::Error) -> IOErrorWrapper {
		IOErrorWrapper(Arc::new(e))
	}
}

impl fmt::Debug for IOErrorWrapper {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		fmt::Debug::fmt(&**self, f)
	}
}

impl fmt::Display for IOErrorWrapper {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		fmt::Display::fmt(&**self, f)
	}
}

impl PartialEq for IOErrorWrapper {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl AsRef<io::Error> for IOErrorWrapper {
	fn as_ref(&self) -> &io::Error {
		&*self.0
	}
}

impl Deref for IOErrorWrapper {
	type Target = io::Error;

	fn deref(&self) -> &io::Error {
		&*self.0
	}
}

impl std::borrow::Borrow<io::Error> for IOErrorWrapper {
	fn borrow(&self) -> &io::Error {
		&*self.0
	}
}

fn write_alternatives(f: &mut fmt::Formatter, opts: &[&'static str]) -> fmt::Result {
	f.write_str(" (expected ")?;
	if opts.len() == 1 {
		f.write_str(opts[0])?;
	} else {
		f.write_str("one of: ")?;
		for (i, opt) in opts.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			f.write_str(*opt)?;
		}
	}
	f.write_str(")")
}

/// Error types which may be returned from the decoder, the encoder or the
/// schema binder.
///
/// With the exception of [`Error::IO`], all errors are fatal for the stream
/// they occurred on; after the first error, the decoder terminates its token
/// stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
	/// An I/O error was encountered on the underlying reader or writer.
	IO(IOErrorWrapper),

	/// End-of-file encountered during a construct where more data was
	/// expected.
	///
	/// The contents are implementation details.
	UnexpectedEof(&'static str),

	/// Syntactically invalid byte sequence.
	///
	/// The contents are implementation details.
	Format(&'static str),

	/// A byte which was not expected at that point in the grammar.
	///
	/// The contents are implementation details.
	UnexpectedByte(&'static str, u8, Option<&'static [&'static str]>),

	/// Reference to a code page which is absent from the code space.
	UnknownPage(u8),

	/// Reference to a code which is absent from its code page, as
	/// `(page, code)`.
	UnknownCode(u8, u8),

	/// A name which is not present in any page of the code space.
	UnknownName(Name),

	/// A construct which the grammar admits, but which this implementation
	/// does not support.
	///
	/// The contents are implementation details.
	NotImplemented(&'static str),

	/// Value does not fit in the configured multi-byte integer width.
	Overflow(u64),

	/// A token which the declared record shape cannot absorb at this
	/// point.
	///
	/// The contents are implementation details.
	SchemaMismatch(&'static str, &'static str, Option<&'static [&'static str]>),

	/// Ending tag name does not match the opening tag, as
	/// `(expected, found)`.
	ElementMismatch(Name, Name),

	/// Error at a byte offset of the input stream.
	Position(usize, Box<Error>),

	/// Error below a named record field; nested variants compose the
	/// dotted field path.
	Field(Name, Box<Error>),
}

pub type Result<T> = StdResult<T, Error>;

impl Error {
	pub fn io(e: io::Error) -> Error {
		Error::IO(IOErrorWrapper::wrap(e))
	}

	/// Wrap the error with the byte offset at which it was detected.
	///
	/// Errors which already carry an offset are returned unchanged.
	pub(crate) fn at(self, offset: usize) -> Error {
		match self {
			Error::Position(..) => self,
			other => Error::Position(offset, Box::new(other)),
		}
	}

	/// Wrap the error with the name of the record field below which it
	/// occurred.
	///
	/// Repeated wrapping builds the dotted path from the outermost record
	/// to the failing leaf.
	pub fn in_field(self, name: &str) -> Error {
		Error::Field(name.into(), Box::new(self))
	}

	/// Byte offset of the input stream at which the error was detected,
	/// if the error came from the decoder.
	pub fn offset(&self) -> Option<usize> {
		match self {
			Error::Position(offset, ..) => Some(*offset),
			Error::Field(_, inner) => inner.offset(),
			_ => None,
		}
	}
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Error {
		Error::io(e)
	}
}

impl fmt::Display for Error {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::IO(e) => write!(f, "I/O error: {}", e),
			Error::UnexpectedEof(ctx) => write!(f, "unexpected end of file {}", ctx),
			Error::Format(msg) => write!(f, "invalid format: {}", msg),
			Error::UnexpectedByte(ctx, b, Some(opts)) if opts.len() > 0 => {
				write!(f, "0x{:02x} not allowed {}", *b, ctx)?;
				write_alternatives(f, opts)
			}
			Error::UnexpectedByte(ctx, b, _) => write!(f, "0x{:02x} not allowed {}", *b, ctx),
			Error::UnknownPage(page) => write!(f, "unknown code page {}", page),
			Error::UnknownCode(page, code) => {
				write!(f, "unknown code {} in page {}", code, page)
			}
			Error::UnknownName(name) => write!(f, "name {:?} not in code space", name.as_str()),
			Error::NotImplemented(msg) => write!(f, "not implemented: {}", msg),
			Error::Overflow(v) => write!(
				f,
				"value {} does not fit the multi-byte integer width",
				v
			),
			Error::SchemaMismatch(ctx, tok, Some(opts)) if opts.len() > 0 => {
				write!(f, "unexpected {} token {}", tok, ctx)?;
				write_alternatives(f, opts)
			}
			Error::SchemaMismatch(ctx, tok, _) => write!(f, "unexpected {} token {}", tok, ctx),
			Error::ElementMismatch(expected, found) => write!(
				f,
				"expected end of element {:?}, got {:?}",
				expected.as_str(),
				found.as_str()
			),
			Error::Position(offset, inner) => write!(f, "position {}: {}", offset, inner),
			Error::Field(name, inner) => match &**inner {
				Error::Field(..) => write!(f, "{}.{}", name, inner),
				other => write!(f, "{}: {}", name, other),
			},
		}
	}
}

impl error::Error for Error {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match self {
			Error::IO(e) => Some(&**e),
			Error::Position(_, inner) | Error::Field(_, inner) => Some(&**inner),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn field_wrapping_builds_dotted_path() {
		let e = Error::Format("broken")
			.in_field("MsgID")
			.in_field("SyncHdr");
		assert_eq!(format!("{}", e), "SyncHdr.MsgID: invalid format: broken");
	}

	#[test]
	fn position_wrapping_is_idempotent() {
		let e = Error::Format("broken").at(12).at(40);
		assert_eq!(e.offset(), Some(12));
		assert_eq!(format!("{}", e), "position 12: invalid format: broken");
	}

	#[test]
	fn offset_is_visible_through_field_context() {
		let e = Error::Format("broken").at(7).in_field("LocURI");
		assert_eq!(e.offset(), Some(7));
	}
}

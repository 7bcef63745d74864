/*!
# Code pages and code spaces

WBXML replaces element and attribute names by single-byte codes drawn from
numbered code pages. A [`CodeSpace`] is the collection of pages valid for
one context; each document uses two independent spaces, one for tags and
one for attribute names and values.

Code spaces are read-only once built and may be shared between any number
of documents; wrap them in an [`RcPtr`] to do so.
*/
#[cfg(not(feature = "mt"))]
use std::rc::Rc;
#[cfg(feature = "mt")]
use std::sync::Arc;

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::token::Name;

/// Wrapper pointer around shared code spaces
///
/// In builds with the `mt` feature, this is a [`Arc`]. In non-`mt`
/// builds, this is a [`std::rc::Rc`]
#[cfg(feature = "mt")]
pub type RcPtr<T> = Arc<T>;
/// Wrapper pointer around shared code spaces
///
/// In builds with the `mt` feature, this is a [`std::sync::Arc`].
/// In non-`mt` builds, this is a [`Rc`]
#[cfg(not(feature = "mt"))]
pub type RcPtr<T> = Rc<T>;

/// A mapping between codes and names within a single page.
///
/// Valid codes are `0x05..=0x3f` for tag pages; attribute pages
/// additionally use codes above `0x7f` for well-known value prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodePage {
	codes: BTreeMap<u8, Name>,
}

impl CodePage {
	pub fn new() -> CodePage {
		CodePage {
			codes: BTreeMap::new(),
		}
	}

	/// Define the name for a code, replacing any previous definition.
	pub fn define<N: Into<Name>>(&mut self, code: u8, name: N) {
		self.codes.insert(code, name.into());
	}

	/// Look up the name assigned to `code`.
	pub fn name(&self, code: u8) -> Option<&Name> {
		self.codes.get(&code)
	}

	/// Find the lowest code assigned to `name`.
	pub fn find(&self, name: &str) -> Option<u8> {
		self.codes
			.iter()
			.find(|(_, n)| n.as_str() == name)
			.map(|(code, _)| *code)
	}

	/// Iterate over `(code, name)` pairs in ascending code order.
	pub fn iter(&self) -> impl Iterator<Item = (u8, &Name)> + '_ {
		self.codes.iter().map(|(code, name)| (*code, name))
	}

	pub fn len(&self) -> usize {
		self.codes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.codes.is_empty()
	}
}

/// The code pages of one naming context, keyed by page id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeSpace {
	pages: BTreeMap<u8, CodePage>,
}

impl CodeSpace {
	pub fn new() -> CodeSpace {
		CodeSpace {
			pages: BTreeMap::new(),
		}
	}

	/// Define a name in the given page, creating the page on demand.
	pub fn define<N: Into<Name>>(&mut self, page: u8, code: u8, name: N) {
		self.pages.entry(page).or_insert_with(CodePage::new).define(code, name);
	}

	/// Access a single page.
	pub fn page(&self, page: u8) -> Option<&CodePage> {
		self.pages.get(&page)
	}

	/// Return the name encoded by `(page, code)`.
	pub fn name(&self, page: u8, code: u8) -> Result<&Name> {
		let p = self.pages.get(&page).ok_or(Error::UnknownPage(page))?;
		p.name(code).ok_or(Error::UnknownCode(page, code))
	}

	/// Find the `(code, page)` pair assigned to `name`.
	///
	/// Names may repeat across pages; the match in the lowest page id (and
	/// the lowest code within it) wins, which keeps encoding
	/// deterministic.
	pub fn find(&self, name: &str) -> Result<(u8, u8)> {
		for (page, p) in self.pages.iter() {
			if let Some(code) = p.find(name) {
				return Ok((code, *page));
			}
		}
		Err(Error::UnknownName(name.into()))
	}
}

/// Build a code space from `(page, code, name)` triples.
impl<'a> std::iter::FromIterator<(u8, u8, &'a str)> for CodeSpace {
	fn from_iter<I: IntoIterator<Item = (u8, u8, &'a str)>>(iter: I) -> CodeSpace {
		let mut space = CodeSpace::new();
		for (page, code, name) in iter {
			space.define(page, code, name);
		}
		space
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn space() -> CodeSpace {
		vec![
			(0u8, 0x05u8, "BR"),
			(0, 0x06, "CARD"),
			(0, 0x07, "XYZ"),
			(1, 0x05, "Anchor"),
			(1, 0x06, "CARD"),
		]
		.into_iter()
		.collect()
	}

	#[test]
	fn name_lookup_resolves_page_and_code() {
		let s = space();
		assert_eq!(s.name(0, 0x06).unwrap(), "CARD");
		assert_eq!(s.name(1, 0x05).unwrap(), "Anchor");
	}

	#[test]
	fn name_lookup_reports_missing_page() {
		match space().name(9, 0x05) {
			Err(Error::UnknownPage(9)) => (),
			other => panic!("unexpected lookup result: {:?}", other),
		}
	}

	#[test]
	fn name_lookup_reports_missing_code() {
		match space().name(0, 0x3f) {
			Err(Error::UnknownCode(0, 0x3f)) => (),
			other => panic!("unexpected lookup result: {:?}", other),
		}
	}

	#[test]
	fn find_prefers_the_lowest_page() {
		// "CARD" exists in pages 0 and 1; ascending iteration pins the
		// result to page 0.
		assert_eq!(space().find("CARD").unwrap(), (0x06, 0));
	}

	#[test]
	fn find_reports_unknown_names() {
		match space().find("NOPE") {
			Err(Error::UnknownName(name)) => assert_eq!(name, "NOPE"),
			other => panic!("unexpected find result: {:?}", other),
		}
	}
}

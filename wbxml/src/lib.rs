/*!
# Restricted WBXML parsing and encoding

This crate provides parsing and encoding of WBXML 1.x documents (WAP
Binary XML, the tokenized binary form of XML) together with a schema
binder which maps record types onto documents.

## Features (some call them restrictions)

* Streamed decoding (pull-style token reader over any [`std::io::BufRead`])
* Streamed encoding (push-style token writer over any [`std::io::Write`])
* Separate, shareable code spaces for tags and attributes
* String table interning and dereferencing
* Schema binding with derive macros (`macros` feature, on by default)
* No processing instructions
* No `LITERAL` tag or attribute names
* No `EXT*` extension tokens

## Example

```
use wbxml::{CodeSpace, Decoder, RcPtr, Token, TokenRead};

let doc: &[u8] = &[0x01, 0x01, 0x03, 0x00, 0x45, 0x03, b'h', b'i', 0x00, 0x01];
let tags = RcPtr::new(vec![(0u8, 0x05u8, "greeting")].into_iter().collect::<CodeSpace>());
let mut d = Decoder::new(doc, tags, RcPtr::new(CodeSpace::new()));
while let Some(token) = d.read().unwrap() {
	println!("got token: {:?}", token);
}
```

## Decoding into records

With the `macros` feature, record shapes can be bound directly:

```
use wbxml::{CodeSpace, Decoder, Encoder, Header, RcPtr, StartElement, Marshal, Unmarshal};

#[derive(Debug, Default, PartialEq, Marshal, Unmarshal)]
struct Greeting {
	#[wbxml(name = "Text")]
	text: String,
}

let tags = RcPtr::new(
	vec![(0u8, 0x05u8, "Greeting"), (0, 0x06, "Text")]
		.into_iter()
		.collect::<CodeSpace>(),
);
let attrs = RcPtr::new(CodeSpace::new());

let mut buf = Vec::new();
let mut e = Encoder::new(&mut buf, tags.clone(), attrs.clone());
e.encode_header(Header { version: 3, public_id: 1, charset: 106, ..Header::default() })
	.unwrap();
let v = Greeting { text: "hi".to_string() };
e.encode_element(&v, StartElement::new("Greeting")).unwrap();

let decoded: Greeting = Decoder::new(&buf[..], tags, attrs).decode().unwrap();
assert_eq!(decoded, v);
```
*/
pub mod codepage;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod header;
pub mod primitives;
pub mod schema;
pub mod syncml;
pub mod token;
pub mod xml;


#[doc(inline)]
pub use codepage::{CodePage, CodeSpace, RcPtr};
#[doc(inline)]
pub use decoder::{Decoder, DecoderOptions, TokenRead};
#[doc(inline)]
pub use encoder::Encoder;
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use header::Header;
#[doc(inline)]
pub use schema::{Marshal, Unmarshal};
pub use token::{Attr, Name, ProcInst, StartElement, Tag, Token};

#[cfg(feature = "macros")]
#[doc(inline)]
#[cfg_attr(docsrs, doc(cfg(feature = "macros")))]
pub use wbxml_proc::{Marshal, Unmarshal};

/// Package version
pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");

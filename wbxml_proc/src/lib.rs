/*!
# Derive macros for WBXML record binding

This crate provides `#[derive(Marshal)]` and `#[derive(Unmarshal)]` which
map a struct with named fields onto a WBXML element: every field becomes
a child element named after the field, in declaration order.

The element name of a field can be overridden:

```rust,ignore
use wbxml::{Marshal, Unmarshal};

#[derive(Default, Marshal, Unmarshal)]
struct SyncHdr {
	#[wbxml(name = "VerDTD")]
	ver_dtd: String,
	#[wbxml(name = "MsgID")]
	msg_id: u32,
}
```

During decoding, child elements without a matching field are skipped
(including their subtrees), and absent fields keep their default value.

## See also

This crate is primarily intended for use with the
[`wbxml`](https://docs.rs/wbxml) crate, which re-exports both macros
behind its `macros` feature.
*/
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr};

struct BoundField {
	ident: syn::Ident,
	label: String,
}

fn bound_fields(input: &DeriveInput) -> syn::Result<Vec<BoundField>> {
	let fields = match &input.data {
		Data::Struct(st) => match &st.fields {
			Fields::Named(named) => &named.named,
			Fields::Unit => return Ok(Vec::new()),
			Fields::Unnamed(..) => {
				return Err(syn::Error::new_spanned(
					&input.ident,
					"wbxml binding requires named fields",
				))
			}
		},
		_ => {
			return Err(syn::Error::new_spanned(
				&input.ident,
				"wbxml binding can only be derived for structs",
			))
		}
	};

	let mut out = Vec::new();
	for field in fields {
		let ident = field
			.ident
			.clone()
			.expect("named fields always have an ident");
		let mut label = ident.to_string();
		for attr in &field.attrs {
			if !attr.path().is_ident("wbxml") {
				continue;
			}
			attr.parse_nested_meta(|meta| {
				if meta.path.is_ident("name") {
					let lit: LitStr = meta.value()?.parse()?;
					label = lit.value();
					Ok(())
				} else {
					Err(meta.error("unsupported wbxml attribute"))
				}
			})?;
		}
		out.push(BoundField { ident, label });
	}
	Ok(out)
}

/** Derive `wbxml::schema::Marshal` for a struct with named fields.

Encodes the value as one element whose children are the fields, in
declaration order, each under the field's (possibly renamed) label. The
content flag is set whenever the struct has at least one field.
*/
#[proc_macro_derive(Marshal, attributes(wbxml))]
pub fn derive_marshal(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	let fields = match bound_fields(&input) {
		Ok(fields) => fields,
		Err(e) => return e.to_compile_error().into(),
	};
	let name = &input.ident;
	let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
	let has_fields = !fields.is_empty();
	let steps = fields.iter().map(|field| {
		let ident = &field.ident;
		let label = &field.label;
		quote! {
			::wbxml::Encoder::encode_element(
				e,
				&self.#ident,
				::wbxml::StartElement::new(#label),
			)
			.map_err(|err| err.in_field(#label))?;
		}
	});

	let expanded = quote! {
		#[automatically_derived]
		impl #impl_generics ::wbxml::schema::Marshal for #name #ty_generics #where_clause {
			fn marshal_wbxml<__W: ::std::io::Write>(
				&self,
				e: &mut ::wbxml::Encoder<__W>,
				mut start: ::wbxml::StartElement,
			) -> ::wbxml::Result<()> {
				start.content = #has_fields;
				let __name = start.name.clone();
				::wbxml::Encoder::encode_token(e, &::wbxml::Token::Start(start))?;
				#(#steps)*
				::wbxml::Encoder::encode_token(e, &::wbxml::Token::End(__name))
			}
		}
	};
	expanded.into()
}

/** Derive `wbxml::schema::Unmarshal` for a struct with named fields.

Consumes tokens until the end of the bound element. Child elements are
dispatched to the field with the matching label; unmatched children are
skipped together with their subtrees, and fields without a matching
child keep their default value.
*/
#[proc_macro_derive(Unmarshal, attributes(wbxml))]
pub fn derive_unmarshal(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	let fields = match bound_fields(&input) {
		Ok(fields) => fields,
		Err(e) => return e.to_compile_error().into(),
	};
	let name = &input.ident;
	let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
	let arms = fields.iter().map(|field| {
		let ident = &field.ident;
		let label = &field.label;
		quote! {
			#label => ::wbxml::Decoder::decode_element(
				d,
				&mut self.#ident,
				::std::option::Option::Some(&st),
			)
			.map_err(|err| err.in_field(#label))?,
		}
	});

	let expanded = quote! {
		#[automatically_derived]
		impl #impl_generics ::wbxml::schema::Unmarshal for #name #ty_generics #where_clause {
			fn unmarshal_wbxml<__R: ::std::io::BufRead>(
				&mut self,
				d: &mut ::wbxml::Decoder<__R>,
				start: &::wbxml::StartElement,
			) -> ::wbxml::Result<()> {
				loop {
					match ::wbxml::TokenRead::read(d)? {
						::std::option::Option::Some(::wbxml::Token::Start(st)) => {
							match st.name.as_str() {
								#(#arms)*
								_ => ::wbxml::Decoder::skip_element(d, &st)?,
							}
						}
						::std::option::Option::Some(::wbxml::Token::End(name)) => {
							if name == start.name {
								return ::std::result::Result::Ok(());
							}
							return ::std::result::Result::Err(
								::wbxml::Error::ElementMismatch(start.name.clone(), name),
							);
						}
						::std::option::Option::Some(..) => (),
						::std::option::Option::None => {
							return ::std::result::Result::Err(
								::wbxml::Error::UnexpectedEof(::wbxml::error::ERRCTX_RECORD),
							)
						}
					}
				}
			}
		}
	};
	expanded.into()
}

#[macro_use]
extern crate afl;
extern crate wbxml;

use wbxml::TokenRead;

fn main() {
    fuzz!(|data: &[u8]| {
		let tags = wbxml::RcPtr::new(wbxml::syncml::tags());
		let attrs = wbxml::RcPtr::new(wbxml::CodeSpace::new());
		let mut decoder = wbxml::Decoder::new(data, tags, attrs);

		loop {
			match decoder.read() {
				Err(_) => return,
				Ok(None) => return,
				Ok(Some(_)) => (),
			}
		}
    });
}

//! Input text decoding using chardetng and `encoding_rs`.
//!
//! Records handed to a [`Writer`](crate::Writer) are Rust strings, so input
//! read from disk has to become UTF-8 first. These helpers do that for
//! callers that do not control the charset of their input.

use std::borrow::Cow;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use simdutf8::basic::from_utf8;

/// The UTF-8 byte order mark.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Strip a leading UTF-8 BOM, if present.
pub fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(UTF8_BOM).unwrap_or(data)
}

/// Text decoded from raw input bytes.
#[derive(Debug, Clone)]
pub struct DecodedText<'a> {
    /// The UTF-8 text, without any byte order mark.
    pub text: Cow<'a, str>,
    /// The charset the input was decoded from.
    pub encoding: &'static Encoding,
    /// Whether malformed sequences were replaced with U+FFFD.
    pub had_errors: bool,
}

impl DecodedText<'_> {
    /// Returns true if the input had to be converted from another charset.
    pub fn was_transcoded(&self) -> bool {
        self.encoding != UTF_8
    }
}

/// Decode raw input bytes to UTF-8 text.
///
/// UTF-16 input is recognized by its BOM. Valid UTF-8 is borrowed as is.
/// Anything else goes through chardetng, which covers the legacy Windows,
/// ISO-8859 and CJK charsets.
pub fn decode_to_utf8(data: &[u8]) -> DecodedText<'_> {
    // chardetng does not look for UTF-16 BOMs
    match Encoding::for_bom(data) {
        Some((encoding, _)) if encoding == UTF_16LE || encoding == UTF_16BE => {
            return decode_with(encoding, data);
        }
        _ => {}
    }

    let data = strip_bom(data);
    if let Ok(text) = from_utf8(data) {
        return DecodedText {
            text: Cow::Borrowed(text),
            encoding: UTF_8,
            had_errors: false,
        };
    }

    let mut detector = EncodingDetector::new();
    detector.feed(data, true);
    decode_with(detector.guess(None, true), data)
}

fn decode_with<'a>(encoding: &'static Encoding, data: &'a [u8]) -> DecodedText<'a> {
    let (text, encoding, had_errors) = encoding.decode(data);
    tracing::debug!(
        encoding = encoding.name(),
        had_errors,
        "decoded input to utf-8"
    );
    DecodedText {
        text,
        encoding,
        had_errors,
    }
}

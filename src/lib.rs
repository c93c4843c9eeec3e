//! csv-scribe: configurable CSV-family record writer
//!
//! Writes records (sequences of text fields) as delimited text, with the
//! delimiter, quote character, quoting policy and line terminator all under
//! the caller's control. Use it to emit pipe-delimited, semicolon-delimited,
//! always-quoted or never-quoted variants that plain RFC 4180 writers do not
//! produce.
//!
//! # Quick Start
//!
//! ```
//! use csv_scribe::Writer;
//!
//! let mut out = Vec::new();
//! let mut writer = Writer::from_writer(&mut out);
//! writer.write_records([["id", "comment"], ["1", "hello, world"]]).unwrap();
//! drop(writer);
//!
//! assert_eq!(out, b"id,comment\n1,\"hello, world\"\n");
//! ```
//!
//! # Dialects
//!
//! ```
//! use csv_scribe::{Quote, WriterBuilder};
//!
//! let mut out = Vec::new();
//! let mut writer = WriterBuilder::new()
//!     .delimiter('|')
//!     .quote(Quote::None)
//!     .build(&mut out)
//!     .unwrap();
//! writer.write_record(["a", "", "b"]).unwrap();
//! writer.flush().unwrap();
//! drop(writer);
//!
//! assert_eq!(out, b"a||b\n");
//! ```
//!
//! # Quoting rules
//!
//! A field is quoted when the dialect says to always quote, or when quoting
//! is enabled and the field is empty, contains the delimiter, the quote
//! character, `\r` or `\n`, or starts with whitespace. Inside quotes the
//! quote character is doubled. With a `\r\n` terminator embedded line breaks
//! are normalized to `\r\n` and bare `\r` is dropped.

mod dialect;
mod encoding;
mod error;
mod quoting;
mod writer;

pub use dialect::{Dialect, LineTerminator, Quote};
pub use error::{EncodeError, IntoInnerError, Result};
pub use writer::{Writer, WriterBuilder};

// Re-export for advanced usage
pub use encoding::{DecodedText, decode_to_utf8, strip_bom};
pub use quoting::{needs_quotes, write_quoted};

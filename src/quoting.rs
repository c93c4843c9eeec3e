//! Field quoting decisions and quoted-field escaping.

use std::io::{self, Write};

use crate::dialect::{Dialect, LineTerminator};

/// Returns true if `field` must be enclosed in quotes under `dialect`.
///
/// Checked in order:
/// 1. `always_quote` forces quoting.
/// 2. With quoting disabled nothing is ever quoted, not even empty fields or
///    fields holding the delimiter or newlines. Keeping such output parseable
///    is up to the caller.
/// 3. Otherwise empty fields, fields containing the delimiter, the quote
///    character, `\r` or `\n`, and fields starting with Unicode whitespace
///    are quoted.
pub fn needs_quotes(field: &str, dialect: &Dialect) -> bool {
    if dialect.always_quote {
        return true;
    }

    let Some(quote) = dialect.quote.char() else {
        return false;
    };

    if field.is_empty()
        || field.contains(dialect.delimiter)
        || field.contains(quote)
        || field.contains(['\r', '\n'])
    {
        return true;
    }

    field.chars().next().is_some_and(char::is_whitespace)
}

/// Write `field` wrapped in `quote`, escaping as it goes.
///
/// Quote characters are doubled. With a CRLF terminator, bare `\r` is dropped
/// and `\n` becomes `\r\n` so embedded line breaks match the record
/// terminator; with LF both are written unchanged.
pub fn write_quoted<W: Write>(
    wtr: &mut W,
    field: &str,
    quote: char,
    line_terminator: LineTerminator,
) -> io::Result<()> {
    let mut buf = [0u8; 4];
    let quote_str = quote.encode_utf8(&mut buf).as_bytes();
    let crlf = line_terminator == LineTerminator::CRLF;

    wtr.write_all(quote_str)?;

    // Copy runs of plain text in one go and only stop at characters that
    // need rewriting.
    let mut start = 0;
    for (i, ch) in field.char_indices() {
        let end = i + ch.len_utf8();
        if ch == quote {
            // Flush the run through this quote and begin the next run on it,
            // so it goes out twice.
            wtr.write_all(field[start..end].as_bytes())?;
            start = i;
            continue;
        }

        let replacement: &[u8] = match ch {
            '\r' if crlf => b"",
            '\n' if crlf => b"\r\n",
            _ => continue,
        };
        wtr.write_all(field[start..i].as_bytes())?;
        wtr.write_all(replacement)?;
        start = end;
    }
    wtr.write_all(field[start..].as_bytes())?;

    wtr.write_all(quote_str)
}

//! Writer builder and record writing methods.

use std::io::{self, BufWriter, Write};

use crate::dialect::{Dialect, LineTerminator, Quote};
use crate::error::{EncodeError, IntoInnerError, Result};
use crate::quoting::{needs_quotes, write_quoted};

/// Default capacity of the internal buffer, in bytes.
const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// Builder for a [`Writer`] with a custom dialect.
///
/// # Example
///
/// ```
/// use csv_scribe::{Quote, WriterBuilder};
///
/// let mut out = Vec::new();
/// let mut writer = WriterBuilder::new()
///     .delimiter(';')
///     .quote(Quote::Some('|'))
///     .use_crlf(true)
///     .build(&mut out)
///     .unwrap();
///
/// writer.write_record(["a;b", "c"]).unwrap();
/// writer.flush().unwrap();
/// drop(writer);
///
/// assert_eq!(out, b"|a;b|;c\r\n");
/// ```
#[derive(Debug, Clone)]
pub struct WriterBuilder {
    /// Dialect handed to every writer built.
    dialect: Dialect,
    /// Capacity of the internal buffer.
    capacity: usize,
}

impl Default for WriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WriterBuilder {
    /// Create a new builder with the default dialect.
    pub fn new() -> Self {
        Self {
            dialect: Dialect::default(),
            capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }

    /// Set the field delimiter.
    pub fn delimiter(&mut self, delimiter: char) -> &mut Self {
        self.dialect.delimiter = delimiter;
        self
    }

    /// Set the quote character, or disable quoting with [`Quote::None`].
    pub fn quote(&mut self, quote: Quote) -> &mut Self {
        self.dialect.quote = quote;
        self
    }

    /// Quote every field regardless of its content.
    pub fn always_quote(&mut self, yes: bool) -> &mut Self {
        self.dialect.always_quote = yes;
        self
    }

    /// End records with `\r\n` instead of `\n`.
    pub fn use_crlf(&mut self, yes: bool) -> &mut Self {
        self.dialect.line_terminator = if yes {
            LineTerminator::CRLF
        } else {
            LineTerminator::LF
        };
        self
    }

    /// Set the record terminator.
    pub fn line_terminator(&mut self, line_terminator: LineTerminator) -> &mut Self {
        self.dialect.line_terminator = line_terminator;
        self
    }

    /// Replace the whole dialect.
    pub fn dialect(&mut self, dialect: Dialect) -> &mut Self {
        self.dialect = dialect;
        self
    }

    /// Set the capacity of the internal buffer.
    ///
    /// A capacity of zero hands every write straight to the sink.
    pub fn buffer_capacity(&mut self, capacity: usize) -> &mut Self {
        self.capacity = capacity;
        self
    }

    /// Build a writer over `wtr`.
    ///
    /// Fails with [`EncodeError::InvalidConfig`] if the dialect forces quotes
    /// while quoting is disabled.
    pub fn build<W: Write>(&self, wtr: W) -> Result<Writer<W>> {
        self.dialect.validate()?;

        if self.dialect.is_ambiguous() {
            tracing::warn!(
                delimiter = %self.dialect.delimiter,
                "delimiter and quote character are identical, output will be ambiguous"
            );
        }

        tracing::debug!(
            delimiter = %self.dialect.delimiter,
            quote = %self.dialect.quote,
            always_quote = self.dialect.always_quote,
            line_terminator = %self.dialect.line_terminator,
            capacity = self.capacity,
            "building csv writer"
        );

        Ok(Writer {
            wtr: BufWriter::with_capacity(self.capacity, wtr),
            dialect: self.dialect,
            last_error: None,
        })
    }
}

/// Writes records to a sink using a configurable dialect.
///
/// Output is buffered; call [`Writer::flush`] (or use
/// [`Writer::write_records`], which flushes) to push it to the sink. The
/// sink is never closed by the writer; pass `&mut W` to keep ownership.
///
/// The first failure reported by the sink is latched: later writes and
/// flushes return it without touching the sink, and [`Writer::error`]
/// reports it. Output still sitting in the buffer is not discarded, so
/// dropping the writer makes one last attempt to flush it, ignoring any
/// error.
///
/// # Example
///
/// ```
/// use csv_scribe::Writer;
///
/// let mut out = Vec::new();
/// let mut writer = Writer::from_writer(&mut out);
/// writer.write_records([["name", "note"], ["Alice", "says \"hi\""]]).unwrap();
/// drop(writer);
///
/// assert_eq!(out, b"name,note\nAlice,\"says \"\"hi\"\"\"\n");
/// ```
#[derive(Debug)]
pub struct Writer<W: Write> {
    wtr: BufWriter<W>,
    dialect: Dialect,
    last_error: Option<EncodeError>,
}

impl<W: Write> Writer<W> {
    /// Create a writer over `wtr` with the default dialect.
    pub fn from_writer(wtr: W) -> Self {
        Self {
            wtr: BufWriter::with_capacity(DEFAULT_BUFFER_CAPACITY, wtr),
            dialect: Dialect::default(),
            last_error: None,
        }
    }

    /// The dialect this writer was built with.
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Write a single record followed by the line terminator.
    ///
    /// The record is not written atomically: if the sink fails part way
    /// through, the fields before the failure may already be in the buffer.
    pub fn write_record<I, T>(&mut self, record: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.check()?;
        let result = encode_record(&mut self.wtr, &self.dialect, record);
        self.latch(result)
    }

    /// Write every record in order, then flush.
    ///
    /// Stops at the first failure. Records written before it stay in the
    /// buffer or the sink.
    pub fn write_records<R, I, T>(&mut self, records: R) -> Result<()>
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut count = 0usize;
        for record in records {
            self.write_record(record)?;
            count += 1;
        }
        self.flush()?;

        tracing::debug!(records = count, "wrote csv records");
        Ok(())
    }

    /// Flush buffered output to the sink.
    pub fn flush(&mut self) -> Result<()> {
        self.check()?;
        let result = self.wtr.flush();
        self.latch(result)
    }

    /// The failure latched by a previous write or flush, if any.
    pub fn error(&self) -> Option<EncodeError> {
        self.last_error.clone()
    }

    /// Borrow the sink.
    pub fn get_ref(&self) -> &W {
        self.wtr.get_ref()
    }

    /// Mutably borrow the sink.
    ///
    /// Writing to the sink directly bypasses the buffer and may interleave
    /// with buffered output.
    pub fn get_mut(&mut self) -> &mut W {
        self.wtr.get_mut()
    }

    /// Flush and return the sink.
    ///
    /// On failure the writer is handed back inside the error, so an owned
    /// sink can still be recovered with [`IntoInnerError::into_inner`].
    pub fn into_inner(mut self) -> std::result::Result<W, IntoInnerError<Writer<W>>> {
        if let Err(err) = self.flush() {
            return Err(IntoInnerError::new(self, err));
        }

        let Writer { wtr, dialect, .. } = self;
        wtr.into_inner().map_err(|err| {
            let (err, wtr) = err.into_parts();
            let err = EncodeError::from(err);
            let writer = Writer {
                wtr,
                dialect,
                last_error: Some(err.clone()),
            };
            IntoInnerError::new(writer, err)
        })
    }

    fn check(&self) -> Result<()> {
        match &self.last_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn latch(&mut self, result: io::Result<()>) -> Result<()> {
        result.map_err(|err| {
            tracing::debug!(error = %err, "csv sink failed, latching error");
            let err = EncodeError::from(err);
            self.last_error = Some(err.clone());
            err
        })
    }
}

/// Encode one record into `wtr`.
fn encode_record<W, I, T>(wtr: &mut W, dialect: &Dialect, record: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut buf = [0u8; 4];
    let delimiter = dialect.delimiter.encode_utf8(&mut buf).as_bytes();

    for (n, field) in record.into_iter().enumerate() {
        if n > 0 {
            wtr.write_all(delimiter)?;
        }

        let field = field.as_ref();
        match dialect.quote {
            Quote::Some(quote) if needs_quotes(field, dialect) => {
                write_quoted(wtr, field, quote, dialect.line_terminator)?;
            }
            // Covers quoting disabled: the field goes out as is, even if it
            // holds structural characters.
            _ => wtr.write_all(field.as_bytes())?,
        }
    }

    wtr.write_all(dialect.line_terminator.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sink that fails every write and flush.
    #[derive(Debug)]
    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::other("sink closed"))
        }
    }

    /// Sink that counts flushes.
    #[derive(Default)]
    struct CountingSink {
        data: Vec<u8>,
        flushes: usize,
    }

    impl Write for CountingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    fn encode(builder: &WriterBuilder, records: &[&[&str]]) -> String {
        let mut wtr = builder.build(Vec::new()).unwrap();
        wtr.write_records(records.iter().copied()).unwrap();
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_writer_builder() {
        let mut builder = WriterBuilder::new();
        builder
            .delimiter(';')
            .quote(Quote::Some('\''))
            .always_quote(true)
            .use_crlf(true)
            .buffer_capacity(16);

        assert_eq!(builder.dialect.delimiter, ';');
        assert_eq!(builder.dialect.quote, Quote::Some('\''));
        assert!(builder.dialect.always_quote);
        assert_eq!(builder.dialect.line_terminator, LineTerminator::CRLF);
        assert_eq!(builder.capacity, 16);

        builder.use_crlf(false);
        assert_eq!(builder.dialect.line_terminator, LineTerminator::LF);
    }

    #[test]
    fn test_build_rejects_always_quote_without_quote() {
        let result = WriterBuilder::new()
            .quote(Quote::None)
            .always_quote(true)
            .build(Vec::new());
        assert!(matches!(result, Err(EncodeError::InvalidConfig(_))));
    }

    #[test]
    fn test_default_writer() {
        assert_eq!(encode(&WriterBuilder::new(), &[&["abc", "def"]]), "abc,def\n");
        assert_eq!(encode(&WriterBuilder::new(), &[&["abc"], &["def"]]), "abc\ndef\n");
        assert_eq!(encode(&WriterBuilder::new(), &[&[""]]), "\"\"\n");
    }

    #[test]
    fn test_empty_record() {
        assert_eq!(encode(&WriterBuilder::new(), &[&[]]), "\n");
    }

    #[test]
    fn test_quoting_disabled_writes_raw() {
        let mut builder = WriterBuilder::new();
        builder.quote(Quote::None);
        assert_eq!(encode(&builder, &[&["a", "", "b"]]), "a,,b\n");
        assert_eq!(encode(&builder, &[&["a,b", "c\nd"]]), "a,b,c\nd\n");
    }

    #[test]
    fn test_multibyte_delimiter() {
        let mut builder = WriterBuilder::new();
        builder.delimiter('¦');
        assert_eq!(encode(&builder, &[&["a", "b¦c"]]), "a¦\"b¦c\"\n");
    }

    #[test]
    fn test_write_records_flushes_once() {
        let mut sink = CountingSink::default();
        let mut wtr = WriterBuilder::new()
            .always_quote(true)
            .build(&mut sink)
            .unwrap();
        wtr.write_records([["abc", "def"], ["uvw", "xyz"]]).unwrap();
        drop(wtr);

        assert_eq!(sink.data, b"\"abc\",\"def\"\n\"uvw\",\"xyz\"\n");
        assert_eq!(sink.flushes, 1);
    }

    #[test]
    fn test_write_record_is_buffered() {
        let mut sink = CountingSink::default();
        let mut wtr = Writer::from_writer(&mut sink);
        wtr.write_record(["abc"]).unwrap();
        assert!(wtr.get_ref().data.is_empty());
        wtr.flush().unwrap();
        assert_eq!(wtr.get_ref().data, b"abc\n");
    }

    #[test]
    fn test_unbuffered_failure_is_reported_and_latched() {
        let mut wtr = WriterBuilder::new()
            .buffer_capacity(0)
            .build(FailingSink)
            .unwrap();
        assert!(wtr.error().is_none());

        let err = wtr.write_record(["abc"]).unwrap_err();
        assert_eq!(err.io_kind(), Some(io::ErrorKind::Other));
        assert!(matches!(wtr.error(), Some(EncodeError::Write(_))));

        // Latched: later calls fail without reaching the sink
        assert!(wtr.write_record(["def"]).is_err());
        assert!(wtr.flush().is_err());
    }

    #[test]
    fn test_buffered_failure_surfaces_on_flush() {
        let mut wtr = Writer::from_writer(FailingSink);
        wtr.write_record(["abc"]).unwrap();
        assert!(wtr.error().is_none());

        assert!(wtr.flush().is_err());
        assert!(wtr.error().is_some());
    }

    #[test]
    fn test_write_records_stops_at_first_failure() {
        let mut wtr = WriterBuilder::new()
            .buffer_capacity(0)
            .build(FailingSink)
            .unwrap();
        let result = wtr.write_records([["a"], ["b"]]);
        assert!(matches!(result, Err(EncodeError::Write(_))));
    }

    #[test]
    fn test_into_inner_reports_flush_failure() {
        let mut wtr = Writer::from_writer(FailingSink);
        wtr.write_record(["abc"]).unwrap();

        let err = wtr.into_inner().unwrap_err();
        assert!(matches!(err.error(), EncodeError::Write(_)));

        // The writer, and through it the sink, comes back intact
        let wtr = err.into_inner();
        assert!(wtr.error().is_some());
        let _sink: &FailingSink = wtr.get_ref();
    }

    /// Sink that fails while `failing` is set and counts write calls.
    #[derive(Debug, Default)]
    struct FlakySink {
        failing: bool,
        writes: usize,
        data: Vec<u8>,
    }

    impl Write for FlakySink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes += 1;
            if self.failing {
                return Err(io::Error::other("sink unavailable"));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_latched_writer_skips_sink_until_drop() {
        let mut sink = FlakySink {
            failing: true,
            ..FlakySink::default()
        };
        let mut wtr = Writer::from_writer(&mut sink);
        wtr.write_record(["abc"]).unwrap();
        assert!(wtr.flush().is_err());
        assert_eq!(wtr.get_ref().writes, 1);

        // Recovery of the sink does not unlatch the writer
        wtr.get_mut().failing = false;
        assert!(wtr.write_record(["def"]).is_err());
        assert!(wtr.flush().is_err());
        assert_eq!(wtr.get_ref().writes, 1);

        // Dropping makes one final attempt with what was buffered
        drop(wtr);
        assert_eq!(sink.writes, 2);
        assert_eq!(sink.data, b"abc\n");
    }
}

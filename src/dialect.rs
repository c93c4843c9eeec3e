use std::fmt;

use crate::error::{EncodeError, Result};

/// Output dialect used by a [`Writer`](crate::Writer).
///
/// The default dialect is comma delimited, double-quote quoted, only quotes
/// fields that need it, and ends records with `\n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dialect {
    /// Field delimiter character.
    pub delimiter: char,
    /// Quote character configuration.
    pub quote: Quote,
    /// Quote every field regardless of its content.
    pub always_quote: bool,
    /// Record terminator.
    pub line_terminator: LineTerminator,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: Quote::default(),
            always_quote: false,
            line_terminator: LineTerminator::LF,
        }
    }
}

impl Dialect {
    /// Create a new Dialect with the given parameters.
    pub const fn new(
        delimiter: char,
        quote: Quote,
        always_quote: bool,
        line_terminator: LineTerminator,
    ) -> Self {
        Self {
            delimiter,
            quote,
            always_quote,
            line_terminator,
        }
    }

    /// Returns true if records end with `\r\n`.
    #[inline]
    pub const fn use_crlf(&self) -> bool {
        matches!(self.line_terminator, LineTerminator::CRLF)
    }

    /// Returns true if the delimiter and the quote character are the same.
    ///
    /// Such a dialect still writes, but the output cannot be read back
    /// unambiguously.
    pub fn is_ambiguous(&self) -> bool {
        self.quote.char() == Some(self.delimiter)
    }

    /// Check that the dialect can be written with.
    ///
    /// Forcing quotes while quoting is disabled has no meaningful output and
    /// is rejected.
    pub fn validate(&self) -> Result<()> {
        if self.always_quote && self.quote == Quote::None {
            return Err(EncodeError::InvalidConfig(
                "always_quote requires a quote character".to_string(),
            ));
        }
        Ok(())
    }
}

/// Quote character configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quote {
    /// No quoting. Fields are always written verbatim.
    None,
    /// Quote with the specified character.
    Some(char),
}

impl Default for Quote {
    fn default() -> Self {
        Quote::Some('"')
    }
}

impl Quote {
    /// Returns the quote character if set.
    pub fn char(&self) -> Option<char> {
        match self {
            Quote::None => None,
            Quote::Some(c) => Some(*c),
        }
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quote::None => write!(f, "none"),
            Quote::Some(c) => write!(f, "{c}"),
        }
    }
}

/// Record terminators.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineTerminator {
    /// Unix-style line ending (\n).
    #[default]
    LF,
    /// Windows-style line ending (\r\n).
    CRLF,
}

impl LineTerminator {
    /// Returns the byte sequence for this line terminator.
    pub const fn as_bytes(&self) -> &'static [u8] {
        match self {
            LineTerminator::LF => b"\n",
            LineTerminator::CRLF => b"\r\n",
        }
    }

    /// Returns the escaped string representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LineTerminator::LF => "\\n",
            LineTerminator::CRLF => "\\r\\n",
        }
    }
}

impl fmt::Display for LineTerminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

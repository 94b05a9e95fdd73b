//! Expansion Errors
//!
//! Parse-error records produced by the pipeline. The list is an append-only
//! value owned by the caller; stages receive it as an optional mutable
//! borrow and never share it otherwise. Offsets are character offsets into
//! the string handed to `expand_string`.

use thiserror::Error;

/// Marker for errors whose source offset cannot be derived.
pub const SOURCE_LOCATION_UNKNOWN: usize = usize::MAX;

/// Classification of a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorCode {
    /// Malformed input: bad slice token, mismatched braces or parens,
    /// empty variable name.
    Syntax,
    /// Command substitution failed at runtime.
    Cmdsubst,
}

/// One recorded error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{text}")]
pub struct ParseError {
    pub code: ParseErrorCode,
    /// Character offset of the offending region, or
    /// `SOURCE_LOCATION_UNKNOWN`.
    pub source_start: usize,
    /// Character length of the offending region.
    pub source_length: usize,
    /// Human-readable message.
    pub text: String,
}

/// Append-only sequence of parse errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseErrorList {
    errors: Vec<ParseError>,
}

impl ParseErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }

    pub fn first(&self) -> Option<&ParseError> {
        self.errors.first()
    }

    pub fn push_syntax(&mut self, source_start: usize, source_length: usize, text: impl Into<String>) {
        self.errors.push(ParseError {
            code: ParseErrorCode::Syntax,
            source_start,
            source_length,
            text: text.into(),
        });
    }

    /// Cmdsubst errors are deduplicated by message so a substitution that
    /// fails once per product element reports once.
    pub fn push_cmdsubst(&mut self, source_start: usize, source_length: usize, text: impl Into<String>) {
        let text = text.into();
        let duplicate = self
            .errors
            .iter()
            .any(|e| e.code == ParseErrorCode::Cmdsubst && e.text == text);
        if duplicate {
            return;
        }
        self.errors.push(ParseError {
            code: ParseErrorCode::Cmdsubst,
            source_start,
            source_length,
            text,
        });
    }
}

/// Record a syntax error when the caller asked for error reporting.
pub fn append_syntax_error(
    errors: Option<&mut ParseErrorList>,
    source_start: usize,
    source_length: usize,
    text: impl Into<String>,
) {
    if let Some(list) = errors {
        list.push_syntax(source_start, source_length, text);
    }
}

/// Record a cmdsubst error when the caller asked for error reporting.
pub fn append_cmdsubst_error(
    errors: Option<&mut ParseErrorList>,
    source_start: usize,
    source_length: usize,
    text: impl Into<String>,
) {
    if let Some(list) = errors {
        list.push_cmdsubst(source_start, source_length, text);
    }
}

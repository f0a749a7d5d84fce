/* Copyright (C) 2018 Olivier Goffart <ogoffart@woboq.com>

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense,
and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so,
subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or substantial
portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES
OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
*/

//! Structured diagnostics produced while parsing a `.po` file.

use std::fmt::Display;

/// The category of structural problem that stopped the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// A `#` line whose second character is not a known comment selector.
    InvalidCommentVariation,
    /// A line that is neither blank, a comment, nor an `msgid`/`msgstr` pair.
    InvalidLine,
    /// An `msgid` line not immediately followed by an `msgstr` line.
    MissingMsgstr,
    /// A header field whose key is not in the table of known header keys.
    UnknownHeaderKey,
    /// A `Plural-Forms` value that does not follow `nplurals=N; plural=(n OP V);`.
    InvalidPluralForms,
    /// A number in a `Plural-Forms` value that does not fit or is out of range.
    InvalidPluralCount,
    /// A `Plural-Forms` comparison operator outside of the supported set.
    InvalidPluralOperator,
}

/// A parse failure, located in the file that was being parsed.
///
/// The error is built from the line cursor at the moment of failure, so
/// [`ParseError::line_index`] is the 1-based number of the last consumed line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{file_path}:{line_index}:0: {message} (expected {expected}, found `{actual}`)")]
pub struct ParseError {
    kind: ParseErrorKind,
    message: String,
    line_index: usize,
    file_path: String,
    expected: String,
    actual: String,
    cause: String,
}

impl ParseError {
    pub(crate) fn new(
        kind: ParseErrorKind,
        message: impl Into<String>,
        line_index: usize,
        file_path: &str,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            line_index,
            file_path: file_path.to_owned(),
            expected: String::new(),
            actual: String::new(),
            cause: String::new(),
        }
    }

    pub(crate) fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = cause.into();
        self
    }

    pub(crate) fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = expected.into();
        self
    }

    pub(crate) fn with_actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = actual.into();
        self
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    /// Short human readable description of the failure.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 1-based index of the line being parsed when the error was raised.
    pub fn line_index(&self) -> usize {
        self.line_index
    }

    /// The file identifier given to [`crate::parse_po_content`].
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// What the parser would have accepted at this point.
    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// The offending fragment of input.
    pub fn actual(&self) -> &str {
        &self.actual
    }

    /// The full text that triggered the failure (a line, a key or a header value).
    pub fn cause(&self) -> &str {
        &self.cause
    }

    /// A `<file>:<line>:0` locator, understood by most editors and terminals.
    pub fn see(&self) -> String {
        format!("{}:{}:0", self.file_path, self.line_index)
    }
}

/// Joins `items` the way an English sentence lists alternatives:
/// `a`, `a and b`, `a, b, and c`.
pub(crate) fn join_naturally<I>(items: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    let items: Vec<String> = items.into_iter().map(|item| item.to_string()).collect();
    match items.as_slice() {
        [] => String::new(),
        [single] => single.clone(),
        [first, second] => format!("{} and {}", first, second),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}

/// `one of a, b, and c`
pub(crate) fn one_of<I>(items: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    format!("one of {}", join_naturally(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_lists() {
        assert_eq!(join_naturally(Vec::<&str>::new()), "");
        assert_eq!(join_naturally(["msgid"]), "msgid");
        assert_eq!(join_naturally(["#", "msgid"]), "# and msgid");
        assert_eq!(join_naturally(["#", "msgid", "msgstr"]), "#, msgid, and msgstr");
        assert_eq!(one_of(["<", ">"]), "one of < and >");
    }

    #[test]
    fn locator_and_display() {
        let error = ParseError::new(ParseErrorKind::InvalidLine, "Invalid line: foo", 7, "po/pt.po")
            .with_cause("foo")
            .with_expected("one of #, msgid, and msgstr")
            .with_actual("foo");
        assert_eq!(error.see(), "po/pt.po:7:0");
        assert_eq!(error.line_index(), 7);
        assert_eq!(error.kind(), ParseErrorKind::InvalidLine);
        assert_eq!(
            error.to_string(),
            "po/pt.po:7:0: Invalid line: foo (expected one of #, msgid, and msgstr, found `foo`)"
        );
    }
}

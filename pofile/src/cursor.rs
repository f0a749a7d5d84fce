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

use crate::error::{ParseError, ParseErrorKind};

/// Hands out the lines of a `.po` file one at a time.
///
/// Lines are consumed irreversibly: there is no peeking and no way to put a
/// line back. The cursor counts the lines it handed out, which is what error
/// locators refer to.
#[derive(Debug)]
pub struct LineCursor<'a> {
    lines: std::str::Split<'a, char>,
    line_index: usize,
    file_path: String,
}

impl<'a> LineCursor<'a> {
    pub fn new(content: &'a str, file_path: impl Into<String>) -> Self {
        Self {
            lines: content.split('\n'),
            line_index: 0,
            file_path: file_path.into(),
        }
    }

    /// Consumes the next line, without its line terminator.
    ///
    /// Once the input is exhausted this keeps returning `None` and the line
    /// counter stops moving.
    pub fn next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.next()?;
        self.line_index += 1;
        Some(line.strip_suffix('\r').unwrap_or(line))
    }

    /// 1-based index of the last consumed line, `0` before the first one.
    pub fn line_index(&self) -> usize {
        self.line_index
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Starts an error located at the current line.
    pub(crate) fn error(&self, kind: ParseErrorKind, message: impl Into<String>) -> ParseError {
        ParseError::new(kind, message, self.line_index, &self.file_path)
    }
}

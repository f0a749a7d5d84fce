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

//! # Reading gettext `.po` files
//!
//! This crate parses the text of a `.po` translation file into two lazy
//! sequences: the header fields at the top of the file, then the body made of
//! comments, blank lines and `msgid`/`msgstr` entries. Both sequences read from
//! the same lines, so the header must be read before the body.
//!
//! Only single-line `msgid`/`msgstr` pairs are understood: plural `msgstr[n]`
//! forms, multi-line strings, obsolete `#~` entries and `msgctxt` are not
//! supported, and string escapes are kept as written.
//!
//! Example:
//!
//! ```
//! use pofile::{parse_po_content, BodyNode, HeaderKey};
//!
//! let content = r#""Language: pt\n"
//! "Plural-Forms: nplurals=2; plural=(n != 1);\n"
//!
//! #: src/main.rs:3
//! msgid "Hello"
//! msgstr "Olá"
//! "#;
//!
//! let mut po = parse_po_content(content, "po/pt.po");
//! let header: Vec<_> = po.header().collect::<Result<_, _>>()?;
//! assert_eq!(header[0].key, HeaderKey::Language);
//!
//! let body: Vec<_> = po.body().collect::<Result<_, _>>()?;
//! assert_eq!(
//!     body[1],
//!     BodyNode::Entry { msgid: "Hello".into(), msgstr: vec!["Olá".into()] }
//! );
//! # Ok::<(), pofile::ParseError>(())
//! ```
//!
//! For lookups, [`Catalog`] assembles both sequences into a translation table,
//! and [`po_format!`] fills in `{key:type}` placeholders.

mod body;
mod catalog;
mod cursor;
mod error;
mod header;
pub mod linguas;
mod plural_forms;
pub mod runtime_format;

pub use body::{BodyNode, BodyParser, CommentVariation};
pub use catalog::{Catalog, CatalogEntry, CatalogLoadError, CatalogStats, PluralSelector, Translator};
pub use cursor::LineCursor;
pub use error::{ParseError, ParseErrorKind};
pub use header::{HeaderKey, HeaderNode, HeaderParser, HeaderValue, PoHeader};
pub use plural_forms::{parse_plural_forms, PluralForm, PluralFormsError, PluralOperator, PluralRule};

use body::BodyState;
use header::HeaderState;

/// A `.po` file being parsed. See [`parse_po_content`].
#[derive(Debug)]
pub struct PoContent<'a> {
    cursor: LineCursor<'a>,
    header_state: HeaderState,
    body_state: BodyState,
}

impl<'a> PoContent<'a> {
    /// The header fields. The header ends at the first line that is not a
    /// quoted `"Key: value\n"` line, such as the blank line before the entries.
    pub fn header(&mut self) -> HeaderParser<'_, 'a> {
        HeaderParser::new(&mut self.cursor, &mut self.header_state)
    }

    /// The body nodes, starting wherever the header stopped.
    pub fn body(&mut self) -> BodyParser<'_, 'a> {
        BodyParser::new(&mut self.cursor, &mut self.body_state)
    }

    /// 1-based index of the last line read.
    pub fn line_index(&self) -> usize {
        self.cursor.line_index()
    }

    pub fn file_path(&self) -> &str {
        self.cursor.file_path()
    }
}

/// Starts parsing `content`. `file_path` identifies the file in errors.
///
/// Nothing is read until [`PoContent::header`] or [`PoContent::body`] is
/// iterated. Every call returns an independent parser.
pub fn parse_po_content(content: &str, file_path: impl Into<String>) -> PoContent<'_> {
    PoContent {
        cursor: LineCursor::new(content, file_path),
        header_state: HeaderState::default(),
        body_state: BodyState::default(),
    }
}

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

//! Entries and comments following the header block.

use std::fmt;

use crate::cursor::LineCursor;
use crate::error::{one_of, ParseError, ParseErrorKind};

const COMMENT_PREFIX: char = '#';
const MSGID_PREFIX: &str = "msgid";
const MSGSTR_PREFIX: &str = "msgstr";

/// The kind of a `#` comment, given by the character following the `#`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentVariation {
    /// `# ` comment written by a translator.
    Translator,
    /// `#:` source code reference.
    Reference,
    /// `#,` flags such as `fuzzy`.
    Flag,
    /// `#.` comment extracted from the source code.
    Extracted,
    /// `#|` previous untranslated string.
    PreviousUntranslatedString,
}

const COMMENT_VARIATIONS: [(char, CommentVariation); 5] = [
    (' ', CommentVariation::Translator),
    (':', CommentVariation::Reference),
    (',', CommentVariation::Flag),
    ('.', CommentVariation::Extracted),
    ('|', CommentVariation::PreviousUntranslatedString),
];

impl CommentVariation {
    /// The character written right after `#`.
    pub fn selector(self) -> char {
        match self {
            Self::Translator => ' ',
            Self::Reference => ':',
            Self::Flag => ',',
            Self::Extracted => '.',
            Self::PreviousUntranslatedString => '|',
        }
    }

    fn from_selector(selector: char) -> Option<Self> {
        COMMENT_VARIATIONS
            .iter()
            .find(|(c, _)| *c == selector)
            .map(|(_, variation)| *variation)
    }
}

/// One syntactic element of the body of a `.po` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyNode {
    /// A blank or whitespace-only line.
    Whitespace,
    /// A comment line. `text` is everything after `#` and the selector.
    Comment {
        text: String,
        variation: CommentVariation,
    },
    /// An `msgid` line and the `msgstr` line that follows it.
    Entry { msgid: String, msgstr: Vec<String> },
    /// The input is exhausted.
    EndOfInput,
}

/// Writes the node back in `.po` syntax, without a trailing newline.
impl fmt::Display for BodyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Whitespace | Self::EndOfInput => Ok(()),
            Self::Comment { text, variation } => {
                write!(f, "{}{}{}", COMMENT_PREFIX, variation.selector(), text)
            }
            Self::Entry { msgid, msgstr } => {
                write!(f, "{} \"{}\"", MSGID_PREFIX, msgid)?;
                for msgstr in msgstr {
                    write!(f, "\n{} \"{}\"", MSGSTR_PREFIX, msgstr)?;
                }
                Ok(())
            }
        }
    }
}

/// What a single trimmed body line is.
#[derive(Debug, PartialEq, Eq)]
enum LineClass {
    Whitespace,
    Comment {
        text: String,
        variation: CommentVariation,
    },
    MsgidStart,
}

fn classify_line(line: &str, cursor: &LineCursor<'_>) -> Result<LineClass, ParseError> {
    if line.trim().is_empty() {
        return Ok(LineClass::Whitespace);
    }

    if let Some(rest) = line.strip_prefix(COMMENT_PREFIX) {
        let mut chars = rest.chars();
        let selector = chars.next();
        let variation = selector
            .and_then(CommentVariation::from_selector)
            .ok_or_else(|| {
                let actual = selector.map(String::from).unwrap_or_default();
                cursor
                    .error(
                        ParseErrorKind::InvalidCommentVariation,
                        format!("Invalid comment variation: {}", actual),
                    )
                    .with_cause(line)
                    .with_expected(one_of(COMMENT_VARIATIONS.iter().map(|(c, _)| format!("{:?}", c))))
                    .with_actual(actual)
            })?;
        return Ok(LineClass::Comment {
            text: chars.as_str().to_owned(),
            variation,
        });
    }

    if line.starts_with(MSGID_PREFIX) {
        return Ok(LineClass::MsgidStart);
    }

    Err(cursor
        .error(ParseErrorKind::InvalidLine, format!("Invalid line: {}", line))
        .with_cause(line)
        .with_expected(one_of([COMMENT_PREFIX.to_string(), MSGID_PREFIX.into(), MSGSTR_PREFIX.into()]))
        .with_actual(line))
}

/// Removes `keyword` and one pair of surrounding double quotes.
///
/// Escape sequences inside the string are kept as written.
pub(crate) fn keyword_content<'l>(line: &'l str, keyword: &str) -> &'l str {
    let rest = line.strip_prefix(keyword).unwrap_or(line).trim();
    let rest = rest.strip_prefix('"').unwrap_or(rest);
    rest.strip_suffix('"').unwrap_or(rest)
}

/// Reads the `msgstr` line owed to an `msgid` line that was just consumed.
///
/// `Ok(None)` means the input ended right after the `msgid`.
pub(crate) fn read_msgstr<'a>(
    msgid_line: &str,
    cursor: &mut LineCursor<'a>,
) -> Result<Option<&'a str>, ParseError> {
    let Some(next_line) = cursor.next_line() else {
        return Ok(None);
    };
    if !next_line.starts_with(MSGSTR_PREFIX) {
        return Err(cursor
            .error(ParseErrorKind::MissingMsgstr, "Line after msgid should start with msgstr")
            .with_cause(format!("{}\n{}", msgid_line, next_line))
            .with_expected(format!(
                "something starting with {} after {}",
                MSGSTR_PREFIX, MSGID_PREFIX
            ))
            .with_actual(next_line));
    }
    Ok(Some(next_line.trim()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum BodyState {
    #[default]
    Running,
    Done,
}

/// Lazily produces the [`BodyNode`]s of a file, resuming wherever the line
/// cursor currently is.
///
/// Obtained from [`crate::PoContent::body`]. The iterator yields nodes until
/// [`BodyNode::EndOfInput`] (which it does not yield) or until the first
/// error, after which it is fused.
#[derive(Debug)]
pub struct BodyParser<'c, 'a> {
    cursor: &'c mut LineCursor<'a>,
    state: &'c mut BodyState,
}

impl<'c, 'a> BodyParser<'c, 'a> {
    pub(crate) fn new(cursor: &'c mut LineCursor<'a>, state: &'c mut BodyState) -> Self {
        Self { cursor, state }
    }

    /// Produces the next node. After the end of input or an error, this
    /// returns [`BodyNode::EndOfInput`] without reading anything.
    pub fn next_node(&mut self) -> Result<BodyNode, ParseError> {
        if *self.state == BodyState::Done {
            return Ok(BodyNode::EndOfInput);
        }
        let node = self.read_node();
        if matches!(node, Ok(BodyNode::EndOfInput) | Err(_)) {
            tracing::debug!(
                file = self.cursor.file_path(),
                line = self.cursor.line_index(),
                "body finished"
            );
            *self.state = BodyState::Done;
        }
        node
    }

    fn read_node(&mut self) -> Result<BodyNode, ParseError> {
        let Some(line) = self.cursor.next_line() else {
            return Ok(BodyNode::EndOfInput);
        };
        let line = line.trim();

        let node = match classify_line(line, self.cursor)? {
            LineClass::Whitespace => BodyNode::Whitespace,
            LineClass::Comment { text, variation } => BodyNode::Comment { text, variation },
            LineClass::MsgidStart => match read_msgstr(line, self.cursor)? {
                None => BodyNode::EndOfInput,
                Some(msgstr_line) => BodyNode::Entry {
                    msgid: keyword_content(line, MSGID_PREFIX).to_owned(),
                    msgstr: vec![keyword_content(msgstr_line, MSGSTR_PREFIX).to_owned()],
                },
            },
        };
        tracing::trace!(line = self.cursor.line_index(), ?node);
        Ok(node)
    }
}

impl Iterator for BodyParser<'_, '_> {
    type Item = Result<BodyNode, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_node() {
            Ok(BodyNode::EndOfInput) => None,
            node => Some(node),
        }
    }
}

impl std::iter::FusedIterator for BodyParser<'_, '_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn body(content: &str) -> Result<Vec<BodyNode>, ParseError> {
        let mut cursor = LineCursor::new(content, "test.po");
        let mut state = BodyState::default();
        BodyParser::new(&mut cursor, &mut state).collect()
    }

    fn comment(variation: CommentVariation, text: &str) -> BodyNode {
        BodyNode::Comment {
            text: text.to_owned(),
            variation,
        }
    }

    #[rstest]
    #[case("# translator", CommentVariation::Translator, " translator")]
    #[case("#: src/file.ts:10", CommentVariation::Reference, " src/file.ts:10")]
    #[case("#, fuzzy", CommentVariation::Flag, " fuzzy")]
    #[case("#. extracted", CommentVariation::Extracted, " extracted")]
    #[case("#| msgid \"old\"", CommentVariation::PreviousUntranslatedString, " msgid \"old\"")]
    #[case("#:no-space", CommentVariation::Reference, "no-space")]
    fn comments(#[case] line: &str, #[case] variation: CommentVariation, #[case] text: &str) {
        assert_eq!(body(line).unwrap(), vec![comment(variation, text)]);
    }

    #[rstest]
    #[case("#: src/file.ts:10")]
    #[case("#. Some extracted comment")]
    #[case("#, fuzzy, c-format")]
    #[case("#.")]
    #[case("#:")]
    fn comments_round_trip(#[case] line: &str) {
        let nodes = body(line).unwrap();
        assert_eq!(nodes[0].to_string(), line);
    }

    #[test]
    fn entries() {
        assert_eq!(
            body("msgid \"Hello\"\nmsgstr \"Olá\"").unwrap(),
            vec![BodyNode::Entry {
                msgid: "Hello".into(),
                msgstr: vec!["Olá".into()],
            }]
        );
        assert_eq!(
            body("  msgid \"a \\\"b\\\"\"  \nmsgstr \"\"").unwrap(),
            vec![BodyNode::Entry {
                msgid: "a \\\"b\\\"".into(),
                msgstr: vec!["".into()],
            }]
        );
    }

    #[test]
    fn whitespace_lines() {
        assert_eq!(
            body("\n   \n\t").unwrap(),
            vec![BodyNode::Whitespace, BodyNode::Whitespace, BodyNode::Whitespace]
        );
    }

    #[test]
    fn mixed_body() {
        let content = "#: main.rs:1\nmsgid \"One\"\nmsgstr \"Um\"\n\n#, fuzzy\nmsgid \"Two\"\nmsgstr \"Dois\"\n";
        assert_eq!(
            body(content).unwrap(),
            vec![
                comment(CommentVariation::Reference, " main.rs:1"),
                BodyNode::Entry {
                    msgid: "One".into(),
                    msgstr: vec!["Um".into()],
                },
                BodyNode::Whitespace,
                comment(CommentVariation::Flag, " fuzzy"),
                BodyNode::Entry {
                    msgid: "Two".into(),
                    msgstr: vec!["Dois".into()],
                },
                BodyNode::Whitespace,
            ]
        );
    }

    #[test]
    fn msgid_at_end_of_input() {
        assert_eq!(
            body("# c\nmsgid \"dangling\"").unwrap(),
            vec![comment(CommentVariation::Translator, " c")]
        );
    }

    #[test]
    fn missing_msgstr() {
        let error = body("\nmsgid \"a\"\n# not a msgstr").unwrap_err();
        assert_eq!(error.kind(), ParseErrorKind::MissingMsgstr);
        assert_eq!(error.actual(), "# not a msgstr");
        assert_eq!(error.line_index(), 3);
        assert_eq!(error.cause(), "msgid \"a\"\n# not a msgstr");
    }

    #[test]
    fn indented_msgstr_is_not_paired() {
        let error = body("msgid \"a\"\n   msgstr \"b\"").unwrap_err();
        assert_eq!(error.kind(), ParseErrorKind::MissingMsgstr);
        assert_eq!(error.actual(), "   msgstr \"b\"");
        assert_eq!(error.line_index(), 2);
    }

    #[test]
    fn bare_hash_has_no_variation() {
        let error = body("msgid \"a\"\nmsgstr \"b\"\n#").unwrap_err();
        assert_eq!(error.kind(), ParseErrorKind::InvalidCommentVariation);
        assert_eq!(error.actual(), "");
        assert_eq!(error.expected(), "one of ' ', ':', ',', '.', and '|'");
        assert_eq!(error.line_index(), 3);
    }

    #[test]
    fn invalid_comment_variation() {
        let error = body("#~ msgid \"obsolete\"").unwrap_err();
        assert_eq!(error.kind(), ParseErrorKind::InvalidCommentVariation);
        assert_eq!(error.actual(), "~");
        assert_eq!(error.expected(), "one of ' ', ':', ',', '.', and '|'");
        assert_eq!(error.see(), "test.po:1:0");
    }

    #[test]
    fn invalid_line() {
        let error = body("\n\nmsgctxt \"menu\"").unwrap_err();
        assert_eq!(error.kind(), ParseErrorKind::InvalidLine);
        assert_eq!(error.expected(), "one of #, msgid, and msgstr");
        assert_eq!(error.actual(), "msgctxt \"menu\"");
        assert_eq!(error.line_index(), 3);
    }

    #[test]
    fn done_is_sticky() {
        let mut cursor = LineCursor::new("bogus\nmsgid \"a\"\nmsgstr \"b\"", "test.po");
        let mut state = BodyState::default();
        let mut parser = BodyParser::new(&mut cursor, &mut state);
        assert!(parser.next_node().is_err());
        assert_eq!(parser.next_node().unwrap(), BodyNode::EndOfInput);
        assert_eq!(parser.next_node().unwrap(), BodyNode::EndOfInput);
        assert!(parser.next().is_none());
        assert_eq!(cursor.line_index(), 1);
    }
}

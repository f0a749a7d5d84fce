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

//! The header block: `"Key: value\n"` lines at the top of a `.po` file.

use std::fmt;

use chrono::{DateTime, FixedOffset};

use crate::body::{keyword_content, read_msgstr};
use crate::cursor::LineCursor;
use crate::error::{one_of, ParseError};
use crate::plural_forms::{parse_plural_forms, PluralRule};

const HEADER_LINE_START: &str = "\"";
const HEADER_LINE_END: &str = "\\n\"";
const HEADER_DATE_FORMAT: &str = "%Y-%m-%d %H:%M%z";

/// The header fields this parser knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderKey {
    ProjectIdVersion,
    ReportMsgidBugsTo,
    PotCreationDate,
    PoRevisionDate,
    LastTranslator,
    LanguageTeam,
    Language,
    MimeVersion,
    ContentType,
    ContentTransferEncoding,
    PluralForms,
    /// The empty `msgid` of the header entry.
    Msgid,
    /// The `msgstr` of the header entry.
    Msgstr,
}

const HEADER_KEYS: [(&str, HeaderKey); 13] = [
    ("Project-Id-Version", HeaderKey::ProjectIdVersion),
    ("Report-Msgid-Bugs-To", HeaderKey::ReportMsgidBugsTo),
    ("POT-Creation-Date", HeaderKey::PotCreationDate),
    ("PO-Revision-Date", HeaderKey::PoRevisionDate),
    ("Last-Translator", HeaderKey::LastTranslator),
    ("Language-Team", HeaderKey::LanguageTeam),
    ("Language", HeaderKey::Language),
    ("MIME-Version", HeaderKey::MimeVersion),
    ("Content-Type", HeaderKey::ContentType),
    ("Content-Transfer-Encoding", HeaderKey::ContentTransferEncoding),
    ("Plural-Forms", HeaderKey::PluralForms),
    ("msgid", HeaderKey::Msgid),
    ("msgstr", HeaderKey::Msgstr),
];

impl HeaderKey {
    /// The key as written in the file.
    pub fn as_str(self) -> &'static str {
        HEADER_KEYS
            .iter()
            .find(|(_, key)| *key == self)
            .map(|(name, _)| *name)
            .unwrap_or_default()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        HEADER_KEYS
            .iter()
            .find(|(text, _)| *text == name)
            .map(|(_, key)| *key)
    }
}

impl fmt::Display for HeaderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Text(String),
    PluralForms(PluralRule),
}

/// A single header field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderNode {
    pub key: HeaderKey,
    pub value: HeaderValue,
}

impl HeaderNode {
    fn text(key: HeaderKey, value: impl Into<String>) -> Self {
        Self {
            key,
            value: HeaderValue::Text(value.into()),
        }
    }
}

/// Writes the node back as the `.po` line it was read from.
impl fmt::Display for HeaderNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.key, &self.value) {
            (HeaderKey::Msgid | HeaderKey::Msgstr, HeaderValue::Text(text)) => {
                write!(f, "{} \"{}\"", self.key, text)
            }
            (_, HeaderValue::Text(text)) => write!(f, "\"{}: {}\\n\"", self.key, text),
            (_, HeaderValue::PluralForms(rule)) => write!(f, "\"{}: {}\\n\"", self.key, rule),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum HeaderState {
    /// Nothing read yet: the header entry's `msgid ""` may come first.
    #[default]
    Start,
    /// `msgid ""` was read, its `msgstr` line comes next.
    Msgstr,
    Fields,
    Done,
}

/// Lazily produces the [`HeaderNode`]s at the top of a file.
///
/// Obtained from [`crate::PoContent::header`]. The header ends at the first
/// line that is not shaped like `"...\n"`; that line is consumed.
#[derive(Debug)]
pub struct HeaderParser<'c, 'a> {
    cursor: &'c mut LineCursor<'a>,
    state: &'c mut HeaderState,
    msgid_line: &'a str,
}

impl<'c, 'a> HeaderParser<'c, 'a> {
    pub(crate) fn new(cursor: &'c mut LineCursor<'a>, state: &'c mut HeaderState) -> Self {
        Self {
            cursor,
            state,
            msgid_line: "",
        }
    }

    fn read_node(&mut self) -> Result<Option<HeaderNode>, ParseError> {
        if *self.state == HeaderState::Msgstr {
            *self.state = HeaderState::Fields;
            return Ok(read_msgstr(self.msgid_line, self.cursor)?
                .map(|line| HeaderNode::text(HeaderKey::Msgstr, keyword_content(line, "msgstr"))));
        }

        let Some(line) = self.cursor.next_line() else {
            return Ok(None);
        };

        if *self.state == HeaderState::Start {
            *self.state = HeaderState::Fields;
            if line.trim() == "msgid \"\"" {
                *self.state = HeaderState::Msgstr;
                self.msgid_line = line.trim();
                return Ok(Some(HeaderNode::text(HeaderKey::Msgid, "")));
            }
        }

        let Some(content) = line
            .strip_prefix(HEADER_LINE_START)
            .and_then(|line| line.strip_suffix(HEADER_LINE_END))
        else {
            return Ok(None);
        };

        let (key, value) = content.split_once(':').unwrap_or((content, ""));
        parse_header_key_value(key.trim(), value.trim(), self.cursor).map(Some)
    }
}

fn parse_header_key_value(
    key: &str,
    value: &str,
    cursor: &LineCursor<'_>,
) -> Result<HeaderNode, ParseError> {
    match HeaderKey::from_name(key) {
        Some(HeaderKey::PluralForms) => {
            let rule = parse_plural_forms(value).map_err(|error| {
                cursor
                    .error(error.kind(), error.message())
                    .with_cause(value)
                    .with_expected(error.expected())
                    .with_actual(error.actual())
            })?;
            Ok(HeaderNode {
                key: HeaderKey::PluralForms,
                value: HeaderValue::PluralForms(rule),
            })
        }
        Some(header_key) => Ok(HeaderNode::text(header_key, value)),
        None => Err(cursor
            .error(crate::ParseErrorKind::UnknownHeaderKey, "Invalid header line key")
            .with_cause(key)
            .with_expected(one_of(HEADER_KEYS.iter().map(|(name, _)| name)))
            .with_actual(key)),
    }
}

impl Iterator for HeaderParser<'_, '_> {
    type Item = Result<HeaderNode, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if *self.state == HeaderState::Done {
            return None;
        }
        let node = self.read_node().transpose();
        match &node {
            Some(Ok(node)) => tracing::trace!(line = self.cursor.line_index(), ?node),
            _ => {
                tracing::debug!(
                    file = self.cursor.file_path(),
                    line = self.cursor.line_index(),
                    "header finished"
                );
                *self.state = HeaderState::Done;
            }
        }
        node
    }
}

impl std::iter::FusedIterator for HeaderParser<'_, '_> {}

/// The header of a `.po` file, assembled from its [`HeaderNode`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoHeader {
    pub msgid: Option<String>,
    pub msgstr: Option<String>,
    pub project_id_version: Option<String>,
    pub report_msgid_bugs_to: Option<String>,
    pub pot_creation_date: Option<String>,
    pub po_revision_date: Option<String>,
    pub last_translator: Option<String>,
    pub language_team: Option<String>,
    pub language: Option<String>,
    pub mime_version: Option<String>,
    pub content_type: Option<String>,
    pub content_transfer_encoding: Option<String>,
    pub plural_forms: Option<PluralRule>,
}

impl PoHeader {
    /// Collects header nodes, stopping at the first error. A key appearing
    /// twice keeps its last value.
    pub fn from_nodes<I>(nodes: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = Result<HeaderNode, ParseError>>,
    {
        let mut header = Self::default();
        for node in nodes {
            header.insert(node?);
        }
        Ok(header)
    }

    pub fn insert(&mut self, node: HeaderNode) {
        let text = match node.value {
            HeaderValue::PluralForms(rule) => {
                self.plural_forms = Some(rule);
                return;
            }
            HeaderValue::Text(text) => Some(text),
        };
        let slot = match node.key {
            HeaderKey::ProjectIdVersion => &mut self.project_id_version,
            HeaderKey::ReportMsgidBugsTo => &mut self.report_msgid_bugs_to,
            HeaderKey::PotCreationDate => &mut self.pot_creation_date,
            HeaderKey::PoRevisionDate => &mut self.po_revision_date,
            HeaderKey::LastTranslator => &mut self.last_translator,
            HeaderKey::LanguageTeam => &mut self.language_team,
            HeaderKey::Language => &mut self.language,
            HeaderKey::MimeVersion => &mut self.mime_version,
            HeaderKey::ContentType => &mut self.content_type,
            HeaderKey::ContentTransferEncoding => &mut self.content_transfer_encoding,
            HeaderKey::Msgid => &mut self.msgid,
            HeaderKey::Msgstr => &mut self.msgstr,
            // a plural forms key always carries a parsed rule
            HeaderKey::PluralForms => return,
        };
        *slot = text;
    }

    /// The declared plural rule, or `nplurals=2; plural=(n != 1);`.
    pub fn plural_rule(&self) -> PluralRule {
        self.plural_forms.unwrap_or_default()
    }

    /// The `charset` parameter of `Content-Type`.
    pub fn charset(&self) -> Option<&str> {
        self.content_type.as_deref()?.split(';').find_map(|param| {
            let (name, value) = param.split_once('=')?;
            (name.trim() == "charset").then(|| value.trim())
        })
    }

    pub fn creation_date(&self) -> Option<DateTime<FixedOffset>> {
        parse_header_date(self.pot_creation_date.as_deref()?)
    }

    pub fn revision_date(&self) -> Option<DateTime<FixedOffset>> {
        parse_header_date(self.po_revision_date.as_deref()?)
    }
}

fn parse_header_date(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(value, HEADER_DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseErrorKind;
    use pretty_assertions::assert_eq;

    fn header(content: &str) -> Result<Vec<HeaderNode>, ParseError> {
        let mut cursor = LineCursor::new(content, "test.po");
        let mut state = HeaderState::default();
        HeaderParser::new(&mut cursor, &mut state).collect()
    }

    #[test]
    fn fields() {
        let content = concat!(
            "\"Project-Id-Version: demo 1.0\\n\"\n",
            "\"Language: pt\\n\"\n",
            "\"Content-Type: text/plain; charset=UTF-8\\n\"\n",
            "\n",
            "msgid \"a\"\n",
        );
        assert_eq!(
            header(content).unwrap(),
            vec![
                HeaderNode::text(HeaderKey::ProjectIdVersion, "demo 1.0"),
                HeaderNode::text(HeaderKey::Language, "pt"),
                HeaderNode::text(HeaderKey::ContentType, "text/plain; charset=UTF-8"),
            ]
        );
    }

    #[test]
    fn plural_forms_field() {
        let nodes = header("\"Plural-Forms: nplurals=2; plural=(n != 1);\\n\"").unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].key, HeaderKey::PluralForms);
        let HeaderValue::PluralForms(rule) = &nodes[0].value else {
            panic!("expected a plural rule, got {:?}", nodes[0].value);
        };
        assert_eq!(rule.plural_count(), 2);
        assert!(!rule.is_form1(1));
    }

    #[test]
    fn header_entry_preamble() {
        let content = "msgid \"\"\nmsgstr \"\"\n\"Language: de\\n\"\n\n";
        assert_eq!(
            header(content).unwrap(),
            vec![
                HeaderNode::text(HeaderKey::Msgid, ""),
                HeaderNode::text(HeaderKey::Msgstr, ""),
                HeaderNode::text(HeaderKey::Language, "de"),
            ]
        );
    }

    #[test]
    fn preamble_without_msgstr() {
        let error = header("msgid \"\"\n\"Language: de\\n\"").unwrap_err();
        assert_eq!(error.kind(), ParseErrorKind::MissingMsgstr);
        assert_eq!(error.actual(), "\"Language: de\\n\"");
        assert_eq!(error.line_index(), 2);
    }

    #[test]
    fn ends_on_first_non_header_line() {
        let mut cursor = LineCursor::new("\"Language: de\\n\"\n# comment\n\"Language: fr\\n\"", "t.po");
        let mut state = HeaderState::default();
        let nodes: Vec<_> = HeaderParser::new(&mut cursor, &mut state).collect();
        assert_eq!(nodes.len(), 1);
        // the terminating line is consumed
        assert_eq!(cursor.line_index(), 2);
        assert_eq!(state, HeaderState::Done);
    }

    #[test]
    fn empty_input_has_no_header() {
        assert_eq!(header("").unwrap(), vec![]);
    }

    #[test]
    fn unknown_key() {
        let error = header("\"Language: de\\n\"\n\"X-Generator: Poedit 3.0\\n\"").unwrap_err();
        assert_eq!(error.kind(), ParseErrorKind::UnknownHeaderKey);
        assert_eq!(error.actual(), "X-Generator");
        assert_eq!(error.line_index(), 2);
        for (name, _) in HEADER_KEYS {
            assert!(error.expected().contains(name), "{} missing", name);
        }
    }

    #[test]
    fn field_without_colon() {
        let error = header("\"Just some text\\n\"").unwrap_err();
        assert_eq!(error.kind(), ParseErrorKind::UnknownHeaderKey);
        assert_eq!(error.actual(), "Just some text");
        assert_eq!(error.line_index(), 1);

        assert_eq!(
            header("\"Language\\n\"").unwrap(),
            vec![HeaderNode::text(HeaderKey::Language, "")]
        );
    }

    #[test]
    fn invalid_plural_forms_is_located() {
        let error = header("\"Language: de\\n\"\n\"Plural-Forms: nplurals=2; plural=(n >= 2);\\n\"")
            .unwrap_err();
        assert_eq!(error.kind(), ParseErrorKind::InvalidPluralOperator);
        assert_eq!(error.see(), "test.po:2:0");
        assert_eq!(error.cause(), "nplurals=2; plural=(n >= 2);");
        assert_eq!(error.actual(), ">=");
    }

    #[test]
    fn assembles_record() {
        let content = concat!(
            "msgid \"\"\n",
            "msgstr \"\"\n",
            "\"POT-Creation-Date: 2024-01-15 10:30+0100\\n\"\n",
            "\"PO-Revision-Date: 2024-02-01 08:00+0000\\n\"\n",
            "\"Content-Type: text/plain; charset=UTF-8\\n\"\n",
            "\"Plural-Forms: nplurals=2; plural=(n > 1);\\n\"\n",
        );
        let mut cursor = LineCursor::new(content, "t.po");
        let mut state = HeaderState::default();
        let record = PoHeader::from_nodes(HeaderParser::new(&mut cursor, &mut state)).unwrap();
        assert_eq!(record.msgid.as_deref(), Some(""));
        assert_eq!(record.charset(), Some("UTF-8"));
        assert!(record.plural_rule().is_form1(2));
        assert_eq!(
            record.creation_date().unwrap().to_rfc3339(),
            "2024-01-15T10:30:00+01:00"
        );
        assert!(record.revision_date().unwrap() > record.creation_date().unwrap());
        assert_eq!(PoHeader::default().plural_rule(), PluralRule::default());
    }

    #[test]
    fn nodes_round_trip() {
        let line = "\"Plural-Forms: nplurals=2; plural=(n != 1);\\n\"";
        assert_eq!(header(line).unwrap()[0].to_string(), line);
        let line = "\"Last-Translator: Ana <ana@example.com>\\n\"";
        assert_eq!(header(line).unwrap()[0].to_string(), line);
    }
}

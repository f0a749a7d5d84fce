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

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use crate::body::{BodyNode, CommentVariation};
use crate::error::ParseError;
use crate::header::PoHeader;
use crate::plural_forms::{PluralForm, PluralRule};
use crate::runtime_format::FormatArgs;

/// Something that can translate messages.
///
/// [`Catalog`] implements it; other implementations can be swapped in by code
/// that only needs lookups.
pub trait Translator {
    /// The translation of `msgid`, or `msgid` itself.
    fn translate<'a>(&'a self, msgid: &'a str) -> Cow<'a, str>;

    /// The translation of `singular` or `plural`, whichever form `n` selects.
    fn ntranslate<'a>(&'a self, n: u64, singular: &'a str, plural: &'a str) -> Cow<'a, str>;
}

/// How to pick between the singular and plural form of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralSelector<'k> {
    /// Apply the catalog's plural rule to a count.
    Count(u64),
    /// Use the given form.
    Form(PluralForm),
    /// Apply the plural rule to the value of a formatting argument.
    Use(&'k str),
}

/// A translated message and the comments written right above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub msgid: String,
    pub msgstr: Vec<String>,
    pub comments: Vec<(CommentVariation, String)>,
}

impl CatalogEntry {
    /// Whether a `#,` comment carries the `fuzzy` flag.
    pub fn is_fuzzy(&self) -> bool {
        self.flags().any(|flag| flag == "fuzzy")
    }

    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.comments_of(CommentVariation::Flag)
            .flat_map(|text| text.split(','))
            .map(str::trim)
            .filter(|flag| !flag.is_empty())
    }

    /// Source locations from `#:` comments.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.comments_of(CommentVariation::Reference)
            .flat_map(str::split_whitespace)
    }

    fn comments_of(&self, variation: CommentVariation) -> impl Iterator<Item = &str> {
        self.comments
            .iter()
            .filter(move |(v, _)| *v == variation)
            .map(|(_, text)| text.as_str())
    }

    /// The translation to use, if the entry is translated and not fuzzy.
    pub fn translation(&self) -> Option<&str> {
        if self.is_fuzzy() {
            return None;
        }
        self.msgstr
            .first()
            .map(String::as_str)
            .filter(|msgstr| !msgstr.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub translated: usize,
    pub untranslated: usize,
    pub fuzzy: usize,
}

impl CatalogStats {
    pub fn total(&self) -> usize {
        self.translated + self.untranslated + self.fuzzy
    }

    pub fn is_complete(&self) -> bool {
        self.untranslated == 0 && self.fuzzy == 0
    }
}

/// The messages of one `.po` file, indexed by `msgid`.
///
/// Construct it with [`Catalog::from_path`] or [`Catalog::from_content`].
#[derive(Debug, Clone)]
pub struct Catalog {
    file_path: String,
    header: PoHeader,
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Reads and parses the file at `path`.
    pub fn from_path(path: &Path) -> Result<Self, CatalogLoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
            path: path.to_owned(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading catalog");
        Ok(Self::from_content(&content, path.display().to_string())?)
    }

    /// Parses `.po` file content; `file_path` only appears in diagnostics.
    pub fn from_content(content: &str, file_path: impl Into<String>) -> Result<Self, ParseError> {
        let mut po = crate::parse_po_content(content, file_path);
        let header = PoHeader::from_nodes(po.header())?;

        let mut catalog = Self {
            file_path: po.file_path().to_owned(),
            header,
            entries: Vec::new(),
            index: HashMap::new(),
        };
        let mut comments = Vec::new();
        for node in po.body() {
            match node? {
                BodyNode::Comment { text, variation } => comments.push((variation, text)),
                BodyNode::Entry { msgid, msgstr } => catalog.insert(CatalogEntry {
                    msgid,
                    msgstr,
                    comments: std::mem::take(&mut comments),
                }),
                BodyNode::Whitespace | BodyNode::EndOfInput => comments.clear(),
            }
        }
        Ok(catalog)
    }

    fn insert(&mut self, entry: CatalogEntry) {
        if entry.msgid.is_empty() {
            tracing::trace!(file = %self.file_path, "skipping entry with an empty msgid");
            return;
        }
        if let Some(&position) = self.index.get(&entry.msgid) {
            tracing::warn!(file = %self.file_path, msgid = %entry.msgid, "duplicate msgid, keeping the last one");
            self.entries[position] = entry;
        } else {
            self.index.insert(entry.msgid.clone(), self.entries.len());
            self.entries.push(entry);
        }
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn header(&self) -> &PoHeader {
        &self.header
    }

    pub fn plural_rule(&self) -> PluralRule {
        self.header.plural_rule()
    }

    pub fn get(&self, msgid: &str) -> Option<&CatalogEntry> {
        self.index.get(msgid).map(|&position| &self.entries[position])
    }

    /// Entries in file order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CatalogStats {
        self.entries
            .iter()
            .fold(CatalogStats::default(), |mut stats, entry| {
                if entry.is_fuzzy() {
                    stats.fuzzy += 1;
                } else if entry.translation().is_some() {
                    stats.translated += 1;
                } else {
                    stats.untranslated += 1;
                }
                stats
            })
    }

    fn lookup<'a>(&'a self, msgid: &'a str) -> &'a str {
        self.get(msgid)
            .and_then(CatalogEntry::translation)
            .unwrap_or(msgid)
    }

    /// Picks and translates the singular or plural message.
    ///
    /// With [`PluralSelector::Use`], a missing or non numeric argument selects
    /// the plural form.
    pub fn select<'a>(
        &'a self,
        singular: &'a str,
        plural: &'a str,
        selector: PluralSelector<'_>,
        args: &[(&str, &dyn Display)],
    ) -> Cow<'a, str> {
        let rule = self.plural_rule();
        let form = match selector {
            PluralSelector::Count(n) => rule.form(n),
            PluralSelector::Form(form) => form,
            PluralSelector::Use(key) => args
                .iter()
                .find(|(name, _)| *name == key)
                .and_then(|(_, value)| value.to_string().trim().parse::<u64>().ok())
                .map_or(PluralForm::Plural, |n| rule.form(n)),
        };
        match form {
            PluralForm::Singular => Cow::Borrowed(self.lookup(singular)),
            PluralForm::Plural => Cow::Borrowed(self.lookup(plural)),
        }
    }

    /// Translates a message, choosing its plural form if `plural` is given,
    /// and substitutes its `{key:type}` placeholders from `args`.
    pub fn format(
        &self,
        msgid: &str,
        plural: Option<(&str, PluralSelector<'_>)>,
        args: &[(&str, &dyn Display)],
    ) -> String {
        let message = match plural {
            None => self.translate(msgid),
            Some((plural, selector)) => self.select(msgid, plural, selector, args),
        };
        FormatArgs {
            template: &message,
            args,
        }
        .to_string()
    }
}

impl Translator for Catalog {
    fn translate<'a>(&'a self, msgid: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(self.lookup(msgid))
    }

    fn ntranslate<'a>(&'a self, n: u64, singular: &'a str, plural: &'a str) -> Cow<'a, str> {
        self.select(singular, plural, PluralSelector::Count(n), &[])
    }
}

/// This error type is returned when a [`Catalog`] cannot be loaded from disk.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CatalogLoadError {
    /// The file could not be read.
    #[error("Error reading `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file content is not a valid `.po` file.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const GERMAN: &str = r#""Language: de\n"
"Plural-Forms: nplurals=2; plural=(n != 1);\n"

#: src/main.rs:10
msgid "Big Error"
msgstr "Großer Fehler"

# needs review
#, fuzzy
msgid "Small Error"
msgstr "Kleiner Fehler"

msgid "Untranslated"
msgstr ""

msgid "{n:number} file"
msgstr "{n:number} Datei"

msgid "{n:number} files"
msgstr "{n:number} Dateien"
"#;

    fn catalog() -> Catalog {
        Catalog::from_content(GERMAN, "de.po").unwrap()
    }

    #[test]
    fn single_message() {
        let catalog = catalog();
        assert_eq!(catalog.translate("Big Error"), "Großer Fehler");
        // fuzzy and empty translations fall back to the source
        assert_eq!(catalog.translate("Small Error"), "Small Error");
        assert_eq!(catalog.translate("Untranslated"), "Untranslated");
        assert_eq!(catalog.translate("Unknown"), "Unknown");
        assert_eq!(catalog.header().language.as_deref(), Some("de"));
    }

    #[test]
    fn plural_message() {
        let catalog = catalog();
        assert_eq!(
            catalog.ntranslate(1, "{n:number} file", "{n:number} files"),
            "{n:number} Datei"
        );
        assert_eq!(
            catalog.ntranslate(0, "{n:number} file", "{n:number} files"),
            "{n:number} Dateien"
        );
        assert_eq!(
            catalog.ntranslate(3, "{n:number} file", "{n:number} files"),
            "{n:number} Dateien"
        );
    }

    #[test]
    fn selectors() {
        let catalog = catalog();
        let (singular, plural) = ("{n:number} file", "{n:number} files");
        assert_eq!(
            catalog.format(singular, Some((plural, PluralSelector::Use("n"))), &[("n", &1)]),
            "1 Datei"
        );
        assert_eq!(
            catalog.format(singular, Some((plural, PluralSelector::Use("n"))), &[("n", &7)]),
            "7 Dateien"
        );
        assert_eq!(
            catalog.format(
                singular,
                Some((plural, PluralSelector::Form(PluralForm::Singular))),
                &[("n", &7)]
            ),
            "7 Datei"
        );
        assert_eq!(
            catalog.format(singular, Some((plural, PluralSelector::Use("n"))), &[("n", &"many")]),
            "many Dateien"
        );
        assert_eq!(catalog.format(singular, None, &[("n", &2)]), "2 Datei");
    }

    #[test]
    fn comments_attach_to_their_entry() {
        let catalog = catalog();
        let big = catalog.get("Big Error").unwrap();
        assert_eq!(big.references().collect::<Vec<_>>(), vec!["src/main.rs:10"]);
        assert!(!big.is_fuzzy());
        let small = catalog.get("Small Error").unwrap();
        assert!(small.is_fuzzy());
        assert_eq!(small.comments.len(), 2);
        assert!(catalog.get("Untranslated").unwrap().comments.is_empty());
    }

    #[test]
    fn stats() {
        let stats = catalog().stats();
        assert_eq!(
            stats,
            CatalogStats {
                translated: 3,
                untranslated: 1,
                fuzzy: 1,
            }
        );
        assert_eq!(stats.total(), 5);
        assert!(!stats.is_complete());
    }

    #[test]
    fn duplicates_keep_the_last_entry() {
        let catalog =
            Catalog::from_content("\nmsgid \"a\"\nmsgstr \"1\"\nmsgid \"a\"\nmsgstr \"2\"\n", "x.po")
                .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.translate("a"), "2");
    }

    #[test]
    fn parse_errors_are_reported() {
        let error = Catalog::from_content("\nmsgid \"a\"\nnope\n", "x.po").unwrap_err();
        assert_eq!(error.see(), "x.po:3:0");
    }

    #[test]
    fn missing_file() {
        let error = Catalog::from_path(Path::new("/nonexistent/xx.po")).unwrap_err();
        assert!(matches!(error, CatalogLoadError::Io { .. }));
        assert!(error.to_string().contains("/nonexistent/xx.po"));
    }
}

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

//! A gettext `po/` directory: a `LINGUAS` file listing languages, and one
//! `<lang>.po` file per language.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, CatalogLoadError};

pub const LINGUAS_FILE: &str = "LINGUAS";

/// Language codes listed in a `LINGUAS` file, in order, without duplicates.
///
/// Codes are separated by whitespace; lines starting with `#` are comments.
pub fn parse_linguas(content: &str) -> Vec<String> {
    let mut languages: Vec<String> = Vec::new();
    for code in content
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .flat_map(str::split_whitespace)
    {
        if !languages.iter().any(|known| known == code) {
            languages.push(code.to_owned());
        }
    }
    languages
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PoDirError {
    #[error("Error reading `{}`: {source}", .path.display())]
    Linguas {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The result of loading every language of a `po/` directory.
///
/// A file that fails to load does not prevent the others from loading.
#[derive(Debug, Default)]
pub struct PoDirectory {
    pub dir: PathBuf,
    /// Languages in `LINGUAS` order.
    pub languages: Vec<String>,
    pub catalogs: BTreeMap<String, Catalog>,
    /// Languages listed in `LINGUAS` without a `.po` file.
    pub missing: Vec<String>,
    pub failed: BTreeMap<String, CatalogLoadError>,
}

impl PoDirectory {
    pub fn po_path(&self, language: &str) -> PathBuf {
        po_path(&self.dir, language)
    }

    pub fn is_ok(&self) -> bool {
        self.missing.is_empty() && self.failed.is_empty()
    }
}

fn po_path(dir: &Path, language: &str) -> PathBuf {
    dir.join(format!("{}.po", language))
}

/// Reads `dir/LINGUAS` and loads the `.po` file of every listed language.
pub fn load_po_dir(dir: &Path) -> Result<PoDirectory, PoDirError> {
    let linguas_path = dir.join(LINGUAS_FILE);
    let content = std::fs::read_to_string(&linguas_path).map_err(|source| PoDirError::Linguas {
        path: linguas_path.clone(),
        source,
    })?;

    let mut po_dir = PoDirectory {
        dir: dir.to_owned(),
        languages: parse_linguas(&content),
        ..Default::default()
    };
    tracing::debug!(dir = %dir.display(), languages = ?po_dir.languages, "loading po directory");

    for language in &po_dir.languages {
        let path = po_path(dir, language);
        if !path.is_file() {
            tracing::warn!(language = %language, path = %path.display(), "no po file for language");
            po_dir.missing.push(language.clone());
            continue;
        }
        match Catalog::from_path(&path) {
            Ok(catalog) => {
                po_dir.catalogs.insert(language.clone(), catalog);
            }
            Err(error) => {
                tracing::debug!(language = %language, %error, "failed to load po file");
                po_dir.failed.insert(language.clone(), error);
            }
        }
    }
    Ok(po_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn linguas_format() {
        let content = "# Languages\nde fr\n  pt_BR\n\n#es\nde\n";
        assert_eq!(parse_linguas(content), vec!["de", "fr", "pt_BR"]);
        assert!(parse_linguas("").is_empty());
    }

    #[test]
    fn loads_each_language() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join(LINGUAS_FILE), "de fr it\n").unwrap();
        fs::write(dir.join("de.po"), "\"Language: de\\n\"\n\nmsgid \"Yes\"\nmsgstr \"Ja\"\n").unwrap();
        fs::write(dir.join("fr.po"), "\"Language: fr\\n\"\n\nmsgid \"Yes\"\nmsgid \"Oui\"\n").unwrap();

        let po_dir = load_po_dir(dir).unwrap();

        assert_eq!(po_dir.languages, vec!["de", "fr", "it"]);
        assert_eq!(po_dir.missing, vec!["it"]);
        assert_eq!(po_dir.catalogs.len(), 1);
        assert_eq!(po_dir.catalogs["de"].get("Yes").unwrap().translation(), Some("Ja"));
        let CatalogLoadError::Parse(error) = &po_dir.failed["fr"] else {
            panic!("expected a parse error, got {:?}", po_dir.failed["fr"]);
        };
        assert_eq!(error.line_index(), 4);
        assert!(error.file_path().ends_with("fr.po"));
        assert!(!po_dir.is_ok());
        assert_eq!(po_dir.po_path("it"), dir.join("it.po"));
    }

    #[test]
    fn missing_linguas() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            load_po_dir(temp_dir.path()),
            Err(PoDirError::Linguas { .. })
        ));
    }
}

use pofile::linguas::{load_po_dir, PoDirectory};
use pofile::runtime_format::placeholders;
use pofile::{Catalog, CatalogLoadError};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

/// Number of problems found by [`check_dir`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CheckReport {
    pub errors: usize,
    pub warnings: usize,
}

/// Loads the `po/` directory at `dir` and writes one diagnostic per problem
/// to `out`, in the `file:line:0: severity: message` form where a line is known.
pub fn check_dir<W: Write>(dir: &Path, out: &mut W) -> anyhow::Result<CheckReport> {
    let po_dir = load_po_dir(dir)?;
    let mut report = CheckReport::default();

    for language in &po_dir.missing {
        writeln!(
            out,
            "{}: warning: no po file for language `{}` listed in LINGUAS",
            po_dir.po_path(language).display(),
            language
        )?;
        report.warnings += 1;
    }

    for error in po_dir.failed.values() {
        write_load_error(out, error)?;
        report.errors += 1;
    }

    for (language, catalog) in &po_dir.catalogs {
        report.warnings += check_catalog(out, language, catalog)?;
    }

    summary(out, &po_dir, report)?;
    Ok(report)
}

fn write_load_error<W: Write>(out: &mut W, error: &CatalogLoadError) -> std::io::Result<()> {
    match error {
        CatalogLoadError::Parse(error) => {
            writeln!(out, "{}: error: {}", error.see(), error.message())?;
            writeln!(out, "    expected: {}", error.expected())?;
            writeln!(out, "    found: {}", error.actual())
        }
        error => writeln!(out, "error: {}", error),
    }
}

/// Returns the number of warnings written.
fn check_catalog<W: Write>(out: &mut W, language: &str, catalog: &Catalog) -> std::io::Result<usize> {
    let file = catalog.file_path();
    let mut warnings = 0;

    match catalog.header().language.as_deref() {
        Some(declared) if declared != language => {
            writeln!(
                out,
                "{}: warning: header declares language `{}` but LINGUAS lists it as `{}`",
                file, declared, language
            )?;
            warnings += 1;
        }
        _ => {}
    }

    let stats = catalog.stats();
    if !stats.is_complete() {
        writeln!(
            out,
            "{}: warning: translation incomplete: {} untranslated and {} fuzzy of {} messages",
            file,
            stats.untranslated,
            stats.fuzzy,
            stats.total()
        )?;
        warnings += 1;
    }

    for entry in catalog.entries() {
        let Some(translation) = entry.translation() else {
            continue;
        };
        let expected = placeholder_set(&entry.msgid);
        let found = placeholder_set(translation);
        if expected != found {
            writeln!(
                out,
                "{}: warning: placeholders of `{}` are [{}] in the translation, expected [{}]",
                file,
                entry.msgid,
                join(&found),
                join(&expected)
            )?;
            warnings += 1;
        }
    }
    Ok(warnings)
}

fn placeholder_set(template: &str) -> BTreeSet<String> {
    placeholders(template).map(|p| p.to_string()).collect()
}

fn join(set: &BTreeSet<String>) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

fn summary<W: Write>(out: &mut W, po_dir: &PoDirectory, report: CheckReport) -> std::io::Result<()> {
    for (language, catalog) in &po_dir.catalogs {
        let stats = catalog.stats();
        writeln!(
            out,
            "{}: {}/{} translated",
            language,
            stats.translated,
            stats.total()
        )?;
    }
    writeln!(
        out,
        "{} languages, {} errors, {} warnings",
        po_dir.languages.len(),
        report.errors,
        report.warnings
    )
}

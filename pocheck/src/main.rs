use anyhow::Context;
use clap::{crate_authors, crate_description, crate_version, value_parser, Arg, ArgAction, ArgGroup, ArgMatches, Command};
use pofile::{parse_po_content, Catalog, PluralForm, PluralSelector};
use std::fmt::Display;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod check;
mod generator;

fn file_arg() -> Arg {
    Arg::new("FILE")
        .help("The .po file to read")
        .required(true)
        .value_parser(value_parser!(PathBuf))
}

fn cli() -> Command {
    Command::new("pocheck")
        .version(crate_version!())
        .author(crate_authors!())
        .about(crate_description!())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Log more details; repeat for more. RUST_LOG takes precedence."),
        )
        .subcommand(
            Command::new("check")
                .about("Validate every .po file listed in the LINGUAS file of a directory")
                .arg(
                    Arg::new("DIR")
                        .help("Directory containing LINGUAS and the .po files")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .action(ArgAction::SetTrue)
                        .help("Fail on warnings too"),
                ),
        )
        .subcommand(
            Command::new("dump")
                .about("Print the header and body nodes of a .po file")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("normalize")
                .about("Rewrite a .po file from its parsed nodes")
                .arg(file_arg())
                .arg(
                    Arg::new("OUTPUT")
                        .short('o')
                        .long("output")
                        .value_name("file")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write output to specified file (instead of stdout)"),
                ),
        )
        .subcommand(
            Command::new("lookup")
                .about("Translate a message and fill in its {key:type} placeholders")
                .arg(file_arg())
                .arg(Arg::new("MSGID").help("The message to translate").required(true))
                .arg(
                    Arg::new("plural")
                        .long("plural")
                        .value_name("msgid")
                        .requires("selector")
                        .help("The plural form of MSGID"),
                )
                .arg(
                    Arg::new("count")
                        .long("count")
                        .value_name("n")
                        .value_parser(value_parser!(u64))
                        .help("Pick the form for this count using the file's plural rule"),
                )
                .arg(
                    Arg::new("form")
                        .long("form")
                        .value_name("index")
                        .value_parser(value_parser!(u8).range(0..=1))
                        .help("Pick form 0 (singular) or 1 (plural)"),
                )
                .arg(
                    Arg::new("use")
                        .long("use")
                        .value_name("key")
                        .help("Pick the form for the count given as the value of placeholder `key`"),
                )
                .group(
                    ArgGroup::new("selector")
                        .args(["count", "form", "use"])
                        .requires("plural"),
                )
                .arg(
                    Arg::new("set")
                        .long("set")
                        .value_name("key=value")
                        .action(ArgAction::Append)
                        .value_parser(parse_key_value)
                        .help("Value of a placeholder"),
                ),
        )
}

fn parse_key_value(arg: &str) -> Result<(String, String), String> {
    arg.split_once('=')
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .ok_or_else(|| format!("`{}` is not of the form key=value", arg))
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let matches = cli().get_matches();
    init_logging(matches.get_count("verbose"));

    match matches.subcommand() {
        Some(("check", sub)) => check(sub),
        Some(("dump", sub)) => dump(sub, &mut std::io::stdout().lock()),
        Some(("normalize", sub)) => normalize(sub, &mut std::io::stdout().lock()),
        Some(("lookup", sub)) => lookup(sub, &mut std::io::stdout().lock()),
        _ => unreachable!("a subcommand is required"),
    }
}

fn required_path<'a>(matches: &'a ArgMatches, id: &str) -> anyhow::Result<&'a PathBuf> {
    matches
        .get_one::<PathBuf>(id)
        .with_context(|| format!("missing argument {}", id))
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))
}

fn check(matches: &ArgMatches) -> anyhow::Result<ExitCode> {
    let dir = required_path(matches, "DIR")?;
    let report = check::check_dir(dir, &mut std::io::stdout().lock())?;
    let failed = report.errors > 0 || (matches.get_flag("strict") && report.warnings > 0);
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn dump(matches: &ArgMatches, out: &mut impl Write) -> anyhow::Result<ExitCode> {
    let path = required_path(matches, "FILE")?;
    let content = read_file(path)?;
    let mut po = parse_po_content(&content, path.display().to_string());

    writeln!(out, "header:")?;
    for node in po.header() {
        writeln!(out, "  {:?}", node?)?;
    }
    writeln!(out, "body:")?;
    for node in po.body() {
        writeln!(out, "  {:?}", node?)?;
    }
    Ok(ExitCode::SUCCESS)
}

fn normalize(matches: &ArgMatches, out: &mut impl Write) -> anyhow::Result<ExitCode> {
    let path = required_path(matches, "FILE")?;
    let content = read_file(path)?;
    let file_path = path.display().to_string();
    match matches.get_one::<PathBuf>("OUTPUT") {
        Some(output) => {
            let mut file = std::fs::File::create(output)
                .with_context(|| format!("could not create {}", output.display()))?;
            generator::generate(&mut file, &content, &file_path)?;
        }
        None => generator::generate(out, &content, &file_path)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn lookup(matches: &ArgMatches, out: &mut impl Write) -> anyhow::Result<ExitCode> {
    let path = required_path(matches, "FILE")?;
    let catalog = Catalog::from_path(path)?;
    let msgid = matches
        .get_one::<String>("MSGID")
        .context("missing argument MSGID")?;

    let values: Vec<&(String, String)> = matches
        .get_many::<(String, String)>("set")
        .map(|values| values.collect())
        .unwrap_or_default();
    let args: Vec<(&str, &dyn Display)> = values
        .iter()
        .map(|(key, value)| (key.as_str(), value as &dyn Display))
        .collect();

    let plural = match matches.get_one::<String>("plural") {
        None => None,
        Some(plural) => {
            let selector = if let Some(&n) = matches.get_one::<u64>("count") {
                PluralSelector::Count(n)
            } else if let Some(&form) = matches.get_one::<u8>("form") {
                PluralSelector::Form(if form == 0 {
                    PluralForm::Singular
                } else {
                    PluralForm::Plural
                })
            } else {
                let key = matches
                    .get_one::<String>("use")
                    .context("--plural needs one of --count, --form or --use")?;
                PluralSelector::Use(key)
            };
            Some((plural.as_str(), selector))
        }
    };

    if catalog.get(msgid).and_then(|entry| entry.translation()).is_none() {
        tracing::info!(msgid = %msgid, "no translation, using the source text");
    }
    writeln!(out, "{}", catalog.format(msgid, plural, &args))?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fixture(name: &str) -> String {
        format!("{}/../pofile/tests/fixtures/po/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    fn run(args: &[&str]) -> String {
        let matches = cli().try_get_matches_from(args).unwrap();
        let mut out = Vec::new();
        let code = match matches.subcommand() {
            Some(("dump", sub)) => dump(sub, &mut out),
            Some(("normalize", sub)) => normalize(sub, &mut out),
            Some(("lookup", sub)) => lookup(sub, &mut out),
            other => panic!("unexpected subcommand {:?}", other),
        }
        .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn verify_cli() {
        cli().debug_assert();
    }

    #[test]
    fn lookup_arguments() {
        let matches = cli()
            .try_get_matches_from([
                "pocheck", "lookup", "pt.po", "{n:number} file", "--plural", "{n:number} files",
                "--use", "n", "--set", "n=3",
            ])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(sub.get_one::<String>("use").map(String::as_str), Some("n"));
        let set: Vec<_> = sub.get_many::<(String, String)>("set").unwrap().collect();
        assert_eq!(set, vec![&("n".to_owned(), "3".to_owned())]);
    }

    #[test]
    fn selector_requires_plural() {
        assert!(cli()
            .try_get_matches_from(["pocheck", "lookup", "pt.po", "Hello", "--count", "2"])
            .is_err());
        assert!(cli()
            .try_get_matches_from(["pocheck", "lookup", "pt.po", "Hello", "--plural", "Hellos"])
            .is_err());
        assert!(cli()
            .try_get_matches_from(["pocheck", "lookup", "pt.po", "a", "--set", "novalue"])
            .is_err());
    }

    #[test]
    fn lookup_translates_from_file() {
        let pt = fixture("pt.po");
        assert_eq!(run(&["pocheck", "lookup", &pt, "Hello"]), "Olá\n");
        // fuzzy and empty translations fall back to the source text
        assert_eq!(
            run(&["pocheck", "lookup", &pt, "Decryption of this file failed:"]),
            "Decryption of this file failed:\n"
        );
        assert_eq!(
            run(&["pocheck", "lookup", &pt, "Decryption of these {n:number} files failed:", "--set", "n=4"]),
            "Decryption of these 4 files failed:\n"
        );
    }

    #[test]
    fn lookup_selects_plural_form() {
        let pt = fixture("pt.po");
        let lookup = |extra: &[&str]| {
            let mut args = vec![
                "pocheck",
                "lookup",
                pt.as_str(),
                "Time: {s:number} second",
                "--plural",
                "Time: {s:number} seconds",
            ];
            args.extend_from_slice(extra);
            run(&args)
        };
        assert_eq!(lookup(&["--count", "1", "--set", "s=1"]), "Tempo: 1 segundo\n");
        assert_eq!(lookup(&["--count", "5", "--set", "s=5"]), "Tempo: 5 segundos\n");
        assert_eq!(lookup(&["--form", "0", "--set", "s=9"]), "Tempo: 9 segundo\n");
        assert_eq!(lookup(&["--use", "s", "--set", "s=1"]), "Tempo: 1 segundo\n");
        assert_eq!(lookup(&["--use", "s", "--set", "s=2"]), "Tempo: 2 segundos\n");
    }

    #[test]
    fn dump_lists_header_then_body() {
        let out = run(&["pocheck", "dump", &fixture("pt.po")]);
        let header = out.find("header:").unwrap();
        let body = out.find("body:").unwrap();
        assert!(header < body);
        assert!(out[header..body].contains("PluralForms"));
        assert!(out[body..].contains("msgid: \"Hello\""));
    }

    #[test]
    fn normalize_to_stdout_and_file() {
        let pt = fixture("pt.po");
        let printed = run(&["pocheck", "normalize", &pt]);
        assert!(printed.starts_with("msgid \"\"\nmsgstr \"\"\n"));
        assert!(printed.contains("msgid \"Hello\"\nmsgstr \"Olá\"\n"));

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("pt.po");
        let output_arg = output.display().to_string();
        assert_eq!(run(&["pocheck", "normalize", &pt, "-o", &output_arg]), "");
        assert_eq!(std::fs::read_to_string(&output).unwrap(), printed);
    }
}

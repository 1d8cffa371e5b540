//! Command-line front end: one extraction run per invocation.
//!
//! Fetches the given URL, extracts the table selected by the chosen profile
//! and writes the result as a CSV sheet named after the last URL path
//! segment.

use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use scrape_logging::LogDestination;
use tablegrab_engine::{sheet_name_from_url, ParseConfig, TableExtractor, TableProfile, Workbook};

struct Args {
    config: PathBuf,
    url: String,
    profile: TableProfile,
    out_dir: PathBuf,
}

fn print_usage() {
    eprintln!(
        "usage: tablegrab <url> [--config FILE] [--profile NAME] [--index N] \
         [--out DIR] [--no-header] [--no-body]"
    );
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut url: Option<String> = None;
    let mut config = PathBuf::from("parse.json");
    let mut out_dir = PathBuf::from(".");
    let mut profile_name: Option<String> = None;
    let mut index: usize = 0;
    let mut no_header = false;
    let mut no_body = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config = PathBuf::from(args.next().ok_or("--config needs a file path")?);
            }
            "--profile" => {
                let name = args.next().ok_or("--profile needs a name")?;
                if name.len() < 2 {
                    return Err(format!("profile name too short: {name:?}"));
                }
                profile_name = Some(name);
            }
            "--index" => {
                let value = args.next().ok_or("--index needs a number")?;
                index = value
                    .parse()
                    .map_err(|_| format!("not a valid index: {value:?}"))?;
            }
            "--out" => {
                out_dir = PathBuf::from(args.next().ok_or("--out needs a directory")?);
            }
            "--no-header" => no_header = true,
            "--no-body" => no_body = true,
            other if other.starts_with("--") => {
                return Err(format!("unknown option {other}"));
            }
            other => {
                if url.replace(other.to_string()).is_some() {
                    return Err("more than one url given".to_string());
                }
            }
        }
    }

    let url = url.ok_or("missing url")?;
    let mut profile = match profile_name {
        Some(name) => TableProfile::named(&name, index),
        None => TableProfile {
            table_index: index,
            ..TableProfile::default()
        },
    };
    if no_header {
        profile.header.clear();
    }
    if no_body {
        profile.body.clear();
    }

    Ok(Args {
        config,
        url,
        profile,
        out_dir,
    })
}

fn run(args: Args) -> Result<ExitCode, Box<dyn Error>> {
    let config = ParseConfig::from_path(&args.config)?;
    let extractor = TableExtractor::new(config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let dataset = runtime.block_on(extractor.extract(&args.url, &args.profile))?;

    let Some(dataset) = dataset else {
        eprintln!("Table not found or failed to retrieve the webpage.");
        return Ok(ExitCode::FAILURE);
    };

    if let Some(columns) = &dataset.columns {
        println!("{}", columns.join("\t"));
    }
    for row in &dataset.rows {
        println!("{}", row.join("\t"));
    }

    let workbook = Workbook::new(args.out_dir, "components");
    let sheet = sheet_name_from_url(&args.url);
    let path = workbook.add_sheet(&sheet, &dataset)?;
    log::info!("wrote {} rows to {}", dataset.rows.len(), path.display());

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    scrape_logging::initialize(LogDestination::Both);

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            log::error!("extraction failed: {err}");
            eprintln!("extraction failed: {err}");
            ExitCode::FAILURE
        }
    }
}

#[macro_use]
extern crate clap;
extern crate env_logger;
extern crate failure;
#[macro_use]
extern crate log;
extern crate payload;
#[macro_use]
extern crate prettytable;
extern crate sofar;

use clap::{App, ArgMatches};
use failure::Error;
use payload::{decoding, fragment, Controller, Summary};
use prettytable::{format, Table};
use sofar::{Config, FilesystemSink, Response};
use std::path::Path;

fn main() {
    let yaml = load_yaml!("cli.yml");
    let matches = App::from_yaml(yaml).get_matches();

    let verbosity = matches
        .subcommand()
        .1
        .map(|matches| matches.occurrences_of("verbose"))
        .unwrap_or(0)
        .max(matches.occurrences_of("verbose"));
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = if let Some(matches) = matches.subcommand_matches("url") {
        url(matches)
    } else if let Some(matches) = matches.subcommand_matches("process") {
        process(matches)
    } else if let Some(matches) = matches.subcommand_matches("decode") {
        decode(matches);
        Ok(())
    } else {
        println!("{}", matches.usage());
        Ok(())
    };
    if let Err(err) = result {
        eprintln!("error: {}", err);
        for cause in err.iter_causes() {
            eprintln!("  caused by: {}", cause);
        }
        std::process::exit(1);
    }
}

fn config(matches: &ArgMatches) -> Result<Config, Error> {
    let path = matches.value_of("CONFIG").unwrap();
    let mut config = Config::from_path(path)?;
    if let Some(output) = matches.value_of("output") {
        config.set_output_directory(output);
    }
    if let Some(order) = matches.value_of("order") {
        config.set_order(order);
    }
    Ok(config)
}

fn url(matches: &ArgMatches) -> Result<(), Error> {
    let query = config(matches)?.query()?;
    println!("{}", query.url()?);
    Ok(())
}

fn process(matches: &ArgMatches) -> Result<(), Error> {
    let config = config(matches)?;
    let order = config.order()?;
    let directory = config.output_directory()?;
    let query = config.query()?;
    let response = match matches.value_of("RESPONSE") {
        Some(path) => Response::from_path(path)?,
        None => sofar::fetch(&query)?,
    };
    info!(
        "read {} entries for {}",
        response.data.len(),
        query.spotter_id()
    );

    sofar::export_csv(&directory, &response.data)?;
    let mut sink = FilesystemSink::create(&directory, config.image_extension())?;
    let summary = Controller::with_order(order).run(&response.records(), &mut sink);
    print_summary(&directory, &summary);
    Ok(())
}

fn decode(matches: &ArgMatches) {
    let collecting = matches.is_present("collecting");
    for value in matches.values_of("HEX").unwrap() {
        match decoding::decode(value) {
            Ok(decoded) => {
                println!("{:?}", decoded.text);
                if decoded.had_replacement {
                    println!("  (invalid utf-8 replaced)");
                }
                match fragment::classify(&decoded.text, collecting) {
                    Ok(fragment) => println!("  {:?}", fragment),
                    Err(err) => println!("  {}", err),
                }
            }
            Err(err) => println!("{}: {}", value, err),
        }
    }
}

fn print_summary(directory: &Path, summary: &Summary) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(row!["Output", "Count"]);
    table.add_row(row!["Records", summary.records]);
    table.add_row(row!["Text messages", summary.texts]);
    table.add_row(row!["Images", summary.images]);
    table.add_row(row!["Empty images", summary.empty_images]);
    table.add_row(row!["Invalid utf-8", summary.replacements]);
    table.add_row(row!["Skipped", summary.skipped.len()]);
    table.add_row(row!["Discarded images", summary.discarded.len()]);
    table.add_row(row!["Failed writes", summary.failed_writes.len()]);
    println!("{}", directory.display());
    table.printstd();

    for skipped in &summary.skipped {
        println!("skipped record {}: {}", skipped.position, skipped.error);
    }
    for index in &summary.discarded {
        println!("image {} was discarded by a later start marker", index);
    }
    for err in &summary.failed_writes {
        println!("failed write: {}", err);
    }
    if let Some(index) = summary.dangling {
        println!("image {} was never closed", index);
    }
}

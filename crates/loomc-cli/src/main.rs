mod cli;
mod util;

use std::process::ExitCode;

use clap::Parser as _;
use loomc_compiler::{Diagnostics, Driver, Error, SourceMap};

use cli::{Cli, ColorChoice, Command, SourceArgs};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::Check { source, keywords, color } => run_check(source, keywords, color),
        Command::Dump { source, keywords, color } => run_dump(source, keywords, color),
    }
}

fn build_driver(keywords: Option<std::path::PathBuf>) -> Result<Driver, ExitCode> {
    let mut driver = Driver::new();
    if let Some(path) = keywords {
        match util::load_text(&path) {
            Ok(manifest) => driver = driver.with_keyword_manifest(manifest),
            Err(err) => {
                eprintln!("error: {err}");
                return Err(ExitCode::FAILURE);
            }
        }
    }
    Ok(driver)
}

fn run_check(source: SourceArgs, keywords: Option<std::path::PathBuf>, color: ColorChoice) -> ExitCode {
    let driver = match build_driver(keywords) {
        Ok(driver) => driver,
        Err(code) => return code,
    };
    let text = match util::load_text(&source.path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    let file_name = source.path.display().to_string();

    match driver.compile(&text, &file_name) {
        Ok(handoff) => {
            print_diagnostics(&handoff.diagnostics, &handoff.sources, color);
            ExitCode::SUCCESS
        }
        Err(Error::AnalysisFailed(diagnostics, sources)) => {
            print_diagnostics(&diagnostics, &sources, color);
            ExitCode::FAILURE
        }
        Err(other) => {
            eprintln!("error: {other}");
            ExitCode::FAILURE
        }
    }
}

fn run_dump(source: SourceArgs, keywords: Option<std::path::PathBuf>, color: ColorChoice) -> ExitCode {
    let driver = match build_driver(keywords) {
        Ok(driver) => driver,
        Err(code) => return code,
    };
    let text = match util::load_text(&source.path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    let file_name = source.path.display().to_string();

    match driver.compile(&text, &file_name) {
        Ok(handoff) => {
            print_diagnostics(&handoff.diagnostics, &handoff.sources, color);
            for (offset, word) in handoff.words.iter().enumerate() {
                println!("{offset:>5}: {word}");
            }
            println!("--- functions ---");
            for entry in handoff.functions.iter() {
                println!("{} @ {}", handoff.reprs.spelling(entry.name), entry.tree_offset);
            }
            ExitCode::SUCCESS
        }
        Err(Error::AnalysisFailed(diagnostics, sources)) => {
            print_diagnostics(&diagnostics, &sources, color);
            ExitCode::FAILURE
        }
        Err(other) => {
            eprintln!("error: {other}");
            ExitCode::FAILURE
        }
    }
}

fn print_diagnostics(diagnostics: &Diagnostics, sources: &SourceMap, color: ColorChoice) {
    if diagnostics.is_empty() {
        return;
    }
    let rendered = diagnostics.printer(sources).with_color(color.should_colorize()).render();
    eprint!("{rendered}");
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn should_colorize(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
        }
    }
}

#[derive(Parser)]
#[command(name = "loomc", bin_name = "loomc")]
#[command(about = "Front end for the loomc language: lex, parse, and analyze a source file")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct SourceArgs {
    /// Source file to compile, or `-` to read from stdin.
    pub path: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full analyzer and report diagnostics.
    Check {
        #[command(flatten)]
        source: SourceArgs,
        /// Override the embedded default keyword manifest.
        #[arg(long)]
        keywords: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
        color: ColorChoice,
    },
    /// Compile and print the flattened tag/argument tree.
    Dump {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long)]
        keywords: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
        color: ColorChoice,
    },
}

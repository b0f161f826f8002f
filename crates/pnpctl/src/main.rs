use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd_convert;
mod cmd_list;
mod cmd_show;
mod cmd_validate;
mod common;

use cmd_convert::ConvertArgs;

#[derive(Parser, Debug)]
#[command(name = "pnpctl", version, about = "Provisioning template (2015-05) CLI")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Output JSON where applicable
    #[arg(long)]
    json: bool,
    /// Register a provider handler, as `Type[, Assembly]` (repeatable)
    #[arg(long = "provider", value_name = "HANDLER")]
    providers: Vec<String>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Validate a document against the embedded schema
    Validate { input: PathBuf },
    /// List the templates a document offers
    List { input: PathBuf },
    /// Read a template and write it back as a Provisioning wrapper
    Convert {
        input: PathBuf,
        #[arg(long)]
        id: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a summary of a template
    Show {
        input: PathBuf,
        #[arg(long)]
        id: Option<String>,
    },
}

fn main() -> Result<()> {
    let Cli {
        verbose,
        json,
        providers,
        cmd,
    } = Cli::parse();

    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.into()),
        ))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cmd {
        Cmd::Validate { input } => cmd_validate::run(&input, json)?,
        Cmd::List { input } => cmd_list::run(&input, json)?,
        Cmd::Convert { input, id, output } => cmd_convert::run(ConvertArgs {
            input,
            id,
            output,
            providers,
        })?,
        Cmd::Show { input, id } => cmd_show::run(&input, id.as_deref(), &providers, json)?,
    };

    Ok(())
}

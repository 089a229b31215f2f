#![deny(unsafe_code)]
pub mod commands;
mod version;

use anyhow::Result;
use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};

/// Custom styles for CLI help output
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

use commands::command::Command;
use commands::common::VerbosityOptions;
use commands::demux::Demux;
use commands::vcall::VariantCalling;
use enum_dispatch::enum_dispatch;
use log::{error, info};
use seqrun_lib::logging;

#[derive(Parser, Debug)]
#[command(styles = STYLES)]
struct Args {
    #[command(flatten)]
    verbosity: VerbosityOptions,

    #[clap(subcommand)]
    subcommand: Subcommand,
}

#[enum_dispatch(Command)]
#[derive(Parser, Debug)]
#[command(version)]
enum Subcommand {
    #[command(display_order = 1)]
    Demux(Demux),
    #[command(display_order = 2)]
    Vcall(VariantCalling),
}

fn main() {
    let args = Args::parse();

    logging::init_logging(args.verbosity.verbose, args.verbosity.quiet);
    info!("Running seqrun version {}", version::VERSION.as_str());

    // every failure is terminal; log it with severity and exit nonzero
    if let Err(err) = args.subcommand.execute() {
        error!("{err:#}");
        std::process::exit(1);
    }
}

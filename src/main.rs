//! Nudelta CLI
//!
//! Reads, writes and resets the keymap of a NuPhy Air60.

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing::debug;
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::EnvFilter;

use nudelta::access::{self, Access};
use nudelta::Settings;

// CLI definitions
mod cli;
use cli::{Cli, Command};

// Command handlers
mod commands;

/// Exit status for runtime and device errors (the classic `-1`)
const EXIT_FAILURE: u8 = 255;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    init_tracing(cli.verbose);

    let Some(command) = cli.operation() else {
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    };

    match run(&cli, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[ERROR] {e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run(cli: &Cli, command: Command) -> anyhow::Result<()> {
    if !command.needs_device() {
        return commands::query::version();
    }
    if access::check_hid_access() == Access::Denied {
        anyhow::bail!("{}", access::failure_message());
    }

    let settings = Settings::discover(cli.config.as_deref())?;
    let mode = settings.mode(cli.mac);
    debug!("Settings: {:?}, mode {}", settings, mode);

    match command {
        Command::Version => commands::query::version(),
        Command::Firmware => commands::query::firmware(&settings),
        Command::Reset => commands::keymap::reset(&settings, mode),
        Command::Dump { path, hex } => {
            commands::keymap::dump(&settings, mode, &path, hex.as_deref())
        }
        Command::LoadKeys(path) => commands::keymap::load_keys(&settings, mode, &path),
        Command::LoadProfile(path) => commands::keymap::load_profile(&settings, mode, &path),
        Command::ExportProfile(path) => commands::keymap::export_profile(&settings, mode, &path),
    }
}

/// Log to stderr; `RUST_LOG` wins over the defaults
fn init_tracing(verbose: bool) {
    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    if verbose {
        for directive in ["nudelta=debug", "nudelta_keyboard=debug", "nudelta_transport=debug"] {
            if let Ok(directive) = directive.parse::<Directive>() {
                filter = filter.add_directive(directive);
            }
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

mod cli;
mod commands;
mod config;
mod progress;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::Config;
use std::io;
use std::path::PathBuf;
use vaskit::{Client, Paths};

/// Global context for the application
pub struct Context {
    pub quiet: bool,
    pub json: bool,
    pub config: Config,
    /// `--vastool` override
    pub vastool: Option<PathBuf>,
}

impl Context {
    /// Context for one invocation. Verbosity only drives the logger.
    fn new(cli: &Cli, config: Config) -> Self {
        Self {
            quiet: cli.quiet,
            json: cli.json,
            config,
            vastool: cli.vastool.clone(),
        }
    }

    /// Binary locations after command-line overrides.
    pub fn paths(&self) -> Paths {
        let mut paths = self.config.binaries();
        if let Some(vastool) = &self.vastool {
            paths.vastool = vastool.clone();
        }
        paths
    }

    /// A client wired to the configured binaries and account source.
    pub fn client(&self) -> Client {
        Client::new()
            .paths(self.paths())
            .accounts(self.config.account_source())
    }

    /// Whether spinners and other decoration should be suppressed.
    pub fn hidden(&self) -> bool {
        self.json || self.quiet
    }
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(log_level(&cli))
        .format_timestamp(None)
        .init();

    if let Err(err) = run(cli) {
        ui::error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

/// Logger filter for `-v`/`-q`; quiet wins.
fn log_level(cli: &Cli) -> log::LevelFilter {
    if cli.quiet {
        return log::LevelFilter::Error;
    }
    match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let ctx = Context::new(&cli, config);

    match cli.command {
        Command::Join(args) => commands::domain::join(&ctx, args),
        Command::Unjoin(args) => commands::domain::unjoin(&ctx, args),
        Command::Status => commands::domain::status(&ctx),
        Command::Health => commands::diagnostics::health(&ctx),
        Command::Preflight(args) => commands::diagnostics::preflight(&ctx, args),
        Command::MappedUsers => commands::access::mapped_users(&ctx),
        Command::Access => commands::access::access(&ctx),
        Command::LogonPolicy => commands::access::logon_policy(&ctx),
        Command::LocalUsers(args) => commands::local::users(&ctx, args),
        Command::LocalGroups(args) => commands::local::groups(&ctx, args),
        Command::Conflicts(cmd) => commands::identity::conflicts(&ctx, cmd),
        Command::UnixEnabled(cmd) => commands::identity::unix_enabled(&ctx, cmd),
        Command::PolicyByUser { input } => commands::identity::policy_by_user(&ctx, &input),
        Command::Version => commands::version::run(&ctx),
        Command::Completions { shell } => {
            generate(shell, &mut Cli::command(), "adjoin", &mut io::stdout());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level() {
        let level = |args: &[&str]| log_level(&Cli::try_parse_from(args).unwrap());
        assert_eq!(level(&["adjoin", "status"]), log::LevelFilter::Warn);
        assert_eq!(level(&["adjoin", "-vv", "status"]), log::LevelFilter::Debug);
        assert_eq!(level(&["adjoin", "-vvvv", "status"]), log::LevelFilter::Trace);
        assert_eq!(level(&["adjoin", "-q", "-vvv", "status"]), log::LevelFilter::Error);
    }

    #[test]
    fn test_context_from_flags() {
        let cli = Cli::try_parse_from(["adjoin", "-vv", "--json", "--vastool", "/tmp/vastool", "status"])
            .unwrap();
        let ctx = Context::new(&cli, Config::default());

        assert!(ctx.json);
        assert!(!ctx.quiet);
        assert!(ctx.hidden());
        assert_eq!(ctx.paths().vastool, PathBuf::from("/tmp/vastool"));
    }
}

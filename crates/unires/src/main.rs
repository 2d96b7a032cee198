mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use unires_core::Session;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(&cli.global, matches!(cli.command, Command::Import(_)));

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Logs go to stderr so stdout carries only the rendered report.
/// `import` logs one line per row at info by default.
fn init_tracing(global: &GlobalOpts, per_row_log: bool) {
    let filter = match (global.quiet, global.verbose) {
        (true, _) => "error",
        (false, 0) if per_row_log => "info",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Completions(args) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "unires", &mut std::io::stdout());
            Ok(())
        }

        Command::Validate(ref args) => commands::validate::handle(args, &cli.global),

        Command::Import(ref args) => {
            let rows = commands::import::read_csv(args)?;
            let session = open_session(&cli.global).await?;
            let result = commands::import::handle(&session, &rows, args, &cli.global).await;
            session.close().await;
            result
        }

        Command::Networks => {
            let session = open_session(&cli.global).await?;
            let result = commands::networks::handle(&session, &cli.global).await;
            session.close().await;
            result
        }
    }
}

async fn open_session(global: &GlobalOpts) -> Result<Session, CliError> {
    let settings = config::resolve_settings(global)?;
    tracing::debug!(controller = %settings.url, site = %settings.site, "opening session");
    Ok(Session::open(&settings).await?)
}

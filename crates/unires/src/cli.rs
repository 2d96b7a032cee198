//! Clap derive structures for the `unires` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// unires -- bulk static-IP reservations for UniFi controllers
#[derive(Debug, Parser)]
#[command(
    name = "unires",
    version,
    about = "Import static DHCP reservations into a UniFi controller from CSV",
    long_about = "Reads a CSV of VLAN, MAC, Client Name and IP, resolves each VLAN to a\n\
        controller network, and creates or updates the matching client record\n\
        with a fixed IP. Re-running the same file is safe.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "UNIRES_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller URL (overrides profile)
    #[arg(long, short = 'c', env = "UNIRES_CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// Site name
    #[arg(long, short = 's', env = "UNIRES_SITE", global = true)]
    pub site: Option<String>,

    /// Controller admin username
    #[arg(long, short = 'u', env = "UNIRES_USERNAME", global = true)]
    pub username: Option<String>,

    /// Read controller, username, password and site from a TOML secrets file
    #[arg(long, env = "UNIRES_SECRETS", global = true, value_name = "FILE")]
    pub secrets: Option<PathBuf>,

    /// Controller platform (login flow and URL prefix)
    #[arg(long, env = "UNIRES_PLATFORM", global = true)]
    pub platform: Option<PlatformArg>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "UNIRES_INSECURE", global = true)]
    pub insecure: bool,

    /// Per-request timeout in seconds
    #[arg(
        long,
        env = "UNIRES_TIMEOUT",
        global = true,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "UNIRES_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress everything but errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Value Enums ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Tab-separated lines (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PlatformArg {
    /// Probe the controller
    Auto,
    /// UniFi OS console (UDM, UCG, Cloud Key Gen2+)
    UnifiOs,
    /// Standalone Network Application
    Classic,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create or update fixed-IP client records from a CSV file
    Import(ImportArgs),

    /// List the controller's VLAN -> network mapping
    #[command(alias = "net")]
    Networks,

    /// Check a CSV file offline without contacting the controller
    Validate(ValidateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// CSV file with columns VLAN, MAC, Client Name, IP
    pub csv: PathBuf,

    /// Look everything up but write nothing
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Note stored on new client records ("Imported by unires" when omitted,
    /// none when empty)
    #[arg(long)]
    pub note: Option<String>,

    /// Skip rows whose IP is outside the VLAN's subnet instead of warning
    #[arg(long)]
    pub strict_subnet: bool,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// CSV file with columns VLAN, MAC, Client Name, IP
    pub csv: PathBuf,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#![forbid(unsafe_code)]

mod cmd;
mod output;
mod tui;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "regis: student information system admin console",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides --json and REGIS_FORMAT).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Session",
        about = "Sign in and store a session token",
        after_help = "EXAMPLES:\n    # Sign in, prompting for the password\n    regis login admin\n\n    # Non-interactive (scripts)\n    regis login admin --password s3cret --json"
    )]
    Login(cmd::login::LoginArgs),

    #[command(
        next_help_heading = "Session",
        about = "Sign out and discard the session token",
        after_help = "EXAMPLES:\n    regis logout"
    )]
    Logout,

    #[command(
        next_help_heading = "Records",
        subcommand,
        about = "Manage student records",
        after_help = "EXAMPLES:\n    # Second page of second-years, newest last name first\n    regis students list --search \"2nd year\" --sort-by last_name --order desc --page 2\n\n    # Enroll with a photo\n    regis students add 2025-0001 --first-name Ana --last-name Reyes \\\n        --gender female --year 1 --college 1 --program 10 --photo ana.png"
    )]
    Students(cmd::students::StudentCommand),

    #[command(
        next_help_heading = "Records",
        subcommand,
        about = "Manage colleges",
        after_help = "EXAMPLES:\n    regis colleges list\n    regis colleges add --code CCS --name \"College of Computer Studies\""
    )]
    Colleges(cmd::colleges::CollegeCommand),

    #[command(
        next_help_heading = "Records",
        subcommand,
        about = "Manage academic programs",
        after_help = "EXAMPLES:\n    regis programs list --filter college_id=1\n    regis programs add --code BSCS --name \"BS Computer Science\" --college 1"
    )]
    Programs(cmd::programs::ProgramCommand),

    #[command(
        next_help_heading = "Console",
        about = "Open the interactive console",
        long_about = "Open the full-screen console: tabbed entity tables with \
                      search, sorting, paging, and record forms.",
        after_help = "EXAMPLES:\n    regis ui"
    )]
    Ui,

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    regis completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("REGIS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "regis=debug,info"
        } else {
            "regis=info,warn"
        })
    });

    let format = env::var("REGIS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // Diagnostics go to stderr; stdout is reserved for command output so
    // `--json` stays parseable.
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> std::process::ExitCode {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }
    let output = output::resolve_output_mode(cli.format, cli.json);

    let result = match &cli.command {
        Commands::Login(args) => cmd::login::run_login(args, output),
        Commands::Logout => cmd::login::run_logout(output),
        Commands::Students(command) => cmd::students::run(command, output),
        Commands::Colleges(command) => cmd::colleges::run(command, output),
        Commands::Programs(command) => cmd::programs::run(command, output),
        Commands::Ui => cmd::ui::run_ui(output),
        Commands::Completions(args) => {
            cmd::completions::run_completions(args.shell, &mut Cli::command())
        }
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        // Errors carrying the marker were already rendered by `report`.
        Err(e) => {
            if !e.is::<output::Reported>() {
                eprintln!("Error: {e:#}");
            }
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_reach_subcommands() {
        let cli = Cli::parse_from(["regis", "colleges", "list", "--json"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Colleges(_)));
    }

    #[test]
    fn format_flag_parses() {
        let cli = Cli::parse_from(["regis", "--format", "text", "logout"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
    }

    #[test]
    fn ui_takes_no_arguments() {
        let cli = Cli::parse_from(["regis", "ui"]);
        assert!(matches!(cli.command, Commands::Ui));
    }
}

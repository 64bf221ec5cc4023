pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "highfive",
    about = "High-Five operator CLI",
    long_about = "Operate the High-Five recognition ledger: migrations, leaderboard inspection, reset, config and readiness checks.",
    after_help = "Examples:\n  highfive doctor --json\n  highfive leaderboard --top 3\n  highfive reset --confirm"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending SQLite ledger migrations and return structured status output")]
    Migrate,
    #[command(about = "Print the current top givers and receivers as structured output")]
    Leaderboard {
        #[arg(long, help = "Number of entries per list (defaults to report.top_n)")]
        top: Option<usize>,
    },
    #[command(about = "Clear every recorded recognition from the ledger")]
    Reset {
        #[arg(long, help = "Required; confirms the ledger should be emptied")]
        confirm: bool,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, signature setup, mirror and ledger readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Leaderboard { top } => commands::leaderboard::run(top),
        Command::Reset { confirm } => commands::reset::run(confirm),
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn parses_leaderboard_and_reset_flags() {
        let cli = Cli::try_parse_from(["highfive", "leaderboard", "--top", "3"]).expect("parse");
        assert!(matches!(cli.command, Command::Leaderboard { top: Some(3) }));

        let cli = Cli::try_parse_from(["highfive", "reset"]).expect("parse");
        assert!(matches!(cli.command, Command::Reset { confirm: false }));

        let cli = Cli::try_parse_from(["highfive", "doctor", "--json"]).expect("parse");
        assert!(matches!(cli.command, Command::Doctor { json: true }));
    }

    #[test]
    fn rejects_unknown_subcommands() {
        assert!(Cli::try_parse_from(["highfive", "seed"]).is_err());
    }
}

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod context;
mod logging;

use commands::{admin, auth, convert, mail, settings};
use context::Context;

#[derive(Parser)]
#[command(name = "wfconv")]
#[command(about = "Convert automation workflows between Make.com and n8n", long_about = None)]
struct Cli {
    /// Directory holding the store and logs (defaults to ~/.config/wfconv)
    #[arg(long, global = true, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, creating the account on first use
    Login {
        email: String,
    },
    /// End the current session
    Logout,
    /// Show the logged-in account, plan and remaining conversions
    Whoami,
    /// Unlock the pro plan with a code
    Unlock {
        code: String,
    },
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: settings::SettingsAction,
    },
    /// Convert a workflow file (or `-` for stdin) to the other platform
    Convert(convert::ConvertArgs),
    /// Print a feedback mail link
    Feedback {
        /// Star rating from 1 to 5
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,
        /// Free-text feedback
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Print a pro upgrade request mail link
    Upgrade,
    /// Developer tools
    Admin {
        #[command(subcommand)]
        action: admin::AdminAction,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let _log_guard = logging::init(cli.data_dir.clone(), cli.verbose);

    let timeout = match &cli.command {
        Commands::Convert(args) => args.timeout.map(Duration::from_secs),
        _ => None,
    };
    let mut ctx = Context::open(cli.data_dir, timeout)?;

    let code = match cli.command {
        Commands::Login { email } => auth::login(&mut ctx, &email)?,
        Commands::Logout => auth::logout(&mut ctx),
        Commands::Whoami => auth::whoami(&ctx),
        Commands::Unlock { code } => auth::unlock(&mut ctx, &code),
        Commands::Settings { action } => settings::run(&mut ctx, action)?,
        Commands::Convert(args) => convert::run(&mut ctx, args).await?,
        Commands::Feedback { rating, text } => mail::feedback(&ctx, rating, &text.join(" ")),
        Commands::Upgrade => mail::upgrade(&ctx),
        Commands::Admin { action } => admin::run(&ctx, action)?,
    };

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wfconv_core::platform::Platform;

    #[test]
    fn test_parse_convert_with_target() {
        let cli = Cli::try_parse_from([
            "wfconv", "convert", "flow.json", "--to", "N8N", "--timeout", "30",
        ])
        .unwrap();

        match cli.command {
            Commands::Convert(args) => {
                assert_eq!(args.input, "flow.json");
                assert_eq!(args.to, Some(Platform::N8n));
                assert_eq!(args.timeout, Some(30));
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_feedback_rating_is_bounded() {
        assert!(Cli::try_parse_from(["wfconv", "feedback", "--rating", "6", "nice"]).is_err());
        assert!(Cli::try_parse_from(["wfconv", "feedback", "--rating", "5", "nice"]).is_ok());
    }

    #[test]
    fn test_global_data_dir_after_subcommand() {
        let cli = Cli::try_parse_from(["wfconv", "whoami", "--data-dir", "/tmp/x"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
    }
}

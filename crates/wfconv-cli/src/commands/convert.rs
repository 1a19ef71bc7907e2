use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use wfconv_application::{ConvertOutcome, IngestOutcome};
use wfconv_core::platform::Platform;

use super::output::resolve_output;
use crate::context::Context;

#[derive(Args)]
pub struct ConvertArgs {
    /// Source workflow (`.json` file, or `-` to read stdin)
    pub input: String,

    /// Target platform (defaults to the opposite of the detected source)
    #[arg(long)]
    pub to: Option<Platform>,

    /// Output file or directory (prints to stdout when omitted)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Abort the backend call after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

pub async fn run(ctx: &mut Context, args: ConvertArgs) -> Result<ExitCode> {
    let ingested = if args.input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read workflow from stdin")?;
        ctx.app.ingest(&text)
    } else {
        ctx.app.ingest_file(&PathBuf::from(&args.input))
    };

    match ingested {
        IngestOutcome::Invalid | IngestOutcome::Rejected(_) => {
            let message = ctx.app.error().unwrap_or("Invalid input.");
            eprintln!("{}", message.red());
            return Ok(ExitCode::FAILURE);
        }
        IngestOutcome::Parsed(platform) => {
            tracing::debug!(%platform, "Detected source platform");
        }
        IngestOutcome::Cleared => {}
    }

    if let Some(target) = args.to {
        ctx.app.set_target(target);
    }

    eprintln!(
        "{}",
        format!(
            "Converting {} → {}...",
            ctx.app.source_platform(),
            ctx.app.target_platform()
        )
        .dimmed()
    );

    let outcome = ctx.app.convert().await;
    match outcome {
        ConvertOutcome::Converted { user, .. } => {
            let pretty = ctx
                .app
                .converted_json_pretty()
                .context("Converted workflow is missing")?;

            match args.output {
                Some(output) => {
                    let path = resolve_output(Some(&output), &ctx.app.download_file_name());
                    std::fs::write(&path, pretty)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    eprintln!(
                        "{}",
                        format!("Converted workflow written to {}", path.display()).green()
                    );
                }
                None => println!("{}", pretty),
            }

            if !user.is_pro {
                eprintln!("Free conversions left: {}", user.conversion_count);
            }
            Ok(ExitCode::SUCCESS)
        }
        ConvertOutcome::Failed(err) => {
            eprintln!("{}", err.to_string().red());
            Ok(ExitCode::FAILURE)
        }
        gate => {
            if let Some(message) = gate.message() {
                eprintln!("{}", message.yellow());
            }
            match gate {
                ConvertOutcome::LoginRequired => {
                    eprintln!("Run `wfconv login <email>` first.");
                }
                ConvertOutcome::ApiKeyMissing => {
                    eprintln!("Run `wfconv settings set-key <key>` first.");
                }
                ConvertOutcome::UpgradeRequired => {
                    eprintln!("Request an upgrade: {}", ctx.app.upgrade_link());
                }
                _ => {}
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Subcommand;
use colored::Colorize;
use wfconv_core::user::is_valid_email;

use super::output::resolve_output;
use crate::context::Context;

#[derive(Subcommand)]
pub enum AdminAction {
    /// Print the unlock code for an email
    IssueCode { email: String },
    /// Write a snapshot of local users and settings (developer only)
    DebugReport {
        /// File or directory to write to (defaults to the current directory)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

pub fn run(ctx: &Context, action: AdminAction) -> Result<ExitCode> {
    match action {
        AdminAction::IssueCode { email } => {
            let email = email.trim();
            if !is_valid_email(email) {
                eprintln!("{}", "Please enter a valid email address.".red());
                return Ok(ExitCode::FAILURE);
            }
            println!("{}", ctx.entitlements.issue_code(email));
            Ok(ExitCode::SUCCESS)
        }
        AdminAction::DebugReport { output } => {
            let Some(report) = ctx.app.debug_report() else {
                eprintln!(
                    "{}",
                    "Only the developer account can export a debug report.".red()
                );
                return Ok(ExitCode::FAILURE);
            };

            let path = resolve_output(output.as_deref(), &report.file_name());
            let json = serde_json::to_string_pretty(&report)
                .context("Failed to serialize debug report")?;
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;

            println!("Debug report written to {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::Subcommand;
use colored::Colorize;
use wfconv_core::settings::Theme;

use crate::context::Context;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the current settings (API key masked)
    Show,
    /// Store the API key used for conversions
    SetKey { key: String },
    /// Remove the stored API key
    ClearKey,
    /// Set the theme preference
    Theme { theme: Theme },
}

pub fn run(ctx: &mut Context, action: SettingsAction) -> Result<ExitCode> {
    let mut settings = ctx.app.settings().clone();

    match action {
        SettingsAction::Show => {
            let masked = settings.masked();
            println!("Provider: {}", masked.provider);
            println!(
                "API key:  {}",
                masked.api_key.as_deref().unwrap_or("(not set)")
            );
            println!("Theme:    {}", masked.theme);
            return Ok(ExitCode::SUCCESS);
        }
        SettingsAction::SetKey { key } => {
            let key = key.trim();
            if key.is_empty() {
                bail!("API key must not be empty");
            }
            settings.api_key = Some(key.to_string());
            ctx.app.save_settings(settings);
            println!("{}", "API key saved.".green());
        }
        SettingsAction::ClearKey => {
            settings.api_key = None;
            ctx.app.save_settings(settings);
            println!("API key removed.");
        }
        SettingsAction::Theme { theme } => {
            settings.theme = theme;
            ctx.app.save_settings(settings);
            println!("Theme set to {}.", theme);
        }
    }

    Ok(ExitCode::SUCCESS)
}

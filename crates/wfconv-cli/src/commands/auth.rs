use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use wfconv_application::LoginOutcome;

use crate::context::Context;

pub fn login(ctx: &mut Context, email: &str) -> Result<ExitCode> {
    match ctx.app.login(email) {
        Ok(LoginOutcome::Returning(user)) => {
            println!("{}", format!("Logged in as {}", user.email).green());
            Ok(ExitCode::SUCCESS)
        }
        Ok(LoginOutcome::Registered {
            user,
            reference_code,
            activation_link,
        }) => {
            println!(
                "{}",
                format!(
                    "Account created for {} with {} free conversions.",
                    user.email, user.conversion_count
                )
                .green()
            );
            println!("Your reference code is {}.", reference_code.bold());
            println!("Send the signup notice to the developer to activate your account:");
            println!("{}", activation_link);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            Ok(ExitCode::FAILURE)
        }
    }
}

pub fn logout(ctx: &mut Context) -> ExitCode {
    ctx.app.logout();
    println!("Logged out.");
    ExitCode::SUCCESS
}

pub fn whoami(ctx: &Context) -> ExitCode {
    let Some(user) = ctx.app.current_user() else {
        println!("Not logged in.");
        return ExitCode::SUCCESS;
    };

    println!("Email:     {}", user.email);
    println!("Plan:      {}", user.plan());
    if user.is_pro {
        println!("Remaining: unlimited");
    } else {
        let remaining = ctx.app.remaining_quota().unwrap_or(0);
        println!("Remaining: {}", remaining);
    }
    if ctx.app.is_admin() {
        println!("Role:      developer");
    }
    ExitCode::SUCCESS
}

pub fn unlock(ctx: &mut Context, code: &str) -> ExitCode {
    match ctx.app.unlock_pro(code) {
        Ok(user) => {
            println!(
                "{}",
                format!("Pro plan unlocked for {}. Enjoy unlimited conversions!", user.email)
                    .green()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            ExitCode::FAILURE
        }
    }
}

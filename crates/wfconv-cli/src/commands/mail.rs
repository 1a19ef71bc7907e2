use std::process::ExitCode;

use colored::Colorize;

use crate::context::Context;

pub fn feedback(ctx: &Context, rating: u8, text: &str) -> ExitCode {
    match ctx.app.feedback_link(rating, text) {
        Some(link) => {
            println!("Open this link to send your feedback:");
            println!("{}", link);
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("{}", "Please log in before sending feedback.".red());
            ExitCode::FAILURE
        }
    }
}

pub fn upgrade(ctx: &Context) -> ExitCode {
    println!("Open this link to request a pro upgrade:");
    println!("{}", ctx.app.upgrade_link());
    ExitCode::SUCCESS
}

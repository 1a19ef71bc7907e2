pub mod admin;
pub mod auth;
pub mod convert;
pub mod mail;
pub mod output;
pub mod settings;

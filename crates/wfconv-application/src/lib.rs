pub mod converter_app;
pub mod mail;

pub use converter_app::{
    ConvertOutcome, ConverterApp, IngestOutcome, LoginError, LoginOutcome, UnlockError,
};

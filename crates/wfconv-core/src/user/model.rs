//! User record domain model.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Number of conversions a new account starts with.
pub const FREE_CONVERSIONS: u32 = 5;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern is a valid regex")
});

/// A user's entitlement record.
///
/// `conversion_count` is the number of free conversions left. It only
/// matters while `is_pro` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    pub is_pro: bool,
    pub conversion_count: u32,
}

impl User {
    /// Creates a free-tier record with the starting quota.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            is_pro: false,
            conversion_count: FREE_CONVERSIONS,
        }
    }

    /// Human-readable plan label.
    pub fn plan(&self) -> &'static str {
        if self.is_pro { "Pro" } else { "Free" }
    }
}

/// Loose syntactic check used before logging in: `something@something.tld`.
pub fn is_valid_email(email: &str) -> bool {
    !email.trim().is_empty() && EMAIL_PATTERN.is_match(email)
}

//! User domain module.
//!
//! # Module Structure
//!
//! - `model`: the persisted user record and email validation
//! - `unlock_code`: deterministic pro unlock codes

mod model;
mod unlock_code;

// Re-export public API
pub use model::{FREE_CONVERSIONS, User, is_valid_email};
pub use unlock_code::{FALLBACK_CODE, UNLOCK_CODE_LEN, code_matches, issue_code};

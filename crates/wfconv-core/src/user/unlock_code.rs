//! Deterministic pro unlock codes.
//!
//! The code for an email is derived from the email alone, so whoever issues
//! codes and the local validator agree without sharing any state. It is a
//! license hint, not a secret: anyone who knows the scheme can compute it.
//!
//! The scheme must stay bit-compatible with codes already handed out:
//!
//! 1. lowercase the email and keep the part before the first `@`;
//! 2. collect its unique `[a-z0-9]` characters in first-seen order;
//! 3. seed = sum of the UTF-16 code units of the whole local part;
//! 4. shuffle with `j = ((seed + i) * (seed + i + 1)) % (i + 1)` for `i`
//!    from the last index down to 1;
//! 5. take 7 characters uppercased, repeating short codes until 7 long.

/// Length of every unlock code.
pub const UNLOCK_CODE_LEN: usize = 7;

/// Code issued for local parts without any alphanumeric character.
pub const FALLBACK_CODE: &str = "DEFAULT";

/// Computes the unlock code for `email`.
pub fn issue_code(email: &str) -> String {
    let lowered = email.to_lowercase();
    let local = lowered.split('@').next().unwrap_or_default();

    let mut unique: Vec<char> = Vec::new();
    for c in local
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        if !unique.contains(&c) {
            unique.push(c);
        }
    }

    if unique.is_empty() {
        return FALLBACK_CODE.to_string();
    }

    let seed: u64 = local.encode_utf16().map(u64::from).sum();

    for i in (1..unique.len()).rev() {
        let n = i as u64;
        let j = ((seed + n) * (seed + n + 1)) % (n + 1);
        unique.swap(i, j as usize);
    }

    let mut code: String = unique
        .iter()
        .take(UNLOCK_CODE_LEN)
        .collect::<String>()
        .to_uppercase();

    while code.len() < UNLOCK_CODE_LEN {
        code = code.repeat(2);
    }
    code.truncate(UNLOCK_CODE_LEN);
    code
}

/// Case-insensitive comparison of a presented code against the issued one.
pub fn code_matches(email: &str, presented: &str) -> bool {
    presented.to_uppercase() == issue_code(email)
}

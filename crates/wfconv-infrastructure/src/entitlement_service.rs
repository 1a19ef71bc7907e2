//! Entitlement store: local accounts, free quota and pro unlocks.
//!
//! Records live in the key-value store as one JSON table (email → user)
//! plus a scalar session pointer holding the logged-in email. Persistence
//! problems never reach the caller: an unreadable table is an empty table and
//! failed writes are logged.

use std::collections::BTreeMap;
use std::sync::Arc;

use wfconv_core::error::{Result, WfconvError};
use wfconv_core::storage::KeyValueStore;
use wfconv_core::user::{self, User};

/// Key of the email → user table.
pub const USER_DB_KEY: &str = "workflowConverterUsers_v1";
/// Key of the current-session email.
pub const CURRENT_USER_KEY: &str = "workflowConverterCurrentUser_v1";

type UserDb = BTreeMap<String, User>;

/// Reads and updates entitlement records.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use wfconv_infrastructure::{EntitlementStore, MemoryStore};
///
/// let store = EntitlementStore::new(Arc::new(MemoryStore::new()));
/// let user = store.login("a@b.com", true).unwrap();
/// assert_eq!(user.conversion_count, 5);
/// ```
#[derive(Clone)]
pub struct EntitlementStore {
    store: Arc<dyn KeyValueStore>,
}

impl EntitlementStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn user_db(&self) -> UserDb {
        match self.store.get(USER_DB_KEY) {
            Ok(raw) => parse_user_db(raw.as_deref()),
            Err(e) => {
                tracing::warn!("Failed to read user table: {}", e);
                UserDb::new()
            }
        }
    }

    /// Applies `edit` to the user table as one locked read-modify-write.
    ///
    /// `edit` returns its result and whether the table changed; unchanged
    /// tables are written back as they were read.
    fn edit_user_db<R>(&self, edit: impl FnOnce(&mut UserDb) -> (R, bool)) -> Result<R> {
        let mut edit = Some(edit);
        let mut outcome = None;

        self.store.update(USER_DB_KEY, &mut |raw: Option<String>| {
            let Some(edit) = edit.take() else {
                return raw;
            };
            let mut db = parse_user_db(raw.as_deref());
            let (result, changed) = edit(&mut db);
            outcome = Some(result);

            if !changed {
                return raw;
            }
            match serde_json::to_string(&db) {
                Ok(json) => Some(json),
                Err(e) => {
                    tracing::warn!("Failed to serialize user table: {}", e);
                    raw
                }
            }
        })?;

        outcome.ok_or_else(|| WfconvError::storage("User table edit did not run"))
    }

    /// Checks if a record exists for `email`.
    pub fn exists(&self, email: &str) -> bool {
        self.user_db().contains_key(email)
    }

    /// Logs `email` in.
    ///
    /// A new user without a record gets one with the free quota. Otherwise the
    /// existing record is returned. The session pointer is set whenever a
    /// record is returned; a returning user without a record gets `None` and
    /// the session is left as it was. If the table cannot be written, a new
    /// user still gets an unsaved record for this session.
    pub fn login(&self, email: &str, is_new_user: bool) -> Option<User> {
        let edited = self.edit_user_db(|db| match db.get(email) {
            Some(existing) => (Some(existing.clone()), false),
            None if is_new_user => {
                let created = User::new(email);
                db.insert(email.to_string(), created.clone());
                (Some(created), true)
            }
            None => (None, false),
        });

        let user = match edited {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::warn!(email, "Login for unknown returning user");
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to update user table: {}", e);
                if !is_new_user {
                    return None;
                }
                User::new(email)
            }
        };

        if let Err(e) = self.store.set(CURRENT_USER_KEY, email.to_string()) {
            tracing::warn!("Failed to save session: {}", e);
        }
        Some(user)
    }

    /// Clears the session pointer. Records are kept.
    pub fn logout(&self) {
        if let Err(e) = self.store.remove(CURRENT_USER_KEY) {
            tracing::warn!("Failed to clear session: {}", e);
        }
    }

    /// Email of the logged-in user, if any.
    pub fn current_email(&self) -> Option<String> {
        match self.store.get(CURRENT_USER_KEY) {
            Ok(email) => email.filter(|e| !e.is_empty()),
            Err(e) => {
                tracing::warn!("Failed to read session: {}", e);
                None
            }
        }
    }

    /// Resolves the session pointer to a record.
    pub fn current_user(&self) -> Option<User> {
        let email = self.current_email()?;
        self.user_db().remove(&email)
    }

    /// Free conversions left for `email`; 0 for unknown users.
    pub fn remaining_quota(&self, email: &str) -> u32 {
        self.user_db()
            .get(email)
            .map(|user| user.conversion_count)
            .unwrap_or(0)
    }

    /// Spends one free conversion.
    ///
    /// Only non-pro users are charged and the count never drops below zero.
    /// For pro or unknown users nothing changes and the session user is
    /// returned as it is.
    pub fn debit_quota(&self, email: &str) -> Option<User> {
        let edited = self.edit_user_db(|db| match db.get_mut(email) {
            Some(user) if !user.is_pro => {
                user.conversion_count = user.conversion_count.saturating_sub(1);
                (Some(user.clone()), true)
            }
            _ => (None, false),
        });

        match edited {
            Ok(Some(updated)) => {
                tracing::debug!(
                    email,
                    remaining = updated.conversion_count,
                    "Debited one conversion"
                );
                Some(updated)
            }
            Ok(None) => self.current_user(),
            Err(e) => {
                tracing::warn!("Failed to debit quota: {}", e);
                self.current_user()
            }
        }
    }

    /// Unlocks pro for `email` if `code` matches its issued code.
    ///
    /// Codes compare case-insensitively. On mismatch or unknown email nothing
    /// changes and `None` is returned.
    pub fn grant_pro(&self, email: &str, code: &str) -> Option<User> {
        if !user::code_matches(email, code) {
            tracing::info!(email, "Rejected unlock code");
            return None;
        }

        let edited = self.edit_user_db(|db| match db.get_mut(email) {
            Some(user) => {
                user.is_pro = true;
                (Some(user.clone()), true)
            }
            None => (None, false),
        });

        match edited {
            Ok(Some(updated)) => {
                tracing::info!(email, "Unlocked pro plan");
                Some(updated)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to save pro unlock: {}", e);
                None
            }
        }
    }

    /// The unlock code for `email`.
    pub fn issue_code(&self, email: &str) -> String {
        user::issue_code(email)
    }

    /// Snapshot of every stored record.
    pub fn users(&self) -> BTreeMap<String, User> {
        self.user_db()
    }
}

/// Parses the stored table; a missing or malformed table is empty.
fn parse_user_db(raw: Option<&str>) -> UserDb {
    let Some(raw) = raw else {
        return UserDb::new();
    };
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!("User table is malformed, treating as empty: {}", e);
        UserDb::new()
    })
}

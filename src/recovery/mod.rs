// src/recovery/mod.rs
//
// Password-reset codes. A forgot-password request parks a one-time
// code here and e-mails it to the account owner; the reset endpoint
// consumes it. Codes are process-local and short-lived, so a restart
// simply voids outstanding requests.

use chrono::{DateTime, Duration, Utc};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::utils;

const RESET_CODE_TTL_MINUTES: i64 = 60;

#[derive(Debug, Clone)]
struct ResetEntry {
    user_id: i64,
    expires_at: DateTime<Utc>,
}

lazy_static! {
    static ref RESET_CODES: Mutex<HashMap<String, ResetEntry>> = Mutex::new(HashMap::new());
}

/// Create a reset code for the account and return it.
pub fn create_reset_code(user_id: i64) -> String {
    let code = utils::random_confirm_id();
    let entry = ResetEntry {
        user_id,
        expires_at: Utc::now() + Duration::minutes(RESET_CODE_TTL_MINUTES),
    };
    RESET_CODES
        .lock()
        .expect("reset code table poisoned")
        .insert(code.clone(), entry);
    code
}

/// Consume a reset code, returning the account it was issued for.
/// A missing, already-used, or expired code returns `None`.
pub fn take_reset_code(code: &str) -> Option<i64> {
    let mut codes = RESET_CODES.lock().expect("reset code table poisoned");
    let entry = codes.remove(code)?;
    if entry.expires_at < Utc::now() {
        return None;
    }
    Some(entry.user_id)
}

/// Drop expired codes; called from the periodic cleanup task.
pub fn cleanup_expired_codes() -> usize {
    let mut codes = RESET_CODES.lock().expect("reset code table poisoned");
    let before = codes.len();
    let now = Utc::now();
    codes.retain(|_, entry| entry.expires_at >= now);
    before - codes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_single_use() {
        let code = create_reset_code(42);
        assert_eq!(take_reset_code(&code), Some(42));
        assert_eq!(take_reset_code(&code), None);
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert_eq!(take_reset_code("no-such-code"), None);
    }

    #[test]
    fn expired_codes_are_rejected_and_cleaned() {
        let code = utils::random_confirm_id();
        RESET_CODES.lock().unwrap().insert(
            code.clone(),
            ResetEntry {
                user_id: 9,
                expires_at: Utc::now() - Duration::minutes(5),
            },
        );
        assert_eq!(take_reset_code(&code), None);

        let other = utils::random_confirm_id();
        RESET_CODES.lock().unwrap().insert(
            other.clone(),
            ResetEntry {
                user_id: 9,
                expires_at: Utc::now() - Duration::minutes(5),
            },
        );
        assert!(cleanup_expired_codes() >= 1);
        assert!(!RESET_CODES.lock().unwrap().contains_key(&other));
    }
}

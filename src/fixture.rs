use chrono::{NaiveDateTime, TimeDelta};
use uuid::Uuid;

pub const PROPOSAL_PERMLINK: &str = "steempy-proposal-title";

/// Random subject in the textual form of a version 4 UUID.
pub fn random_subject() -> String {
    Uuid::new_v4().to_string()
}

/// Random account name starting with `prefix`, cut to the 16 characters a name may hold.
pub fn random_account_name(prefix: &str) -> String {
    let suffix = hex::encode(rand::random::<[u8; 4]>());
    let mut name = format!("{prefix}{suffix}");
    name.truncate(16);
    name
}

/// Checks the chain's account naming rules: dot separated segments of at
/// least three characters, each starting with a letter, ending with a letter
/// or digit, and holding only lowercase letters, digits and dashes.
pub fn is_valid_account_name(name: &str) -> bool {
    if !(3..=16).contains(&name.len()) {
        return false;
    }
    name.split('.').all(|segment| {
        let bytes = segment.as_bytes();
        bytes.len() >= 3
            && bytes[0].is_ascii_lowercase()
            && bytes[bytes.len() - 1].is_ascii_alphanumeric()
            && bytes
                .iter()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
    })
}

/// Window starting `start_days` after `now` and lasting `length_days`.
pub fn date_window(now: NaiveDateTime, start_days: i64, length_days: i64) -> (NaiveDateTime, NaiveDateTime) {
    let start = now + TimeDelta::days(start_days);
    (start, start + TimeDelta::days(length_days))
}

pub fn account_permlink(account: &str) -> String {
    format!("{PROPOSAL_PERMLINK}-{account}")
}

//! ID generation for tasks and subtasks.

use chrono::{DateTime, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};

/// Generate a unique ID from content + entropy.
/// Format: "tw-" + 10 hex chars of SHA256(description + timestamp + random)
pub fn generate_id(description: &str, created_at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(description.as_bytes());
    hasher.update(created_at.timestamp_nanos_opt().unwrap_or(0).to_le_bytes());
    hasher.update(rand::rng().random::<[u8; 8]>());
    let hash = hasher.finalize();
    format!(
        "tw-{:010x}",
        u64::from_be_bytes([hash[0], hash[1], hash[2], hash[3], hash[4], 0, 0, 0]) >> 24
    )
}

/// Generate an ID that is not already taken according to `taken`.
pub fn generate_unique_id(description: &str, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = generate_id(description, Utc::now());
        if !taken(&id) {
            return id;
        }
        log::debug!("ID collision on {}, regenerating", id);
    }
}

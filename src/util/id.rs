//! ID generation for issues.
//!
//! Issue IDs are 24 lowercase hex digits: 8 digits of creation time in Unix
//! seconds followed by 16 digits of a SHA256 over the project, the store's
//! insertion sequence number, the creation timestamp and a nonce.
//!
//! The sequence number is never reused by the store, so an ID that has been
//! deleted is never generated again.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// Total length of an issue ID.
pub const ID_LENGTH: usize = 24;

/// Hex digits taken from the creation time.
const TIME_DIGITS: usize = 8;

/// Nonces tried before giving up on a candidate.
const MAX_NONCE: u32 = 1000;

/// ID generator that produces unique issue IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdGenerator;

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Generate a candidate ID with the given parameters.
    #[must_use]
    pub fn generate_candidate(
        &self,
        project: &str,
        sequence: i64,
        created_on: DateTime<Utc>,
        nonce: u32,
    ) -> String {
        let seed = generate_id_seed(project, sequence, created_on, nonce);
        let time_part = time_prefix(created_on);
        let hash_part = compute_id_hash(&seed, ID_LENGTH - TIME_DIGITS);
        format!("{time_part}{hash_part}")
    }

    /// Generate an ID, checking for collisions with the provided checker.
    ///
    /// The checker function should return `true` if the ID already exists.
    /// Returns `None` only if every nonce collided, which means the checker
    /// is broken.
    pub fn generate<F>(
        &self,
        project: &str,
        sequence: i64,
        created_on: DateTime<Utc>,
        mut exists: F,
    ) -> Option<String>
    where
        F: FnMut(&str) -> bool,
    {
        (0..MAX_NONCE)
            .map(|nonce| self.generate_candidate(project, sequence, created_on, nonce))
            .find(|id| !exists(id))
    }
}

/// Generate the seed string for ID generation.
///
/// Inputs: `project | sequence | created_on (ns) | nonce`
#[must_use]
pub fn generate_id_seed(
    project: &str,
    sequence: i64,
    created_on: DateTime<Utc>,
    nonce: u32,
) -> String {
    format!(
        "{}|{}|{}|{}",
        project,
        sequence,
        created_on.timestamp_nanos_opt().unwrap_or(0),
        nonce
    )
}

/// Compute a lowercase hex hash of the input with a specific length.
#[must_use]
pub fn compute_id_hash(input: &str, length: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();

    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out.truncate(length);
    out
}

fn time_prefix(created_on: DateTime<Utc>) -> String {
    // Seconds before 1970 or after 2106 wrap; the prefix only has to be stable.
    let seconds = u32::try_from(created_on.timestamp().rem_euclid(1_i64 << 32)).unwrap_or(0);
    format!("{seconds:08x}")
}

/// Check whether a string has the shape of an issue ID.
#[must_use]
pub fn is_valid_id_format(id: &str) -> bool {
    id.len() == ID_LENGTH
        && id
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

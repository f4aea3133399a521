//! Shared helpers for name matching and identifier generation.

use chrono::Utc;
use rand::Rng;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Compare two company names the way every link in the tracker does:
/// case-insensitively, with no other normalization.
#[must_use]
pub fn names_match(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Encode `value` in lower-case base 36.
fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Generator for record and note identifiers.
///
/// Ids have the form `<millis>-<sequence>-<random>`. The sequence is
/// monotonic for the generator's lifetime, so two ids from the same
/// generator never collide even within one millisecond.
#[derive(Debug, Default)]
pub struct IdGenerator {
    sequence: u64,
}

impl IdGenerator {
    /// Create a generator starting at sequence zero
    #[must_use]
    pub const fn new() -> Self {
        Self { sequence: 0 }
    }

    /// Mint the next identifier
    pub fn next_id(&mut self) -> String {
        self.sequence += 1;
        let millis = Utc::now().timestamp_millis();
        let suffix: u64 = rand::thread_rng().gen_range(0..36_u64.pow(6));
        format!("{millis}-{}-{}", to_base36(self.sequence), to_base36(suffix))
    }
}

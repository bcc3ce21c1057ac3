//! Order number generation
//!
//! Format: `<PREFIX>-<14-digit UTC timestamp>-<5-char random suffix>`,
//! e.g. `UCO-20260830142501-7KQ2M`.
//!
//! Candidates are not pre-checked for existence; uniqueness is enforced by
//! the `order_numbers` storage table at claim time and the creation
//! transaction regenerates on conflict, bounded by
//! `Config::order_number_max_attempts`. This avoids the check-then-create
//! race entirely.

use chrono::Utc;
use rand::Rng;

/// Suffix alphabet: uppercase alphanumerics.
const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 5;

/// Generate one order-number candidate.
pub fn candidate(prefix: &str) -> String {
    let stamp = Utc::now().format("%Y%m%d%H%M%S");
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect();
    format!("{}-{}-{}", prefix, stamp, suffix)
}

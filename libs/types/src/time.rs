//! Nanosecond wall-clock helper

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time in nanoseconds since the Unix epoch.
///
/// Used to stamp orders at creation; comparisons between stamps from the
/// same process are meaningful at nanosecond resolution.
pub fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the Unix epoch")
        .as_nanos() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_nanos_monotone_enough() {
        let a = now_nanos();
        let b = now_nanos();
        assert!(b >= a);
    }
}

// File: frota-sync/src/ids.rs
// Purpose: Locally generated entity ids

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Generate an id from the current time in milliseconds.
///
/// Ids are strictly increasing within the process: two calls in the same
/// millisecond get consecutive values.
pub fn next_local_id() -> String {
    let now = Utc::now().timestamp_millis();
    let mut prev = LAST_ID.load(Ordering::Relaxed);

    loop {
        let candidate = if now > prev { now } else { prev + 1 };
        match LAST_ID.compare_exchange_weak(prev, candidate, Ordering::SeqCst, Ordering::Relaxed) {
            Ok(_) => return candidate.to_string(),
            Err(actual) => prev = actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_strictly_increase() {
        let ids: Vec<i64> = (0..1000)
            .map(|_| next_local_id().parse().unwrap())
            .collect();

        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_ids_are_time_based() {
        let before = Utc::now().timestamp_millis();
        let id: i64 = next_local_id().parse().unwrap();
        assert!(id >= before);
    }
}
